//! Font descriptions and advance-width metrics for the PDF base-14 fonts
//!
//! Widths are in 1/1000 em, as in the Adobe AFM files.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

pub const PT_TO_MM: f64 = 25.4 / 72.0;

const COURIER_ADVANCE: u16 = 600;
const HELVETICA_FALLBACK_ADVANCE: u16 = 556;

/// Helvetica advances for U+0020..=U+007E.
#[rustfmt::skip]
const HELVETICA_ASCII_ADVANCES: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // p..~
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Monospace
    Courier,
    /// Proportional
    Helvetica,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub family: FontFamily,
    pub weight: FontWeight,
    pub size_pt: f64,
}

impl FontSpec {
    pub const fn new(family: FontFamily, weight: FontWeight, size_pt: f64) -> Self {
        Self {
            family,
            weight,
            size_pt,
        }
    }

    /// PostScript name of the matching base-14 font
    pub fn base_font_name(&self) -> &'static str {
        match (self.family, self.weight) {
            (FontFamily::Helvetica, FontWeight::Normal) => "Helvetica",
            (FontFamily::Helvetica, FontWeight::Bold) => "Helvetica-Bold",
            (FontFamily::Courier, FontWeight::Normal) => "Courier",
            (FontFamily::Courier, FontWeight::Bold) => "Courier-Bold",
        }
    }

    /// Advance of `text` in 1/1000 em, independent of size
    pub fn text_units(&self, text: &str) -> u32 {
        text.chars()
            .map(|ch| u32::from(advance(self.family, ch)))
            .sum()
    }

    pub fn char_units(&self, ch: char) -> u32 {
        u32::from(advance(self.family, ch))
    }

    pub fn units_to_mm(&self, units: u32) -> f64 {
        f64::from(units) / 1000.0 * self.size_pt * PT_TO_MM
    }

    pub fn char_width_mm(&self, ch: char) -> f64 {
        self.units_to_mm(self.char_units(ch))
    }

    pub fn text_width_mm(&self, text: &str) -> f64 {
        self.units_to_mm(self.text_units(text))
    }
}

// Helvetica-Bold is measured with the regular advances; only body text is
// set in Helvetica and it is never bold.
fn advance(family: FontFamily, ch: char) -> u16 {
    let code = ch as u32;
    match family {
        FontFamily::Courier => {
            if (0x20..=0x7E).contains(&code) {
                COURIER_ADVANCE
            } else {
                COURIER_ADVANCE * display_cells(ch)
            }
        }
        FontFamily::Helvetica => {
            if (0x20..=0x7E).contains(&code) {
                HELVETICA_ASCII_ADVANCES[(code - 0x20) as usize]
            } else {
                HELVETICA_FALLBACK_ADVANCE * display_cells(ch)
            }
        }
    }
}

fn display_cells(ch: char) -> u16 {
    UnicodeWidthChar::width(ch).unwrap_or(0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    const COURIER_10: FontSpec = FontSpec::new(FontFamily::Courier, FontWeight::Bold, 10.0);
    const HELVETICA_10: FontSpec = FontSpec::new(FontFamily::Helvetica, FontWeight::Normal, 10.0);

    #[test]
    fn courier_is_monospaced() {
        assert_eq!(COURIER_10.text_width_mm("iiii"), COURIER_10.text_width_mm("MMMM"));
        let expected = 4.0 * 0.6 * 10.0 * PT_TO_MM;
        assert!((COURIER_10.text_width_mm("abcd") - expected).abs() < 1e-9);
    }

    #[test]
    fn helvetica_is_proportional() {
        assert!(HELVETICA_10.text_width_mm("iiii") < HELVETICA_10.text_width_mm("MMMM"));
        assert!((HELVETICA_10.char_width_mm('W') - 0.944 * 10.0 * PT_TO_MM).abs() < 1e-9);
    }

    #[test]
    fn wide_glyphs_take_two_cells() {
        assert_eq!(
            HELVETICA_10.char_width_mm('漢'),
            2.0 * HELVETICA_10.char_width_mm('é')
        );
    }

    #[test]
    fn control_characters_have_no_width() {
        assert_eq!(HELVETICA_10.char_width_mm('\u{7}'), 0.0);
    }

    #[test]
    fn base_font_names() {
        assert_eq!(COURIER_10.base_font_name(), "Courier-Bold");
        assert_eq!(HELVETICA_10.base_font_name(), "Helvetica");
    }
}
