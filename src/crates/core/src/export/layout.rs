//! Deterministic page layout for exported reports
//!
//! All positions are millimetres on an A4 portrait page, measured to the text
//! baseline from the top edge. Layout never reads the clock or any other
//! ambient state.

use super::metrics::{FontFamily, FontSpec, FontWeight, PT_TO_MM};
use super::types::{ExportDocument, HeaderBand, Page, Position, RegionRole, Rgb, StyledRegion};

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;
pub const MARGIN_MM: f64 = 20.0;
pub const CONTENT_WIDTH_MM: f64 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
pub const BOTTOM_LIMIT_MM: f64 = PAGE_HEIGHT_MM - MARGIN_MM;

pub const HEADER_BAND_HEIGHT_MM: f64 = 45.0;
pub const HEADING_TEXT: &str = "SOVEREIGN ARCHIVE // INTEL";
pub const HEADING_Y_MM: f64 = 22.0;
pub const TITLE_FIRST_LINE_Y_MM: f64 = 32.0;
pub const TITLE_LINE_HEIGHT_MM: f64 = 5.0;
/// Title lines that fit inside the header band; longer titles end in `TITLE_ELLIPSIS`
pub const MAX_TITLE_LINES: usize = 3;
pub const TITLE_ELLIPSIS: &str = "...";
/// Body start before accounting for the wrapped title; clears the header band
pub const CONTENT_BASE_OFFSET_MM: f64 = 50.0;
pub const BODY_LINE_HEIGHT_MM: f64 = 11.0 * 1.15 * PT_TO_MM;
pub const CONTINUATION_START_Y_MM: f64 = MARGIN_MM;

pub const HEADER_BAND_COLOR: Rgb = Rgb(15, 23, 42);
pub const ACCENT_COLOR: Rgb = Rgb(34, 211, 238);
pub const TITLE_COLOR: Rgb = Rgb(100, 116, 139);
pub const BODY_COLOR: Rgb = Rgb(30, 41, 59);

pub const HEADING_FONT: FontSpec = FontSpec::new(FontFamily::Courier, FontWeight::Bold, 20.0);
pub const TITLE_FONT: FontSpec = FontSpec::new(FontFamily::Courier, FontWeight::Bold, 9.0);
pub const BODY_FONT: FontSpec = FontSpec::new(FontFamily::Helvetica, FontWeight::Normal, 11.0);

const FILE_PREFIX: &str = "Sovereign_Intel_";
const MARKUP_CHARS: [char; 2] = ['#', '*'];

/// Lay out `(topic, report_text)` into pages.
pub fn export(topic: &str, report_text: &str) -> ExportDocument {
    let title_lines = title_lines(topic);
    let body = normalize_body(report_text);
    let body_lines = if body.trim().is_empty() {
        Vec::new()
    } else {
        wrap_text(body.trim_end(), &BODY_FONT, CONTENT_WIDTH_MM)
    };

    let mut first = Page {
        header: Some(HeaderBand {
            width_mm: PAGE_WIDTH_MM,
            height_mm: HEADER_BAND_HEIGHT_MM,
            color: HEADER_BAND_COLOR,
        }),
        regions: Vec::with_capacity(1 + title_lines.len() + body_lines.len()),
    };
    first.regions.push(region(
        RegionRole::Heading,
        HEADING_TEXT.to_string(),
        HEADING_FONT,
        ACCENT_COLOR,
        HEADING_Y_MM,
    ));
    for (i, line) in title_lines.iter().enumerate() {
        first.regions.push(region(
            RegionRole::Target,
            line.clone(),
            TITLE_FONT,
            TITLE_COLOR,
            TITLE_FIRST_LINE_Y_MM + i as f64 * TITLE_LINE_HEIGHT_MM,
        ));
    }

    let mut pages = vec![first];
    let mut y = content_start_y(title_lines.len());
    for line in body_lines {
        if y > BOTTOM_LIMIT_MM {
            pages.push(Page::default());
            y = CONTINUATION_START_Y_MM;
        }
        if let Some(page) = pages.last_mut() {
            page.regions
                .push(region(RegionRole::Body, line, BODY_FONT, BODY_COLOR, y));
        }
        y += BODY_LINE_HEIGHT_MM;
    }

    ExportDocument {
        file_stem: file_stem(topic),
        page_width_mm: PAGE_WIDTH_MM,
        page_height_mm: PAGE_HEIGHT_MM,
        pages,
    }
}

/// Baseline of the first body line for a title wrapped onto `title_line_count` lines
pub fn content_start_y(title_line_count: usize) -> f64 {
    CONTENT_BASE_OFFSET_MM + title_line_count as f64 * TITLE_LINE_HEIGHT_MM
}

/// Wrapped title, capped at `MAX_TITLE_LINES` so it never leaves the header band.
pub fn title_lines(topic: &str) -> Vec<String> {
    let mut lines = wrap_text(&title_text(topic), &TITLE_FONT, CONTENT_WIDTH_MM);
    if lines.len() > MAX_TITLE_LINES {
        lines.truncate(MAX_TITLE_LINES);
        if let Some(last) = lines.last_mut() {
            *last = with_ellipsis(last, &TITLE_FONT, CONTENT_WIDTH_MM);
        }
    }
    lines
}

fn with_ellipsis(line: &str, font: &FontSpec, max_width_mm: f64) -> String {
    let ellipsis_units = font.text_units(TITLE_ELLIPSIS);
    let mut kept = line.to_string();
    while !kept.is_empty() && font.units_to_mm(font.text_units(&kept) + ellipsis_units) > max_width_mm {
        kept.pop();
    }
    format!("{}{}", kept.trim_end(), TITLE_ELLIPSIS)
}

pub fn title_text(topic: &str) -> String {
    format!("TARGET: {}", topic.trim().to_uppercase())
}

/// Strip lightweight markup and unify line endings.
pub fn normalize_body(report_text: &str) -> String {
    report_text
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .filter(|c| !MARKUP_CHARS.contains(c))
        .collect()
}

/// `Sovereign_Intel_<topic>` with whitespace runs and path separators as `_`
pub fn file_stem(topic: &str) -> String {
    let joined = topic.split_whitespace().collect::<Vec<_>>().join("_");
    let safe: String = joined
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}{}", FILE_PREFIX, safe)
}

/// Greedy word wrap by measured width. Blank lines are kept; words wider
/// than the line are broken by character.
pub fn wrap_text(text: &str, font: &FontSpec, max_width_mm: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, font, max_width_mm, &mut lines);
    }
    lines
}

fn wrap_paragraph(paragraph: &str, font: &FontSpec, max_width_mm: f64, lines: &mut Vec<String>) {
    // Widths are accumulated in integer font units so a line measured later
    // with `text_width_mm` yields exactly the value tested here.
    let fits = |units: u32| font.units_to_mm(units) <= max_width_mm;
    let space_units = font.char_units(' ');
    let mut current = String::new();
    let mut current_units = 0u32;

    for word in paragraph.split_whitespace() {
        let word_units = font.text_units(word);
        if !current.is_empty() {
            if fits(current_units + space_units + word_units) {
                current.push(' ');
                current.push_str(word);
                current_units += space_units + word_units;
                continue;
            }
            lines.push(std::mem::take(&mut current));
        }

        if fits(word_units) {
            current.push_str(word);
            current_units = word_units;
        } else {
            let mut pieces = break_word(word, font, max_width_mm);
            current = pieces.pop().unwrap_or_default();
            current_units = font.text_units(&current);
            lines.extend(pieces);
        }
    }

    // An empty paragraph still occupies a line.
    lines.push(current);
}

fn break_word(word: &str, font: &FontSpec, max_width_mm: f64) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_units = 0u32;
    for ch in word.chars() {
        let units = font.char_units(ch);
        if !piece.is_empty() && font.units_to_mm(piece_units + units) > max_width_mm {
            pieces.push(std::mem::take(&mut piece));
            piece_units = 0;
        }
        piece.push(ch);
        piece_units += units;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

fn region(role: RegionRole, text: String, font: FontSpec, color: Rgb, y_mm: f64) -> StyledRegion {
    StyledRegion {
        role,
        text,
        font,
        color,
        position: Position {
            x_mm: MARGIN_MM,
            y_mm,
        },
    }
}
