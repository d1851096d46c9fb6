//! Minimal PDF 1.4 writer for `ExportDocument`
//!
//! Uses the four base-14 fonts by reference (nothing embedded) with
//! WinAnsiEncoding. Output depends only on the document, so identical
//! documents serialize to identical bytes.

use super::metrics::{FontFamily, FontSpec, FontWeight};
use super::types::{ExportDocument, HeaderBand, Rgb, StyledRegion};

const MM_TO_PT: f64 = 72.0 / 25.4;

/// Resource name and PostScript name, in object order starting at id 3.
const FONTS: [(&str, &str); 4] = [
    ("F1", "Helvetica"),
    ("F2", "Helvetica-Bold"),
    ("F3", "Courier"),
    ("F4", "Courier-Bold"),
];
const FIRST_PAGE_OBJECT_ID: usize = 3 + FONTS.len();

pub fn render_pdf(doc: &ExportDocument) -> Vec<u8> {
    let page_width_pt = doc.page_width_mm * MM_TO_PT;
    let page_height_pt = doc.page_height_mm * MM_TO_PT;

    let mut writer = PdfWriter::new();

    writer.object(b"<< /Type /Catalog /Pages 2 0 R >>");

    let kids = (0..doc.pages.len())
        .map(|i| format!("{} 0 R", page_object_id(i)))
        .collect::<Vec<_>>()
        .join(" ");
    writer.object(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            doc.pages.len()
        )
        .as_bytes(),
    );

    for (_, base_font) in FONTS {
        writer.object(
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                base_font
            )
            .as_bytes(),
        );
    }

    let font_resources = FONTS
        .iter()
        .enumerate()
        .map(|(i, (name, _))| format!("/{} {} 0 R", name, 3 + i))
        .collect::<Vec<_>>()
        .join(" ");

    for (i, page) in doc.pages.iter().enumerate() {
        writer.object(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << {} >> >> /Contents {} 0 R >>",
                page_width_pt,
                page_height_pt,
                font_resources,
                page_object_id(i) + 1
            )
            .as_bytes(),
        );

        let mut content = Vec::new();
        if let Some(band) = &page.header {
            draw_band(&mut content, band, page_height_pt);
        }
        for region in page.regions.iter().filter(|r| !r.text.is_empty()) {
            draw_text(&mut content, region, page_height_pt);
        }
        writer.stream_object(&content);
    }

    writer.finish()
}

fn page_object_id(page_index: usize) -> usize {
    FIRST_PAGE_OBJECT_ID + page_index * 2
}

fn font_resource(font: &FontSpec) -> &'static str {
    match (font.family, font.weight) {
        (FontFamily::Helvetica, FontWeight::Normal) => "F1",
        (FontFamily::Helvetica, FontWeight::Bold) => "F2",
        (FontFamily::Courier, FontWeight::Normal) => "F3",
        (FontFamily::Courier, FontWeight::Bold) => "F4",
    }
}

fn color_operands(color: Rgb) -> String {
    format!(
        "{:.3} {:.3} {:.3}",
        f64::from(color.0) / 255.0,
        f64::from(color.1) / 255.0,
        f64::from(color.2) / 255.0
    )
}

fn draw_band(content: &mut Vec<u8>, band: &HeaderBand, page_height_pt: f64) {
    let height_pt = band.height_mm * MM_TO_PT;
    content.extend_from_slice(
        format!(
            "q {} rg 0 {:.2} {:.2} {:.2} re f Q\n",
            color_operands(band.color),
            page_height_pt - height_pt,
            band.width_mm * MM_TO_PT,
            height_pt
        )
        .as_bytes(),
    );
}

fn draw_text(content: &mut Vec<u8>, region: &StyledRegion, page_height_pt: f64) {
    content.extend_from_slice(
        format!(
            "BT /{} {:.2} Tf {} rg {:.2} {:.2} Td (",
            font_resource(&region.font),
            region.font.size_pt,
            color_operands(region.color),
            region.position.x_mm * MM_TO_PT,
            page_height_pt - region.position.y_mm * MM_TO_PT
        )
        .as_bytes(),
    );
    content.extend(encode_text(&region.text));
    content.extend_from_slice(b") Tj ET\n");
}

/// WinAnsi bytes with PDF string escapes; unmappable characters become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let byte = win_ansi_byte(ch).unwrap_or(b'?');
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out
}

fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        0x09 => Some(b' '),
        _ => match ch {
            '\u{20AC}' => Some(0x80),
            '\u{2026}' => Some(0x85),
            '\u{2018}' => Some(0x91),
            '\u{2019}' => Some(0x92),
            '\u{201C}' => Some(0x93),
            '\u{201D}' => Some(0x94),
            '\u{2022}' => Some(0x95),
            '\u{2013}' => Some(0x96),
            '\u{2014}' => Some(0x97),
            _ => None,
        },
    }
}

struct PdfWriter {
    buf: Vec<u8>,
    /// Byte offset of each object; object id = index + 1
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, body: &[u8]) {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf
            .extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream_object(&mut self, content: &[u8]) {
        let mut body = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(b"\nendstream");
        self.object(&body);
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let count = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", count);
        for offset in &self.offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            count, xref_offset
        ));
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::layout::export;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn output_is_a_pdf_with_one_page_object_per_page() {
        let text = (0..150).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let doc = export("rust", &text);
        let bytes = render_pdf(&doc);
        assert!(bytes.starts_with(b"%PDF-1.4\n"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert_eq!(count(&bytes, b"/Type /Page "), doc.pages.len());
        assert!(contains(&bytes, format!("/Count {}", doc.pages.len()).as_bytes()));
    }

    #[test]
    fn rendering_is_byte_identical_for_identical_documents() {
        let doc = export("deep sea mining", "## Summary\nNodules (polymetallic) \\ cobalt");
        assert_eq!(render_pdf(&doc), render_pdf(&doc.clone()));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let bytes = render_pdf(&export("rust", "hello"));
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let xref_start = text.rfind("\nxref\n").unwrap() + 1;
        let entries: Vec<usize> = text[xref_start..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert!(!entries.is_empty());
        for (i, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", i + 1);
            assert!(bytes[*offset..].starts_with(expected.as_bytes()));
        }
    }

    #[test]
    fn text_is_escaped_and_transcoded() {
        assert_eq!(encode_text("a(b)c\\"), b"a\\(b\\)c\\\\".to_vec());
        assert_eq!(encode_text("caf\u{e9} \u{2014} \u{6f22}"), b"caf\xe9 \x97 ?".to_vec());
    }

    #[test]
    fn heading_uses_courier_bold_and_body_helvetica() {
        let bytes = render_pdf(&export("rust", "hello"));
        assert!(contains(&bytes, b"/F4 20.00 Tf"));
        assert!(contains(&bytes, b"/F1 11.00 Tf"));
        assert!(contains(&bytes, b"(SOVEREIGN ARCHIVE // INTEL) Tj"));
    }
}
