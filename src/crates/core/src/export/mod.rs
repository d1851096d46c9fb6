//! Report export
//!
//! `export` lays a report out into pages; `ExportFormat` turns the laid-out
//! document into bytes (PDF for download, JSON for inspection).

pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod types;

pub use layout::export;
pub use metrics::{FontFamily, FontSpec, FontWeight};
pub use pdf::render_pdf;
pub use types::*;

use crate::util::errors::ResearchResult;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Json => "json",
        }
    }

    pub fn render(&self, doc: &ExportDocument) -> ResearchResult<Vec<u8>> {
        match self {
            Self::Pdf => Ok(render_pdf(doc)),
            Self::Json => Ok(serde_json::to_vec_pretty(doc)?),
        }
    }
}

/// Render `doc` and write it into `dir` under its export file name.
pub fn write_document(doc: &ExportDocument, dir: &Path, format: ExportFormat) -> ResearchResult<PathBuf> {
    let bytes = format.render(doc)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(doc.file_name(format.extension()));
    std::fs::write(&path, &bytes)?;
    debug!(
        "Export written: path={}, bytes={}, pages={}",
        path.display(),
        bytes.len(),
        doc.pages.len()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_pdf_named_after_topic() {
        let dir = tempfile::tempdir().unwrap();
        let doc = export("quantum dots", "Findings");
        let path = write_document(&doc, dir.path(), ExportFormat::Pdf).unwrap();
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("Sovereign_Intel_quantum_dots.pdf")
        );
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn json_rendition_keeps_regions_and_roles() {
        let doc = export("quantum dots", "Findings");
        let bytes = ExportFormat::Json.render(&doc).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["fileStem"], "Sovereign_Intel_quantum_dots");
        let regions = value["pages"][0]["regions"].as_array().unwrap();
        assert_eq!(regions[0]["role"], "heading");
        assert_eq!(regions[1]["text"], "TARGET: QUANTUM DOTS");
        assert_eq!(regions[2]["role"], "body");
        assert_eq!(regions[2]["font"]["family"], "helvetica");
    }

    #[test]
    fn creates_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let doc = export("x", "y");
        let path = write_document(&doc, &nested, ExportFormat::Json).unwrap();
        assert!(path.ends_with("Sovereign_Intel_x.json"));
    }
}
