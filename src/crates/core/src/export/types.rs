use super::metrics::FontSpec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Millimetres from the left edge and from the top edge (text baseline).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x_mm: f64,
    pub y_mm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionRole {
    Heading,
    Target,
    Body,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyledRegion {
    pub role: RegionRole,
    pub text: String,
    pub font: FontSpec,
    pub color: Rgb,
    pub position: Position,
}

/// Filled band across the top of the first page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderBand {
    pub width_mm: f64,
    pub height_mm: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub header: Option<HeaderBand>,
    pub regions: Vec<StyledRegion>,
}

impl Page {
    pub fn body_lines(&self) -> impl Iterator<Item = &StyledRegion> {
        self.regions.iter().filter(|r| r.role == RegionRole::Body)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// `Sovereign_Intel_<topic>`; the extension depends on the rendition
    pub file_stem: String,
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub pages: Vec<Page>,
}

impl ExportDocument {
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.file_stem, extension)
    }
}
