//! Tool Library - JSON-based cutting tool catalog
//!
//! A catalog maps a tool code (e.g. "431207") to the physical and cutting
//! attributes of that tool. Catalog files come in two shapes:
//! an object keyed by code, or the generator's list of single-entry objects.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

pub mod generator;

pub use generator::generate_catalog;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read or write catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tool {code} is invalid: {reason}")]
    InvalidTool { code: String, reason: String },

    #[error("tool code {0} appears more than once")]
    DuplicateCode(String),
}

/// Tool type classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ToolType {
    #[serde(rename = "endmill", alias = "end_mill", alias = "ENDMILL")]
    #[default]
    EndMill,
    #[serde(rename = "ballmill", alias = "ball_mill", alias = "BALLMILL")]
    BallMill,
    #[serde(rename = "facemill", alias = "face_mill", alias = "FACEMILL")]
    FaceMill,
    #[serde(rename = "drill", alias = "DRILL")]
    Drill,
}

impl std::fmt::Display for ToolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolType::EndMill => write!(f, "End Mill"),
            ToolType::BallMill => write!(f, "Ball Mill"),
            ToolType::FaceMill => write!(f, "Face Mill"),
            ToolType::Drill => write!(f, "Drill"),
        }
    }
}

/// Inclusive `min..=max` range of a cutting parameter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Draw uniformly from the range. A degenerate range yields `min` exactly.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.min == self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One physical cutting tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolRecord {
    /// Tool code. Lives in the catalog key on disk, copied in on load.
    #[serde(skip)]
    pub code: String,

    #[serde(rename = "type", default)]
    pub tool_type: ToolType,

    /// Tool diameter in inches
    pub diameter: f64,

    pub flutes: u8,

    /// Overall tool length
    #[serde(rename = "length")]
    pub overall_length: f64,

    /// Length of the fluted portion
    #[serde(rename = "cutlength")]
    pub cutting_length: f64,

    /// Surface feet per minute
    #[serde(rename = "sfm")]
    pub surface_speed_range: ValueRange,

    /// Inches per tooth (chip load)
    #[serde(rename = "ipt")]
    pub feed_per_tooth_range: ValueRange,

    #[serde(rename = "cutcom", default)]
    pub supports_cutter_compensation: bool,

    #[serde(rename = "coolant", default)]
    pub supports_coolant: bool,

    #[serde(rename = "air", default)]
    pub supports_air: bool,

    #[serde(default)]
    pub indexable: bool,
}

impl ToolRecord {
    /// Check the record invariants: positive magnitudes, ordered ranges,
    /// cutting length within overall length.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidTool {
            code: self.code.clone(),
            reason,
        };

        if self.code.is_empty() {
            return Err(invalid("empty tool code".to_string()));
        }
        if !(self.diameter > 0.0) {
            return Err(invalid(format!("diameter {} must be positive", self.diameter)));
        }
        if self.flutes == 0 {
            return Err(invalid("flute count must be positive".to_string()));
        }
        if !(self.cutting_length > 0.0) || !(self.overall_length > 0.0) {
            return Err(invalid(format!(
                "lengths must be positive (cut {}, overall {})",
                self.cutting_length, self.overall_length
            )));
        }
        if self.cutting_length > self.overall_length {
            return Err(invalid(format!(
                "cutting length {} exceeds overall length {}",
                self.cutting_length, self.overall_length
            )));
        }
        for (name, range) in [
            ("sfm", self.surface_speed_range),
            ("ipt", self.feed_per_tooth_range),
        ] {
            if !(range.min > 0.0) || range.min > range.max {
                return Err(invalid(format!(
                    "{} range {}..{} must be positive and ordered",
                    name, range.min, range.max
                )));
            }
        }
        Ok(())
    }
}

/// On-disk catalog layouts
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Keyed(BTreeMap<String, ToolRecord>),
    Listed(Vec<BTreeMap<String, ToolRecord>>),
}

/// Tool catalog, ordered by code
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ToolCatalog {
    tools: BTreeMap<String, ToolRecord>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from JSON and validate every record
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<(String, ToolRecord)> = match serde_json::from_str(json)? {
            CatalogFile::Keyed(map) => map.into_iter().collect(),
            CatalogFile::Listed(list) => list.into_iter().flatten().collect(),
        };

        let mut catalog = Self::new();
        for (code, mut tool) in entries {
            tool.code = code;
            tool.validate()?;
            if catalog.contains(&tool.code) {
                return Err(CatalogError::DuplicateCode(tool.code));
            }
            catalog.insert(tool);
        }
        Ok(catalog)
    }

    /// Load a catalog from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save as a code-keyed JSON object
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Insert a tool under its own code, replacing any previous entry
    pub fn insert(&mut self, tool: ToolRecord) -> Option<ToolRecord> {
        self.tools.insert(tool.code.clone(), tool)
    }

    pub fn get(&self, code: &str) -> Option<&ToolRecord> {
        self.tools.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.tools.contains_key(code)
    }

    /// Codes in ascending order
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    /// Tools in ascending code order
    pub fn iter(&self) -> impl Iterator<Item = &ToolRecord> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl FromIterator<ToolRecord> for ToolCatalog {
    fn from_iter<I: IntoIterator<Item = ToolRecord>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for tool in iter {
            catalog.insert(tool);
        }
        catalog
    }
}

#[cfg(test)]
pub(crate) fn sample_tool(code: &str, cutcom: bool) -> ToolRecord {
    ToolRecord {
        code: code.to_string(),
        tool_type: ToolType::EndMill,
        diameter: 0.5,
        flutes: 2,
        overall_length: 3.0,
        cutting_length: 1.0,
        surface_speed_range: ValueRange::new(100.0, 100.0),
        feed_per_tooth_range: ValueRange::new(0.01, 0.01),
        supports_cutter_compensation: cutcom,
        supports_coolant: false,
        supports_air: false,
        indexable: false,
    }
}
