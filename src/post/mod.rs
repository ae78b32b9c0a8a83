//! Controller-specific program dialects
//!
//! Every controller gets the same toolpaths; what differs is the modal
//! reset block at the top of the program and how the controller is named
//! in the header.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod haas;
pub mod linuxcnc;
pub mod mach3;

/// Post-processor trait - implemented for each controller type
pub trait PostProcessor {
    /// Machine/controller name
    fn name(&self) -> &str;

    /// Modal setup emitted after the header annotations
    fn startup_block(&self) -> Vec<String>;

    /// Program end and rewind
    fn program_end(&self) -> &str {
        "M30"
    }
}

/// Available post-processors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostProcessorType {
    #[default]
    Generic, // Fanuc-compatible
    Haas,
    #[serde(rename = "linuxcnc")]
    LinuxCNC,
    Mach3,
}

impl PostProcessorType {
    pub const ALL: [PostProcessorType; 4] = [
        PostProcessorType::Generic,
        PostProcessorType::Haas,
        PostProcessorType::LinuxCNC,
        PostProcessorType::Mach3,
    ];

    /// Get the post-processor implementation
    pub fn get_processor(&self) -> Box<dyn PostProcessor> {
        match self {
            PostProcessorType::Generic => Box::new(GenericPost),
            PostProcessorType::Haas => Box::new(haas::HaasPost),
            PostProcessorType::LinuxCNC => Box::new(linuxcnc::LinuxCncPost),
            PostProcessorType::Mach3 => Box::new(mach3::Mach3Post),
        }
    }

    fn key(&self) -> &'static str {
        match self {
            PostProcessorType::Generic => "generic",
            PostProcessorType::Haas => "haas",
            PostProcessorType::LinuxCNC => "linuxcnc",
            PostProcessorType::Mach3 => "mach3",
        }
    }
}

impl fmt::Display for PostProcessorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for PostProcessorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        let wanted = match wanted.as_str() {
            "fanuc" => "generic",
            "mach4" => "mach3",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown controller '{}', expected one of: generic, haas, linuxcnc, mach3",
                    s
                )
            })
    }
}

/// Generic/Fanuc-compatible post-processor (default)
pub struct GenericPost;

impl PostProcessor for GenericPost {
    fn name(&self) -> &str {
        "Generic Fanuc"
    }

    fn startup_block(&self) -> Vec<String> {
        vec![
            "G20".to_string(),               // Inches
            "G17 G40 G49 G80".to_string(),   // XY plane, cancel comp, length, cycles
            "G90 G94".to_string(),           // Absolute, feed per minute
            "G54".to_string(),
        ]
    }
}
