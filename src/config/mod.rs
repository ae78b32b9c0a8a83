//! Generation run options

use crate::post::PostProcessorType;
use crate::program::ProgramMetadata;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Options for one `generate` run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Programs to write
    pub count: usize,
    /// Seed for the random source; `None` draws one from entropy
    pub seed: Option<u64>,
    pub controller: PostProcessorType,
    /// Program number of the first program, later ones count up
    pub first_program_number: u32,
    pub part_id: String,
    pub revision: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            count: 1,
            seed: None,
            controller: PostProcessorType::Generic,
            first_program_number: 1001,
            part_id: "SAMPLE".to_string(),
            revision: "A".to_string(),
        }
    }
}

impl GeneratorOptions {
    /// Header metadata for the `index`-th program of the run
    pub fn metadata(&self, index: usize, timestamp: NaiveDateTime) -> ProgramMetadata {
        let number = u64::from(self.first_program_number) + index as u64;
        ProgramMetadata {
            program_id: format!("O{:04}", number),
            part_id: self.part_id.clone(),
            revision: self.revision.clone(),
            timestamp,
            controller: self.controller,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    #[test]
    fn test_program_ids_count_up() {
        let options = GeneratorOptions {
            first_program_number: 7,
            ..GeneratorOptions::default()
        };
        assert_eq!(options.metadata(0, noon()).program_id, "O0007");
        assert_eq!(options.metadata(3, noon()).program_id, "O0010");
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: GeneratorOptions =
            serde_json::from_str(r#"{"count": 4, "controller": "haas", "seed": 12}"#).unwrap();
        assert_eq!(options.count, 4);
        assert_eq!(options.seed, Some(12));
        assert_eq!(options.controller, PostProcessorType::Haas);
        assert_eq!(options.revision, "A");
    }
}
