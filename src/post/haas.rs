//! Haas post-processor
//!
//! Haas is Fanuc-compatible; it defaults canned cycles to return to the
//! initial plane, so the reset block says so explicitly.

use crate::post::PostProcessor;

pub struct HaasPost;

impl PostProcessor for HaasPost {
    fn name(&self) -> &str {
        "Haas"
    }

    fn startup_block(&self) -> Vec<String> {
        vec![
            "G20".to_string(),
            "G17 G40 G49 G80 G90 G94 G98".to_string(),
            "G54".to_string(),
            "G187 P2".to_string(), // Medium smoothness
        ]
    }
}
