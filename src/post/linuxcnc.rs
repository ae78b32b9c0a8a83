//! LinuxCNC post-processor
//!
//! LinuxCNC is mostly Fanuc-compatible. Path blending is set explicitly
//! since its default tolerance is unbounded.

use crate::post::PostProcessor;

pub struct LinuxCncPost;

impl PostProcessor for LinuxCncPost {
    fn name(&self) -> &str {
        "LinuxCNC"
    }

    fn startup_block(&self) -> Vec<String> {
        vec![
            "G20".to_string(),
            "G17 G40 G49 G80".to_string(),
            "G90 G94".to_string(),
            "G64 P0.001".to_string(), // Blend tolerance
            "G54".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linuxcnc_sets_blend_tolerance() {
        assert!(LinuxCncPost.startup_block().contains(&"G64 P0.001".to_string()));
    }
}
