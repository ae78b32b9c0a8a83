//! Mach3/Mach4 post-processor
//!
//! Mach3 is picky about multiple modal groups on one line, so the reset
//! block puts each code on its own line.

use crate::post::PostProcessor;

pub struct Mach3Post;

impl PostProcessor for Mach3Post {
    fn name(&self) -> &str {
        "Mach3/Mach4"
    }

    fn startup_block(&self) -> Vec<String> {
        ["G20", "G17", "G40", "G49", "G80", "G90", "G94", "G64", "G54"]
            .iter()
            .map(|code| code.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mach3_one_code_per_line() {
        for line in Mach3Post.startup_block() {
            assert_eq!(line.split_whitespace().count(), 1, "{}", line);
        }
    }
}
