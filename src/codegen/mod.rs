//! G-code line construction and block numbering
//!
//! `Block` builds one program line from typed words so numeric formatting
//! lives in a single place. `number` assigns `N` addresses to a run of lines.

use std::fmt;

/// Round to two decimals (spindle speed and feedrate)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a real at full precision, always with a decimal point.
///
/// `5.0` → "5.0", `0.25` → "0.25", `764.0` → "764.0". Negative zero prints as "0.0".
/// Never uses an exponent.
pub fn format_real(value: f64) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    let mut text = value.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Annotation comment: `(@@ key = value)`
pub fn annotation(key: &str, value: impl fmt::Display) -> String {
    format!("(@@ {} = {})", key, value)
}

/// Start of a sequence
pub fn seq_start(ordinal: u32) -> String {
    annotation("seq_start", ordinal)
}

/// End of a sequence
pub fn seq_end(ordinal: u32) -> String {
    annotation("seq_end", ordinal)
}

/// One G-code line assembled word by word
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    words: Vec<String>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preparatory word, e.g. `G1`
    pub fn g(mut self, code: u8) -> Self {
        self.words.push(format!("G{}", code));
        self
    }

    /// Miscellaneous word, e.g. `M3`
    pub fn m(mut self, code: u8) -> Self {
        self.words.push(format!("M{}", code));
        self
    }

    /// Tool select word
    pub fn tool(mut self, code: &str) -> Self {
        self.words.push(format!("T{}", code));
        self
    }

    /// Address word carrying a full-precision real (X, Y, Z, I, J)
    pub fn axis(mut self, letter: char, value: f64) -> Self {
        self.words.push(format!("{}{}", letter, format_real(value)));
        self
    }

    pub fn x(self, value: f64) -> Self {
        self.axis('X', value)
    }

    pub fn y(self, value: f64) -> Self {
        self.axis('Y', value)
    }

    pub fn z(self, value: f64) -> Self {
        self.axis('Z', value)
    }

    /// Arc center offsets, incremental from the arc start
    pub fn ij(self, i: f64, j: f64) -> Self {
        self.axis('I', i).axis('J', j)
    }

    /// Feedrate, rounded to two decimals
    pub fn feed(self, value: f64) -> Self {
        self.axis('F', round2(value))
    }

    /// Spindle speed, rounded to two decimals
    pub fn speed(self, value: f64) -> Self {
        self.axis('S', round2(value))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.words.join(" "))
    }
}

impl From<Block> for String {
    fn from(block: Block) -> Self {
        block.to_string()
    }
}

/// Prefix each line with a block address, counting up by one from `start`
pub fn number<I, S>(lines: I, start: u32) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .zip(start..)
        .map(|(line, address)| format!("N{} {}", address, line.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(5.0), "5.0");
        assert_eq!(format_real(0.25), "0.25");
        assert_eq!(format_real(-1.25), "-1.25");
        assert_eq!(format_real(-0.0), "0.0");
        assert_eq!(format_real(13.0 / 5.0), "2.6");
    }

    #[test]
    fn test_format_real_without_exponent() {
        assert_eq!(format_real(3.82e16), "38200000000000000.0");
        assert_eq!(format_real(0.00005), "0.00005");
        assert_eq!(format_real(-2e-7), "-0.0000002");

        let spindle = Block::new().speed(100.0 * 3.82 / 1e-14).m(3);
        assert!(!spindle.to_string().contains('e'));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(100.0 * 3.82 / 0.5), 764.0);
        assert_eq!(round2(0.01 * 764.0), 7.64);
        assert_eq!(round2(1.234567), 1.23);
    }

    #[test]
    fn test_block_words() {
        let arc = Block::new().g(2).x(1.0).y(0.0).ij(1.0, 0.0);
        assert_eq!(arc.to_string(), "G2 X1.0 Y0.0 I1.0 J0.0");

        let spindle = Block::new().speed(764.004).m(3);
        assert_eq!(spindle.to_string(), "S764.0 M3");

        let change = Block::new().tool("100001").m(6);
        assert_eq!(change.to_string(), "T100001 M6");

        let plunge = Block::new().g(1).z(0.0).feed(7.64 / 3.0);
        assert_eq!(plunge.to_string(), "G1 Z0.0 F2.55");
    }

    #[test]
    fn test_markers() {
        assert_eq!(seq_start(3), "(@@ seq_start = 3)");
        assert_eq!(seq_end(3), "(@@ seq_end = 3)");
        assert_eq!(annotation("revision", "A"), "(@@ revision = A)");
    }

    #[test]
    fn test_number_is_contiguous() {
        let numbered = number(["G90", "G20", "M30"], 2);
        assert_eq!(numbered, vec!["N2 G90", "N3 G20", "N4 M30"]);
    }

    #[test]
    fn test_number_empty() {
        let numbered = number(Vec::<String>::new(), 10);
        assert!(numbered.is_empty());
    }
}
