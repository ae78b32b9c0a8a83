//! Toolpath synthesis
//!
//! Turns one catalog tool into an illustrative closed toolpath. Speeds and
//! feeds come from the tool's declared ranges; geometry is a rounded square
//! or an oval of random size. Nothing here models real tool engagement.

use crate::codegen::{round2, Block};
use crate::tool_library::ToolRecord;
use rand::Rng;
use std::fmt;
use thiserror::Error;
use tracing::debug;

mod shapes;

/// RPM = SFM × 3.82 / diameter
pub const RPM_CONSTANT: f64 = 3.82;
pub const MIN_SIZE: u32 = 5;
pub const MAX_SIZE: u32 = 20;

#[derive(Error, Debug, PartialEq)]
pub enum MotionError {
    #[error("shape family {0} has no toolpath implementation")]
    UnimplementedFamily(ShapeFamily),
}

/// Cutter radius compensation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutterCompensation {
    None,
    Left,  // G41
    Right, // G42
}

impl CutterCompensation {
    /// G-code that turns this mode on, if any
    pub fn code(self) -> Option<u8> {
        match self {
            CutterCompensation::None => None,
            CutterCompensation::Left => Some(41),
            CutterCompensation::Right => Some(42),
        }
    }

    pub fn is_active(self) -> bool {
        self != CutterCompensation::None
    }
}

/// Toolpath shape families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFamily {
    Square,
    Oval,
    Triangle,
}

/// Emits a toolpath for a tool code, parameters and plunge feed
pub type ToolpathFn = fn(&str, &MotionParameters, f64) -> Vec<String>;

impl ShapeFamily {
    /// Toolpath emitter, `None` for families without one
    pub fn toolpath(self) -> Option<ToolpathFn> {
        match self {
            ShapeFamily::Square => Some(shapes::square),
            ShapeFamily::Oval => Some(shapes::oval),
            ShapeFamily::Triangle => None,
        }
    }
}

impl fmt::Display for ShapeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeFamily::Square => write!(f, "square"),
            ShapeFamily::Oval => write!(f, "oval"),
            ShapeFamily::Triangle => write!(f, "triangle"),
        }
    }
}

/// Per-sequence cutting parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParameters {
    /// Surface speed drawn from the tool's SFM range
    pub surface_speed: f64,
    /// Chip load drawn from the tool's IPT range
    pub feed_per_tooth: f64,
    pub spindle_speed: f64,
    pub feedrate: f64,
    pub size: u32,
    pub compensation: CutterCompensation,
}

impl MotionParameters {
    /// Spindle speed and feedrate from explicit surface speed and chip load
    pub fn derive(tool: &ToolRecord, surface_speed: f64, feed_per_tooth: f64) -> (f64, f64) {
        let spindle_speed = round2(surface_speed * RPM_CONSTANT / tool.diameter);
        let feedrate = round2(feed_per_tooth * spindle_speed);
        (spindle_speed, feedrate)
    }
}

pub fn sample_size<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(MIN_SIZE..=MAX_SIZE)
}

pub fn sample_compensation<R: Rng + ?Sized>(tool: &ToolRecord, rng: &mut R) -> CutterCompensation {
    if !tool.supports_cutter_compensation {
        return CutterCompensation::None;
    }
    match rng.gen_range(0..3) {
        0 => CutterCompensation::None,
        1 => CutterCompensation::Left,
        _ => CutterCompensation::Right,
    }
}

/// Builds toolpaths for one tool
pub struct MotionSynthesizer<'a> {
    tool: &'a ToolRecord,
}

impl<'a> MotionSynthesizer<'a> {
    pub fn new(tool: &'a ToolRecord) -> Self {
        Self { tool }
    }

    /// Surface speed and chip load draws plus the spindle speed and feed they give
    fn sample_speeds<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64, f64, f64) {
        let surface_speed = self.tool.surface_speed_range.sample(rng);
        let feed_per_tooth = self.tool.feed_per_tooth_range.sample(rng);
        let (spindle_speed, feedrate) =
            MotionParameters::derive(self.tool, surface_speed, feed_per_tooth);
        (surface_speed, feed_per_tooth, spindle_speed, feedrate)
    }

    fn sample_geometry<R: Rng + ?Sized>(
        &self,
        speeds: (f64, f64, f64, f64),
        rng: &mut R,
    ) -> MotionParameters {
        let (surface_speed, feed_per_tooth, spindle_speed, feedrate) = speeds;
        MotionParameters {
            surface_speed,
            feed_per_tooth,
            spindle_speed,
            feedrate,
            size: sample_size(rng),
            compensation: sample_compensation(self.tool, rng),
        }
    }

    /// Sample a complete parameter set without choosing a shape
    pub fn sample_parameters<R: Rng + ?Sized>(&self, rng: &mut R) -> MotionParameters {
        let speeds = self.sample_speeds(rng);
        self.sample_geometry(speeds, rng)
    }

    /// Toolpath for a randomly chosen implemented family.
    ///
    /// Draw order: surface speed, chip load, family, size, compensation,
    /// then the plunge feed divisor.
    pub fn synthesize<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        const CHOICES: [(ShapeFamily, ToolpathFn); 2] = [
            (ShapeFamily::Square, shapes::square),
            (ShapeFamily::Oval, shapes::oval),
        ];

        let speeds = self.sample_speeds(rng);
        let (family, toolpath) = CHOICES[rng.gen_range(0..CHOICES.len())];
        let params = self.sample_geometry(speeds, rng);
        self.trace(family, &params);
        toolpath(&self.tool.code, &params, plunge_feed(params.feedrate, rng))
    }

    /// Toolpath for a caller-chosen family
    pub fn synthesize_family<R: Rng + ?Sized>(
        &self,
        family: ShapeFamily,
        rng: &mut R,
    ) -> Result<Vec<String>, MotionError> {
        let params = self.sample_parameters(rng);
        self.emit(family, &params, rng)
    }

    /// Emit the toolpath for fixed parameters
    pub fn emit<R: Rng + ?Sized>(
        &self,
        family: ShapeFamily,
        params: &MotionParameters,
        rng: &mut R,
    ) -> Result<Vec<String>, MotionError> {
        let toolpath = family
            .toolpath()
            .ok_or(MotionError::UnimplementedFamily(family))?;
        self.trace(family, params);
        Ok(toolpath(&self.tool.code, params, plunge_feed(params.feedrate, rng)))
    }

    fn trace(&self, family: ShapeFamily, params: &MotionParameters) {
        debug!(
            tool = %self.tool.code,
            %family,
            rpm = params.spindle_speed,
            feed = params.feedrate,
            size = params.size,
            compensation = ?params.compensation,
            "synthesizing toolpath"
        );
    }
}

/// Plunge at a random fraction 1/k of the cutting feed, k in 1..=5
fn plunge_feed<R: Rng + ?Sized>(feedrate: f64, rng: &mut R) -> f64 {
    let k = rng.gen_range(1..=5u32);
    round2(feedrate / f64::from(k))
}

/// Opening lines shared by every family
pub(crate) fn tool_change(code: &str, spindle_speed: f64) -> [String; 2] {
    [
        Block::new().tool(code).m(6).to_string(),
        Block::new().speed(spindle_speed).m(3).to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_library::{sample_tool, ValueRange};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_derived_speeds() {
        let tool = sample_tool("100001", false);
        let (rpm, feed) = MotionParameters::derive(&tool, 100.0, 0.01);
        assert_eq!(rpm, 764.0);
        assert_eq!(feed, 7.64);
    }

    #[test]
    fn test_parameters_respect_ranges() {
        let mut tool = sample_tool("100001", true);
        tool.surface_speed_range = ValueRange::new(150.0, 900.0);
        tool.feed_per_tooth_range = ValueRange::new(0.001, 0.015);

        let synth = MotionSynthesizer::new(&tool);
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let params = synth.sample_parameters(&mut rng);
            assert!(tool.surface_speed_range.contains(params.surface_speed));
            assert!(tool.feed_per_tooth_range.contains(params.feed_per_tooth));
            assert!((MIN_SIZE..=MAX_SIZE).contains(&params.size));
            let (rpm, feed) =
                MotionParameters::derive(&tool, params.surface_speed, params.feed_per_tooth);
            assert_eq!(params.spindle_speed, rpm);
            assert_eq!(params.feedrate, feed);
        }
    }

    #[test]
    fn test_compensation_gated_by_tool() {
        let tool = sample_tool("100001", false);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            assert_eq!(sample_compensation(&tool, &mut rng), CutterCompensation::None);
            let lines = MotionSynthesizer::new(&tool).synthesize(&mut rng);
            assert!(!lines
                .iter()
                .any(|l| l == "G41" || l == "G42" || l == "G40"));
        }
    }

    #[test]
    fn test_compensation_modes_all_reachable() {
        let tool = sample_tool("100001", true);
        let mut rng = StdRng::seed_from_u64(5);
        let seen: Vec<_> = (0..300).map(|_| sample_compensation(&tool, &mut rng)).collect();
        assert!(seen.contains(&CutterCompensation::None));
        assert!(seen.contains(&CutterCompensation::Left));
        assert!(seen.contains(&CutterCompensation::Right));
    }

    #[test]
    fn test_synthesize_starts_with_tool_change() {
        let tool = sample_tool("100001", true);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let lines = MotionSynthesizer::new(&tool).synthesize(&mut rng);
            assert!(lines[0].starts_with("(@@ seq_name = Draw "));
            assert_eq!(lines[1], "T100001 M6");
            assert_eq!(lines[2], "S764.0 M3");
            assert_eq!(lines.last().map(String::as_str), Some("G0 Z3.0"));
        }
    }

    #[test]
    fn test_triangle_is_an_error() {
        let tool = sample_tool("100001", false);
        let mut rng = StdRng::seed_from_u64(1);
        let result = MotionSynthesizer::new(&tool).synthesize_family(ShapeFamily::Triangle, &mut rng);
        assert_eq!(result, Err(MotionError::UnimplementedFamily(ShapeFamily::Triangle)));
    }

    #[test]
    fn test_random_choice_covers_both_families() {
        let tool = sample_tool("100001", false);
        let mut rng = StdRng::seed_from_u64(8);
        let names: Vec<String> = (0..100)
            .map(|_| MotionSynthesizer::new(&tool).synthesize(&mut rng)[0].clone())
            .collect();
        assert!(names.iter().any(|n| n.contains("Draw Square")));
        assert!(names.iter().any(|n| n.contains("Draw Oval")));
    }

    #[test]
    fn test_same_seed_same_toolpath() {
        let tool = sample_tool("100001", true);
        let a = MotionSynthesizer::new(&tool).synthesize(&mut StdRng::seed_from_u64(42));
        let b = MotionSynthesizer::new(&tool).synthesize(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
