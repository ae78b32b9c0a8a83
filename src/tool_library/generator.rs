//! Random catalog generation
//!
//! Produces end mills with believable inch-based geometry and cutting
//! ranges. Used to seed fixture catalogs, not by the program pipeline.

use super::{ToolCatalog, ToolRecord, ToolType, ValueRange};
use rand::Rng;

/// Common end mill diameters in inches, 1/4" through 3" in 1/8" steps
pub const COMMON_DIAMETERS: [f64; 23] = [
    0.25, 0.375, 0.5, 0.625, 0.75, 0.875, 1.0, 1.125, 1.25, 1.375, 1.5, 1.625, 1.75, 1.875, 2.0,
    2.125, 2.25, 2.375, 2.5, 2.625, 2.75, 2.875, 3.0,
];

const MAX_IPT: f64 = 0.02;
const MAX_SFM: f64 = 1000.0;

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Six digit tool code
pub fn generate_tool_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.gen_range(100_000..=999_999u32).to_string()
}

/// One random end mill under the given code
pub fn generate_tool<R: Rng + ?Sized>(code: String, rng: &mut R) -> ToolRecord {
    let diameter = COMMON_DIAMETERS[rng.gen_range(0..COMMON_DIAMETERS.len())];
    let flutes = rng.gen_range(2..=6u8);
    let overall_length = round4(rng.gen_range(3.0..8.0));
    let cutting_length = round4(rng.gen_range(0.1..0.6) * overall_length);

    let ipt_min = round4(rng.gen_range(0.0005..MAX_IPT)).max(0.0005);
    let ipt_max = round4(ipt_min * rng.gen_range(1.0..5.0)).min(MAX_IPT).max(ipt_min);
    let sfm_min = round4(rng.gen_range(50.0..MAX_SFM));
    let sfm_max = round4(sfm_min * rng.gen_range(1.0..3.0)).min(MAX_SFM).max(sfm_min);

    ToolRecord {
        code,
        tool_type: ToolType::EndMill,
        diameter,
        flutes,
        overall_length,
        cutting_length,
        surface_speed_range: ValueRange::new(sfm_min, sfm_max),
        feed_per_tooth_range: ValueRange::new(ipt_min, ipt_max),
        indexable: rng.gen_bool(0.5),
        supports_coolant: rng.gen_bool(0.5),
        supports_air: rng.gen_bool(0.5),
        supports_cutter_compensation: rng.gen_bool(0.5),
    }
}

/// Generate `count` tools with distinct codes
pub fn generate_catalog<R: Rng + ?Sized>(count: usize, rng: &mut R) -> ToolCatalog {
    let mut catalog = ToolCatalog::new();
    while catalog.len() < count {
        let code = generate_tool_code(rng);
        if catalog.contains(&code) {
            continue;
        }
        catalog.insert(generate_tool(code, rng));
    }
    tracing::debug!(count, "generated tool catalog");
    catalog
}
