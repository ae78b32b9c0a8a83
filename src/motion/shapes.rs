//! Closed toolpaths for each implemented shape family

use super::{tool_change, MotionParameters};
use crate::codegen::{annotation, format_real, Block};

/// Lead-in distance before the first corner
const APPROACH: f64 = 1.0;
/// Lead-out arc radius
const RETRACT: f64 = 0.25;
const SAFE_Z: f64 = 3.0;
const CLEARANCE_Z: f64 = 0.1;

/// Spindle on, rapid to the start point, plunge, optional comp on
fn lead_in(
    lines: &mut Vec<String>,
    code: &str,
    params: &MotionParameters,
    start: (f64, f64),
    plunge_feed: f64,
) {
    lines.extend(tool_change(code, params.spindle_speed));
    lines.push(Block::new().g(0).x(start.0).y(start.1).z(SAFE_Z).into());
    lines.push(Block::new().g(0).z(CLEARANCE_Z).into());
    lines.push(Block::new().g(1).z(0.0).feed(plunge_feed).into());
    if let Some(comp) = params.compensation.code() {
        lines.push(Block::new().g(comp).into());
    }
}

/// Comp off if it was turned on, then back to safe height
fn lead_out(lines: &mut Vec<String>, params: &MotionParameters) {
    if params.compensation.is_active() {
        lines.push(Block::new().g(40).into());
    }
    lines.push(Block::new().g(0).z(SAFE_Z).into());
}

/// Square with rounded corners, corner radius size/5, origin at the lower left
pub(super) fn square(code: &str, params: &MotionParameters, plunge_feed: f64) -> Vec<String> {
    let size = f64::from(params.size);
    let r = size / 5.0;

    let mut lines = vec![annotation(
        "seq_name",
        format!(
            "Draw Square -- Size: {}in, Corners: {}in",
            params.size,
            format_real(r)
        ),
    )];
    lead_in(&mut lines, code, params, (0.0, -(APPROACH + r)), plunge_feed);

    let path = [
        Block::new().g(1).y(-r),
        Block::new().g(2).x(r).y(0.0).ij(r, 0.0),
        Block::new().g(1).x(size - r).y(0.0).feed(params.feedrate),
        Block::new().g(3).x(size).y(r).ij(0.0, r),
        Block::new().g(1).x(size).y(size - r),
        Block::new().g(3).x(size - r).y(size).ij(-r, 0.0),
        Block::new().g(1).x(r).y(size),
        Block::new().g(3).x(0.0).y(size - r).ij(0.0, -r),
        Block::new().g(1).x(0.0).y(r),
        Block::new().g(3).x(r).y(0.0).ij(r, 0.0),
        Block::new().g(2).x(r + RETRACT).y(-RETRACT).ij(0.0, -RETRACT),
    ];
    lines.extend(path.into_iter().map(String::from));

    lead_out(&mut lines, params);
    lines
}

/// Oval with semicircular ends of radius size/2, entered from below the origin
pub(super) fn oval(code: &str, params: &MotionParameters, plunge_feed: f64) -> Vec<String> {
    let size = f64::from(params.size);
    let a = size / 2.0;

    let mut lines = vec![annotation(
        "seq_name",
        format!(
            "Draw Oval -- Size: {}in, Arcsize: {}in",
            params.size,
            format_real(a)
        ),
    )];
    lead_in(&mut lines, code, params, (-1.0, -2.0), plunge_feed);

    let path = [
        Block::new().g(1).y(-1.0),
        Block::new().g(2).x(0.0).y(0.0).ij(1.0, 0.0),
        Block::new().g(3).x(a).y(a).ij(0.0, a).feed(params.feedrate),
        Block::new().g(1).y(a + 1.0),
        Block::new().g(3).x(0.0).y(size + 1.0).ij(-a, 0.0),
        Block::new().g(3).x(-a).y(a + 1.0).ij(0.0, -a),
        Block::new().g(1).y(a),
        Block::new().g(3).x(0.0).y(0.0).ij(a, 0.0),
        Block::new().g(2).x(RETRACT).y(-RETRACT).ij(0.0, -RETRACT),
    ];
    lines.extend(path.into_iter().map(String::from));

    lead_out(&mut lines, params);
    lines
}
