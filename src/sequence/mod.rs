//! Sequence planning
//!
//! Decides how many tool operations a program has and which tool runs each
//! one. Every selected tool runs at least once; leftover sequences repeat
//! randomly chosen tools.

use crate::codegen::{seq_end, seq_start};
use crate::motion::MotionSynthesizer;
use crate::tool_library::{ToolCatalog, ToolRecord};
use rand::Rng;
use thiserror::Error;
use tracing::debug;

/// Upper bound on repeat sequences beyond one per tool
pub const MAX_EXTRA_SEQUENCES: usize = 5;

#[derive(Error, Debug, PartialEq)]
pub enum PlanError {
    #[error("no tools selected, cannot plan sequences")]
    EmptySelection,

    #[error("{count} sequences cannot cover {tools} selected tools")]
    SequenceCountTooSmall { count: usize, tools: usize },
}

/// One tool operation within a program
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub ordinal: u32,
    pub tool_code: String,
    /// Toolpath lines, bracketed by the start and end markers
    pub lines: Vec<String>,
}

impl Sequence {
    fn new(ordinal: u32, tool_code: String, body: Vec<String>) -> Self {
        let mut lines = Vec::with_capacity(body.len() + 2);
        lines.push(seq_start(ordinal));
        lines.extend(body);
        lines.push(seq_end(ordinal));
        Self {
            ordinal,
            tool_code,
            lines,
        }
    }
}

/// Draw a sequence count in `[tools, tools + extra]`, `extra` uniform in `[0, 5]`
pub fn sample_sequence_count<R: Rng + ?Sized>(tools: usize, rng: &mut R) -> usize {
    let extra = rng.gen_range(0..=MAX_EXTRA_SEQUENCES);
    rng.gen_range(tools..=tools + extra)
}

pub struct SequencePlanner;

impl SequencePlanner {
    /// Plan a random number of sequences over the selected tools
    pub fn plan<R: Rng + ?Sized>(
        selected: &ToolCatalog,
        rng: &mut R,
    ) -> Result<Vec<Sequence>, PlanError> {
        if selected.is_empty() {
            return Err(PlanError::EmptySelection);
        }
        let count = sample_sequence_count(selected.len(), rng);
        Self::plan_with_count(selected, count, rng)
    }

    /// Plan exactly `count` sequences
    pub fn plan_with_count<R: Rng + ?Sized>(
        selected: &ToolCatalog,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<Sequence>, PlanError> {
        let assignments = Self::assign_tools(selected, count, rng)?;
        debug!(
            tools = selected.len(),
            sequences = assignments.len(),
            "planned sequences"
        );

        let sequences = assignments
            .into_iter()
            .zip(1u32..)
            .map(|(tool, ordinal)| {
                let body = MotionSynthesizer::new(tool).synthesize(rng);
                Sequence::new(ordinal, tool.code.clone(), body)
            })
            .collect();
        Ok(sequences)
    }

    /// Tool per sequence: each selected tool once in code order, then
    /// uniform repeats for the remainder.
    pub fn assign_tools<'a, R: Rng + ?Sized>(
        selected: &'a ToolCatalog,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<&'a ToolRecord>, PlanError> {
        if selected.is_empty() {
            return Err(PlanError::EmptySelection);
        }
        if count < selected.len() {
            return Err(PlanError::SequenceCountTooSmall {
                count,
                tools: selected.len(),
            });
        }

        let tools: Vec<&ToolRecord> = selected.iter().collect();
        let mut assignments = tools.clone();
        for _ in tools.len()..count {
            assignments.push(tools[rng.gen_range(0..tools.len())]);
        }
        Ok(assignments)
    }
}
