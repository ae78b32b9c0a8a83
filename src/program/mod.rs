//! Program assembly
//!
//! A program is an unnumbered `%` preamble, a numbered block (header
//! annotations, controller startup, every sequence, program end) and a
//! closing `%`.

use crate::codegen::{annotation, format_real, number};
use crate::post::PostProcessorType;
use crate::selector::{SelectionError, ToolSelector};
use crate::sequence::{PlanError, Sequence, SequencePlanner};
use crate::tool_library::ToolCatalog;
use chrono::NaiveDateTime;
use rand::Rng;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Program stream start, never numbered
pub const PREAMBLE: [&str; 1] = ["%"];
/// Program stream end, never numbered
pub const CLOSING: &str = "%";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug, PartialEq)]
pub enum GenerateError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Identifying header data for one program
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramMetadata {
    pub program_id: String,
    pub part_id: String,
    pub revision: String,
    pub timestamp: NaiveDateTime,
    pub controller: PostProcessorType,
}

impl ProgramMetadata {
    /// Header annotations in their fixed order
    pub fn header_lines(&self, controller_name: &str) -> Vec<String> {
        vec![
            annotation("program_id", &self.program_id),
            annotation("part_id", &self.part_id),
            annotation("revision", &self.revision),
            annotation("timestamp", self.timestamp.format(TIMESTAMP_FORMAT)),
            annotation("controller", controller_name),
        ]
    }
}

/// Assembled program text
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    lines: Vec<String>,
    first_address: u32,
    sequence_count: usize,
}

impl Program {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Address of the first numbered block
    pub fn first_address(&self) -> u32 {
        self.first_address
    }

    pub fn sequence_count(&self) -> usize {
        self.sequence_count
    }

    /// Lines joined with newlines, ending in a newline
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

pub struct ProgramAssembler {
    first_address: u32,
}

impl Default for ProgramAssembler {
    fn default() -> Self {
        Self {
            first_address: PREAMBLE.len() as u32 + 1,
        }
    }
}

impl ProgramAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the address of the first numbered block
    pub fn with_first_address(mut self, first_address: u32) -> Self {
        self.first_address = first_address;
        self
    }

    /// Compose the final line list. Pure, never fails.
    pub fn assemble(
        &self,
        metadata: &ProgramMetadata,
        selected: &ToolCatalog,
        sequences: &[Sequence],
    ) -> Program {
        let post = metadata.controller.get_processor();

        let mut block = metadata.header_lines(post.name());
        block.extend(selected.iter().map(|tool| {
            annotation(
                "tool",
                format!(
                    "{} -- {}, Dia: {}in, Flutes: {}",
                    tool.code,
                    tool.tool_type,
                    format_real(tool.diameter),
                    tool.flutes
                ),
            )
        }));
        block.extend(post.startup_block());
        for sequence in sequences {
            block.extend(sequence.lines.iter().cloned());
        }
        block.push(post.program_end().to_string());

        let mut lines: Vec<String> = PREAMBLE.iter().map(|l| l.to_string()).collect();
        lines.extend(number(block, self.first_address));
        lines.push(CLOSING.to_string());

        debug!(
            program = %metadata.program_id,
            controller = post.name(),
            lines = lines.len(),
            "assembled program"
        );

        Program {
            lines,
            first_address: self.first_address,
            sequence_count: sequences.len(),
        }
    }
}

/// Select tools, plan sequences and assemble one program.
///
/// All randomness comes from `rng`, in that order. The controller dialect
/// is `metadata.controller`.
pub fn generate_program<R: Rng + ?Sized>(
    catalog: &ToolCatalog,
    metadata: &ProgramMetadata,
    rng: &mut R,
) -> Result<Program, GenerateError> {
    let selected = ToolSelector::select(catalog, rng)?;
    let sequences = SequencePlanner::plan(&selected, rng)?;
    let program = ProgramAssembler::new().assemble(metadata, &selected, &sequences);
    info!(
        program = %metadata.program_id,
        tools = selected.len(),
        sequences = sequences.len(),
        "generated program"
    );
    Ok(program)
}
