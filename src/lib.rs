//! Sample G-code program generator
//!
//! Builds realistic-looking, varied G-code programs from a tool catalog for
//! use as parser and validator fixtures. The pipeline is
//! select tools → plan sequences → synthesize toolpaths → number and
//! assemble, with every random draw taken from one caller-supplied `Rng`.

pub mod codegen;
pub mod config;
pub mod lexer;
pub mod motion;
pub mod output;
pub mod post;
pub mod program;
pub mod selector;
pub mod sequence;
pub mod tool_library;
pub mod validator;

pub use program::{generate_program, Program, ProgramAssembler, ProgramMetadata};
pub use tool_library::{ToolCatalog, ToolRecord};
