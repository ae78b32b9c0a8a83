//! Structural checks for generated programs
//!
//! Reads a program back line by line and verifies what downstream parsers
//! rely on: `%` delimiters, contiguous block addresses, balanced sequence
//! markers in ascending order, a tool change per sequence, cutter
//! compensation cancelled before each sequence ends, and a program end as
//! the last block. With a catalog, tool codes and compensation support are
//! checked too.

use crate::lexer::{lex, Token, Word};
use crate::tool_library::ToolCatalog;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("program is missing the leading '%'")]
    MissingPreamble,

    #[error("program is missing the closing '%'")]
    MissingClosing,

    #[error("line {line}: unrecognized text")]
    Lex { line: usize },

    #[error("line {line}: block has no N address")]
    Unnumbered { line: usize },

    #[error("line {line}: expected N{expected}, found N{found}")]
    Numbering {
        line: usize,
        expected: u32,
        found: u32,
    },

    #[error("line {line}: malformed sequence marker '{text}'")]
    MalformedMarker { line: usize, text: String },

    #[error("line {line}: sequence {ordinal} starts while sequence {open} is open")]
    NestedSequence { line: usize, ordinal: u32, open: u32 },

    #[error("line {line}: sequence {found} out of order, expected {expected}")]
    SequenceOrder {
        line: usize,
        expected: u32,
        found: u32,
    },

    #[error("line {line}: seq_end {ordinal} has no matching seq_start")]
    UnmatchedSequenceEnd { line: usize, ordinal: u32 },

    #[error("sequence {ordinal} is never closed")]
    UnclosedSequence { ordinal: u32 },

    #[error("sequence {ordinal} has no tool change")]
    MissingToolChange { ordinal: u32 },

    #[error("sequence {ordinal} ends with cutter compensation still active")]
    CompensationNotCancelled { ordinal: u32 },

    #[error("line {line}: tool {tool} does not support cutter compensation")]
    CompensationNotSupported { line: usize, tool: String },

    #[error("line {line}: tool {tool} is not in the catalog")]
    UnknownTool { line: usize, tool: String },

    #[error("last block must end the program, found '{found}'")]
    MissingProgramEnd { found: String },
}

/// Summary of a program that passed validation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgramReport {
    pub first_address: u32,
    pub last_address: u32,
    pub sequence_count: u32,
    pub tool_codes: BTreeSet<String>,
}

#[derive(Debug)]
struct OpenSequence {
    ordinal: u32,
    has_tool_change: bool,
    compensation: bool,
}

/// Running state while walking the numbered block
#[derive(Debug, Default)]
struct Walk {
    errors: Vec<ValidationError>,
    next_address: Option<u32>,
    report: ProgramReport,
    open: Option<OpenSequence>,
    current_tool: Option<String>,
    last_block: Vec<Token>,
}

impl Walk {
    /// Keep numbering in step across a line that does not lex
    fn skip_block(&mut self, text: &str) {
        let address = text
            .strip_prefix('N')
            .map(|rest| rest.split(|c: char| !c.is_ascii_digit()).next().unwrap_or(""))
            .and_then(|digits| digits.parse::<u32>().ok());

        match address {
            Some(found) => {
                if self.next_address.is_none() {
                    self.report.first_address = found;
                }
                self.next_address = Some(found.saturating_add(1));
                self.report.last_address = found;
            }
            None => self.next_address = self.next_address.map(|n| n.saturating_add(1)),
        }
        self.last_block.clear();
    }
}

#[derive(Default)]
pub struct Validator<'a> {
    catalog: Option<&'a ToolCatalog>,
}

impl<'a> Validator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also check tool codes and compensation support against a catalog
    pub fn with_catalog(catalog: &'a ToolCatalog) -> Self {
        Self {
            catalog: Some(catalog),
        }
    }

    pub fn validate_program<S: AsRef<str>>(
        &self,
        lines: &[S],
    ) -> Result<ProgramReport, Vec<ValidationError>> {
        let lines: Vec<&str> = lines.iter().map(|l| l.as_ref().trim()).collect();
        let mut walk = Walk::default();

        if lines.first() != Some(&"%") {
            walk.errors.push(ValidationError::MissingPreamble);
        }
        if lines.len() < 2 || lines.last() != Some(&"%") {
            walk.errors.push(ValidationError::MissingClosing);
        }

        let body = lines.get(1..lines.len().saturating_sub(1)).unwrap_or(&[]);
        for (idx, text) in body.iter().enumerate() {
            // 1-based, counting the preamble
            let line = idx + 2;
            match lex(text) {
                Ok(tokens) => self.validate_block(line, tokens, &mut walk),
                Err(_) => {
                    walk.errors.push(ValidationError::Lex { line });
                    walk.skip_block(text);
                }
            }
        }

        if let Some(open) = walk.open.take() {
            walk.errors
                .push(ValidationError::UnclosedSequence { ordinal: open.ordinal });
        }

        let ends_program = walk
            .last_block
            .iter()
            .any(|t| matches!(t, Token::Word(w) if w.is('M', 30) || w.is('M', 2)));
        if !ends_program {
            walk.errors.push(ValidationError::MissingProgramEnd {
                found: body.last().map(|l| l.to_string()).unwrap_or_default(),
            });
        }

        if walk.errors.is_empty() {
            Ok(walk.report)
        } else {
            Err(walk.errors)
        }
    }

    fn validate_block(&self, line: usize, tokens: Vec<Token>, walk: &mut Walk) {
        let Some(Token::Address(found)) = tokens.first().cloned() else {
            walk.errors.push(ValidationError::Unnumbered { line });
            return;
        };

        match walk.next_address {
            None => walk.report.first_address = found,
            Some(expected) if expected != found => {
                walk.errors.push(ValidationError::Numbering {
                    line,
                    expected,
                    found,
                });
            }
            Some(_) => {}
        }
        walk.next_address = Some(found.saturating_add(1));
        walk.report.last_address = found;

        for token in &tokens[1..] {
            if let Some((key, value)) = token.annotation() {
                self.validate_marker(line, key, value, walk);
            }
        }

        let words: Vec<&Word> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Word(w) => Some(w),
                _ => None,
            })
            .collect();
        let tool = tokens.iter().find_map(|t| match t {
            Token::Tool(code) => Some(code.as_str()),
            _ => None,
        });
        self.validate_words(line, tool, &words, walk);

        walk.last_block = tokens;
    }

    fn validate_marker(&self, line: usize, key: &str, value: &str, walk: &mut Walk) {
        if key != "seq_start" && key != "seq_end" {
            return;
        }
        let Ok(ordinal) = value.parse::<u32>() else {
            walk.errors.push(ValidationError::MalformedMarker {
                line,
                text: format!("{} = {}", key, value),
            });
            return;
        };

        if key == "seq_start" {
            if let Some(open) = &walk.open {
                walk.errors.push(ValidationError::NestedSequence {
                    line,
                    ordinal,
                    open: open.ordinal,
                });
            }
            let expected = walk.report.sequence_count + 1;
            if ordinal != expected {
                walk.errors.push(ValidationError::SequenceOrder {
                    line,
                    expected,
                    found: ordinal,
                });
            }
            walk.report.sequence_count = ordinal;
            walk.open = Some(OpenSequence {
                ordinal,
                has_tool_change: false,
                compensation: false,
            });
            return;
        }

        match walk.open.take() {
            Some(open) if open.ordinal == ordinal => {
                if !open.has_tool_change {
                    walk.errors
                        .push(ValidationError::MissingToolChange { ordinal });
                }
                if open.compensation {
                    walk.errors
                        .push(ValidationError::CompensationNotCancelled { ordinal });
                }
            }
            other => {
                walk.open = other;
                walk.errors
                    .push(ValidationError::UnmatchedSequenceEnd { line, ordinal });
            }
        }
    }

    fn validate_words(&self, line: usize, tool: Option<&str>, words: &[&Word], walk: &mut Walk) {
        let tool_change = words.iter().any(|w| w.is('M', 6));
        if let Some(code) = tool {
            let code = code.to_string();
            if let Some(catalog) = self.catalog {
                if !catalog.contains(&code) {
                    walk.errors.push(ValidationError::UnknownTool {
                        line,
                        tool: code.clone(),
                    });
                }
            }
            if tool_change {
                if let Some(open) = walk.open.as_mut() {
                    open.has_tool_change = true;
                }
            }
            walk.report.tool_codes.insert(code.clone());
            walk.current_tool = Some(code);
        }

        for word in words {
            if word.is('G', 41) || word.is('G', 42) {
                self.check_compensation_support(line, walk);
                if let Some(open) = walk.open.as_mut() {
                    open.compensation = true;
                }
            } else if word.is('G', 40) {
                if let Some(open) = walk.open.as_mut() {
                    open.compensation = false;
                }
            }
        }
    }

    fn check_compensation_support(&self, line: usize, walk: &mut Walk) {
        let (Some(catalog), Some(code)) = (self.catalog, walk.current_tool.as_ref()) else {
            return;
        };
        let supported = catalog
            .get(code)
            .map(|tool| tool.supports_cutter_compensation)
            .unwrap_or(true);
        if !supported {
            walk.errors.push(ValidationError::CompensationNotSupported {
                line,
                tool: code.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorOptions;
    use crate::post::PostProcessorType;
    use crate::program::generate_program;
    use crate::tool_library::{generate_catalog, sample_tool};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn valid_program() -> Vec<String> {
        [
            "%",
            "N2 (@@ program_id = O1001)",
            "N3 G20",
            "N4 (@@ seq_start = 1)",
            "N5 T100001 M6",
            "N6 S764.0 M3",
            "N7 G41",
            "N8 G1 X1.0 F7.64",
            "N9 G40",
            "N10 (@@ seq_end = 1)",
            "N11 M30",
            "%",
        ]
        .iter()
        .map(|l| l.to_string())
        .collect()
    }

    #[test]
    fn test_valid_program_report() {
        let report = Validator::new().validate_program(&valid_program()).unwrap();
        assert_eq!(report.first_address, 2);
        assert_eq!(report.last_address, 11);
        assert_eq!(report.sequence_count, 1);
        assert!(report.tool_codes.contains("100001"));
    }

    #[test]
    fn test_numbering_gap() {
        let mut lines = valid_program();
        lines[3] = "N5 (@@ seq_start = 1)".to_string();
        let errors = Validator::new().validate_program(&lines).unwrap_err();
        assert_eq!(
            errors[0],
            ValidationError::Numbering {
                line: 4,
                expected: 4,
                found: 5
            }
        );
    }

    #[test]
    fn test_missing_delimiters_and_end() {
        let mut lines = valid_program();
        lines.remove(0);
        lines.pop();
        lines.pop();
        let errors = Validator::new().validate_program(&lines).unwrap_err();
        assert!(errors.contains(&ValidationError::MissingPreamble));
        assert!(errors.contains(&ValidationError::MissingClosing));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::MissingProgramEnd { .. })));
    }

    #[test]
    fn test_unbalanced_markers() {
        let mut lines = valid_program();
        lines[9] = "N10 (@@ seq_end = 2)".to_string();
        let errors = Validator::new().validate_program(&lines).unwrap_err();
        assert!(errors.contains(&ValidationError::UnmatchedSequenceEnd { line: 10, ordinal: 2 }));
        assert!(errors.contains(&ValidationError::UnclosedSequence { ordinal: 1 }));
    }

    #[test]
    fn test_compensation_left_on() {
        let mut lines = valid_program();
        lines[8] = "N9 G0 Z3.0".to_string();
        let errors = Validator::new().validate_program(&lines).unwrap_err();
        assert_eq!(errors, vec![ValidationError::CompensationNotCancelled { ordinal: 1 }]);
    }

    #[test]
    fn test_compensation_on_unsupported_tool() {
        let catalog: ToolCatalog = [sample_tool("100001", false)].into_iter().collect();
        let errors = Validator::with_catalog(&catalog)
            .validate_program(&valid_program())
            .unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::CompensationNotSupported {
                line: 7,
                tool: "100001".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_tool() {
        let catalog: ToolCatalog = [sample_tool("200002", true)].into_iter().collect();
        let errors = Validator::with_catalog(&catalog)
            .validate_program(&valid_program())
            .unwrap_err();
        assert!(errors.contains(&ValidationError::UnknownTool {
            line: 5,
            tool: "100001".to_string()
        }));
    }

    #[test]
    fn test_unreadable_line_reported_once() {
        let mut lines = valid_program();
        lines[7] = "N8 G1 X1.0 $$".to_string();
        let errors = Validator::new().validate_program(&lines).unwrap_err();
        assert_eq!(errors, vec![ValidationError::Lex { line: 8 }]);

        lines[7] = "garbage $$".to_string();
        let errors = Validator::new().validate_program(&lines).unwrap_err();
        assert_eq!(errors, vec![ValidationError::Lex { line: 8 }]);
    }

    #[test]
    fn test_non_numeric_tool_codes_validate() {
        let catalog: ToolCatalog = [sample_tool("EM-1", true), sample_tool("T12", false)]
            .into_iter()
            .collect();
        let timestamp = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .unwrap();
        let metadata = GeneratorOptions::default().metadata(0, timestamp);

        for seed in 0..20u64 {
            let program =
                generate_program(&catalog, &metadata, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(program.lines().iter().any(|l| l.ends_with("TEM-1 M6")));

            let report = Validator::with_catalog(&catalog)
                .validate_program(program.lines())
                .unwrap_or_else(|errors| panic!("seed {}: {:?}", seed, errors));
            let codes: Vec<&str> = report.tool_codes.iter().map(String::as_str).collect();
            assert_eq!(codes, vec!["EM-1", "T12"]);
        }
    }

    #[test]
    fn test_generated_programs_validate() {
        let mut rng = StdRng::seed_from_u64(1234);
        let catalog = generate_catalog(40, &mut rng);
        let timestamp = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .unwrap();

        for seed in 0..60u64 {
            let options = GeneratorOptions {
                controller: PostProcessorType::ALL[seed as usize % 4],
                ..GeneratorOptions::default()
            };
            let metadata = options.metadata(seed as usize, timestamp);
            let program =
                generate_program(&catalog, &metadata, &mut StdRng::seed_from_u64(seed)).unwrap();

            let report = Validator::with_catalog(&catalog)
                .validate_program(program.lines())
                .unwrap_or_else(|errors| panic!("seed {}: {:?}", seed, errors));
            assert_eq!(report.first_address, program.first_address());
            assert_eq!(report.sequence_count as usize, program.sequence_count());
            assert!(report.tool_codes.iter().all(|c| catalog.contains(c)));
        }
    }
}
