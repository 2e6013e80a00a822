//! Callback name validation.
//!
//! # Responsibilities
//! - Classify a candidate callback name into exactly one outcome
//! - Hold the reserved-word table and identifier pattern
//! - Bound the size of rejected values before they reach the logs
//!
//! # Design Decisions
//! - Rules run in fixed order: empty, too long, reserved, pattern
//! - Tables are built once at startup and never mutated
//! - Length is counted in bytes; the pattern rejects anything non-ASCII anyway

use std::collections::HashSet;
use std::fmt;

use regex::Regex;

/// Longest callback name accepted by default.
pub const DEFAULT_MAX_CALLBACK_LEN: usize = 50;

/// JavaScript reserved words that can never be a bare callback identifier.
pub const RESERVED_WORDS: [&str; 59] = [
    "abstract",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "double",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "function",
    "goto",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "volatile",
    "while",
    "with",
];

const IDENTIFIER_PATTERN: &str = r"^[$a-zA-Z_][0-9a-zA-Z_.\[\]]*$";

/// Result of classifying a callback candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationOutcome {
    Valid,
    Empty,
    TooLong,
    Reserved,
    Invalid,
}

impl ValidationOutcome {
    /// Every outcome, in stats output order.
    pub const ALL: [ValidationOutcome; 5] = [
        ValidationOutcome::Valid,
        ValidationOutcome::Empty,
        ValidationOutcome::TooLong,
        ValidationOutcome::Reserved,
        ValidationOutcome::Invalid,
    ];

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// Short reason used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationOutcome::Valid => "ok",
            ValidationOutcome::Empty => "empty",
            ValidationOutcome::TooLong => "too long",
            ValidationOutcome::Reserved => "reserved",
            ValidationOutcome::Invalid => "invalid",
        }
    }

    /// Key used by the stats listener and the metrics label.
    pub fn stat_key(&self) -> &'static str {
        match self {
            ValidationOutcome::Valid => "ok",
            ValidationOutcome::Empty => "e_empty",
            ValidationOutcome::TooLong => "e_toolong",
            ValidationOutcome::Reserved => "e_reserved",
            ValidationOutcome::Invalid => "e_invalid",
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allow-list validator for JSONP callback names.
///
/// Cheap to share: wrap it in an `Arc` and hand it to every request task.
#[derive(Debug, Clone)]
pub struct CallbackValidator {
    reserved: HashSet<&'static str>,
    pattern: Regex,
    max_len: usize,
}

impl CallbackValidator {
    /// Build the validator with the given length ceiling (in bytes).
    pub fn new(max_len: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            reserved: RESERVED_WORDS.iter().copied().collect(),
            pattern: Regex::new(IDENTIFIER_PATTERN)?,
            max_len,
        })
    }

    /// Classify `candidate`. First matching rule wins.
    pub fn validate(&self, candidate: &str) -> ValidationOutcome {
        if candidate.is_empty() {
            return ValidationOutcome::Empty;
        }
        if candidate.len() > self.max_len {
            return ValidationOutcome::TooLong;
        }
        if self.reserved.contains(candidate) {
            return ValidationOutcome::Reserved;
        }
        if !self.pattern.is_match(candidate) {
            return ValidationOutcome::Invalid;
        }
        ValidationOutcome::Valid
    }

    /// Longest prefix of `candidate` within the length ceiling, cut on a char boundary.
    pub fn truncate_for_log<'a>(&self, candidate: &'a str) -> &'a str {
        if candidate.len() <= self.max_len {
            return candidate;
        }
        let mut end = self.max_len;
        while !candidate.is_char_boundary(end) {
            end -= 1;
        }
        &candidate[..end]
    }
}

impl Default for CallbackValidator {
    /// Validator with the standard 50-byte ceiling.
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CALLBACK_LEN).expect("identifier pattern is a valid regex")
    }
}
