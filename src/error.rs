//! Error definitions for CNF construction, S-box compilation and decoding.

/// Crate-wide error type.
///
/// Every variant describes a misuse detected at the offending call; the call
/// leaves the allocator, formula or compiler it was invoked on unchanged.
#[derive(Debug, thiserror::Error)]
pub enum CnfError {
    #[error("variable family `{name}` is already declared")]
    DuplicateName { name: String },
    #[error("variable family `{name}` is not declared")]
    UnknownFamily { name: String },
    #[error("family `{name}` has {expected} dimension(s), got {actual} coordinate(s)")]
    TooManyCoordinates {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("coordinate {axis} of family `{name}` is too large ({value} >= {bound})")]
    CoordinateOutOfRange {
        name: String,
        axis: usize,
        value: usize,
        bound: usize,
    },
    #[error("family `{name}` has a zero-sized dimension at axis {axis}")]
    EmptyDimension { name: String, axis: usize },
    #[error("family `{name}` does not fit in the DIMACS variable range")]
    FamilyTooLarge { name: String },
    #[error("cannot decode an assignment: no variable family is declared")]
    NoFamiliesDeclared,
    #[error("variables have not been assigned yet")]
    NotYetAssigned,
    #[error("equality chain starting at literal {start} does not resolve")]
    EqualityCycle { start: i32 },
    #[error("variable {var} is out of range (only {num_vars} variable(s) declared)")]
    VariableOutOfRange { var: u32, num_vars: usize },
    #[error("literal vectors must have the same length ({left} != {right})")]
    LengthMismatch { left: usize, right: usize },
    #[error("lookup table has {actual} entries, expected 2^{input_bits}")]
    SizeMismatch { input_bits: usize, actual: usize },
    #[error("lookup table entry {index} = {value} does not fit in {output_bits} output bit(s)")]
    ValueTooWide {
        index: usize,
        value: u32,
        output_bits: usize,
    },
    #[error("{side} literal vector has {actual} entries, expected {expected}")]
    ArityMismatch {
        side: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("template row {index} does not fit a {input_bits}x{output_bits} S-box (pattern length {pattern_len}, output {output})")]
    InvalidTemplateRow {
        index: usize,
        pattern_len: usize,
        output: i32,
        input_bits: usize,
        output_bits: usize,
    },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CnfError> = std::result::Result<T, E>;
