//! DIMACS text formats.
//!
//! # CNF
//!
//! ```text
//! c optional comment lines
//! p cnf <variables> <clauses>     # optional problem line
//! 1 -3 0                          # one clause per line, 0-terminated
//! -2 3 0
//! ```
//!
//! # Assignment
//!
//! The answer of a solver in the minisat style: a status token, followed (when
//! satisfiable) by the model as signed literals terminated by `0`.
//!
//! ```text
//! SAT
//! 1 -2 3 0
//! ```

use std::fmt::Write as FmtWrite;

use crate::clause::Clause;
use crate::error::{CnfError, Result};
use crate::types::Lit;

/// Writes the problem line `p cnf <variables> <clauses>`.
pub fn write_header(out: &mut String, num_vars: usize, num_clauses: usize) {
    writeln!(out, "p cnf {} {}", num_vars, num_clauses).unwrap();
}

/// Writes one `0`-terminated clause line.
pub fn write_clause(out: &mut String, literals: impl IntoIterator<Item = Lit>) {
    for lit in literals {
        write!(out, "{} ", lit).unwrap();
    }
    out.push_str("0\n");
}

/// A CNF read back from DIMACS text.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CnfText {
    /// Variable count announced by the problem line, if present.
    pub num_vars: Option<usize>,
    pub clauses: Vec<Clause>,
}

impl CnfText {
    /// Largest variable mentioned in the problem line or in any clause.
    pub fn max_var(&self) -> usize {
        let used = self
            .clauses
            .iter()
            .flatten()
            .map(|lit| lit.var().id() as usize)
            .max()
            .unwrap_or(0);
        used.max(self.num_vars.unwrap_or(0))
    }
}

/// Parses DIMACS CNF text. The problem line is optional.
pub fn parse_cnf(text: &str) -> Result<CnfText> {
    let mut cnf = CnfText::default();
    let mut clause = Clause::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') || line.starts_with('%') {
            continue;
        }
        if line.starts_with('p') {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 4 || parts[1] != "cnf" {
                return Err(CnfError::Parse(format!("invalid problem line: {}", line)));
            }
            let num_vars = parts[2]
                .parse::<usize>()
                .map_err(|_| CnfError::Parse(format!("invalid variable count: {}", parts[2])))?;
            cnf.num_vars = Some(num_vars);
            continue;
        }
        for word in line.split_whitespace() {
            match parse_int(word)? {
                0 => cnf.clauses.push(std::mem::take(&mut clause)),
                code => clause.push(Lit::from_dimacs(code)),
            }
        }
    }
    if !clause.is_empty() {
        return Err(CnfError::Parse("last clause is not terminated by 0".into()));
    }

    Ok(cnf)
}

/// Parses a solver answer.
///
/// Returns `None` unless the first token is `SAT`. Otherwise returns the
/// literals up to the `0` terminator (or the end of the input).
pub fn parse_assignment(text: &str) -> Result<Option<Vec<i32>>> {
    let mut tokens = text.split_whitespace();
    match tokens.next() {
        Some("SAT") => {}
        _ => return Ok(None),
    }

    let mut model = Vec::new();
    for token in tokens {
        match parse_int(token)? {
            0 => break,
            code => model.push(code),
        }
    }
    Ok(Some(model))
}

/// Renders an answer in the format read by [`parse_assignment`].
pub fn format_assignment(model: Option<&[i32]>) -> String {
    match model {
        None => "UNSAT\n".to_string(),
        Some(model) => {
            let mut out = String::from("SAT\n");
            for code in model {
                write!(out, "{} ", code).unwrap();
            }
            out.push_str("0\n");
            out
        }
    }
}

fn parse_int(token: &str) -> Result<i32> {
    match token.parse::<i32>() {
        Ok(i32::MIN) | Err(_) => Err(CnfError::Parse(format!("invalid literal: {}", token))),
        Ok(code) => Ok(code),
    }
}
