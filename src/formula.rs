//! CNF formulas and the constraint builders used to populate them.
//!
//! A [`Formula`] is an ordered list of [`Clause`]s bound to the
//! [`VariableAllocator`] its literals come from. The allocator is consulted
//! when the formula is serialized: every literal is rewritten through the
//! equality map, and the variable count of the problem line is the allocator's.
//!
//! ```
//! use cnf_rs::clause::Clause;
//! use cnf_rs::formula::Formula;
//! use cnf_rs::variables::VariableAllocator;
//!
//! let vars = VariableAllocator::new();
//! let mut f = Formula::new(&vars);
//! f.append_clause(Clause::from_dimacs([1, -3]));
//! f.append_clause(Clause::from_dimacs([-2, 3]));
//! assert_eq!(f.to_dimacs(3, false).unwrap(), "1 -3 0\n-2 3 0\n");
//! ```
//!
//! # Equalities
//!
//! Two literals can be constrained equal in two ways:
//!
//! - [`Formula::assert_equal`] records the equality in the allocator. No clause
//!   is emitted; one of the two variables disappears from the serialized
//!   formula. This is the preferred way.
//! - [`Formula::assert_equal_clauses`] emits `(x | -y) & (-x | y)`, which keeps
//!   both variables visible to the solver.

use std::io::Write;

use log::debug;

use crate::clause::Clause;
use crate::dimacs;
use crate::error::{CnfError, Result};
use crate::types::Lit;
use crate::variables::VariableAllocator;

#[derive(Debug, Clone)]
pub struct Formula<'a> {
    vars: &'a VariableAllocator,
    clauses: Vec<Clause>,
}

impl<'a> Formula<'a> {
    /// Creates an empty formula over `vars`.
    pub fn new(vars: &'a VariableAllocator) -> Self {
        Self {
            vars,
            clauses: Vec::new(),
        }
    }

    pub fn variables(&self) -> &'a VariableAllocator {
        self.vars
    }

    /// Total number of variables declared in the allocator.
    pub fn num_vars(&self) -> usize {
        self.vars.num_vars()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.clauses.iter()
    }
}

// Clauses
impl Formula<'_> {
    pub fn append_clause(&mut self, clause: impl Into<Clause>) {
        self.clauses.push(clause.into());
    }

    pub fn append_clauses(&mut self, clauses: impl IntoIterator<Item = Clause>) {
        self.clauses.extend(clauses);
    }
}

// Constraints
impl Formula<'_> {
    /// Constrains `x == y` through the allocator's equality map.
    pub fn assert_equal(&mut self, x: Lit, y: Lit) -> Result<()> {
        self.vars.declare_equal(x, y)
    }

    /// Constrains `x == y` with the clauses `(x | -y)` and `(-x | y)`.
    pub fn assert_equal_clauses(&mut self, x: Lit, y: Lit) {
        self.append_clauses([Clause::from([x, -y]), Clause::from([-x, y])]);
    }

    /// Constrains `a ^ b ^ c == 0`, with true as 1 and false as 0.
    pub fn assert_xor3(&mut self, a: Lit, b: Lit, c: Lit) {
        self.append_clauses([
            Clause::from([-a, b, c]),
            Clause::from([a, -b, c]),
            Clause::from([a, b, -c]),
            Clause::from([-a, -b, -c]),
        ]);
    }

    /// Fixes `bits` (most significant bit first) to the binary expansion of
    /// `value`, one unit clause per bit.
    ///
    /// Bits above bit 31 of `value` are taken as 0.
    pub fn assign_integer(&mut self, bits: &[Lit], value: u32) {
        let n = bits.len();
        for i in 0..n {
            let bit = value.checked_shr(i as u32).unwrap_or(0) & 1 == 1;
            self.append_clause([bits[n - i - 1].with_sign(bit)]);
        }
    }

    /// Constrains `bits1 ^ bits2 == constant` position-wise, both vectors read
    /// most significant bit first.
    ///
    /// Each position becomes an equality (`bits1[i] == -bits2[i]` where the
    /// constant bit is 1, `bits1[i] == bits2[i]` otherwise), so no clauses are
    /// emitted.
    pub fn assert_xor_with_constant(&mut self, bits1: &[Lit], bits2: &[Lit], constant: u32) -> Result<()> {
        if bits1.len() != bits2.len() {
            return Err(CnfError::LengthMismatch {
                left: bits1.len(),
                right: bits2.len(),
            });
        }
        let n = bits1.len();
        let pairs = bits1.iter().zip(bits2).enumerate().map(|(i, (&x, &y))| {
            let flip = constant.checked_shr((n - i - 1) as u32).unwrap_or(0) & 1 == 1;
            (x, y.with_sign(!flip))
        });
        self.vars.declare_equalities(pairs)
    }
}

// Serialization
impl Formula<'_> {
    /// Renders the formula in DIMACS CNF format.
    ///
    /// Every literal is replaced by its representative in the allocator. The
    /// problem line `p cnf <variable_count> <clauses>` is emitted only when
    /// `header` is set; common solvers do not need it.
    pub fn to_dimacs(&self, variable_count: usize, header: bool) -> Result<String> {
        let mut out = String::new();
        if header {
            dimacs::write_header(&mut out, variable_count, self.clauses.len());
        }
        let mut resolved = Vec::new();
        for clause in &self.clauses {
            resolved.clear();
            for &lit in clause {
                resolved.push(self.vars.resolve(lit)?);
            }
            dimacs::write_clause(&mut out, resolved.iter().copied());
        }
        debug!(
            "to_dimacs: {} clause(s), {} variable(s), {} bytes",
            self.clauses.len(),
            variable_count,
            out.len()
        );
        Ok(out)
    }

    /// Writes [`to_dimacs`](Self::to_dimacs) to `writer`. Nothing is written if
    /// a literal fails to resolve.
    pub fn write_dimacs<W: Write>(&self, writer: &mut W, variable_count: usize, header: bool) -> Result<()> {
        let text = self.to_dimacs(variable_count, header)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Evaluates the formula under `value`, which maps each variable of the
    /// serialized (resolved) formula to its value.
    pub fn eval(&self, mut value: impl FnMut(Lit) -> bool) -> Result<bool> {
        for clause in &self.clauses {
            let mut satisfied = false;
            for &lit in clause {
                if value(self.vars.resolve(lit)?) {
                    satisfied = true;
                    break;
                }
            }
            if !satisfied {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
