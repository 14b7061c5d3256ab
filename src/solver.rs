//! Handing formulas to an external SAT solver.
//!
//! The library does not ship a solver. A [`Solver`] receives the DIMACS text of
//! a formula and returns the answer in the format read by
//! [`parse_assignment`]; closures can be used directly:
//!
//! ```
//! use cnf_rs::formula::Formula;
//! use cnf_rs::solver::solve;
//! use cnf_rs::variables::VariableAllocator;
//!
//! let vars = VariableAllocator::new();
//! vars.declare_family("x", &[2]).unwrap();
//! let x0 = vars.code_of("x", &[0]).unwrap();
//! let x1 = vars.code_of("x", &[1]).unwrap();
//!
//! let mut f = Formula::new(&vars);
//! f.append_clause([x0]);
//! f.append_clause([-x1]);
//!
//! let mut solver = |_cnf: &str, _num_vars: usize| -> cnf_rs::error::Result<String> { Ok("SAT\n1 -2 0\n".into()) };
//! assert!(solve(&f, &mut solver, true).unwrap());
//! assert_eq!(vars.pack_little_endian(&[x0, x1]).unwrap(), 0b10);
//! ```

use log::debug;

use crate::dimacs::parse_assignment;
use crate::error::Result;
use crate::formula::Formula;

/// An external SAT solver.
pub trait Solver {
    /// Solves the DIMACS CNF `cnf` over variables `1..=num_vars`.
    ///
    /// Returns `SAT` followed by the model, or anything else when no model
    /// exists.
    fn solve(&mut self, cnf: &str, num_vars: usize) -> Result<String>;
}

impl<F> Solver for F
where
    F: FnMut(&str, usize) -> Result<String>,
{
    fn solve(&mut self, cnf: &str, num_vars: usize) -> Result<String> {
        self(cnf, num_vars)
    }
}

/// Serializes `formula`, runs `solver` on it and decodes the model into the
/// formula's allocator.
///
/// Returns `false` if the formula is unsatisfiable, in which case any previous
/// assignment is cleared.
pub fn solve<S: Solver + ?Sized>(formula: &Formula, solver: &mut S, header: bool) -> Result<bool> {
    let vars = formula.variables();
    let num_vars = formula.num_vars();
    let cnf = formula.to_dimacs(num_vars, header)?;
    debug!("solve: {} clause(s) over {} variable(s)", formula.len(), num_vars);

    let answer = solver.solve(&cnf, num_vars)?;
    match parse_assignment(&answer)? {
        Some(model) => {
            vars.decode_assignment(&model)?;
            debug!("solve: SAT");
            Ok(true)
        }
        None => {
            vars.clear_assignment();
            debug!("solve: UNSAT");
            Ok(false)
        }
    }
}
