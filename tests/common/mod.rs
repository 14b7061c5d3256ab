//! Exhaustive solver used by the integration tests.

#![allow(dead_code)]

use cnf_rs::clause::Clause;
use cnf_rs::dimacs::{format_assignment, parse_cnf};
use cnf_rs::error::Result;
use cnf_rs::solver::Solver;

/// Tries every assignment in increasing binary order, variable 1 as bit 0.
#[derive(Debug, Default)]
pub struct BruteForce {
    pub calls: usize,
}

impl Solver for BruteForce {
    fn solve(&mut self, cnf: &str, num_vars: usize) -> Result<String> {
        self.calls += 1;
        let clauses = parse_cnf(cnf)?.clauses;
        let model = all_models(&clauses, num_vars).into_iter().next().map(|values| to_codes(&values));
        Ok(format_assignment(model.as_deref()))
    }
}

/// Every assignment of variables `1..=num_vars` satisfying `clauses`.
pub fn all_models(clauses: &[Clause], num_vars: usize) -> Vec<Vec<bool>> {
    assert!(num_vars < 24, "too many variables for exhaustive search");
    (0..1u32 << num_vars)
        .map(|mask| (0..num_vars).map(|i| mask >> i & 1 == 1).collect::<Vec<bool>>())
        .filter(|values| clauses.iter().all(|c| c.eval(|var| values[var.index()])))
        .collect()
}

pub fn to_codes(values: &[bool]) -> Vec<i32> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| if v { i as i32 + 1 } else { -(i as i32 + 1) })
        .collect()
}
