use std::fmt::{Display, Formatter};
use std::ops::Index;

use crate::types::{Lit, Var};

/// A disjunction of literals.
///
/// Literals keep their insertion order; duplicates and tautologies are kept
/// as given.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct Clause {
    literals: Vec<Lit>,
}

impl Clause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a clause from signed DIMACS codes.
    ///
    /// # Panics
    ///
    /// Panics if a code is `0`.
    pub fn from_dimacs(codes: impl IntoIterator<Item = i32>) -> Self {
        codes.into_iter().map(Lit::from_dimacs).collect()
    }

    pub fn push(&mut self, lit: Lit) {
        self.literals.push(lit);
    }

    /// Position of the first literal over the variable of `code`, whatever
    /// the polarity of either.
    pub fn index_of(&self, code: Lit) -> Option<usize> {
        self.literals.iter().position(|lit| lit.var() == code.var())
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn literals(&self) -> &[Lit] {
        &self.literals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Lit> {
        self.literals.iter()
    }

    /// Evaluates the clause under `value`, which maps each variable to its value.
    pub fn eval(&self, mut value: impl FnMut(Var) -> bool) -> bool {
        self.literals.iter().any(|lit| lit.eval(value(lit.var())))
    }
}

impl Index<usize> for Clause {
    type Output = Lit;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl FromIterator<Lit> for Clause {
    fn from_iter<I: IntoIterator<Item = Lit>>(iter: I) -> Self {
        Self {
            literals: iter.into_iter().collect(),
        }
    }
}

impl Extend<Lit> for Clause {
    fn extend<I: IntoIterator<Item = Lit>>(&mut self, iter: I) {
        self.literals.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Clause {
    type Item = &'a Lit;
    type IntoIter = std::slice::Iter<'a, Lit>;

    fn into_iter(self) -> Self::IntoIter {
        self.literals.iter()
    }
}

impl From<Vec<Lit>> for Clause {
    fn from(literals: Vec<Lit>) -> Self {
        Self { literals }
    }
}

impl<const N: usize> From<[Lit; N]> for Clause {
    fn from(literals: [Lit; N]) -> Self {
        Self {
            literals: literals.to_vec(),
        }
    }
}

/// Raw DIMACS line, `0`-terminated. Equalities are not applied.
impl Display for Clause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for lit in &self.literals {
            write!(f, "{} ", lit)?;
        }
        write!(f, "0")
    }
}
