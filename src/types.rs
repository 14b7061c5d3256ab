//! Type-safe wrappers for CNF variables and literals.
//!
//! Variables are 1-indexed, matching the DIMACS convention where `0` terminates
//! a clause. Literals pack a variable and a polarity into one signed integer.
use std::fmt;
use std::ops::Neg;

/// A variable identifier (1-indexed).
///
/// # Invariants
///
/// - Variable IDs must be >= 1 (0 is the DIMACS clause terminator)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Creates a new variable with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id == 0` or if `id` does not fit a DIMACS literal (`i32`).
    pub fn new(id: u32) -> Self {
        assert_ne!(id, 0, "Variable IDs must be >= 1");
        assert!(id <= i32::MAX as u32, "Variable IDs must be <= i32::MAX");
        Var(id)
    }

    /// Returns the raw variable ID as a `u32`.
    pub fn id(self) -> u32 {
        self.0
    }

    /// Returns the 0-based position of this variable in a dense array.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Positive literal of this variable.
    pub fn pos(self) -> Lit {
        Lit(self.0 as i32)
    }

    /// Negative literal of this variable.
    pub fn neg(self) -> Lit {
        Lit(-(self.0 as i32))
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

/// A literal: a variable or its negation.
///
/// Represented by the signed DIMACS code, so `-lit` is the negation and
/// `lit.var()` recovers the variable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit(i32);

impl Lit {
    /// Creates a literal of `var` with the given polarity.
    pub fn new(var: Var, positive: bool) -> Self {
        if positive {
            var.pos()
        } else {
            var.neg()
        }
    }

    /// Creates a literal from its signed DIMACS code.
    ///
    /// # Panics
    ///
    /// Panics if `code == 0` or `code == i32::MIN` (which has no negation).
    pub fn from_dimacs(code: i32) -> Self {
        assert_ne!(code, 0, "Literal codes must be non-zero");
        assert_ne!(code, i32::MIN, "Literal codes must be negatable");
        Lit(code)
    }

    /// Returns the signed DIMACS code.
    pub const fn to_dimacs(self) -> i32 {
        self.0
    }

    pub fn var(self) -> Var {
        Var(self.0.unsigned_abs())
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negated(self) -> bool {
        self.0 < 0
    }

    pub const fn negate(self) -> Self {
        Lit(-self.0)
    }

    /// Returns `self` when `positive`, `-self` otherwise.
    pub const fn with_sign(self, positive: bool) -> Self {
        if positive {
            self
        } else {
            self.negate()
        }
    }

    /// Evaluates the literal under a value of its variable.
    pub const fn eval(self, value: bool) -> bool {
        value == self.is_positive()
    }
}

impl Neg for Lit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Lit> for i32 {
    fn from(lit: Lit) -> Self {
        lit.0
    }
}

impl From<Var> for Lit {
    fn from(var: Var) -> Self {
        var.pos()
    }
}
