//! Allocation of dense variable codes for named, multi-dimensional families.
//!
//! A [`VariableAllocator`] hands out DIMACS codes for variables grouped in
//! *families*. Declaring `x` with dimensions `[7, 3]` and then `y` with
//! dimensions `[7, 3, 3]` gives `x` the codes `1..=21` and `y` the codes
//! `22..=84`:
//!
//! ```
//! use cnf_rs::variables::VariableAllocator;
//!
//! let vars = VariableAllocator::new();
//! vars.declare_family("x", &[7, 3]).unwrap();
//! vars.declare_family("y", &[7, 3, 3]).unwrap();
//!
//! assert_eq!(vars.code_of("x", &[0, 0]).unwrap().to_dimacs(), 1);
//! assert_eq!(vars.code_of("y", &[0, 0, 0]).unwrap().to_dimacs(), 22);
//! assert_eq!(vars.num_vars(), 84);
//! ```
//!
//! Coordinates are folded row-major, so the last coordinate varies fastest.
//!
//! The allocator also records *equalities* between literals. An equality does
//! not produce clauses: the literal with the larger variable is rewritten to the
//! one with the smaller variable when a formula is serialized, which shrinks the
//! problem the solver sees. After solving, [`decode_assignment`] fills the
//! elided variables back in, so every declared variable has a value.
//!
//! [`decode_assignment`]: VariableAllocator::decode_assignment

use std::cell::{Ref, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;

use log::debug;

use crate::error::{CnfError, Result};
use crate::types::{Lit, Var};

/// A multi-dimensional array of boolean variables occupying a contiguous
/// range of codes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Family {
    name: String,
    dimensions: Vec<usize>,
    base_offset: usize,
}

impl Family {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    /// Sum of the sizes of all families declared before this one.
    pub fn base_offset(&self) -> usize {
        self.base_offset
    }

    /// Number of variables in the family.
    pub fn size(&self) -> usize {
        self.dimensions.iter().product()
    }

    /// Mixed-radix, row-major index of `coordinates` within the family.
    fn index_of(&self, coordinates: &[usize]) -> Result<usize> {
        if coordinates.len() != self.dimensions.len() {
            return Err(CnfError::TooManyCoordinates {
                name: self.name.clone(),
                expected: self.dimensions.len(),
                actual: coordinates.len(),
            });
        }
        let mut index = 0;
        for (axis, (&value, &bound)) in coordinates.iter().zip(&self.dimensions).enumerate() {
            if value >= bound {
                return Err(CnfError::CoordinateOutOfRange {
                    name: self.name.clone(),
                    axis,
                    value,
                    bound,
                });
            }
            index = index * bound + value;
        }
        Ok(index)
    }
}

#[derive(Debug, Default)]
struct Families {
    list: Vec<Family>,
    by_name: HashMap<String, usize>,
    total: usize,
    /// Counter for synthesized family names.
    anonymous: usize,
}

impl Families {
    fn get(&self, name: &str) -> Result<&Family> {
        self.by_name
            .get(name)
            .map(|&i| &self.list[i])
            .ok_or_else(|| CnfError::UnknownFamily { name: name.to_string() })
    }
}

/// Owner of the variable numbering, the equality map and the decoded
/// assignment of one problem instance.
///
/// All operations take `&self`, so the allocator can be shared by several
/// [`Formula`]s that keep declaring equalities while they are being built.
///
/// [`Formula`]: crate::formula::Formula
#[derive(Default)]
pub struct VariableAllocator {
    families: RefCell<Families>,
    equalities: RefCell<HashMap<Lit, Lit>>,
    assignment: RefCell<Option<Vec<bool>>>,
}

impl VariableAllocator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for VariableAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableAllocator")
            .field("families", &self.families.borrow().list.len())
            .field("num_vars", &self.num_vars())
            .field("equalities", &(self.equalities.borrow().len() / 2))
            .field("assigned", &self.is_assigned())
            .finish()
    }
}

/// Lists the declared families, one per line: `name index { d0 d1 ... }`.
impl fmt::Display for VariableAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, family) in self.families.borrow().list.iter().enumerate() {
            write!(f, "{} {} {{", family.name, index)?;
            for d in &family.dimensions {
                write!(f, " {}", d)?;
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}

// Declarations
impl VariableAllocator {
    /// Declares a new family of variables with the given dimensions.
    ///
    /// An empty `dimensions` slice declares a single scalar variable,
    /// addressed with an empty coordinate list.
    pub fn declare_family(&self, name: &str, dimensions: &[usize]) -> Result<()> {
        let mut families = self.families.borrow_mut();
        if families.by_name.contains_key(name) {
            return Err(CnfError::DuplicateName { name: name.to_string() });
        }
        if let Some(axis) = dimensions.iter().position(|&d| d == 0) {
            return Err(CnfError::EmptyDimension {
                name: name.to_string(),
                axis,
            });
        }
        let too_large = || CnfError::FamilyTooLarge { name: name.to_string() };
        let size = dimensions
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(too_large)?;
        let total = families
            .total
            .checked_add(size)
            .filter(|&t| t <= i32::MAX as usize)
            .ok_or_else(too_large)?;

        let family = Family {
            name: name.to_string(),
            dimensions: dimensions.to_vec(),
            base_offset: families.total,
        };
        debug!(
            "declare_family({}, {:?}) -> codes {}..={}",
            name,
            dimensions,
            family.base_offset + 1,
            total
        );
        let index = families.list.len();
        families.by_name.insert(family.name.clone(), index);
        families.list.push(family);
        families.total = total;
        Ok(())
    }

    /// Declares a family under a fresh synthesized name and returns that name.
    pub fn declare_anonymous_family(&self, dimensions: &[usize]) -> Result<String> {
        let name = {
            let mut families = self.families.borrow_mut();
            loop {
                families.anonymous += 1;
                let candidate = format!("__anon__{}", families.anonymous);
                if !families.by_name.contains_key(&candidate) {
                    break candidate;
                }
            }
        };
        self.declare_family(&name, dimensions)?;
        Ok(name)
    }

    /// Total number of declared variables.
    pub fn num_vars(&self) -> usize {
        self.families.borrow().total
    }

    pub fn num_families(&self) -> usize {
        self.families.borrow().list.len()
    }

    /// Declared families, in declaration order.
    pub fn families(&self) -> Ref<'_, [Family]> {
        Ref::map(self.families.borrow(), |f| f.list.as_slice())
    }

    /// Returns the size of dimension `axis` of the family `name`.
    pub fn dimension_bound(&self, name: &str, axis: usize) -> Result<usize> {
        let families = self.families.borrow();
        let family = families.get(name)?;
        family
            .dimensions
            .get(axis)
            .copied()
            .ok_or_else(|| CnfError::TooManyCoordinates {
                name: name.to_string(),
                expected: family.dimensions.len(),
                actual: axis + 1,
            })
    }
}

// Codes
impl VariableAllocator {
    /// Returns the (positive) literal of the variable `name[coordinates]`.
    pub fn code_of(&self, name: &str, coordinates: &[usize]) -> Result<Lit> {
        let families = self.families.borrow();
        let family = families.get(name)?;
        let index = family.index_of(coordinates)?;
        Ok(Var::new((family.base_offset + index + 1) as u32).pos())
    }

    /// Same as [`code_of`](Self::code_of) followed by [`resolve`](Self::resolve).
    pub fn resolve_named(&self, name: &str, coordinates: &[usize]) -> Result<Lit> {
        let lit = self.code_of(name, coordinates)?;
        self.resolve(lit)
    }
}

// Equalities
impl VariableAllocator {
    /// Records that `x` and `y` always take the same value.
    ///
    /// Both literals are first resolved to their representatives; the
    /// representative with the larger variable is then mapped to the other one,
    /// for both polarities. Declaring a literal equal to its own negation fails
    /// with [`CnfError::EqualityCycle`] and records nothing.
    pub fn declare_equal(&self, x: Lit, y: Lit) -> Result<()> {
        link(&mut self.equalities.borrow_mut(), x, y).map(|_| ())
    }

    /// Records a batch of equalities: either all of them or none.
    pub fn declare_equalities(&self, pairs: impl IntoIterator<Item = (Lit, Lit)>) -> Result<()> {
        let mut equalities = self.equalities.borrow_mut();
        let mut linked = Vec::new();
        for (x, y) in pairs {
            match link(&mut equalities, x, y) {
                Ok(Some(from)) => linked.push(from),
                Ok(None) => {}
                Err(e) => {
                    // Linked literals were representatives, so they had no entry before.
                    for from in linked.into_iter().rev() {
                        equalities.remove(&from);
                        equalities.remove(&-from);
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Follows the equality map from `lit` to its representative.
    pub fn resolve(&self, lit: Lit) -> Result<Lit> {
        resolve_in(&self.equalities.borrow(), lit)
    }

    /// Number of variables elided by equalities.
    pub fn num_equalities(&self) -> usize {
        self.equalities.borrow().len() / 2
    }
}

fn resolve_in(equalities: &HashMap<Lit, Lit>, lit: Lit) -> Result<Lit> {
    let mut current = lit;
    let mut visited = HashSet::new();
    while let Some(&next) = equalities.get(&current) {
        if !visited.insert(current) {
            return Err(CnfError::EqualityCycle { start: lit.to_dimacs() });
        }
        current = next;
    }
    Ok(current)
}

/// Links the representatives of `x` and `y`, returning the literal that stopped
/// being a representative, if any.
fn link(equalities: &mut HashMap<Lit, Lit>, x: Lit, y: Lit) -> Result<Option<Lit>> {
    let rx = resolve_in(equalities, x)?;
    let ry = resolve_in(equalities, y)?;
    if rx == ry {
        return Ok(None);
    }
    if rx == -ry {
        return Err(CnfError::EqualityCycle { start: x.to_dimacs() });
    }
    let (from, to) = if rx.var() > ry.var() { (rx, ry) } else { (ry, rx) };
    debug!("equality {} == {}: mapping {} -> {}", x, y, from, to);
    equalities.insert(from, to);
    equalities.insert(-from, -to);
    Ok(Some(from))
}

// Assignment
impl VariableAllocator {
    /// Loads a satisfying assignment returned by the solver.
    ///
    /// Each literal sets its variable to its polarity; unmentioned variables are
    /// false. A `0` ends the list. Variables elided by equalities then receive
    /// the value of their representative, negated if the representative is a
    /// negative literal.
    pub fn decode_assignment(&self, raw: &[i32]) -> Result<()> {
        if self.num_families() == 0 {
            return Err(CnfError::NoFamiliesDeclared);
        }
        let num_vars = self.num_vars();

        let mut values = vec![false; num_vars];
        for &code in raw.iter().take_while(|&&code| code != 0) {
            let var = code.unsigned_abs();
            if var as usize > num_vars {
                return Err(CnfError::VariableOutOfRange { var, num_vars });
            }
            values[var as usize - 1] = code > 0;
        }

        let equalities = self.equalities.borrow();
        let mut backfilled = 0;
        for index in 0..num_vars {
            let lit = Var::new(index as u32 + 1).pos();
            let resolved = resolve_in(&equalities, lit)?;
            if resolved != lit {
                let source = resolved.var();
                let value = *values.get(source.index()).ok_or(CnfError::VariableOutOfRange {
                    var: source.id(),
                    num_vars,
                })?;
                values[index] = resolved.eval(value);
                backfilled += 1;
            }
        }
        debug!(
            "decode_assignment: {} variable(s), {} backfilled from equalities",
            num_vars, backfilled
        );

        *self.assignment.borrow_mut() = Some(values);
        Ok(())
    }

    pub fn is_assigned(&self) -> bool {
        self.assignment.borrow().is_some()
    }

    /// Decoded values indexed by `var.index()`, if any.
    pub fn assignment(&self) -> Option<Vec<bool>> {
        self.assignment.borrow().clone()
    }

    pub fn clear_assignment(&self) {
        self.assignment.borrow_mut().take();
    }

    /// Value of a literal under the decoded assignment.
    pub fn value(&self, lit: Lit) -> Result<bool> {
        let assignment = self.assignment.borrow();
        let values = assignment.as_ref().ok_or(CnfError::NotYetAssigned)?;
        let var = lit.var();
        match values.get(var.index()) {
            Some(&value) => Ok(lit.eval(value)),
            None if (var.id() as usize) <= self.num_vars() => Err(CnfError::NotYetAssigned),
            None => Err(CnfError::VariableOutOfRange {
                var: var.id(),
                num_vars: self.num_vars(),
            }),
        }
    }

    /// Value of the variable `name[coordinates]` under the decoded assignment.
    pub fn value_of(&self, name: &str, coordinates: &[usize]) -> Result<bool> {
        if !self.is_assigned() {
            return Err(CnfError::NotYetAssigned);
        }
        let lit = self.code_of(name, coordinates)?;
        self.value(lit)
    }

    /// Packs the values of `codes` into an integer, first code as the most
    /// significant bit.
    ///
    /// Only the last 32 codes survive; earlier bits are shifted out.
    pub fn pack_little_endian(&self, codes: &[Lit]) -> Result<u32> {
        if !self.is_assigned() {
            return Err(CnfError::NotYetAssigned);
        }
        codes.iter().try_fold(0u32, |acc, &lit| {
            let bit = self.value(lit)? as u32;
            Ok(acc.wrapping_shl(1) | bit)
        })
    }
}
