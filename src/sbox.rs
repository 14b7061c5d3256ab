//! Compilation of S-boxes (lookup tables) to CNF.
//!
//! An [`Sbox`] with `n` input bits and `m` output bits is compiled once into an
//! [`SboxTemplate`]: a list of clauses over *positions* rather than variables.
//! The template can then be instantiated any number of times with
//! [`Sbox::add_clauses_image`], which binds the positions to concrete literals
//! and appends the clauses to a [`Formula`].
//!
//! # Construction
//!
//! The naive template has one row per input value `x` and output bit `k`:
//!
//! ```text
//! (input != x) | (output[k] == bit k of table[x])
//! ```
//!
//! where `input != x` is the disjunction of the negations of the input bits of
//! `x`. These `m * 2^n` rows are then reduced by a [`Simplify`] strategy,
//! [`GreedyMerge`](crate::simplify::GreedyMerge) by default. The cost is exponential in `n`.
//!
//! # Bit order
//!
//! Input position `0` and output position `0` are the most significant bits,
//! matching [`Formula::assign_integer`] and
//! [`VariableAllocator::pack_little_endian`]:
//!
//! ```
//! use cnf_rs::formula::Formula;
//! use cnf_rs::sbox::Sbox;
//! use cnf_rs::variables::VariableAllocator;
//!
//! let sbox = Sbox::new(2, 2, [1, 2, 0, 3]).unwrap();
//!
//! let vars = VariableAllocator::new();
//! vars.declare_family("in", &[2]).unwrap();
//! vars.declare_family("out", &[2]).unwrap();
//! let input = [vars.code_of("in", &[0]).unwrap(), vars.code_of("in", &[1]).unwrap()];
//! let output = [vars.code_of("out", &[0]).unwrap(), vars.code_of("out", &[1]).unwrap()];
//!
//! let mut f = Formula::new(&vars);
//! sbox.add_clauses_image(&mut f, &input, &output).unwrap();
//! f.assign_integer(&input, 2);
//! assert_eq!(f.len(), sbox.template().len() + 2);
//! ```
//!
//! [`VariableAllocator::pack_little_endian`]: crate::variables::VariableAllocator::pack_little_endian

use std::fmt::{Display, Formatter};

use log::debug;

use crate::clause::Clause;
use crate::error::{CnfError, Result};
use crate::formula::Formula;
use crate::simplify::{DefaultSimplifier, Simplify};
use crate::types::Lit;

/// One parameterized clause of a template.
///
/// `pattern[i]` is the sign of input position `i` in the clause (`0` when the
/// position does not occur), `output` is the signed, 1-based output position.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TemplateRow {
    pattern: Vec<i8>,
    output: i32,
}

impl TemplateRow {
    /// # Panics
    ///
    /// Panics if `output == 0` or if a pattern entry is not in `-1..=1`.
    pub fn new(pattern: Vec<i8>, output: i32) -> Self {
        assert_ne!(output, 0, "Output position must be non-zero");
        assert!(
            pattern.iter().all(|p| (-1..=1).contains(p)),
            "Pattern entries must be -1, 0 or 1"
        );
        Self { pattern, output }
    }

    pub fn pattern(&self) -> &[i8] {
        &self.pattern
    }

    /// Signed, 1-based output position.
    pub fn output(&self) -> i32 {
        self.output
    }

    /// 0-based output position.
    pub fn output_bit(&self) -> usize {
        self.output.unsigned_abs() as usize - 1
    }

    /// Number of literals the row instantiates to.
    pub fn literal_count(&self) -> usize {
        self.pattern.iter().filter(|&&p| p != 0).count() + 1
    }

    /// If both rows share the output literal and their patterns differ in
    /// exactly one position, returns that position.
    pub fn merge_position(&self, other: &TemplateRow) -> Option<usize> {
        if self.output != other.output || self.pattern.len() != other.pattern.len() {
            return None;
        }
        let mut diffs = self
            .pattern
            .iter()
            .zip(&other.pattern)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i);
        match (diffs.next(), diffs.next()) {
            (Some(pos), None) => Some(pos),
            _ => None,
        }
    }

    /// Copy of this row with position `pos` turned into a don't-care.
    pub fn with_dont_care(&self, pos: usize) -> TemplateRow {
        let mut pattern = self.pattern.clone();
        pattern[pos] = 0;
        TemplateRow {
            pattern,
            output: self.output,
        }
    }

    /// Evaluates the clause for a concrete `input` (of `pattern().len()` bits)
    /// and `output` (of `output_bits` bits), both most significant bit first.
    pub fn eval(&self, input: u32, output: u32, output_bits: usize) -> bool {
        let n = self.pattern.len();
        let input_hit = self.pattern.iter().enumerate().any(|(i, &p)| {
            p != 0 && bit_msb_first(input, i, n) == (p > 0)
        });
        input_hit || bit_msb_first(output, self.output_bit(), output_bits) == (self.output > 0)
    }

    /// Binds the row to concrete literals.
    fn instantiate(&self, inputs: &[Lit], outputs: &[Lit]) -> Clause {
        let mut clause: Clause = self
            .pattern
            .iter()
            .zip(inputs)
            .filter(|(&p, _)| p != 0)
            .map(|(&p, &lit)| lit.with_sign(p > 0))
            .collect();
        clause.push(outputs[self.output_bit()].with_sign(self.output > 0));
        clause
    }
}

/// `[+ - 0 ... | +k]`, e.g. `[+-0 | -2]`.
impl Display for TemplateRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for &p in &self.pattern {
            let c = match p {
                1 => '+',
                -1 => '-',
                _ => '0',
            };
            write!(f, "{}", c)?;
        }
        write!(f, " | {:+}]", self.output)
    }
}

/// Bit `i` of an `n`-bit value, counted from the most significant bit.
fn bit_msb_first(value: u32, i: usize, n: usize) -> bool {
    value.checked_shr((n - i - 1) as u32).unwrap_or(0) & 1 == 1
}

/// A compiled S-box: rows independent of any concrete variables.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SboxTemplate {
    rows: Vec<TemplateRow>,
}

impl SboxTemplate {
    /// Enumerates the unsimplified template: `output_bits * 2^input_bits` rows.
    pub fn naive(input_bits: usize, output_bits: usize, table: &[u32]) -> Result<Self> {
        validate(input_bits, output_bits, table)?;

        let mut rows = Vec::with_capacity(table.len() * output_bits);
        for (x, &value) in table.iter().enumerate() {
            let pattern: Vec<i8> = (0..input_bits)
                .map(|i| if bit_msb_first(x as u32, i, input_bits) { -1 } else { 1 })
                .collect();
            for k in 0..output_bits {
                let position = k as i32 + 1;
                let output = if bit_msb_first(value, k, output_bits) { position } else { -position };
                rows.push(TemplateRow {
                    pattern: pattern.clone(),
                    output,
                });
            }
        }
        debug!("naive template for {}x{} S-box: {} rows", input_bits, output_bits, rows.len());

        Ok(Self { rows })
    }

    /// Reduces the rows with `simplifier`.
    pub fn simplified(self, simplifier: &dyn Simplify) -> Self {
        Self {
            rows: simplifier.simplify(self.rows),
        }
    }

    pub fn rows(&self) -> &[TemplateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of literals over all instantiated clauses.
    pub fn literal_count(&self) -> usize {
        self.rows.iter().map(TemplateRow::literal_count).sum()
    }

    /// Checks that every row has `input_bits` pattern positions and an output
    /// position in `1..=output_bits`.
    fn check_shape(&self, input_bits: usize, output_bits: usize) -> Result<()> {
        let bad = self
            .rows
            .iter()
            .position(|row| row.pattern.len() != input_bits || row.output_bit() >= output_bits);
        match bad {
            Some(index) => Err(CnfError::InvalidTemplateRow {
                index,
                pattern_len: self.rows[index].pattern.len(),
                output: self.rows[index].output,
                input_bits,
                output_bits,
            }),
            None => Ok(()),
        }
    }

    /// Whether the pair `(input, output)` satisfies every row.
    pub fn eval(&self, input: u32, output: u32, output_bits: usize) -> bool {
        self.rows.iter().all(|row| row.eval(input, output, output_bits))
    }
}

fn validate(input_bits: usize, output_bits: usize, table: &[u32]) -> Result<()> {
    let size_mismatch = || CnfError::SizeMismatch {
        input_bits,
        actual: table.len(),
    };
    if input_bits >= u32::BITS as usize {
        return Err(size_mismatch());
    }
    let expected = 1usize.checked_shl(input_bits as u32).ok_or_else(size_mismatch)?;
    if table.len() != expected {
        return Err(size_mismatch());
    }
    if let Some(index) = table
        .iter()
        .position(|&v| v.checked_shr(output_bits as u32).unwrap_or(0) != 0)
    {
        return Err(CnfError::ValueTooWide {
            index,
            value: table[index],
            output_bits,
        });
    }
    Ok(())
}

/// An S-box together with its compiled CNF template.
#[derive(Debug, Clone)]
pub struct Sbox {
    input_bits: usize,
    output_bits: usize,
    table: Vec<u32>,
    template: SboxTemplate,
}

impl Sbox {
    /// Compiles the lookup table `table` of `2^input_bits` entries, each below
    /// `2^output_bits`, with the default [`GreedyMerge`](crate::simplify::GreedyMerge) strategy.
    pub fn new(input_bits: usize, output_bits: usize, table: impl Into<Vec<u32>>) -> Result<Self> {
        Self::with_simplifier(input_bits, output_bits, table, &DefaultSimplifier::default())
    }

    /// Compiles the lookup table with a custom simplification strategy.
    pub fn with_simplifier(
        input_bits: usize,
        output_bits: usize,
        table: impl Into<Vec<u32>>,
        simplifier: &dyn Simplify,
    ) -> Result<Self> {
        let table = table.into();
        let template = SboxTemplate::naive(input_bits, output_bits, &table)?.simplified(simplifier);
        template.check_shape(input_bits, output_bits)?;
        debug!(
            "compiled {}x{} S-box: {} rows, {} literals",
            input_bits,
            output_bits,
            template.len(),
            template.literal_count()
        );

        Ok(Self {
            input_bits,
            output_bits,
            table,
            template,
        })
    }

    pub fn input_bits(&self) -> usize {
        self.input_bits
    }

    pub fn output_bits(&self) -> usize {
        self.output_bits
    }

    pub fn table(&self) -> &[u32] {
        &self.table
    }

    pub fn template(&self) -> &SboxTemplate {
        &self.template
    }

    /// Image of `x`, if `x` is in the input space.
    pub fn lookup(&self, x: u32) -> Option<u32> {
        self.table.get(x as usize).copied()
    }

    /// Appends to `formula` the clauses stating that `outputs` is the image of
    /// `inputs` by this S-box. Both vectors are most significant bit first.
    pub fn add_clauses_image(&self, formula: &mut Formula, inputs: &[Lit], outputs: &[Lit]) -> Result<()> {
        if inputs.len() != self.input_bits {
            return Err(CnfError::ArityMismatch {
                side: "input",
                expected: self.input_bits,
                actual: inputs.len(),
            });
        }
        if outputs.len() != self.output_bits {
            return Err(CnfError::ArityMismatch {
                side: "output",
                expected: self.output_bits,
                actual: outputs.len(),
            });
        }
        formula.append_clauses(self.template.rows.iter().map(|row| row.instantiate(inputs, outputs)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::simplify::{GreedyMerge, Naive};
    use crate::variables::VariableAllocator;

    const PRESENT: [u32; 16] = [0xC, 0x5, 0x6, 0xB, 0x9, 0x0, 0xA, 0xD, 0x3, 0xE, 0xF, 0x8, 0x4, 0x7, 0x1, 0x2];

    fn row(pattern: &[i8], output: i32) -> TemplateRow {
        TemplateRow::new(pattern.to_vec(), output)
    }

    fn lit(code: i32) -> Lit {
        Lit::from_dimacs(code)
    }

    /// The template accepts exactly the pairs `(x, table[x])`.
    fn assert_exact(template: &SboxTemplate, n: usize, m: usize, table: &[u32]) {
        for x in 0..(1u32 << n) {
            for y in 0..(1u32 << m) {
                let expected = table[x as usize] == y;
                assert_eq!(template.eval(x, y, m), expected, "x = {}, y = {}", x, y);
            }
        }
    }

    #[test]
    fn test_naive_template() {
        let template = SboxTemplate::naive(2, 2, &[1, 2, 0, 3]).unwrap();
        assert_eq!(template.len(), 2 * 4);
        assert!(template.rows().iter().all(|r| r.pattern().iter().all(|&p| p != 0)));

        // x = 0b01 -> 0b10
        assert_eq!(template.rows()[2], row(&[1, -1], 1));
        assert_eq!(template.rows()[3], row(&[1, -1], -2));
        // x = 0b11 -> 0b11
        assert_eq!(template.rows()[6], row(&[-1, -1], 1));
        assert_eq!(template.rows()[7], row(&[-1, -1], 2));

        assert_exact(&template, 2, 2, &[1, 2, 0, 3]);
    }

    #[test]
    fn test_simplified_is_equivalent() {
        for (n, m, table) in [
            (2, 2, vec![1, 2, 0, 3]),
            (1, 1, vec![0, 1]),
            (1, 1, vec![1, 1]),
            (3, 2, vec![0, 1, 1, 0, 3, 3, 2, 0]),
            (4, 4, PRESENT.to_vec()),
            (4, 4, vec![0x5, 0xb, 0x6, 0xe, 0x8, 0x2, 0x7, 0xa, 0x3, 0x4, 0x0, 0xc, 0x1, 0x9, 0xf, 0xd]),
        ] {
            let sbox = Sbox::new(n, m, table.clone()).unwrap();
            let template = sbox.template();
            assert_exact(template, n, m, &table);

            // Fixed point, and no row grew.
            let (_, merges) = GreedyMerge::pass(template.rows().to_vec());
            assert_eq!(merges, 0);
            assert!(template.rows().iter().all(|r| r.literal_count() <= n + 1));
            assert!(template.len() <= m << n);
        }
    }

    #[test]
    fn test_constant_output_collapses() {
        let sbox = Sbox::new(1, 1, [1, 1]).unwrap();
        assert_eq!(sbox.template().rows(), &[row(&[0], 1)]);
    }

    #[test]
    fn test_identity_does_not_merge() {
        let sbox = Sbox::new(1, 1, [0, 1]).unwrap();
        assert_eq!(sbox.template().rows(), &[row(&[1], -1), row(&[-1], 1)]);
    }

    #[test]
    fn test_naive_strategy() {
        let sbox = Sbox::with_simplifier(4, 4, PRESENT, &Naive).unwrap();
        assert_eq!(sbox.template().len(), 64);
        assert_eq!(sbox.template().literal_count(), 64 * 5);
        let reduced = Sbox::new(4, 4, PRESENT).unwrap();
        assert!(reduced.template().literal_count() < sbox.template().literal_count());
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            Sbox::new(2, 2, [0, 1, 2]),
            Err(CnfError::SizeMismatch { input_bits: 2, actual: 3 })
        ));
        assert!(matches!(
            Sbox::new(2, 2, [0, 1, 2, 4]),
            Err(CnfError::ValueTooWide { index: 3, value: 4, .. })
        ));
        assert!(matches!(Sbox::new(40, 2, [0]), Err(CnfError::SizeMismatch { .. })));
    }

    /// Returns fixed rows whatever it is given.
    struct Replace(Vec<TemplateRow>);

    impl Simplify for Replace {
        fn simplify(&self, _rows: Vec<TemplateRow>) -> Vec<TemplateRow> {
            self.0.clone()
        }
    }

    #[test]
    fn test_strategy_rows_are_checked() {
        let table = [1, 2, 0, 3];
        assert!(matches!(
            Sbox::with_simplifier(2, 2, table, &Replace(vec![row(&[1, 1], 1), row(&[1, 1], 5)])),
            Err(CnfError::InvalidTemplateRow { index: 1, output: 5, .. })
        ));
        assert!(matches!(
            Sbox::with_simplifier(2, 2, table, &Replace(vec![row(&[1], -2)])),
            Err(CnfError::InvalidTemplateRow { index: 0, pattern_len: 1, .. })
        ));
        assert!(matches!(
            Sbox::with_simplifier(2, 2, table, &Replace(vec![row(&[1, 0, -1], 2)])),
            Err(CnfError::InvalidTemplateRow { index: 0, pattern_len: 3, .. })
        ));

        // Well-shaped rows are accepted as given, and instantiate without panicking.
        let sbox = Sbox::with_simplifier(2, 2, table, &Replace(vec![row(&[0, 1], -2)])).unwrap();
        let vars = VariableAllocator::new();
        let mut f = Formula::new(&vars);
        sbox.add_clauses_image(&mut f, &[lit(1), lit(2)], &[lit(3), lit(4)]).unwrap();
        assert_eq!(f.clauses(), &[Clause::from_dimacs([2, -4])]);
    }

    #[test]
    fn test_zero_input_bits() {
        let sbox = Sbox::new(0, 2, [0b10]).unwrap();
        assert_eq!(sbox.template().rows(), &[row(&[], 1), row(&[], -2)]);
    }

    #[test]
    fn test_instantiation() {
        let vars = VariableAllocator::new();
        let mut f = Formula::new(&vars);
        let sbox = Sbox::new(1, 1, [0, 1]).unwrap();
        sbox.add_clauses_image(&mut f, &[lit(4)], &[lit(7)]).unwrap();
        assert_eq!(f.clauses(), &[Clause::from_dimacs([4, -7]), Clause::from_dimacs([-4, 7])]);

        // Negated bindings compose with the row signs.
        let mut g = Formula::new(&vars);
        sbox.add_clauses_image(&mut g, &[lit(-4)], &[lit(-7)]).unwrap();
        assert_eq!(g.clauses(), &[Clause::from_dimacs([-4, 7]), Clause::from_dimacs([4, -7])]);
    }

    #[test]
    fn test_instantiation_skips_dont_cares() {
        let vars = VariableAllocator::new();
        let mut f = Formula::new(&vars);
        let sbox = Sbox::new(2, 1, [1, 1, 0, 1]).unwrap();
        sbox.add_clauses_image(&mut f, &[lit(1), lit(2)], &[lit(3)]).unwrap();
        for (clause, row) in f.clauses().iter().zip(sbox.template().rows()) {
            assert_eq!(clause.len(), row.literal_count());
        }
        assert!(f.clauses().iter().any(|c| c.len() < 3));
    }

    #[test]
    fn test_arity_mismatch() {
        let vars = VariableAllocator::new();
        let mut f = Formula::new(&vars);
        let sbox = Sbox::new(2, 2, [1, 2, 0, 3]).unwrap();
        assert!(matches!(
            sbox.add_clauses_image(&mut f, &[lit(1)], &[lit(3), lit(4)]),
            Err(CnfError::ArityMismatch { side: "input", expected: 2, actual: 1 })
        ));
        assert!(matches!(
            sbox.add_clauses_image(&mut f, &[lit(1), lit(2)], &[lit(3)]),
            Err(CnfError::ArityMismatch { side: "output", expected: 2, actual: 1 })
        ));
        assert!(f.is_empty());
    }

    #[test]
    fn test_row_display() {
        assert_eq!(row(&[1, -1, 0], -2).to_string(), "[+-0 | -2]");
        assert_eq!(row(&[], 1).to_string(), "[ | +1]");
    }

    #[test]
    fn test_lookup() {
        let sbox = Sbox::new(2, 2, [1, 2, 0, 3]).unwrap();
        assert_eq!(sbox.lookup(1), Some(2));
        assert_eq!(sbox.lookup(4), None);
        assert_eq!(sbox.table(), &[1, 2, 0, 3]);
        assert_eq!((sbox.input_bits(), sbox.output_bits()), (2, 2));
    }
}
