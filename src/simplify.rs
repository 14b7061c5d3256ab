//! Reduction strategies for S-box CNF templates.
//!
//! A strategy takes the rows of a template and returns an equivalent, possibly
//! smaller, set of rows. Two strategies are provided:
//!
//! | Strategy        | Result                                                       |
//! |-----------------|--------------------------------------------------------------|
//! | [`GreedyMerge`] | Fixed point of pairwise merges (default)                      |
//! | [`Naive`]       | Rows unchanged: one row per input value and output bit        |
//!
//! # Greedy merge
//!
//! Two rows with the same output literal whose patterns differ in exactly one
//! position are replaced by a single row where that position is a don't-care.
//! This is resolution on the differing input literal, so the row set stays
//! logically equivalent and no row ever gains a literal.
//!
//! A *pass* scans every row `i` against every later row `j` that has not been
//! merged yet in this pass; row `i` keeps scanning after a successful merge, so
//! it may produce several merged rows. Merged rows come first in the output,
//! followed by the untouched rows in their original order. Passes repeat until
//! one performs no merge.
//!
//! The result depends on the merge order and is not a minimum cover; a
//! consensus-based minimizer can be plugged in through [`Simplify`] instead.

use log::{debug, trace};

use crate::sbox::TemplateRow;

/// Reduces a row set to an equivalent, possibly smaller, row set.
pub trait Simplify {
    fn simplify(&self, rows: Vec<TemplateRow>) -> Vec<TemplateRow>;
}

/// Default strategy.
pub type DefaultSimplifier = GreedyMerge;

/// Iterated pairwise merging of rows that differ in a single position.
#[derive(Debug, Default, Copy, Clone)]
pub struct GreedyMerge;

impl GreedyMerge {
    /// Performs one pass over `rows`, returning the new rows and the number of
    /// merges performed.
    pub fn pass(rows: Vec<TemplateRow>) -> (Vec<TemplateRow>, usize) {
        let mut result = Vec::with_capacity(rows.len());
        let mut treated = vec![false; rows.len()];
        let mut merges = 0;

        for i in 0..rows.len() {
            if treated[i] {
                continue;
            }
            for j in (i + 1)..rows.len() {
                if treated[j] {
                    continue;
                }
                if let Some(pos) = rows[i].merge_position(&rows[j]) {
                    let merged = rows[i].with_dont_care(pos);
                    trace!("merge {} + {} at {} -> {}", rows[i], rows[j], pos, merged);
                    result.push(merged);
                    treated[i] = true;
                    treated[j] = true;
                    merges += 1;
                }
            }
        }

        result.extend(rows.into_iter().zip(treated).filter(|(_, t)| !t).map(|(row, _)| row));
        (result, merges)
    }
}

impl Simplify for GreedyMerge {
    fn simplify(&self, rows: Vec<TemplateRow>) -> Vec<TemplateRow> {
        let mut rows = rows;
        for round in 1.. {
            let before = rows.len();
            let (next, merges) = Self::pass(rows);
            rows = next;
            debug!("greedy merge pass {}: {} merge(s), {} -> {} row(s)", round, merges, before, rows.len());
            if merges == 0 {
                break;
            }
        }
        rows
    }
}

/// Keeps the rows as they are.
#[derive(Debug, Default, Copy, Clone)]
pub struct Naive;

impl Simplify for Naive {
    fn simplify(&self, rows: Vec<TemplateRow>) -> Vec<TemplateRow> {
        rows
    }
}
