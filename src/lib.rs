//! # cnf-rs: CNF encodings for cryptanalysis
//!
//! **`cnf-rs`** builds CNF formulas in DIMACS format for SAT-based
//! cryptanalysis, with a focus on compiling **S-boxes** (small lookup tables)
//! into compact clause templates.
//!
//! ## Key Features
//!
//! - **Named variable families**: Multidimensional arrays of boolean variables (`x[i][j]`) mapped to contiguous, 1-based DIMACS codes by the [`VariableAllocator`][crate::variables::VariableAllocator].
//! - **Equalities without clauses**: `x == y` and `x == !y` are recorded in the allocator and substituted at serialization time, so they cost neither variables nor clauses.
//! - **S-box compilation**: A lookup table is turned once into a [`SboxTemplate`][crate::sbox::SboxTemplate], reduced by merging rows, and instantiated on any input/output literals.
//! - **Solver-agnostic**: The formula is rendered as DIMACS text; any solver answering in the `SAT` / model format can be plugged in through [`Solver`][crate::solver::Solver].
//!
//! ## Basic Usage
//!
//! ```rust
//! use cnf_rs::formula::Formula;
//! use cnf_rs::sbox::Sbox;
//! use cnf_rs::variables::VariableAllocator;
//!
//! // 1. Declare the variables
//! let vars = VariableAllocator::new();
//! vars.declare_family("x", &[2]).unwrap();
//! vars.declare_family("y", &[2]).unwrap();
//! let x = [vars.code_of("x", &[0]).unwrap(), vars.code_of("x", &[1]).unwrap()];
//! let y = [vars.code_of("y", &[0]).unwrap(), vars.code_of("y", &[1]).unwrap()];
//!
//! // 2. Compile the S-box and bind it: y = S(x)
//! let sbox = Sbox::new(2, 2, [1, 2, 0, 3]).unwrap();
//! let mut f = Formula::new(&vars);
//! sbox.add_clauses_image(&mut f, &x, &y).unwrap();
//!
//! // 3. Fix the input, and serialize
//! f.assign_integer(&x, 1);
//! let cnf = f.to_dimacs(vars.num_vars(), true).unwrap();
//! assert!(cnf.starts_with("p cnf 4 "));
//! ```
//!
//! ## Core Components
//!
//! - **[`variables`]**: Variable families, equalities and decoding of solver models.
//! - **[`formula`]**: Clause list with the usual constraint helpers and DIMACS output.
//! - **[`sbox`]**: S-box templates and their instantiation.
//! - **[`simplify`]**: Row reduction strategies for templates.
//! - **[`solver`]**: The bridge to an external SAT solver.

pub mod clause;
pub mod dimacs;
pub mod error;
pub mod formula;
pub mod sbox;
pub mod simplify;
pub mod solver;
pub mod types;
pub mod variables;
