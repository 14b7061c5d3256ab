//! End-to-end tests: S-box templates, DIMACS output and model decoding.

mod common;

use cnf_rs::dimacs::parse_cnf;
use cnf_rs::formula::Formula;
use cnf_rs::sbox::Sbox;
use cnf_rs::simplify::Naive;
use cnf_rs::solver::solve;
use cnf_rs::types::Lit;
use cnf_rs::variables::VariableAllocator;

use common::{all_models, BruteForce};

const SBOX4: [u32; 16] = [0x5, 0xb, 0x6, 0xe, 0x8, 0x2, 0x7, 0xa, 0x3, 0x4, 0x0, 0xc, 0x1, 0x9, 0xf, 0xd];

fn bits(vars: &VariableAllocator, name: &str, n: usize) -> Vec<Lit> {
    vars.declare_family(name, &[n]).unwrap();
    (0..n).map(|i| vars.code_of(name, &[i]).unwrap()).collect()
}

/// For every input, the formula `y = S(x) & x = input` has exactly one model,
/// whose `y` is the table entry.
fn check_image(sbox: &Sbox) {
    let (n, m) = (sbox.input_bits(), sbox.output_bits());
    for input in 0..(1u32 << n) {
        let vars = VariableAllocator::new();
        let x = bits(&vars, "x", n);
        let y = bits(&vars, "y", m);

        let mut f = Formula::new(&vars);
        sbox.add_clauses_image(&mut f, &x, &y).unwrap();
        f.assign_integer(&x, input);

        let cnf = parse_cnf(&f.to_dimacs(vars.num_vars(), true).unwrap()).unwrap();
        assert_eq!(cnf.num_vars, Some(n + m));
        let models = all_models(&cnf.clauses, n + m);
        assert_eq!(models.len(), 1, "input {}", input);

        let codes = common::to_codes(&models[0]);
        vars.decode_assignment(&codes).unwrap();
        assert_eq!(vars.pack_little_endian(&x).unwrap(), input);
        assert_eq!(vars.pack_little_endian(&y).unwrap(), sbox.table()[input as usize], "input {}", input);
    }
}

#[test]
fn small_sbox_image() {
    check_image(&Sbox::new(2, 2, [1, 2, 0, 3]).unwrap());
}

#[test]
fn four_bit_sbox_image() {
    check_image(&Sbox::new(4, 4, SBOX4).unwrap());
    check_image(&Sbox::with_simplifier(4, 4, SBOX4, &Naive).unwrap());
}

#[test]
fn non_square_sbox_image() {
    check_image(&Sbox::new(3, 2, [0, 1, 1, 0, 3, 3, 2, 0]).unwrap());
    check_image(&Sbox::new(2, 3, [7, 0, 5, 5]).unwrap());
}

#[test]
fn preimage_through_solver() {
    let sbox = Sbox::new(4, 4, SBOX4).unwrap();
    let vars = VariableAllocator::new();
    let x = bits(&vars, "x", 4);
    let y = bits(&vars, "y", 4);

    let mut f = Formula::new(&vars);
    sbox.add_clauses_image(&mut f, &x, &y).unwrap();
    f.assign_integer(&y, 0xc);

    let mut solver = BruteForce::default();
    assert!(solve(&f, &mut solver, false).unwrap());
    assert_eq!(solver.calls, 1);
    assert_eq!(vars.pack_little_endian(&x).unwrap(), 11);
}

#[test]
fn conflicting_output_is_unsat() {
    let sbox = Sbox::new(2, 2, [1, 2, 0, 3]).unwrap();
    let vars = VariableAllocator::new();
    let x = bits(&vars, "x", 2);
    let y = bits(&vars, "y", 2);

    let mut f = Formula::new(&vars);
    sbox.add_clauses_image(&mut f, &x, &y).unwrap();
    f.assign_integer(&x, 2);
    f.assign_integer(&y, 1);

    assert!(!solve(&f, &mut BruteForce::default(), true).unwrap());
    assert!(!vars.is_assigned());
}

#[test]
fn chained_sboxes_with_round_key() {
    // z = S(S(x) ^ k), with the key addition expressed as equalities.
    const KEY: u32 = 0b0110;
    let sbox = Sbox::new(4, 4, SBOX4).unwrap();
    let vars = VariableAllocator::new();
    let x = bits(&vars, "x", 4);
    let y = bits(&vars, "y", 4);
    let k = bits(&vars, "yk", 4);
    let z = bits(&vars, "z", 4);

    let mut f = Formula::new(&vars);
    sbox.add_clauses_image(&mut f, &x, &y).unwrap();
    f.assert_xor_with_constant(&k, &y, KEY).unwrap();
    sbox.add_clauses_image(&mut f, &k, &z).unwrap();
    f.assign_integer(&x, 9);
    assert_eq!(vars.num_equalities(), 4);

    assert!(solve(&f, &mut BruteForce::default(), true).unwrap());
    let after_key = SBOX4[9] ^ KEY;
    assert_eq!(vars.pack_little_endian(&y).unwrap(), SBOX4[9]);
    assert_eq!(vars.pack_little_endian(&k).unwrap(), after_key);
    assert_eq!(vars.pack_little_endian(&z).unwrap(), SBOX4[after_key as usize]);
}

#[test]
fn template_is_reused_across_instances() {
    let sbox = Sbox::new(2, 2, [1, 2, 0, 3]).unwrap();
    let vars = VariableAllocator::new();
    let a = bits(&vars, "a", 2);
    let b = bits(&vars, "b", 2);
    let c = bits(&vars, "c", 2);

    let mut f = Formula::new(&vars);
    sbox.add_clauses_image(&mut f, &a, &b).unwrap();
    sbox.add_clauses_image(&mut f, &b, &c).unwrap();
    assert_eq!(f.len(), 2 * sbox.template().len());

    f.assign_integer(&a, 0);
    assert!(solve(&f, &mut BruteForce::default(), false).unwrap());
    assert_eq!(vars.pack_little_endian(&b).unwrap(), 1);
    assert_eq!(vars.pack_little_endian(&c).unwrap(), 2);
}
