use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;

use cnf_rs::formula::Formula;
use cnf_rs::sbox::Sbox;
use cnf_rs::simplify::{GreedyMerge, Naive, Simplify};
use cnf_rs::variables::VariableAllocator;

const DEFAULT_TABLE: [u32; 16] = [0x5, 0xb, 0x6, 0xe, 0x8, 0x2, 0x7, 0xa, 0x3, 0x4, 0x0, 0xc, 0x1, 0x9, 0xf, 0xd];

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Lookup table entries (hexadecimal), `2^n` of them.
    #[arg(value_name = "HEX", value_parser = parse_hex)]
    table: Vec<u32>,

    /// Number of output bits.
    #[arg(short, long, value_name = "INT", default_value = "4")]
    output_bits: usize,

    /// Fix the input to this value.
    #[arg(long, value_name = "INT")]
    input: Option<u32>,

    /// Keep the unsimplified template.
    #[arg(long)]
    naive: bool,

    /// Emit the `p cnf` problem line.
    #[arg(long)]
    header: bool,

    /// Output file for the DIMACS CNF (stdout if not given).
    #[arg(short = 'f', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print every template row.
    #[arg(long)]
    rows: bool,
}

fn parse_hex(s: &str) -> Result<u32, std::num::ParseIntError> {
    u32::from_str_radix(s.trim_start_matches("0x"), 16)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    eprintln!("args = {:?}", args);

    let table = if args.table.is_empty() {
        DEFAULT_TABLE.to_vec()
    } else {
        args.table.clone()
    };
    let input_bits = table.len().trailing_zeros() as usize;

    let time_compile = std::time::Instant::now();
    let simplifier: &dyn Simplify = if args.naive { &Naive } else { &GreedyMerge };
    let sbox = Sbox::with_simplifier(input_bits, args.output_bits, table, simplifier)?;
    eprintln!(
        "Compiled {}x{} S-box in {:.3} s: {} rows, {} literals",
        sbox.input_bits(),
        sbox.output_bits(),
        time_compile.elapsed().as_secs_f64(),
        sbox.template().len(),
        sbox.template().literal_count()
    );
    if args.rows {
        for row in sbox.template().rows() {
            eprintln!("  {}", row);
        }
    }

    let vars = VariableAllocator::new();
    vars.declare_family("x", &[sbox.input_bits()])?;
    vars.declare_family("y", &[sbox.output_bits()])?;
    let x = (0..sbox.input_bits())
        .map(|i| vars.code_of("x", &[i]))
        .collect::<Result<Vec<_>, _>>()?;
    let y = (0..sbox.output_bits())
        .map(|i| vars.code_of("y", &[i]))
        .collect::<Result<Vec<_>, _>>()?;
    eprintln!("vars = {}", vars);

    let mut f = Formula::new(&vars);
    sbox.add_clauses_image(&mut f, &x, &y)?;
    if let Some(input) = args.input {
        f.assign_integer(&x, input);
        if let Some(image) = sbox.lookup(input) {
            eprintln!("S({:#x}) = {:#x}", input, image);
        }
    }

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            f.write_dimacs(&mut writer, vars.num_vars(), args.header)?;
            eprintln!("Wrote {} clauses to {}", f.len(), path.display());
        }
        None => {
            f.write_dimacs(&mut std::io::stdout().lock(), vars.num_vars(), args.header)?;
        }
    }

    Ok(())
}
