//! `x12-parse`: parse, validate, and unbundle ANSI X12 interchanges from
//! the command line.
//!
//! # Examples
//!
//! ```text
//! x12-parse parse claim.837
//! x12-parse validate claim.837
//! x12-parse unbundle-by-transaction claim.837 --out-dir out/
//! x12-parse unbundle-by-loop claim.837 2300 --out-dir out/
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "x12-parse", about = "Parse, validate, and unbundle ANSI X12 interchanges")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a file and print the reconstructed container tree.
    Parse {
        path: PathBuf,
        /// Force-attach unplaceable segments and downgrade HL errors to
        /// warnings instead of failing the parse.
        #[arg(long)]
        lenient: bool,
    },
    /// Run SNIP1/SNIP7 syntax-level validation over a file.
    Validate { path: PathBuf },
    /// Split every transaction in a file into its own interchange file.
    UnbundleByTransaction {
        path: PathBuf,
        #[arg(long, default_value = "unbundled")]
        out_dir: PathBuf,
        #[arg(long)]
        lenient: bool,
    },
    /// Split every occurrence of a loop id into its own interchange file.
    UnbundleByLoop {
        path: PathBuf,
        loop_id: String,
        #[arg(long, default_value = "unbundled")]
        out_dir: PathBuf,
        #[arg(long)]
        lenient: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Parse { path, lenient } => {
            let document = x12_host::parse_file(&path, lenient)?;
            print!("{}", x12_host::describe_document(&document));
        }
        Command::Validate { path } => {
            let errors = x12_host::validate_file(&path)?;
            if errors.is_empty() {
                println!("no syntax-level violations found");
            } else {
                for error in &errors {
                    println!("{error}");
                }
                return Err(format!("{} syntax-level violation(s) found", errors.len()).into());
            }
        }
        Command::UnbundleByTransaction {
            path,
            out_dir,
            lenient,
        } => {
            std::fs::create_dir_all(&out_dir)?;
            let count = x12_host::unbundle_by_transaction_to_dir(&path, &out_dir, lenient)?;
            println!("wrote {count} transaction(s) to {}", out_dir.display());
        }
        Command::UnbundleByLoop {
            path,
            loop_id,
            out_dir,
            lenient,
        } => {
            std::fs::create_dir_all(&out_dir)?;
            let count =
                x12_host::unbundle_by_loop_to_dir(&path, &loop_id, &out_dir, lenient)?;
            println!("wrote {count} occurrence(s) of loop {loop_id} to {}", out_dir.display());
        }
    }

    Ok(())
}
