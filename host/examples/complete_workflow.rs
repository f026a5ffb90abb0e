//! Parses a file, prints its container tree, and reports any SNIP
//! syntax-level violations found alongside it.
//!
//! Run with:
//! cargo run --example complete_workflow -- path/to/file.x12

use std::env;
use std::path::PathBuf;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <file.x12>", args[0]);
        process::exit(1);
    }

    let path = PathBuf::from(&args[1]);

    println!("Parsing X12 file: {}", path.display());
    println!();

    let start = std::time::Instant::now();

    let document = match x12_host::parse_file(&path, false) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let duration = start.elapsed();

    println!("=== Container Tree ===\n");
    print!("{}", x12_host::describe_document(&document));

    println!("\n=== SNIP Validation ===\n");
    match x12_host::validate_file(&path) {
        Ok(errors) if errors.is_empty() => println!("no syntax-level violations found"),
        Ok(errors) => {
            for error in &errors {
                println!("  {error}");
            }
        }
        Err(e) => eprintln!("validation error: {e}"),
    }

    println!("\nParsed in {:.4}s", duration.as_secs_f64());
}
