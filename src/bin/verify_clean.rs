use anyhow::{Context, Result};
use parquet::file::reader::{FileReader, SerializedFileReader};
use retail_clean::{config::Config, verify};
use std::{env, fs::File, path::PathBuf, process::exit};

fn main() -> Result<()> {
    // Optional single argument: the Parquet file. Defaults to the configured output.
    let args: Vec<String> = env::args().collect();
    let path = match args.len() {
        1 => Config::from_env()?.clean_path,
        2 => PathBuf::from(&args[1]),
        _ => {
            eprintln!("Usage: {} [PARQUET_FILE]", args[0]);
            exit(2);
        }
    };

    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let reader = SerializedFileReader::new(file)
        .with_context(|| format!("reading parquet footer of {}", path.display()))?;
    let meta = reader.metadata();

    println!("=== Parquet File: {} ===", path.display());
    println!("Total rows:           {}", meta.file_metadata().num_rows());
    println!("Number of row groups: {}", meta.num_row_groups());
    println!();
    println!("=== Columns ===");
    for col in meta.file_metadata().schema_descr().columns() {
        let logical = col
            .logical_type()
            .as_ref()
            .map_or("<none>".to_string(), |lt| format!("{:?}", lt));
        println!(
            "- {:<14} | Physical: {:<10} | Logical: {}",
            col.name(),
            format!("{:?}", col.physical_type()),
            logical
        );
    }
    println!();

    let (rows, violations) = verify::verify_file(&path)?;
    if violations.is_empty() {
        println!("OK: {} rows satisfy all invariants", rows);
        return Ok(());
    }

    for v in violations.iter().take(50) {
        println!("VIOLATION {}", v);
    }
    if violations.len() > 50 {
        println!("... {} more", violations.len() - 50);
    }
    eprintln!("{} violations in {} rows", violations.len(), rows);
    exit(1);
}
