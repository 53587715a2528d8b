//! CLI tool for xlstream
//!
//! Usage:
//!   xlstream_cli dump <input.xlsx> [--row-limit N] [-o out.json]
//!   xlstream_cli stream <input.csv> <output.xlsx> [--sheet NAME]

#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use xlstream::csv::{read_records, stream_records, Delimiter};
use xlstream::{open_file, RowLimit};

const USAGE: &str = "Usage:
  xlstream_cli dump <input.xlsx> [--row-limit N] [-o output.json]
  xlstream_cli stream <input.csv> <output.xlsx> [--sheet NAME]";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("dump") => dump(&args[1..]),
        Some("stream") => stream(&args[1..]),
        _ => Err(USAGE.to_string()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

/// Value following `flag`, if the flag is present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>, String> {
    match args.iter().position(|a| a == flag) {
        Some(idx) => args
            .get(idx + 1)
            .map(|v| Some(v.as_str()))
            .ok_or_else(|| format!("{flag} needs a value")),
        None => Ok(None),
    }
}

fn dump(args: &[String]) -> Result<(), String> {
    let input = args.first().ok_or(USAGE)?;
    let row_limit = match flag_value(args, "--row-limit")? {
        Some(n) => {
            let rows: usize = n.parse().map_err(|_| format!("invalid row limit '{n}'"))?;
            RowLimit::from_count(Some(rows))
        }
        None => RowLimit::Unlimited,
    };

    let document =
        open_file(input, row_limit).map_err(|e| format!("Error reading {input}: {e}"))?;
    let grid = document
        .to_slice()
        .map_err(|e| format!("Error formatting {input}: {e}"))?;
    let sheets: Vec<serde_json::Value> = document
        .sheets
        .iter()
        .zip(grid)
        .map(|(sheet, rows)| serde_json::json!({ "name": sheet.name, "rows": rows }))
        .collect();
    let json = serde_json::to_string_pretty(&sheets)
        .map_err(|e| format!("Error serializing JSON: {e}"))?;

    match flag_value(args, "-o")? {
        Some(path) => {
            fs::write(path, &json).map_err(|e| format!("Error writing {path}: {e}"))?;
            eprintln!("Written: {path}");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").map_err(|e| format!("Error writing output: {e}"))?;
        }
    }
    Ok(())
}

fn stream(args: &[String]) -> Result<(), String> {
    let (Some(input), Some(output)) = (args.first(), args.get(1)) else {
        return Err(USAGE.to_string());
    };
    let sheet_name = flag_value(args, "--sheet")?.unwrap_or("Sheet1");

    let data = fs::read(input).map_err(|e| format!("Error reading {input}: {e}"))?;
    let records = read_records(&data, Delimiter::from_path(Path::new(input)));
    let file = fs::File::create(output).map_err(|e| format!("Error creating {output}: {e}"))?;
    let mut writer = stream_records(&records, sheet_name, io::BufWriter::new(file))
        .map_err(|e| format!("Error writing {output}: {e}"))?;
    writer
        .flush()
        .map_err(|e| format!("Error writing {output}: {e}"))?;
    eprintln!("Written: {output} ({} rows)", records.len());
    Ok(())
}
