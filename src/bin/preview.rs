#![cfg(not(tarpaulin_include))]

use clap::Parser;
use container_entry::Session;
use std::path::PathBuf;

/// Print the rows around the next insertion point of one sheet.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Sheet to preview (defaults to the first visible sheet)
    sheet: Option<String>,

    #[arg(short, long, default_value = "containers.xlsx")]
    workbook: PathBuf,

    #[arg(short, long, default_value = "settings.json")]
    settings: PathBuf,

    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(..=50))]
    preview_range: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut session = Session::open(&args.workbook, &args.settings, args.preview_range)?;
    if let Some(sheet) = &args.sheet {
        session.select_sheet(sheet)?;
    }
    println!("{}", session.refresh_preview());
    Ok(())
}
