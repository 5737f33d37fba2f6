#![cfg(not(tarpaulin_include))]

use clap::Parser;
use container_entry::Session;
use container_entry::command::{Command, HELP};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

/// Key in container records and append them to a shared workbook.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Workbook the records are appended to
    #[arg(short, long, default_value = "containers.xlsx")]
    workbook: PathBuf,

    /// JSON file holding the start row/column of every sheet
    #[arg(short, long, default_value = "settings.json")]
    settings: PathBuf,

    /// Rows shown above and below the next insertion row
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(..=50))]
    preview_range: u32,

    /// Sheet selected at start-up
    #[arg(long)]
    sheet: Option<String>,
}

fn show_form(session: &mut Session) {
    let form = session.form();
    println!();
    println!(
        "Sheet: {}   (available: {})",
        form.selected_sheet().unwrap_or("-"),
        form.sheets().join(", ")
    );
    for field in container_entry::Field::ALL {
        println!(
            "  {:>2}. {:<18} {}",
            field.number(),
            field.label(),
            form.record().value(field)
        );
    }
    println!();
    println!("{}", session.refresh_preview());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut session = Session::open(&args.workbook, &args.settings, args.preview_range)?;
    if let Some(sheet) = &args.sheet {
        session.select_sheet(sheet)?;
    }

    let mut start_time = Instant::now();
    let mut status = String::from("ok");
    let mut show = true;
    loop {
        if show {
            show_form(&mut session);
        }

        let elapsed_time = start_time.elapsed().as_secs_f64();
        print!("[{:.1}] ({}) > ", elapsed_time, status);
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        start_time = Instant::now();

        let outcome = match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => {
                println!("{}", HELP);
                continue;
            }
            Command::Show | Command::Refresh => Ok("ok".to_string()),
            Command::Settings => {
                for (sheet, row, col) in session.positions() {
                    println!("  {:<24} row {:<6} column {}", sheet, row, col);
                }
                Ok("ok".to_string())
            }
            Command::SelectSheet(name) => session.select_sheet(&name).map(|_| "ok".to_string()),
            Command::SetField(field, value) => {
                session.set_field(field, &value).map(|_| "ok".to_string())
            }
            Command::Save => session.save_entry(),
            Command::Undo => session.undo_last_entry(),
            Command::DeletePrevious => session.delete_previous_row(),
            Command::Reload => session.reload(),
            Command::Position { sheet, row, col } => session.set_position(&sheet, row, &col),
            Command::DisableOutput => {
                show = false;
                Ok("ok".to_string())
            }
            Command::EnableOutput => {
                show = true;
                Ok("ok".to_string())
            }
            Command::Invalid(reason) => Ok(reason),
        };

        status = match outcome {
            Ok(message) => message,
            Err(e) => {
                log::warn!("{}", e);
                format!("error: {}", e)
            }
        };
    }

    Ok(())
}
