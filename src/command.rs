use crate::record::Field;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ASSIGN_REGEX: Regex = Regex::new(r"^([^=\s]+)\s*=(.*)$").unwrap();
    static ref SHEET_REGEX: Regex = Regex::new(r"^sheet\s+(.+)$").unwrap();
    static ref POSITION_REGEX: Regex =
        Regex::new(r"^position\s+(.+?)\s+([0-9]+)\s+([A-Za-z]+)$").unwrap();
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Help,
    Quit,
    Show,
    SelectSheet(String),
    SetField(Field, String),
    Save,
    Undo,
    DeletePrevious,
    Refresh,
    Reload,
    Settings,
    Position { sheet: String, row: u32, col: String },
    DisableOutput,
    EnableOutput,
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  <field>=<value>              Set a field by number (1-11) or name
  sheet <name>                 Select the target sheet
  save                         Write the form as a new row
  undo                         Take back the last saved row
  delete_prev                  Clear the row above the start row
  refresh                      Redraw the preview
  reload                       Re-read the workbook from disk
  settings                     Show start row/column per sheet
  position <sheet> <row> <col> Set where entries start on a sheet
  show                         Show the form
  disable_output               Stop redrawing after each command
  enable_output                Redraw after each command
  q                            Quit";

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        match line {
            "" => return Command::Invalid("empty command".to_string()),
            "help" => return Command::Help,
            "q" | "quit" => return Command::Quit,
            "show" => return Command::Show,
            "save" => return Command::Save,
            "undo" => return Command::Undo,
            "delete_prev" => return Command::DeletePrevious,
            "refresh" => return Command::Refresh,
            "reload" => return Command::Reload,
            "settings" => return Command::Settings,
            "disable_output" => return Command::DisableOutput,
            "enable_output" => return Command::EnableOutput,
            _ => {}
        }

        if let Some(caps) = POSITION_REGEX.captures(line) {
            return match caps[2].parse::<u32>() {
                Ok(row) => Command::Position {
                    sheet: caps[1].to_string(),
                    row,
                    col: caps[3].to_string(),
                },
                Err(_) => Command::Invalid(format!("invalid row '{}'", &caps[2])),
            };
        }
        if let Some(caps) = SHEET_REGEX.captures(line) {
            return Command::SelectSheet(caps[1].trim().to_string());
        }
        if let Some(caps) = ASSIGN_REGEX.captures(line) {
            return match Field::parse(&caps[1]) {
                Some(field) => Command::SetField(field, caps[2].trim().to_string()),
                None => Command::Invalid(format!("unknown field '{}'", &caps[1])),
            };
        }
        Command::Invalid("invalid command".to_string())
    }
}
