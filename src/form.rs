//! State of the entry form: selected sheet and the value of every field.

use crate::error::{Error, Result};
use crate::record::{
    ContainerRecord, Field, Operation, SIZE_CHOICES, TRUCKING_CHOICES, parse_quantity,
};
use chrono::Local;

pub const DATE_FORMAT: &str = "%d/%m/%Y";

pub fn today() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

#[derive(Clone, Debug)]
pub struct EntryForm {
    sheets: Vec<String>,
    selected: Option<String>,
    record: ContainerRecord,
}

impl EntryForm {
    /// A fresh form over `sheets`, with the first sheet selected.
    pub fn new(sheets: Vec<String>) -> Self {
        let selected = sheets.first().cloned();
        let mut form = EntryForm {
            sheets,
            selected,
            record: ContainerRecord::default(),
        };
        form.apply_defaults();
        form
    }

    fn apply_defaults(&mut self) {
        self.record = ContainerRecord {
            pickup_date: today(),
            company: self.selected.clone().unwrap_or_default(),
            ..ContainerRecord::default()
        };
    }

    pub fn sheets(&self) -> &[String] {
        &self.sheets
    }

    pub fn selected_sheet(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn record(&self) -> &ContainerRecord {
        &self.record
    }

    /// Replace the sheet list after the workbook was reloaded.
    pub fn set_sheets(&mut self, sheets: Vec<String>) {
        if self
            .selected
            .as_ref()
            .is_none_or(|s| !sheets.contains(s))
        {
            self.selected = sheets.first().cloned();
            self.record.company = self.selected.clone().unwrap_or_default();
        }
        self.sheets = sheets;
    }

    /// Select the target sheet; the company follows the sheet name.
    pub fn select_sheet(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if !self.sheets.iter().any(|s| s == name) {
            return Err(Error::SheetNotFound {
                name: name.to_string(),
            });
        }
        self.selected = Some(name.to_string());
        self.record.company = name.to_string();
        Ok(())
    }

    pub fn set(&mut self, field: Field, value: &str) -> Result<()> {
        let value = value.trim();
        match field {
            Field::Company => {
                self.record.company = pick(field, value, self.sheets.iter().map(String::as_str))?;
            }
            Field::Trucking => {
                self.record.trucking = pick(field, value, TRUCKING_CHOICES)?;
            }
            Field::Size => {
                self.record.size = pick(field, value, SIZE_CHOICES)?;
            }
            Field::Operation => {
                self.record.operation =
                    Operation::parse(value).ok_or_else(|| Error::InvalidField {
                        field: field.label(),
                        value: value.to_string(),
                        reason: "expected Nhập or Xuất".to_string(),
                    })?;
            }
            Field::Quantity => {
                self.record.quantity = parse_quantity(value)?;
            }
            other => {
                if let Some(slot) = self.record.text_mut(other) {
                    *slot = value.to_string();
                }
            }
        }
        Ok(())
    }

    /// Clear the form after a successful save; date, operation and the
    /// choice fields go back to their defaults.
    pub fn reset_after_save(&mut self) {
        self.apply_defaults();
    }

    /// Put a previously written record back on the form.
    pub fn restore(&mut self, record: ContainerRecord) {
        self.record = record;
    }
}

fn pick<'a>(
    field: Field,
    value: &str,
    choices: impl IntoIterator<Item = &'a str>,
) -> Result<String> {
    let choices: Vec<&str> = choices.into_iter().collect();
    choices
        .iter()
        .find(|c| c.eq_ignore_ascii_case(value))
        .map(|c| c.to_string())
        .ok_or_else(|| Error::InvalidField {
            field: field.label(),
            value: value.to_string(),
            reason: format!("expected one of {}", choices.join(", ")),
        })
}
