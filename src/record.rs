//! The container record keyed in by the operator.

use crate::cell::CellValue;
use crate::error::{Error, Result};
use std::fmt;

pub const TRUCKING_CHOICES: [&str; 3] = ["GH", "HNP", "DAP"];
pub const SIZE_CHOICES: [&str; 3] = ["40", "20", "45"];
pub const QUANTITY_RANGE: std::ops::RangeInclusive<u32> = 1..=1000;

/// Record fields, in the order their columns appear on the sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    PickupDate,
    Company,
    Trucking,
    Booking,
    Container,
    Seal,
    Operation,
    Quantity,
    Size,
    PickupLocation,
    DropoffLocation,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::PickupDate,
        Field::Company,
        Field::Trucking,
        Field::Booking,
        Field::Container,
        Field::Seal,
        Field::Operation,
        Field::Quantity,
        Field::Size,
        Field::PickupLocation,
        Field::DropoffLocation,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn label(self) -> &'static str {
        match self {
            Field::PickupDate => "Pickup date",
            Field::Company => "Company",
            Field::Trucking => "Trucking",
            Field::Booking => "BK No",
            Field::Container => "Container No",
            Field::Seal => "Seal",
            Field::Operation => "Operation",
            Field::Quantity => "Quantity",
            Field::Size => "Size",
            Field::PickupLocation => "Pickup location",
            Field::DropoffLocation => "Drop-off location",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::PickupDate => &["date", "ngay"],
            Field::Company => &["company", "cty"],
            Field::Trucking => &["trucking", "vendor", "nhaxe"],
            Field::Booking => &["bk", "booking"],
            Field::Container => &["container", "cont"],
            Field::Seal => &["seal"],
            Field::Operation => &["operation", "type", "loaihinh"],
            Field::Quantity => &["qty", "quantity"],
            Field::Size => &["size"],
            Field::PickupLocation => &["from", "pickup"],
            Field::DropoffLocation => &["to", "dropoff"],
        }
    }

    /// 1-based position on the form.
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0) + 1
    }

    /// Look a field up by its form number (`1`..`11`) or one of its aliases.
    pub fn parse(name: &str) -> Option<Field> {
        let name = name.trim().to_lowercase();
        if let Ok(n) = name.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied());
        }
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.aliases().contains(&name.as_str()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Operation {
    Import,
    #[default]
    Export,
}

impl Operation {
    /// What the operator sees on the form.
    pub fn label(self) -> &'static str {
        match self {
            Operation::Import => "Nhập",
            Operation::Export => "Xuất",
        }
    }

    /// What lands in the sheet.
    pub fn code(self) -> &'static str {
        match self {
            Operation::Import => "N",
            Operation::Export => "X",
        }
    }

    pub fn parse(s: &str) -> Option<Operation> {
        match s.trim().to_lowercase().as_str() {
            "nhập" | "nhap" | "n" | "import" | "i" => Some(Operation::Import),
            "xuất" | "xuat" | "x" | "export" | "e" => Some(Operation::Export),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerRecord {
    pub pickup_date: String,
    pub company: String,
    pub trucking: String,
    pub booking: String,
    pub container: String,
    pub seal: String,
    pub operation: Operation,
    pub quantity: u32,
    pub size: String,
    pub pickup_location: String,
    pub dropoff_location: String,
}

impl Default for ContainerRecord {
    fn default() -> Self {
        ContainerRecord {
            pickup_date: String::new(),
            company: String::new(),
            trucking: TRUCKING_CHOICES[0].to_string(),
            booking: String::new(),
            container: String::new(),
            seal: String::new(),
            operation: Operation::default(),
            quantity: *QUANTITY_RANGE.start(),
            size: SIZE_CHOICES[0].to_string(),
            pickup_location: String::new(),
            dropoff_location: String::new(),
        }
    }
}

impl ContainerRecord {
    /// Form representation of one field.
    pub fn value(&self, field: Field) -> String {
        match field {
            Field::PickupDate => self.pickup_date.clone(),
            Field::Company => self.company.clone(),
            Field::Trucking => self.trucking.clone(),
            Field::Booking => self.booking.clone(),
            Field::Container => self.container.clone(),
            Field::Seal => self.seal.clone(),
            Field::Operation => self.operation.label().to_string(),
            Field::Quantity => self.quantity.to_string(),
            Field::Size => self.size.clone(),
            Field::PickupLocation => self.pickup_location.clone(),
            Field::DropoffLocation => self.dropoff_location.clone(),
        }
    }

    /// Set a free-text field. Choice fields go through [`crate::form::EntryForm::set`].
    pub(crate) fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::PickupDate => Some(&mut self.pickup_date),
            Field::Booking => Some(&mut self.booking),
            Field::Container => Some(&mut self.container),
            Field::Seal => Some(&mut self.seal),
            Field::PickupLocation => Some(&mut self.pickup_location),
            Field::DropoffLocation => Some(&mut self.dropoff_location),
            _ => None,
        }
    }

    /// Cells written to the sheet, one per field in [`Field::ALL`] order.
    pub fn to_row(&self) -> Vec<CellValue> {
        Field::ALL
            .iter()
            .map(|field| match field {
                Field::Operation => CellValue::text(self.operation.code()),
                Field::Quantity => CellValue::from(self.quantity),
                other => CellValue::text(self.value(*other)),
            })
            .collect()
    }
}

pub fn parse_quantity(value: &str) -> Result<u32> {
    let invalid = |reason: String| Error::InvalidField {
        field: Field::Quantity.label(),
        value: value.to_string(),
        reason,
    };
    let n = value
        .trim()
        .parse::<u32>()
        .map_err(|e| invalid(e.to_string()))?;
    if !QUANTITY_RANGE.contains(&n) {
        return Err(invalid(format!(
            "must be between {} and {}",
            QUANTITY_RANGE.start(),
            QUANTITY_RANGE.end()
        )));
    }
    Ok(n)
}
