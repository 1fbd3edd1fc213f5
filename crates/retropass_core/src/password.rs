use std::fmt;
use std::fmt::Write as _;

use crate::cells::CellPassword;
use crate::core_api::{FieldEntry, Game, Result};
use crate::digits::DigitPassword;
use crate::structured::StructuredPassword;

/// A decoded or freshly built password for one of the supported games.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Password {
    Structured(StructuredPassword),
    Cells(CellPassword),
    Digits(DigitPassword),
}

impl Password {
    pub fn game(&self) -> Game {
        match self {
            Self::Structured(pw) => pw.game(),
            Self::Cells(pw) => pw.game(),
            Self::Digits(pw) => pw.game(),
        }
    }

    pub fn get(&self, id: &str) -> Result<i64> {
        match self {
            Self::Structured(pw) => pw.get(id),
            Self::Cells(pw) => pw.get(id),
            Self::Digits(pw) => pw.get(id),
        }
    }

    pub fn set(&mut self, id: &str, value: i64) -> Result<()> {
        match self {
            Self::Structured(pw) => pw.set(id, value),
            Self::Cells(pw) => pw.set(id, value),
            Self::Digits(pw) => pw.set(id, value),
        }
    }

    /// Every field with its current value, in report order: sorted by id for
    /// structured games, declaration order otherwise.
    pub fn entries(&self) -> Result<Vec<FieldEntry>> {
        match self {
            Self::Structured(pw) => pw.entries(),
            Self::Cells(pw) => Ok(pw.entries()),
            Self::Digits(pw) => pw.entries(),
        }
    }

    pub fn field_ids(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.into_iter().map(|e| e.name).collect())
    }

    /// Checksum over the current state; cell passwords carry none.
    pub fn checksum(&self) -> Option<u8> {
        match self {
            Self::Structured(pw) => Some(pw.checksum()),
            Self::Cells(_) => None,
            Self::Digits(pw) => Some(pw.checksum()),
        }
    }

    /// One `name: value` line per field, names padded to a shared column.
    pub fn dump(&self) -> Result<String> {
        Ok(dump_entries(&self.entries()?))
    }
}

pub fn dump_entries(entries: &[FieldEntry]) -> String {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0) + 2;
    let mut out = String::new();
    for entry in entries {
        let label = format!("{}:", entry.name);
        let _ = writeln!(out, "{label:<width$}{}", entry.value);
    }
    out
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured(pw) => pw.fmt(f),
            Self::Cells(pw) => pw.fmt(f),
            Self::Digits(pw) => pw.fmt(f),
        }
    }
}

impl From<StructuredPassword> for Password {
    fn from(pw: StructuredPassword) -> Self {
        Self::Structured(pw)
    }
}

impl From<CellPassword> for Password {
    fn from(pw: CellPassword) -> Self {
        Self::Cells(pw)
    }
}

impl From<DigitPassword> for Password {
    fn from(pw: DigitPassword) -> Self {
        Self::Digits(pw)
    }
}
