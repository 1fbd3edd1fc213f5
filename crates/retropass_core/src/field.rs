use std::collections::HashMap;
use std::fs;
use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, Result};

/// Widest field a structure can read into a single integer.
pub const MAX_FIELD_WIDTH: usize = 64;

/// Parses an integer whose base is implied by its prefix (`0x`, `0o`, `0b`,
/// otherwise decimal). A leading sign and `_` separators are accepted.
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, lower.as_str())
    };
    let body = body.replace('_', "");
    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = i64::from_str_radix(&body, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Uint,
    Bool,
}

impl FieldKind {
    fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "" | "uint" | "int" => Some(Self::Uint),
            "bool" => Some(Self::Bool),
            _ => None,
        }
    }
}

/// Attributes of one password data field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub offset: usize,
    pub width: usize,
    pub kind: FieldKind,
    /// Added to the stored bits on read, subtracted on write.
    pub numeric_offset: i64,
    pub group: String,
    pub order: i32,
    pub description: String,
}

impl Field {
    /// Bits of the owning structure this field occupies.
    pub fn slice(&self) -> Range<usize> {
        self.offset..self.offset + self.width
    }

    pub fn min_value(&self) -> i64 {
        self.numeric_offset
    }

    pub fn max_value(&self) -> i64 {
        let raw_max = if self.width >= 63 {
            i64::MAX
        } else {
            (1i64 << self.width) - 1
        };
        self.numeric_offset.saturating_add(raw_max)
    }
}

/// Schema of one game's bit structure, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTable {
    name: String,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

struct Columns {
    fid: usize,
    offset: usize,
    width: usize,
    kind: Option<usize>,
    group: Option<usize>,
    order: Option<usize>,
    desc: Option<usize>,
    numeric_offset: Option<usize>,
}

impl Columns {
    fn from_header(origin: &str, header: &str) -> Result<Self> {
        let names: Vec<&str> = header.split('\t').map(str::trim).collect();
        let find = |name: &str| names.iter().position(|&n| n == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| CoreError::schema(origin, 1, format!("missing column {name:?}")))
        };
        Ok(Self {
            fid: require("fid")?,
            offset: require("offset")?,
            width: require("width")?,
            kind: find("type"),
            group: find("group"),
            order: find("order"),
            desc: find("desc"),
            numeric_offset: find("mod"),
        })
    }
}

impl FieldTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(&name, &text)
    }

    /// Parses tab-separated schema text whose first line names the columns.
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let mut lines = text.lines().enumerate();
        let Some((_, header)) = lines.next() else {
            return Err(CoreError::schema(name, 1, "empty schema"));
        };
        let columns = Columns::from_header(name, header)?;

        let mut fields = Vec::new();
        for (index, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let cells: Vec<&str> = line.split('\t').collect();
            fields.push(parse_record(name, index + 1, &columns, &cells)?);
        }

        Self::from_fields(name, fields)
    }

    /// Builds a table, suffixing repeated ids with their 1-based occurrence.
    /// Fails if a suffixed id collides with another field's id.
    pub fn from_fields(name: &str, mut fields: Vec<Field>) -> Result<Self> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for field in &fields {
            *counts.entry(field.id.clone()).or_default() += 1;
        }
        let mut seen: HashMap<String, usize> = HashMap::new();
        for field in &mut fields {
            if counts[&field.id] > 1 {
                let n = seen.entry(field.id.clone()).or_default();
                *n += 1;
                field.id = format!("{}{}", field.id, n);
            }
        }

        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if let Some(first) = index.insert(field.id.clone(), i) {
                return Err(CoreError::schema(
                    name,
                    i + 2,
                    format!("field id {} is also used on line {}", field.id, first + 2),
                ));
            }
        }
        Ok(Self {
            name: name.to_string(),
            fields,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, id: &str) -> Option<&Field> {
        self.index.get(id).map(|&i| &self.fields[i])
    }

    pub fn field(&self, id: &str) -> Result<&Field> {
        self.get(id)
            .ok_or_else(|| CoreError::UnknownField(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn total_bits(&self) -> usize {
        self.fields.iter().map(|f| f.width).sum()
    }

    /// Checks every slice against the structure width.
    pub fn validate(&self) -> Result<()> {
        let total = self.total_bits();
        for (i, field) in self.fields.iter().enumerate() {
            if field.width == 0 || field.width > MAX_FIELD_WIDTH {
                return Err(CoreError::schema(
                    &self.name,
                    i + 2,
                    format!(
                        "field {} has width {}, expected 1..={MAX_FIELD_WIDTH}",
                        field.id, field.width
                    ),
                ));
            }
            if field.slice().end > total {
                return Err(CoreError::schema(
                    &self.name,
                    i + 2,
                    format!(
                        "field {} spans bits {}..{} but the structure is {} bits wide",
                        field.id,
                        field.offset,
                        field.slice().end,
                        total
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FieldTable {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn parse_record(origin: &str, line: usize, columns: &Columns, cells: &[&str]) -> Result<Field> {
    let cell = |i: usize| cells.get(i).map(|s| s.trim()).unwrap_or("");
    let optional = |i: Option<usize>| i.map(cell).unwrap_or("");

    let id = cell(columns.fid);
    if id.is_empty() {
        return Err(CoreError::schema(origin, line, "empty field id"));
    }
    let number = |column: &str, text: &str| {
        parse_int(text).ok_or_else(|| {
            CoreError::schema(
                origin,
                line,
                format!("{column} of field {id} is not numeric: {text:?}"),
            )
        })
    };
    let offset = number("offset", cell(columns.offset))?;
    let width = number("width", cell(columns.width))?;
    let (Ok(offset), Ok(width)) = (usize::try_from(offset), usize::try_from(width)) else {
        return Err(CoreError::schema(
            origin,
            line,
            format!("offset and width of field {id} must not be negative"),
        ));
    };

    let kind_text = optional(columns.kind);
    let kind = FieldKind::parse(kind_text).ok_or_else(|| {
        CoreError::schema(origin, line, format!("unknown field type {kind_text:?}"))
    })?;
    let order = match optional(columns.order) {
        "" => 0,
        text => i32::try_from(number("order", text)?)
            .map_err(|_| CoreError::schema(origin, line, "order out of range"))?,
    };
    let numeric_offset = match optional(columns.numeric_offset) {
        "" => 0,
        text => number("mod", text)?,
    };
    let group = match optional(columns.group) {
        "" => "misc",
        text => text,
    };

    Ok(Field {
        id: id.to_string(),
        offset,
        width,
        kind,
        numeric_offset,
        group: group.to_string(),
        order,
        description: optional(columns.desc).to_string(),
    })
}
