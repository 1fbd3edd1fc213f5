//! Passwords that serialize a [`BitStructure`] followed by a checksum byte.
//!
//! Metroid stores the payload rotated left by a shift byte and documents its
//! stream msb0; Kid Icarus has no shift and reads its codepoints lsb0.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::bits::{self, BitOrder};
use crate::core_api::{CoreError, FieldEntry, Game, Result};
use crate::field::FieldTable;
use crate::structure::BitStructure;
use crate::text::TextCodec;

pub const SHIFT_FIELD: &str = "shift";
pub const LEVEL_FIELD: &str = "level";
pub const STAGE_FIELD: &str = "stage";
pub const SUBSTAGE_FIELD: &str = "substage";
pub const FORTRESS_FIELD: &str = "fortress";

const FORTRESS_SUBSTAGE: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuredLayout {
    /// Password characters, excluding group separators.
    pub text_len: usize,
    pub codepoint_width: usize,
    /// Characters per space-separated output group.
    pub group_len: usize,
    pub has_shift: bool,
    pub stream_order: BitOrder,
    /// Exposes the derived `level` pseudo-field.
    pub has_level: bool,
}

impl StructuredLayout {
    pub const METROID: Self = Self {
        text_len: 24,
        codepoint_width: 6,
        group_len: 6,
        has_shift: true,
        stream_order: BitOrder::Msb0,
        has_level: false,
    };

    pub const KID_ICARUS: Self = Self {
        text_len: 24,
        codepoint_width: 6,
        group_len: 6,
        has_shift: false,
        stream_order: BitOrder::Lsb0,
        has_level: true,
    };

    pub fn trailer_bits(&self) -> usize {
        if self.has_shift { 16 } else { 8 }
    }

    pub fn payload_bits(&self) -> usize {
        self.text_len * self.codepoint_width - self.trailer_bits()
    }

    fn pseudo_fields(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.has_shift {
            out.push(SHIFT_FIELD);
        }
        if self.has_level {
            out.push(LEVEL_FIELD);
        }
        out
    }
}

/// Everything passwords of one structured game share.
#[derive(Debug, PartialEq, Eq)]
pub struct StructuredScheme {
    game: Game,
    fields: Arc<FieldTable>,
    text: TextCodec,
    layout: StructuredLayout,
}

impl StructuredScheme {
    pub fn new(
        game: Game,
        fields: FieldTable,
        text: TextCodec,
        layout: StructuredLayout,
    ) -> Result<Self> {
        fields.validate()?;
        if fields.total_bits() != layout.payload_bits() {
            return Err(CoreError::schema(
                fields.name(),
                0,
                format!(
                    "fields cover {} bits but {} passwords carry {} payload bits",
                    fields.total_bits(),
                    game,
                    layout.payload_bits()
                ),
            ));
        }
        text.require_width(layout.codepoint_width)?;
        for pseudo in layout.pseudo_fields() {
            if fields.contains(pseudo) {
                return Err(CoreError::schema(
                    fields.name(),
                    0,
                    format!("{pseudo} is derived and cannot be a stored field"),
                ));
            }
        }
        if layout.has_level {
            for id in [STAGE_FIELD, SUBSTAGE_FIELD, FORTRESS_FIELD] {
                fields.field(id)?;
            }
        }
        Ok(Self {
            game,
            fields: Arc::new(fields),
            text,
            layout,
        })
    }

    pub fn game(&self) -> Game {
        self.game
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    pub fn layout(&self) -> &StructuredLayout {
        &self.layout
    }
}

/// World and stage, with stage 4 meaning the world's fortress. Substage 0
/// is the blank state a fresh password starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub stage: u8,
    pub substage: u8,
}

impl Level {
    pub const MIN_VALUE: i64 = 10;
    pub const MAX_VALUE: i64 = 44;

    pub fn new(stage: u8, substage: u8) -> Option<Self> {
        ((1..=4).contains(&stage) && substage <= FORTRESS_SUBSTAGE)
            .then_some(Self { stage, substage })
    }

    /// Integer form used by field access: `stage * 10 + substage`.
    pub fn value(&self) -> i64 {
        i64::from(self.stage) * 10 + i64::from(self.substage)
    }

    pub fn from_value(value: i64) -> Option<Self> {
        if !(Self::MIN_VALUE..=Self::MAX_VALUE).contains(&value) {
            return None;
        }
        Self::new((value / 10) as u8, (value % 10) as u8)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.stage, self.substage)
    }
}

impl FromStr for Level {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let parsed = s
            .split_once('-')
            .and_then(|(a, b)| Some((a.trim().parse().ok()?, b.trim().parse().ok()?)))
            .and_then(|(stage, substage)| Self::new(stage, substage));
        parsed.ok_or_else(|| CoreError::invalid(format!("{s:?} is not a level like 1-4")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredPassword {
    scheme: Arc<StructuredScheme>,
    data: BitStructure,
    shift: u8,
}

impl StructuredPassword {
    pub fn new(scheme: Arc<StructuredScheme>) -> Result<Self> {
        let data = BitStructure::new(Arc::clone(&scheme.fields))?;
        Ok(Self {
            scheme,
            data,
            shift: 0,
        })
    }

    pub fn decode(scheme: Arc<StructuredScheme>, text: &str) -> Result<Self> {
        let layout = scheme.layout;
        let compact: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.len() != layout.text_len {
            return Err(CoreError::invalid(format!(
                "{} passwords have {} characters, got {}",
                scheme.game,
                layout.text_len,
                compact.len()
            )));
        }

        let mut codes = Vec::with_capacity(compact.len());
        for &c in &compact {
            let code = u32::from(scheme.text.code(c)?);
            if code >= 1 << layout.codepoint_width {
                return Err(CoreError::invalid(format!(
                    "character {c:?} is outside the {}-bit code range",
                    layout.codepoint_width
                )));
            }
            codes.push(code);
        }
        trace!(game = %scheme.game, ?codes, "decoded codepoints");

        let stream = bits::unchunk(&codes, layout.codepoint_width, layout.stream_order);
        let stored = match layout.stream_order {
            BitOrder::Msb0 => bits::flip_bit_order(&stream),
            BitOrder::Lsb0 => stream,
        };
        let (rotated, trailer) = stored.split_at(layout.payload_bits());
        let (shift, checksum) = if layout.has_shift {
            (bits::to_u8(&trailer[..8]), bits::to_u8(&trailer[8..16]))
        } else {
            (0, bits::to_u8(&trailer[..8]))
        };

        let payload = bits::rotate_right(rotated, usize::from(shift));
        let data = BitStructure::from_bits(Arc::clone(&scheme.fields), payload)?;
        let password = Self {
            scheme,
            data,
            shift,
        };

        let expected = password.checksum();
        if expected != checksum {
            return Err(CoreError::invalid(format!(
                "checksum mismatch: password carries {checksum:#04x}, contents sum to {expected:#04x}"
            )));
        }
        debug!(game = %password.scheme.game, shift, checksum, "decoded password");
        Ok(password)
    }

    pub fn game(&self) -> Game {
        self.scheme.game
    }

    pub fn scheme(&self) -> &StructuredScheme {
        &self.scheme
    }

    pub fn data(&self) -> &BitStructure {
        &self.data
    }

    pub fn shift(&self) -> u8 {
        self.shift
    }

    pub fn set_shift(&mut self, shift: u8) -> Result<()> {
        if !self.scheme.layout.has_shift {
            return Err(CoreError::UnknownField(SHIFT_FIELD.to_string()));
        }
        self.shift = shift;
        Ok(())
    }

    /// `(sum of payload bytes + shift) mod 256`, over the unrotated payload.
    pub fn checksum(&self) -> u8 {
        let sum = self
            .data
            .to_bytes()
            .iter()
            .fold(u32::from(self.shift), |acc, &b| acc + u32::from(b));
        (sum % 0x100) as u8
    }

    pub fn level(&self) -> Result<Level> {
        if !self.scheme.layout.has_level {
            return Err(CoreError::UnknownField(LEVEL_FIELD.to_string()));
        }
        let stage = self.data.get(STAGE_FIELD)?;
        let substage = if self.data.get(FORTRESS_FIELD)? == 1 {
            i64::from(FORTRESS_SUBSTAGE)
        } else {
            self.data.get(SUBSTAGE_FIELD)?
        };
        Ok(Level {
            stage: stage as u8,
            substage: substage as u8,
        })
    }

    pub fn set_level(&mut self, level: Level) -> Result<()> {
        if !self.scheme.layout.has_level {
            return Err(CoreError::UnknownField(LEVEL_FIELD.to_string()));
        }
        let (substage, fortress) = if level.substage == FORTRESS_SUBSTAGE {
            (0, 1)
        } else {
            (i64::from(level.substage), 0)
        };
        let mut data = self.data.clone();
        data.set(STAGE_FIELD, i64::from(level.stage))?;
        data.set(SUBSTAGE_FIELD, substage)?;
        data.set(FORTRESS_FIELD, fortress)?;
        self.data = data;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<i64> {
        match id {
            SHIFT_FIELD if self.scheme.layout.has_shift => Ok(i64::from(self.shift)),
            LEVEL_FIELD if self.scheme.layout.has_level => Ok(self.level()?.value()),
            _ => self.data.get(id),
        }
    }

    pub fn set(&mut self, id: &str, value: i64) -> Result<()> {
        match id {
            SHIFT_FIELD if self.scheme.layout.has_shift => {
                let shift = u8::try_from(value)
                    .map_err(|_| CoreError::range(SHIFT_FIELD, value, 0, 0xFF))?;
                self.set_shift(shift)
            }
            LEVEL_FIELD if self.scheme.layout.has_level => {
                let level = Level::from_value(value).ok_or_else(|| {
                    CoreError::range(LEVEL_FIELD, value, Level::MIN_VALUE, Level::MAX_VALUE)
                })?;
                self.set_level(level)
            }
            _ => self.data.set(id, value),
        }
    }

    /// Stored fields and pseudo-fields, sorted by id.
    pub fn entries(&self) -> Result<Vec<FieldEntry>> {
        let mut names: Vec<&str> = self.scheme.fields.iter().map(|f| f.id.as_str()).collect();
        names.extend(self.scheme.layout.pseudo_fields());
        names.sort_unstable();
        names
            .into_iter()
            .map(|name| {
                Ok(FieldEntry {
                    name: name.to_string(),
                    value: self.get(name)?,
                })
            })
            .collect()
    }

    /// Full serialized bit sequence in storage order: rotated payload, shift
    /// byte when present, checksum byte.
    pub fn bits(&self) -> Vec<bool> {
        let mut out = bits::rotate_left(self.data.bits(), usize::from(self.shift));
        if self.scheme.layout.has_shift {
            out.extend(bits::from_u8(self.shift));
        }
        out.extend(bits::from_u8(self.checksum()));
        out
    }

    pub fn hex(&self) -> String {
        bits::to_bytes(&self.bits())
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    pub fn codepoints(&self) -> Vec<u32> {
        let layout = &self.scheme.layout;
        let stored = self.bits();
        match layout.stream_order {
            BitOrder::Msb0 => bits::chunk(
                &bits::flip_bit_order(&stored),
                layout.codepoint_width,
                BitOrder::Msb0,
            ),
            BitOrder::Lsb0 => bits::chunk(&stored, layout.codepoint_width, BitOrder::Lsb0),
        }
    }
}

impl fmt::Display for StructuredPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<char> = self
            .codepoints()
            .into_iter()
            .map(|cp| self.scheme.text.symbol(cp).unwrap_or('?'))
            .collect();
        let groups: Vec<String> = symbols
            .chunks(self.scheme.layout.group_len)
            .map(|group| group.iter().collect())
            .collect();
        f.write_str(&groups.join(" "))
    }
}
