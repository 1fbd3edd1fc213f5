//! Twelve 4-bit digits at fixed positions with two checksum nibbles, one per
//! half of the password.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::core_api::{CoreError, FieldEntry, Game, Result};
use crate::text::TextCodec;

pub const DIGIT_COUNT: usize = 12;
const HALF: usize = DIGIT_COUNT / 2;
const CHECKSUM_A: usize = 5;
const CHECKSUM_B: usize = 11;
const NIBBLE: u8 = 0x0F;

/// Field ids with their inclusive maximum, in report order.
pub const FIELDS: [(&str, i64); 8] = [
    ("level", 15),
    ("score", 9999),
    ("ship", 0xFF),
    ("lives", 0xFF),
    ("map", 1),
    ("supermap", 1),
    ("thrusters", 1),
    ("shields", 1),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigitState {
    pub level: u8,
    pub score: u16,
    pub ship: u8,
    pub lives: u8,
    pub map: bool,
    pub supermap: bool,
    pub thrusters: bool,
    pub shields: bool,
}

impl DigitState {
    /// Digits with both checksum slots filled in.
    pub fn digits(&self) -> [u8; DIGIT_COUNT] {
        let mut d = [0u8; DIGIT_COUNT];
        let score = self.score;
        d[0] = self.lives & NIBBLE;
        d[1] = (score % 10) as u8;
        d[2] = (self.level & 0b11) | u8::from(self.map) << 2 | u8::from(self.supermap) << 3;
        d[3] = (score / 10 % 10) as u8;
        d[4] = self.ship & NIBBLE;
        d[6] = (score / 100 % 10) as u8;
        d[7] = (self.level >> 2 & 0b11)
            | u8::from(self.thrusters) << 2
            | u8::from(self.shields) << 3;
        d[8] = (score / 1000 % 10) as u8;
        d[9] = self.ship >> 4;
        d[10] = self.lives >> 4;
        let (a, b) = checksum(&d);
        d[CHECKSUM_A] = a;
        d[CHECKSUM_B] = b;
        d
    }

    /// Inverts the layout; checksum slots are ignored.
    fn from_digits(d: &[u8; DIGIT_COUNT]) -> Result<Self> {
        let score_digits = [d[1], d[3], d[6], d[8]];
        if let Some(bad) = score_digits.iter().find(|&&digit| digit > 9) {
            return Err(CoreError::invalid(format!(
                "score digit {bad} is not decimal"
            )));
        }
        let score = score_digits
            .iter()
            .rev()
            .fold(0u16, |acc, &digit| acc * 10 + u16::from(digit));
        Ok(Self {
            level: (d[2] & 0b11) | (d[7] & 0b11) << 2,
            score,
            ship: d[4] | d[9] << 4,
            lives: d[0] | d[10] << 4,
            map: d[2] & 0b0100 != 0,
            supermap: d[2] & 0b1000 != 0,
            thrusters: d[7] & 0b0100 != 0,
            shields: d[7] & 0b1000 != 0,
        })
    }
}

/// Sums `d[2k] ^ d[2k + 1]` over the pairs of one half.
fn fold_half(half: &[u8]) -> u32 {
    half.chunks(2)
        .map(|pair| u32::from(pair[0] ^ pair[1]))
        .sum()
}

/// Both checksum nibbles; the checksum slots of `digits` count as zero.
pub fn checksum(digits: &[u8; DIGIT_COUNT]) -> (u8, u8) {
    let mut d = *digits;
    d[CHECKSUM_A] = 0;
    d[CHECKSUM_B] = 0;
    let first = fold_half(&d[..HALF]);
    let second = fold_half(&d[HALF..]) + (first >> 4);
    ((first & 0xF) as u8, (second & 0xF) as u8)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitPassword {
    text: Arc<TextCodec>,
    state: DigitState,
}

impl DigitPassword {
    pub fn new(text: Arc<TextCodec>) -> Self {
        Self {
            text,
            state: DigitState::default(),
        }
    }

    /// Reads the fixed layout back and re-runs the forward checksum on the
    /// recovered state; no inverse of the fold is attempted.
    pub fn decode(text: Arc<TextCodec>, password: &str) -> Result<Self> {
        let symbols: Vec<char> = password
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if symbols.len() != DIGIT_COUNT {
            return Err(CoreError::invalid(format!(
                "expected {DIGIT_COUNT} characters, got {}",
                symbols.len()
            )));
        }
        let mut digits = [0u8; DIGIT_COUNT];
        for (slot, &symbol) in digits.iter_mut().zip(&symbols) {
            *slot = text.code(symbol)?;
            if *slot > NIBBLE {
                return Err(CoreError::invalid(format!(
                    "character {symbol:?} is not a digit symbol"
                )));
            }
        }

        let state = DigitState::from_digits(&digits)?;
        let expected = checksum(&digits);
        let carried = (digits[CHECKSUM_A], digits[CHECKSUM_B]);
        if expected != carried {
            return Err(CoreError::invalid(format!(
                "checksum mismatch: password carries {carried:?}, contents give {expected:?}"
            )));
        }
        debug!(game = %Game::SolarJetman, ?state, "decoded digit password");
        Ok(Self { text, state })
    }

    pub fn game(&self) -> Game {
        Game::SolarJetman
    }

    pub fn state(&self) -> &DigitState {
        &self.state
    }

    /// Checksum B in the high nibble, A in the low nibble.
    pub fn checksum(&self) -> u8 {
        let (a, b) = checksum(&self.state.digits());
        b << 4 | a
    }

    pub fn get(&self, id: &str) -> Result<i64> {
        let s = &self.state;
        let value = match id {
            "level" => i64::from(s.level),
            "score" => i64::from(s.score),
            "ship" => i64::from(s.ship),
            "lives" => i64::from(s.lives),
            "map" => i64::from(s.map),
            "supermap" => i64::from(s.supermap),
            "thrusters" => i64::from(s.thrusters),
            "shields" => i64::from(s.shields),
            _ => return Err(CoreError::UnknownField(id.to_string())),
        };
        Ok(value)
    }

    pub fn set(&mut self, id: &str, value: i64) -> Result<()> {
        let Some(&(name, max)) = FIELDS.iter().find(|(name, _)| *name == id) else {
            return Err(CoreError::UnknownField(id.to_string()));
        };
        if !(0..=max).contains(&value) {
            return Err(CoreError::range(name, value, 0, max));
        }
        let s = &mut self.state;
        match name {
            "level" => s.level = value as u8,
            "score" => s.score = value as u16,
            "ship" => s.ship = value as u8,
            "lives" => s.lives = value as u8,
            "map" => s.map = value == 1,
            "supermap" => s.supermap = value == 1,
            "thrusters" => s.thrusters = value == 1,
            _ => s.shields = value == 1,
        }
        Ok(())
    }

    pub fn entries(&self) -> Result<Vec<FieldEntry>> {
        FIELDS
            .iter()
            .map(|&(name, _)| {
                Ok(FieldEntry {
                    name: name.to_string(),
                    value: self.get(name)?,
                })
            })
            .collect()
    }
}

impl fmt::Display for DigitPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: String = self
            .state
            .digits()
            .iter()
            .map(|&d| self.text.symbol(u32::from(d)).unwrap_or('?'))
            .collect();
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_places_fields() {
        let state = DigitState {
            level: 6,
            score: 4321,
            ship: 0x2A,
            lives: 3,
            map: true,
            thrusters: true,
            ..DigitState::default()
        };
        assert_eq!(state.digits(), [3, 1, 6, 2, 10, 0, 3, 5, 4, 2, 0, 13]);
    }

    #[test]
    fn first_half_carries_into_second() {
        let mut d = [0u8; DIGIT_COUNT];
        d[0] = 15;
        d[2] = 15;
        assert_eq!(checksum(&d), (14, 1));
    }

    #[test]
    fn checksum_ignores_its_own_slots() {
        let mut d = DigitState::default().digits();
        assert_eq!(checksum(&d), (0, 0));
        d[CHECKSUM_A] = 7;
        d[CHECKSUM_B] = 9;
        assert_eq!(checksum(&d), (0, 0));
    }

    #[test]
    fn rejects_non_decimal_score_digit() {
        let mut d = [0u8; DIGIT_COUNT];
        d[3] = 12;
        assert!(DigitState::from_digits(&d).is_err());
    }
}
