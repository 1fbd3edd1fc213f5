use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::core_api::{CoreError, Result};

/// A game's password character set: codes `0..len()` mapped to characters.
///
/// Tables are read from `.tbl` text, one `HEX=CHAR` entry per line. Blank
/// lines and lines starting with `#` are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCodec {
    name: String,
    symbols: Vec<char>,
    codes: HashMap<char, u8>,
}

impl TextCodec {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(&name, &text)
    }

    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let mut entries: Vec<(u8, char)> = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((code, symbol)) = line.split_once('=') else {
                return Err(CoreError::schema(name, line_no, "expected HEX=CHAR"));
            };
            let code = u8::from_str_radix(code.trim(), 16).map_err(|_| {
                CoreError::schema(name, line_no, format!("bad code {:?}", code.trim()))
            })?;
            let mut chars = symbol.chars();
            let (Some(symbol), None) = (chars.next(), chars.next()) else {
                return Err(CoreError::schema(
                    name,
                    line_no,
                    format!("expected a single character, got {symbol:?}"),
                ));
            };
            entries.push((code, symbol));
        }
        entries.sort_by_key(|&(code, _)| code);

        let mut symbols = Vec::with_capacity(entries.len());
        let mut codes = HashMap::with_capacity(entries.len());
        for (expected, (code, symbol)) in entries.into_iter().enumerate() {
            if usize::from(code) != expected {
                return Err(CoreError::schema(
                    name,
                    0,
                    format!("codes must run densely from 00; missing {expected:02X}"),
                ));
            }
            if codes.insert(symbol, code).is_some() {
                return Err(CoreError::schema(
                    name,
                    0,
                    format!("character {symbol:?} is mapped twice"),
                ));
            }
            symbols.push(symbol);
        }

        Ok(Self {
            name: name.to_string(),
            symbols,
            codes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn code(&self, symbol: char) -> Result<u8> {
        self.codes.get(&symbol).copied().ok_or_else(|| {
            CoreError::invalid(format!(
                "character {symbol:?} is not used in {} passwords",
                self.name
            ))
        })
    }

    pub fn symbol(&self, code: u32) -> Option<char> {
        self.symbols.get(code as usize).copied()
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        text.chars().map(|c| self.code(c)).collect()
    }

    pub fn decode(&self, codes: &[u32]) -> Option<String> {
        codes.iter().map(|&c| self.symbol(c)).collect()
    }

    /// Errors unless every `width`-bit code has a character.
    pub(crate) fn require_width(&self, width: usize) -> Result<()> {
        if self.len() < 1 << width {
            return Err(CoreError::schema(
                &self.name,
                0,
                format!(
                    "{} characters cannot cover {width}-bit codes",
                    self.len()
                ),
            ));
        }
        Ok(())
    }
}
