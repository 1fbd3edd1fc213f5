use std::fs;
use std::path::Path;

use tracing::debug;

use crate::core_api::{CoreError, Result};
use crate::password::Password;

pub use crate::field::parse_int;

/// Field assignments read from a `key: value` settings file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: Vec<(String, i64)>,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                return Err(CoreError::Settings {
                    line: index + 1,
                    message: format!("expected `key: value`, got {line:?}"),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(CoreError::Settings {
                    line: index + 1,
                    message: "empty key".to_string(),
                });
            }
            let value = parse_int(value).ok_or_else(|| CoreError::Settings {
                line: index + 1,
                message: format!("{:?} is not an integer", value.trim()),
            })?;
            entries.push((key.to_string(), value));
        }
        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sets every entry in file order. On error `password` is left as it was.
    pub fn apply(&self, password: &mut Password) -> Result<()> {
        let mut updated = password.clone();
        for (key, value) in self.iter() {
            debug!(key, value, "applying setting");
            updated.set(key, value)?;
        }
        *password = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# starting state\n\nmissiles: 0x30\n  has_bombs: 1\n";
        let settings = Settings::parse(text).unwrap();
        let entries: Vec<_> = settings.iter().collect();
        assert_eq!(entries, vec![("missiles", 48), ("has_bombs", 1)]);
    }

    #[test]
    fn reports_line_of_bad_value() {
        let err = Settings::parse("a: 1\nb: lots\n").unwrap_err();
        match err {
            CoreError::Settings { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(Settings::parse("no separator here").is_err());
    }
}
