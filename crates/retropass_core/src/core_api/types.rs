use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Game {
    #[serde(rename = "metroid")]
    Metroid,
    #[serde(rename = "kidicarus")]
    KidIcarus,
    #[serde(rename = "mm2")]
    MegaMan2,
    #[serde(rename = "sjetman")]
    SolarJetman,
}

impl Game {
    pub const ALL: [Game; 4] = [
        Game::Metroid,
        Game::KidIcarus,
        Game::MegaMan2,
        Game::SolarJetman,
    ];

    /// Registry identifier, also the stem of the game's bundled data files.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Metroid => "metroid",
            Self::KidIcarus => "kidicarus",
            Self::MegaMan2 => "mm2",
            Self::SolarJetman => "sjetman",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Metroid => "Metroid",
            Self::KidIcarus => "Kid Icarus",
            Self::MegaMan2 => "Mega Man 2",
            Self::SolarJetman => "Solar Jetman",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Game {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metroid" => Ok(Self::Metroid),
            "kidicarus" | "kid-icarus" | "icarus" => Ok(Self::KidIcarus),
            "mm2" | "megaman2" | "mega-man-2" => Ok(Self::MegaMan2),
            "sjetman" | "solarjetman" | "solar-jetman" => Ok(Self::SolarJetman),
            _ => Err(CoreError::UnknownGame(s.to_string())),
        }
    }
}

/// One named value as reported by a password dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldEntry {
    pub name: String,
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_and_aliases() {
        for game in Game::ALL {
            assert_eq!(game.id().parse::<Game>().unwrap(), game);
        }
        assert_eq!("Mega-Man-2".parse::<Game>().unwrap(), Game::MegaMan2);
        assert!("zelda".parse::<Game>().is_err());
    }

    #[test]
    fn serializes_with_registry_ids() {
        assert_eq!(serde_json::to_string(&Game::MegaMan2).unwrap(), "\"mm2\"");
        let entry: FieldEntry = serde_json::from_str(r#"{"name":"tanks","value":3}"#).unwrap();
        assert_eq!(entry.value, 3);
        assert!(
            serde_json::from_str::<FieldEntry>(r#"{"name":"tanks","value":3,"max":4}"#).is_err()
        );
    }
}
