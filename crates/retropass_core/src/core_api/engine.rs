use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::cells::{BossTable, CellPassword};
use crate::digits::DigitPassword;
use crate::field::FieldTable;
use crate::password::Password;
use crate::structured::{StructuredLayout, StructuredPassword, StructuredScheme};
use crate::text::TextCodec;

use super::error::{CoreError, Result};
use super::types::Game;

const METROID_FIELDS: &str = include_str!("../../data/metroid.tsv");
const METROID_TEXT: &str = include_str!("../../data/metroid.tbl");
const KID_ICARUS_FIELDS: &str = include_str!("../../data/kidicarus.tsv");
const KID_ICARUS_TEXT: &str = include_str!("../../data/kidicarus.tbl");
const MEGA_MAN_2_BOSSES: &str = include_str!("../../data/mm2.tsv");
const SOLAR_JETMAN_TEXT: &str = include_str!("../../data/sjetman.tbl");

/// Structured layout used by `game`, if it is a structured game.
pub fn structured_layout(game: Game) -> Option<StructuredLayout> {
    match game {
        Game::Metroid => Some(StructuredLayout::METROID),
        Game::KidIcarus => Some(StructuredLayout::KID_ICARUS),
        Game::MegaMan2 | Game::SolarJetman => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GameDef {
    Structured(Arc<StructuredScheme>),
    Cells(Arc<BossTable>),
    Digits(Arc<TextCodec>),
}

/// Immutable registry of game definitions. Build it once and hand it to
/// whoever needs to make passwords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    games: BTreeMap<Game, GameDef>,
}

#[derive(Debug, Default)]
pub struct EngineBuilder {
    games: BTreeMap<Game, GameDef>,
}

impl EngineBuilder {
    pub fn structured(mut self, game: Game, fields: FieldTable, text: TextCodec) -> Result<Self> {
        let layout = structured_layout(game)
            .ok_or_else(|| CoreError::UnknownGame(format!("{game} is not a structured game")))?;
        let scheme = StructuredScheme::new(game, fields, text, layout)?;
        self.games
            .insert(game, GameDef::Structured(Arc::new(scheme)));
        Ok(self)
    }

    pub fn cells(mut self, bosses: BossTable) -> Self {
        self.games
            .insert(bosses.game(), GameDef::Cells(Arc::new(bosses)));
        self
    }

    pub fn digits(mut self, game: Game, text: TextCodec) -> Result<Self> {
        if game != Game::SolarJetman {
            return Err(CoreError::UnknownGame(format!(
                "{game} does not use digit passwords"
            )));
        }
        text.require_width(4)?;
        self.games.insert(game, GameDef::Digits(Arc::new(text)));
        Ok(self)
    }

    pub fn build(self) -> Engine {
        let games: Vec<Game> = self.games.keys().copied().collect();
        debug!(?games, "built engine");
        Engine { games: self.games }
    }
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// All four games from the tables bundled with the crate.
    pub fn builtin() -> Result<Self> {
        Ok(Self::builder()
            .structured(
                Game::Metroid,
                FieldTable::parse("metroid", METROID_FIELDS)?,
                TextCodec::parse("metroid", METROID_TEXT)?,
            )?
            .structured(
                Game::KidIcarus,
                FieldTable::parse("kidicarus", KID_ICARUS_FIELDS)?,
                TextCodec::parse("kidicarus", KID_ICARUS_TEXT)?,
            )?
            .cells(BossTable::parse(Game::MegaMan2, MEGA_MAN_2_BOSSES)?)
            .digits(
                Game::SolarJetman,
                TextCodec::parse("sjetman", SOLAR_JETMAN_TEXT)?,
            )?
            .build())
    }

    /// Loads `{id}.tsv` and `{id}.tbl` files from `dir`. Games whose files
    /// are absent are left out; a file that is present but broken is an
    /// error.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let file = |game: Game, ext: &str| -> Option<PathBuf> {
            let path = dir.join(format!("{}.{ext}", game.id()));
            path.is_file().then_some(path)
        };

        let mut builder = Self::builder();
        for game in Game::ALL {
            match game {
                Game::Metroid | Game::KidIcarus => {
                    let (Some(tsv), Some(tbl)) = (file(game, "tsv"), file(game, "tbl")) else {
                        debug!(%game, dir = %dir.display(), "no schema files, skipping");
                        continue;
                    };
                    builder =
                        builder.structured(game, FieldTable::load(tsv)?, TextCodec::load(tbl)?)?;
                }
                Game::MegaMan2 => {
                    let Some(tsv) = file(game, "tsv") else {
                        debug!(%game, dir = %dir.display(), "no boss table, skipping");
                        continue;
                    };
                    builder = builder.cells(BossTable::load(game, tsv)?);
                }
                Game::SolarJetman => {
                    let Some(tbl) = file(game, "tbl") else {
                        debug!(%game, dir = %dir.display(), "no text table, skipping");
                        continue;
                    };
                    builder = builder.digits(game, TextCodec::load(tbl)?)?;
                }
            }
        }
        Ok(builder.build())
    }

    pub fn games(&self) -> Vec<Game> {
        self.games.keys().copied().collect()
    }

    /// A default password for `game`, or the decoding of `text`.
    pub fn make_password(&self, game: Game, text: Option<&str>) -> Result<Password> {
        let def = self
            .games
            .get(&game)
            .ok_or_else(|| CoreError::UnknownGame(game.id().to_string()))?;
        let password: Password = match (def, text) {
            (GameDef::Structured(scheme), None) => {
                StructuredPassword::new(Arc::clone(scheme))?.into()
            }
            (GameDef::Structured(scheme), Some(text)) => {
                StructuredPassword::decode(Arc::clone(scheme), text)?.into()
            }
            (GameDef::Cells(bosses), None) => CellPassword::new(Arc::clone(bosses)).into(),
            (GameDef::Cells(bosses), Some(text)) => {
                CellPassword::decode(Arc::clone(bosses), text)?.into()
            }
            (GameDef::Digits(codec), None) => DigitPassword::new(Arc::clone(codec)).into(),
            (GameDef::Digits(codec), Some(text)) => {
                DigitPassword::decode(Arc::clone(codec), text)?.into()
            }
        };
        Ok(password)
    }

    pub fn make_password_by_id(&self, id: &str, text: Option<&str>) -> Result<Password> {
        self.make_password(id.parse()?, text)
    }
}
