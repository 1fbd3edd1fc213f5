//! Grid-cell passwords: nine cells on a 5x5 board, one tank cell in row A
//! plus one cell per boss whose position says whether it was defeated.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::core_api::{CoreError, FieldEntry, Game, Result};

pub const TANKS_FIELD: &str = "tanks";
pub const MAX_TANKS: u8 = 4;

const ROWS: u8 = 5;
const COLUMNS: u8 = 5;
/// Boss codes cycle through the 20 cells of rows B..E.
const BOSS_CELLS: u8 = 20;
const ROW_LABELS: [char; ROWS as usize] = ['A', 'B', 'C', 'D', 'E'];

/// Converts a cell such as `"C3"` to `row * 5 + (column - 1)`.
pub fn cell_to_code(cell: &str) -> Result<u8> {
    let malformed = || CoreError::MalformedCell(cell.to_string());
    let mut chars = cell.chars();
    let (Some(row), Some(column), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(malformed());
    };
    let row = ROW_LABELS
        .iter()
        .position(|&label| label == row.to_ascii_uppercase())
        .ok_or_else(malformed)? as u8;
    let column = column
        .to_digit(10)
        .filter(|c| (1..=u32::from(COLUMNS)).contains(c))
        .ok_or_else(malformed)? as u8;
    Ok(row * COLUMNS + column - 1)
}

/// Inverse of [`cell_to_code`]; `code` must be below 25.
pub fn code_to_cell(code: u8) -> String {
    debug_assert!(code < ROWS * COLUMNS);
    let row = ROW_LABELS[usize::from(code / COLUMNS)];
    format!("{row}{}", code % COLUMNS + 1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boss {
    pub name: String,
    pub alive_code: u8,
    pub dead_code: u8,
}

impl Boss {
    fn code(&self, defeated: bool) -> u8 {
        if defeated {
            self.dead_code
        } else {
            self.alive_code
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BossTable {
    game: Game,
    bosses: Vec<Boss>,
}

impl BossTable {
    pub fn load(game: Game, path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::parse(game, &text)
    }

    /// Parses `name\talive\tdead` rows; alive and dead are cells in rows B..E.
    pub fn parse(game: Game, text: &str) -> Result<Self> {
        let origin = game.id();
        let mut lines = text.lines().enumerate();
        let header_ok = lines.next().is_some_and(|(_, header)| {
            let names: Vec<&str> = header.split('\t').map(str::trim).collect();
            names == ["name", "alive", "dead"]
        });
        if !header_ok {
            return Err(CoreError::schema(origin, 1, "expected header name/alive/dead"));
        }

        let mut bosses: Vec<Boss> = Vec::new();
        for (index, line) in lines {
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            let cells: Vec<&str> = line.split('\t').map(str::trim).collect();
            let [name, alive, dead] = cells[..] else {
                return Err(CoreError::schema(origin, line_no, "expected three columns"));
            };
            let boss_code = |cell: &str| -> Result<u8> {
                let code = cell_to_code(cell)
                    .map_err(|e| CoreError::schema(origin, line_no, e.to_string()))?;
                code.checked_sub(COLUMNS).ok_or_else(|| {
                    CoreError::schema(origin, line_no, format!("{cell} is a tank cell"))
                })
            };
            let boss = Boss {
                name: name.to_string(),
                alive_code: boss_code(alive)?,
                dead_code: boss_code(dead)?,
            };
            if boss.alive_code == boss.dead_code {
                return Err(CoreError::schema(
                    origin,
                    line_no,
                    format!("{name} uses the same cell alive and dead"),
                ));
            }
            if name == TANKS_FIELD || bosses.iter().any(|b| b.name == name) {
                return Err(CoreError::schema(
                    origin,
                    line_no,
                    format!("duplicate name {name}"),
                ));
            }
            bosses.push(boss);
        }
        if bosses.is_empty() {
            return Err(CoreError::schema(origin, 0, "no bosses"));
        }
        Ok(Self { game, bosses })
    }

    pub fn game(&self) -> Game {
        self.game
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Boss> {
        self.bosses.iter()
    }

    pub fn len(&self) -> usize {
        self.bosses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bosses.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.bosses.iter().position(|b| b.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellPassword {
    bosses: Arc<BossTable>,
    tanks: u8,
    defeated: Vec<bool>,
}

impl CellPassword {
    pub fn new(bosses: Arc<BossTable>) -> Self {
        let defeated = vec![false; bosses.len()];
        Self {
            bosses,
            tanks: 0,
            defeated,
        }
    }

    pub fn decode(bosses: Arc<BossTable>, text: &str) -> Result<Self> {
        let cells: Vec<&str> = text.split_whitespace().collect();
        let expected = bosses.len() + 1;
        if cells.len() != expected {
            return Err(CoreError::invalid(format!(
                "expected {expected} cells, got {}",
                cells.len()
            )));
        }
        let mut codes = cells
            .iter()
            .map(|cell| cell_to_code(cell))
            .collect::<Result<Vec<u8>>>()?;
        codes.sort_unstable();

        let tanks = codes[0];
        if tanks > MAX_TANKS {
            return Err(CoreError::invalid("tank cell missing"));
        }
        // A second row-A cell would decode but never re-encode to the same text.
        if codes[1] <= MAX_TANKS {
            return Err(CoreError::invalid("more than one tank cell"));
        }
        let relative: Vec<u8> = codes[1..]
            .iter()
            .map(|&code| (code - COLUMNS + BOSS_CELLS - tanks) % BOSS_CELLS)
            .collect();

        // Assemble every boss state before anything is exposed.
        let mut states: Vec<Option<bool>> = vec![None; bosses.len()];
        let mut claimed = vec![false; relative.len()];
        for (boss, state) in bosses.iter().zip(states.iter_mut()) {
            let alive = relative.iter().position(|&c| c == boss.alive_code);
            let dead = relative.iter().position(|&c| c == boss.dead_code);
            match (alive, dead) {
                (Some(_), Some(_)) => {
                    return Err(CoreError::invalid(format!(
                        "{} is marked both alive and defeated",
                        boss.name
                    )));
                }
                (Some(i), None) | (None, Some(i)) => {
                    claimed[i] = true;
                    *state = Some(dead.is_some());
                }
                (None, None) => {
                    return Err(CoreError::invalid(format!("no cell for {}", boss.name)));
                }
            }
        }
        if let Some(i) = claimed.iter().position(|&c| !c) {
            return Err(CoreError::invalid(format!(
                "cell {} matches no boss",
                code_to_cell(codes[i + 1])
            )));
        }

        let defeated = states
            .into_iter()
            .map(|s| s.ok_or_else(|| CoreError::invalid("unresolved boss state")))
            .collect::<Result<Vec<bool>>>()?;
        debug!(game = %bosses.game, tanks, "decoded cell password");
        Ok(Self {
            bosses,
            tanks,
            defeated,
        })
    }

    pub fn game(&self) -> Game {
        self.bosses.game
    }

    pub fn tanks(&self) -> u8 {
        self.tanks
    }

    pub fn set_tanks(&mut self, tanks: u8) -> Result<()> {
        if tanks > MAX_TANKS {
            return Err(CoreError::range(
                TANKS_FIELD,
                i64::from(tanks),
                0,
                i64::from(MAX_TANKS),
            ));
        }
        self.tanks = tanks;
        Ok(())
    }

    pub fn is_defeated(&self, boss: &str) -> Result<bool> {
        let i = self
            .bosses
            .position(boss)
            .ok_or_else(|| CoreError::UnknownField(boss.to_string()))?;
        Ok(self.defeated[i])
    }

    pub fn set_defeated(&mut self, boss: &str, defeated: bool) -> Result<()> {
        let i = self
            .bosses
            .position(boss)
            .ok_or_else(|| CoreError::UnknownField(boss.to_string()))?;
        self.defeated[i] = defeated;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<i64> {
        if id == TANKS_FIELD {
            return Ok(i64::from(self.tanks));
        }
        self.is_defeated(id).map(i64::from)
    }

    pub fn set(&mut self, id: &str, value: i64) -> Result<()> {
        if id == TANKS_FIELD {
            let tanks = u8::try_from(value)
                .map_err(|_| CoreError::range(TANKS_FIELD, value, 0, i64::from(MAX_TANKS)))?;
            return self.set_tanks(tanks);
        }
        if self.bosses.position(id).is_none() {
            return Err(CoreError::UnknownField(id.to_string()));
        }
        match value {
            0 | 1 => self.set_defeated(id, value == 1),
            _ => Err(CoreError::range(id, value, 0, 1)),
        }
    }

    /// `tanks` first, then bosses in table order.
    pub fn entries(&self) -> Vec<FieldEntry> {
        let mut out = Vec::with_capacity(self.bosses.len() + 1);
        out.push(FieldEntry {
            name: TANKS_FIELD.to_string(),
            value: i64::from(self.tanks),
        });
        for (boss, &defeated) in self.bosses.iter().zip(&self.defeated) {
            out.push(FieldEntry {
                name: boss.name.clone(),
                value: i64::from(defeated),
            });
        }
        out
    }

    /// Cell codes in canonical (sorted) order.
    pub fn codes(&self) -> Vec<u8> {
        let mut codes: Vec<u8> = self
            .bosses
            .iter()
            .zip(&self.defeated)
            .map(|(boss, &defeated)| (boss.code(defeated) + self.tanks) % BOSS_CELLS + COLUMNS)
            .collect();
        codes.push(self.tanks);
        codes.sort_unstable();
        codes
    }
}

impl fmt::Display for CellPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self.codes().into_iter().map(code_to_cell).collect();
        f.write_str(&cells.join(" "))
    }
}
