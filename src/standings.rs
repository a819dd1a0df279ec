use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::fixtures::canonical_player;

/// Header of the player-handle column; also the sentinel that marks the
/// header row inside a dashboard worksheet.
pub const PLAYER_COLUMN: &str = "Twitter Handles";

pub const STAT_COLUMNS: [&str; 8] = ["MP", "W", "D", "L", "GF", "GA", "GD", "Points"];

const POSITION_COLUMN: &str = "Position";
const COMBINED_GOALS_COLUMN: &str = "+/-";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl StandingsTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Non-empty cells of a row joined by a space.
    pub fn row_text(&self, row: usize) -> String {
        self.rows
            .get(row)
            .map(|cells| {
                cells
                    .iter()
                    .filter(|c| !c.is_empty())
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    /// True for a header row repeated inside the data, e.g. under a
    /// division section marker.
    pub fn is_repeated_header(&self, row: usize) -> bool {
        self.column(PLAYER_COLUMN)
            .is_some_and(|col| self.cell(row, col) == canonical_player(PLAYER_COLUMN))
    }

    pub fn has_player_column(&self) -> bool {
        self.column(PLAYER_COLUMN).is_some()
    }

    /// Index of the first row whose handle equals `player` (canonical form).
    pub fn find_player(&self, player: &str) -> Option<usize> {
        let col = self.column(PLAYER_COLUMN)?;
        let wanted = canonical_player(player);
        (0..self.rows.len()).find(|&i| self.cell(i, col) == wanted)
    }
}

/// Locate the header row (first row holding the player-column sentinel) and
/// slice the table out from under it. No sentinel yields an empty table.
pub fn parse_standings(rows: &[Vec<String>]) -> StandingsTable {
    let Some(header_idx) = rows
        .iter()
        .position(|row| row.iter().any(|cell| cell.trim() == PLAYER_COLUMN))
    else {
        return StandingsTable::default();
    };

    let mut seen = HashSet::new();
    let mut kept: Vec<(usize, String)> = Vec::new();
    for (idx, cell) in rows[header_idx].iter().enumerate() {
        let name = cell.trim().to_string();
        if seen.insert(name.clone()) {
            kept.push((idx, name));
        }
    }

    let player_col = kept.iter().position(|(_, name)| name == PLAYER_COLUMN);
    let data = rows[header_idx + 1..]
        .iter()
        .map(|row| {
            kept.iter()
                .enumerate()
                .map(|(out_idx, (src_idx, _))| {
                    let cell = row.get(*src_idx).map(String::as_str).unwrap_or("");
                    if Some(out_idx) == player_col {
                        canonical_player(cell)
                    } else {
                        cell.to_string()
                    }
                })
                .collect()
        })
        .collect();

    StandingsTable {
        columns: kept.into_iter().map(|(_, name)| name).collect(),
        rows: data,
    }
}

/// How a season's table encodes goals for/against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalColumns {
    Split { gf: usize, ga: usize },
    Combined(usize),
    Absent,
}

/// Column indices resolved once per table; a missing column stays `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandingsSchema {
    pub player: Option<usize>,
    pub matches_played: Option<usize>,
    pub wins: Option<usize>,
    pub draws: Option<usize>,
    pub losses: Option<usize>,
    pub points: Option<usize>,
    pub position: Option<usize>,
    pub goals: GoalColumns,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub player: String,
    pub matches_played: i64,
    pub wins: i64,
    pub draws: i64,
    pub losses: i64,
    pub goals_for: i64,
    pub goals_against: i64,
    pub goal_difference: i64,
    pub points: i64,
    pub position: Option<u32>,
}

impl StandingsSchema {
    pub fn resolve(table: &StandingsTable) -> Self {
        let goals = match (table.column("GF"), table.column("GA")) {
            (Some(gf), Some(ga)) => GoalColumns::Split { gf, ga },
            _ => table
                .columns
                .iter()
                .position(|c| squash(c) == COMBINED_GOALS_COLUMN)
                .map(GoalColumns::Combined)
                .unwrap_or(GoalColumns::Absent),
        };
        Self {
            player: table.column(PLAYER_COLUMN),
            matches_played: table.column("MP"),
            wins: table.column("W"),
            draws: table.column("D"),
            losses: table.column("L"),
            points: table.column("Points"),
            position: table.column(POSITION_COLUMN),
            goals,
        }
    }

    pub fn row(&self, table: &StandingsTable, idx: usize) -> StandingsRow {
        let stat = |col: Option<usize>| col.map(|c| parse_stat(table.cell(idx, c))).unwrap_or(0);
        let (goals_for, goals_against) = match self.goals {
            GoalColumns::Split { gf, ga } => {
                match (
                    parse_stat_strict(table.cell(idx, gf)),
                    parse_stat_strict(table.cell(idx, ga)),
                ) {
                    (Some(gf), Some(ga)) => (gf, ga),
                    _ => (0, 0),
                }
            }
            GoalColumns::Combined(col) => parse_combined_goals(table.cell(idx, col)).unwrap_or((0, 0)),
            GoalColumns::Absent => (0, 0),
        };
        StandingsRow {
            player: self
                .player
                .map(|c| table.cell(idx, c).to_string())
                .unwrap_or_default(),
            matches_played: stat(self.matches_played),
            wins: stat(self.wins),
            draws: stat(self.draws),
            losses: stat(self.losses),
            goals_for,
            goals_against,
            goal_difference: goals_for - goals_against,
            points: stat(self.points),
            position: self
                .position
                .and_then(|c| table.cell(idx, c).trim().parse::<u32>().ok()),
        }
    }
}

/// Lenient stat coercion: thousands separators stripped, float fallback,
/// anything else counts as zero.
pub fn parse_stat(cell: &str) -> i64 {
    parse_stat_strict(cell)
        .or_else(|| {
            let cleaned = cell.replace(',', "");
            cleaned
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.trunc() as i64)
        })
        .unwrap_or(0)
}

fn parse_stat_strict(cell: &str) -> Option<i64> {
    cell.replace(',', "").trim().parse::<i64>().ok()
}

/// `"362/120"` -> `(362, 120)`.
pub fn parse_combined_goals(cell: &str) -> Option<(i64, i64)> {
    let (gf, ga) = cell.trim().split_once('/')?;
    let gf = parse_stat_strict(gf)?;
    let ga = parse_stat_strict(ga)?;
    Some((gf, ga))
}

fn squash(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}
