use serde::{Deserialize, Serialize};

use crate::fixtures::canonical_player;
use crate::season::SeasonId;
use crate::standings::{PLAYER_COLUMN, StandingsSchema, StandingsTable};

pub const DEFAULT_SPLIT_SEASON: u32 = 5;
pub const DEFAULT_POSITION_CUTOFF: u32 = 16;

const DIVISION_TWO_SPELLINGS: [&str; 3] = ["DIV 2", "DIV2", "DIVISION 2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Division1,
    Division2,
    Unknown,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Division1 => "Division 1",
            Tier::Division2 => "Division 2",
            Tier::Unknown => "Unknown",
        }
    }

    /// Lower is better: every Division 1 finish outranks every Division 2 one.
    pub fn rank(self) -> u8 {
        match self {
            Tier::Division1 => 0,
            Tier::Division2 => 1,
            Tier::Unknown => 2,
        }
    }
}

pub trait DivisionClassifier: Send + Sync {
    fn classify(&self, player: &str, table: &StandingsTable, season: &SeasonId) -> Tier;
}

/// Splits a dashboard table at the first "SEASON .. DIV 2" section header.
#[derive(Debug, Clone, Copy)]
pub struct SectionMarkerClassifier {
    pub split_from_season: u32,
    pub position_cutoff: u32,
}

impl Default for SectionMarkerClassifier {
    fn default() -> Self {
        Self {
            split_from_season: DEFAULT_SPLIT_SEASON,
            position_cutoff: DEFAULT_POSITION_CUTOFF,
        }
    }
}

impl SectionMarkerClassifier {
    pub fn new(split_from_season: u32) -> Self {
        Self {
            split_from_season,
            ..Self::default()
        }
    }

    fn position_fallback(&self, player: &str, table: &StandingsTable) -> Tier {
        let Some(col) = table.column(PLAYER_COLUMN) else {
            return Tier::Unknown;
        };
        let wanted = strip_handle(player);
        let schema = StandingsSchema::resolve(table);
        let position = (0..table.rows.len())
            .find(|&i| {
                let handle = table.cell(i, col);
                !handle.is_empty() && strip_handle(handle) == wanted
            })
            .and_then(|i| schema.row(table, i).position);
        match position {
            Some(pos) if pos <= self.position_cutoff => Tier::Division1,
            Some(_) => Tier::Division2,
            None => Tier::Unknown,
        }
    }
}

impl DivisionClassifier for SectionMarkerClassifier {
    fn classify(&self, player: &str, table: &StandingsTable, season: &SeasonId) -> Tier {
        if season
            .number()
            .is_some_and(|n| n < self.split_from_season)
        {
            return Tier::Division1;
        }
        let Some(col) = table.column(PLAYER_COLUMN) else {
            return Tier::Unknown;
        };

        let wanted = canonical_player(player);
        let mut in_division_two = false;
        for i in 0..table.rows.len() {
            if is_division_two_marker(&table.row_text(i)) {
                in_division_two = true;
                continue;
            }
            if table.cell(i, col) == wanted {
                return if in_division_two {
                    Tier::Division2
                } else {
                    Tier::Division1
                };
            }
        }

        self.position_fallback(player, table)
    }
}

pub fn is_division_two_marker(row_text: &str) -> bool {
    let upper = row_text.to_uppercase();
    upper.contains("SEASON") && DIVISION_TWO_SPELLINGS.iter().any(|m| upper.contains(m))
}

fn strip_handle(raw: &str) -> String {
    canonical_player(raw).trim_start_matches('@').to_string()
}

#[cfg(test)]
mod tests {
    use super::is_division_two_marker;

    #[test]
    fn marker_needs_season_and_div_two() {
        assert!(is_division_two_marker("FC26 SEASON 6 (DIV 2)"));
        assert!(is_division_two_marker("season 7 division 2"));
        assert!(!is_division_two_marker("DIV 2"));
        assert!(!is_division_two_marker("SEASON 6 (DIV 1)"));
    }
}
