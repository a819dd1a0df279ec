use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::division::{DivisionClassifier, Tier, is_division_two_marker};
use crate::fixtures::{Competition, Fixture, canonical_player};
use crate::season::SeasonId;
use crate::standings::{PLAYER_COLUMN, StandingsRow, StandingsSchema, StandingsTable};

pub type SeasonTables = BTreeMap<SeasonId, StandingsTable>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerTotals {
    pub matches_played: i64,
    pub wins: i64,
    pub draws: i64,
    pub losses: i64,
    pub goals_for: i64,
    pub goals_against: i64,
    pub goal_difference: i64,
    pub points: i64,
}

impl CareerTotals {
    fn add(&mut self, row: &StandingsRow) {
        self.matches_played += row.matches_played;
        self.wins += row.wins;
        self.draws += row.draws;
        self.losses += row.losses;
        self.goals_for += row.goals_for;
        self.goals_against += row.goals_against;
        self.goal_difference = self.goals_for - self.goals_against;
        self.points += row.points;
    }

    /// Wins as a percentage of matches played, one decimal.
    pub fn win_rate(&self) -> f64 {
        if self.matches_played <= 0 {
            return 0.0;
        }
        let pct = self.wins as f64 / self.matches_played as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonLine {
    pub season: SeasonId,
    pub tier: Tier,
    pub position: u32,
    pub stats: StandingsRow,
}

impl SeasonLine {
    fn standing_key(&self) -> (u8, u32) {
        (self.tier.rank(), self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSnapshot {
    pub position: u32,
    pub tier: Tier,
}

/// A single leg seen from the player's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotableResult {
    pub season: SeasonId,
    pub competition: Competition,
    pub round: Option<String>,
    pub opponent: String,
    pub goals_for: i32,
    pub goals_against: i32,
}

impl NotableResult {
    pub fn margin(&self) -> i32 {
        self.goals_for - self.goals_against
    }

    pub fn score(&self) -> String {
        format!("{}-{}", self.goals_for, self.goals_against)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerCareerStats {
    pub player: String,
    pub totals: CareerTotals,
    pub seasons: Vec<SeasonLine>,
    pub snapshots: BTreeMap<SeasonId, SeasonSnapshot>,
    pub best_season: Option<SeasonLine>,
    pub worst_season: Option<SeasonLine>,
    pub largest_win: Option<NotableResult>,
    pub largest_defeat: Option<NotableResult>,
}

impl PlayerCareerStats {
    pub fn participated(&self) -> bool {
        !self.seasons.is_empty()
    }
}

pub fn player_career(
    player: &str,
    tables: &SeasonTables,
    fixtures: &[Fixture],
    classifier: &dyn DivisionClassifier,
) -> PlayerCareerStats {
    let player = canonical_player(player);
    let mut stats = PlayerCareerStats {
        player: player.clone(),
        ..PlayerCareerStats::default()
    };

    for (season, table) in tables {
        let Some(line) = season_line(&player, season, table, classifier) else {
            continue;
        };
        stats.totals.add(&line.stats);
        stats.snapshots.insert(
            season.clone(),
            SeasonSnapshot {
                position: line.position,
                tier: line.tier,
            },
        );
        if stats
            .best_season
            .as_ref()
            .is_none_or(|best| line.standing_key() < best.standing_key())
        {
            stats.best_season = Some(line.clone());
        }
        if stats
            .worst_season
            .as_ref()
            .is_none_or(|worst| line.standing_key() > worst.standing_key())
        {
            stats.worst_season = Some(line.clone());
        }
        stats.seasons.push(line);
    }

    let (largest_win, largest_defeat) = largest_margins(&player, fixtures);
    stats.largest_win = largest_win;
    stats.largest_defeat = largest_defeat;
    stats
}

fn season_line(
    player: &str,
    season: &SeasonId,
    table: &StandingsTable,
    classifier: &dyn DivisionClassifier,
) -> Option<SeasonLine> {
    let idx = table.find_player(player)?;
    let schema = StandingsSchema::resolve(table);
    let row = schema.row(table, idx);
    let position = row
        .position
        .unwrap_or_else(|| ordinal_position(table, idx));
    Some(SeasonLine {
        season: season.clone(),
        tier: classifier.classify(player, table, season),
        position,
        stats: row,
    })
}

/// 1-based rank of `idx` among the table's player rows. Section markers
/// and repeated header rows are not players.
fn ordinal_position(table: &StandingsTable, idx: usize) -> u32 {
    let Some(col) = table.column(PLAYER_COLUMN) else {
        return idx as u32 + 1;
    };
    let preceding = (0..idx)
        .filter(|&i| {
            !table.cell(i, col).is_empty()
                && !table.is_repeated_header(i)
                && !is_division_two_marker(&table.row_text(i))
        })
        .count();
    preceding as u32 + 1
}

fn largest_margins(
    player: &str,
    fixtures: &[Fixture],
) -> (Option<NotableResult>, Option<NotableResult>) {
    let mut win: Option<NotableResult> = None;
    let mut defeat: Option<NotableResult> = None;

    for fixture in fixtures.iter().filter(|f| f.involves(player)) {
        let at_home = fixture.home.eq_ignore_ascii_case(player);
        for leg in fixture.legs() {
            let (goals_for, goals_against, opponent) = if at_home {
                (leg.home_score, leg.away_score, &fixture.away)
            } else {
                (leg.away_score, leg.home_score, &fixture.home)
            };
            let result = NotableResult {
                season: fixture.season.clone(),
                competition: fixture.competition,
                round: fixture.round.clone(),
                opponent: opponent.clone(),
                goals_for,
                goals_against,
            };
            let margin = result.margin();
            if margin > 0 && win.as_ref().is_none_or(|w| margin > w.margin()) {
                win = Some(result);
            } else if margin < 0 && defeat.as_ref().is_none_or(|d| margin < d.margin()) {
                defeat = Some(result);
            }
        }
    }

    (win, defeat)
}

/// Summed league record for each player over the given tables.
pub fn combined_league_record(tables: &SeasonTables, players: &[&str]) -> Vec<(String, CareerTotals)> {
    players
        .iter()
        .map(|player| {
            let mut totals = CareerTotals::default();
            for table in tables.values() {
                let Some(idx) = table.find_player(player) else {
                    continue;
                };
                totals.add(&StandingsSchema::resolve(table).row(table, idx));
            }
            (canonical_player(player), totals)
        })
        .collect()
}

/// Keep only the most recent `n` seasons (all of them when `n` is larger).
pub fn last_seasons(tables: &SeasonTables, n: usize) -> Vec<SeasonId> {
    let skip = tables.len().saturating_sub(n);
    tables.keys().skip(skip).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_rate_rounds_to_one_decimal() {
        let totals = CareerTotals {
            matches_played: 3,
            wins: 1,
            ..CareerTotals::default()
        };
        assert_eq!(totals.win_rate(), 33.3);
        assert_eq!(CareerTotals::default().win_rate(), 0.0);
    }

    #[test]
    fn notable_result_score_is_player_first() {
        let result = NotableResult {
            season: SeasonId::new("S1"),
            competition: Competition::Cup,
            round: None,
            opponent: "bo".to_string(),
            goals_for: 1,
            goals_against: 4,
        };
        assert_eq!(result.score(), "1-4");
        assert_eq!(result.margin(), -3);
    }
}
