use serde::{Deserialize, Serialize};

use crate::round_label::normalize_round_label;
use crate::season::SeasonId;

const HOME_CELL: usize = 2;
const AWAY_CELL: usize = 3;
const LEG1_CELLS: (usize, usize) = (4, 5);
const LEG2_CELLS: (usize, usize) = (7, 8);
const MIN_MATCH_CELLS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Competition {
    Division1,
    Division2,
    Cup,
}

impl Competition {
    pub fn label(self) -> &'static str {
        match self {
            Competition::Division1 => "Division 1",
            Competition::Division2 => "Division 2",
            Competition::Cup => "CUP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub season: SeasonId,
    pub competition: Competition,
    pub round: Option<String>,
    pub home: String,
    pub away: String,
    pub home_leg1: Option<i32>,
    pub away_leg1: Option<i32>,
    pub home_leg2: Option<i32>,
    pub away_leg2: Option<i32>,
}

/// One played leg of a fixture, scores from the home side's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    pub number: u8,
    pub home_score: i32,
    pub away_score: i32,
}

impl Fixture {
    /// Legs with both scores present, leg 1 first. Unplayed legs are skipped.
    pub fn legs(&self) -> impl Iterator<Item = Leg> + '_ {
        [
            (1u8, self.home_leg1, self.away_leg1),
            (2u8, self.home_leg2, self.away_leg2),
        ]
        .into_iter()
        .filter_map(|(number, home, away)| {
            let (Some(home_score), Some(away_score)) = (home, away) else {
                return None;
            };
            Some(Leg {
                number,
                home_score,
                away_score,
            })
        })
    }

    pub fn involves(&self, player: &str) -> bool {
        self.home.eq_ignore_ascii_case(player) || self.away.eq_ignore_ascii_case(player)
    }
}

/// Canonical player handle: trimmed and lower-cased.
pub fn canonical_player(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parse a league division worksheet. Round headers are any row with a
/// cell mentioning ROUND; their text goes through the round normalizer.
pub fn parse_division_rows(
    rows: &[Vec<String>],
    season: &SeasonId,
    competition: Competition,
) -> Vec<Fixture> {
    let mut out = Vec::new();
    let mut current_round: Option<String> = None;

    for row in rows {
        if row
            .iter()
            .any(|cell| !cell.is_empty() && cell.to_uppercase().contains("ROUND"))
        {
            current_round = Some(normalize_round_label(&joined_cells(row)));
            continue;
        }
        if let Some(fixture) = parse_match_row(row, season, competition, &current_round) {
            out.push(fixture);
        }
    }

    out
}

/// Parse the cup worksheet. A header is a lone non-empty cell with the two
/// name cells empty, e.g. "Playoffs" or "R of 32"; it is kept verbatim.
pub fn parse_cup_rows(rows: &[Vec<String>], season: &SeasonId) -> Vec<Fixture> {
    let mut out = Vec::new();
    let mut current_round: Option<String> = None;

    for row in rows {
        let filled = row.iter().filter(|cell| !cell.is_empty()).count();
        if filled == 1 && cell_is_blank(row, HOME_CELL) && cell_is_blank(row, AWAY_CELL) {
            current_round = Some(joined_cells(row));
            continue;
        }
        if let Some(fixture) = parse_match_row(row, season, Competition::Cup, &current_round) {
            out.push(fixture);
        }
    }

    out
}

fn parse_match_row(
    row: &[String],
    season: &SeasonId,
    competition: Competition,
    round: &Option<String>,
) -> Option<Fixture> {
    if row.len() < MIN_MATCH_CELLS {
        return None;
    }
    let home = &row[HOME_CELL];
    let away = &row[AWAY_CELL];
    if home.is_empty() || away.is_empty() {
        return None;
    }

    let (home_leg1, away_leg1) = parse_leg(row, LEG1_CELLS);
    let (home_leg2, away_leg2) = parse_leg(row, LEG2_CELLS);

    Some(Fixture {
        season: season.clone(),
        competition,
        round: round.clone(),
        home: canonical_player(home),
        away: canonical_player(away),
        home_leg1,
        away_leg1,
        home_leg2,
        away_leg2,
    })
}

fn parse_leg(row: &[String], (home_idx, away_idx): (usize, usize)) -> (Option<i32>, Option<i32>) {
    let home = row.get(home_idx).and_then(|cell| parse_score(cell));
    let away = row.get(away_idx).and_then(|cell| parse_score(cell));
    match (home, away) {
        (Some(h), Some(a)) => (Some(h), Some(a)),
        _ => (None, None),
    }
}

/// Goals are small non-negative counts; anything else is an unplayed leg.
fn parse_score(cell: &str) -> Option<i32> {
    cell.trim().parse::<u16>().ok().map(i32::from)
}

fn joined_cells(row: &[String]) -> String {
    row.iter()
        .filter(|cell| !cell.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

fn cell_is_blank(row: &[String], idx: usize) -> bool {
    row.get(idx).is_none_or(|cell| cell.trim().is_empty())
}
