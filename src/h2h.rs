use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::fixtures::{Competition, Fixture};
use crate::season::SeasonId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct H2hMatch {
    pub season: SeasonId,
    pub competition: Competition,
    pub round: Option<String>,
    pub leg: u8,
    pub home: String,
    pub away: String,
    pub home_score: i32,
    pub away_score: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub matches: Vec<H2hMatch>,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

/// All played legs between `p1` and `p2`, counted from `p1`'s side.
/// Names are compared as given; callers pass canonical handles.
pub fn get_h2h(fixtures: &[Fixture], p1: &str, p2: &str) -> HeadToHead {
    let mut out = HeadToHead::default();

    for fixture in fixtures {
        let same_pair = (fixture.home == p1 && fixture.away == p2)
            || (fixture.home == p2 && fixture.away == p1);
        if !same_pair {
            continue;
        }
        for leg in fixture.legs() {
            if leg.home_score > leg.away_score && fixture.home == p1 {
                out.wins += 1;
            } else if leg.home_score < leg.away_score && fixture.away == p1 {
                out.wins += 1;
            } else if leg.home_score == leg.away_score {
                out.draws += 1;
            } else {
                out.losses += 1;
            }
            out.matches.push(H2hMatch {
                season: fixture.season.clone(),
                competition: fixture.competition,
                round: fixture.round.clone(),
                leg: leg.number,
                home: fixture.home.clone(),
                away: fixture.away.clone(),
                home_score: leg.home_score,
                away_score: leg.away_score,
            });
        }
    }

    out
}

/// Head-to-head with the leading player first: if `p1` has fewer wins than
/// losses the pair is swapped and recounted from `p2`'s side.
pub fn head_to_head_leader_first(
    fixtures: &[Fixture],
    p1: &str,
    p2: &str,
) -> (String, String, HeadToHead) {
    let h2h = get_h2h(fixtures, p1, p2);
    if h2h.wins < h2h.losses {
        return (p2.to_string(), p1.to_string(), get_h2h(fixtures, p2, p1));
    }
    (p1.to_string(), p2.to_string(), h2h)
}

/// Every distinct non-empty player handle, sorted.
pub fn players(fixtures: &[Fixture]) -> Vec<String> {
    fixtures
        .iter()
        .flat_map(|f| [f.home.as_str(), f.away.as_str()])
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
