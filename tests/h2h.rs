use std::path::PathBuf;

use h2h_dashboard::config::FixtureSheets;
use h2h_dashboard::fixtures::{Competition, Fixture};
use h2h_dashboard::h2h::{get_h2h, head_to_head_leader_first, players};
use h2h_dashboard::league::load_season_fixtures;
use h2h_dashboard::season::SeasonId;
use h2h_dashboard::sheets::CsvDirectory;

fn fixture(
    season: &str,
    home: &str,
    away: &str,
    leg1: (Option<i32>, Option<i32>),
    leg2: (Option<i32>, Option<i32>),
) -> Fixture {
    Fixture {
        season: SeasonId::new(season),
        competition: Competition::Division1,
        round: None,
        home: home.to_string(),
        away: away.to_string(),
        home_leg1: leg1.0,
        away_leg1: leg1.1,
        home_leg2: leg2.0,
        away_leg2: leg2.1,
    }
}

fn league_fixtures() -> Vec<Fixture> {
    let mut out = Vec::new();
    for season in ["S4", "S5"] {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("tests");
        path.push("fixtures");
        path.push(season);
        out.extend(load_season_fixtures(
            &CsvDirectory::new(path),
            &SeasonId::new(season),
            &FixtureSheets::default(),
        ));
    }
    out
}

#[test]
fn two_played_legs_give_a_win_and_a_draw() {
    let fixtures = vec![fixture("S1", "amy", "bo", (Some(2), Some(1)), (Some(0), Some(0)))];
    let h2h = get_h2h(&fixtures, "amy", "bo");
    assert_eq!(h2h.matches.len(), 2);
    assert_eq!((h2h.wins, h2h.draws, h2h.losses), (1, 1, 0));
    assert_eq!(h2h.matches[0].leg, 1);
    assert_eq!(h2h.matches[1].leg, 2);
}

#[test]
fn half_recorded_leg_is_not_a_match() {
    let fixtures = vec![fixture("S1", "amy", "bo", (Some(3), Some(1)), (None, Some(2)))];
    let h2h = get_h2h(&fixtures, "amy", "bo");
    assert_eq!(h2h.matches.len(), 1);
    assert_eq!(h2h.matches[0].home_score, 3);
    assert_eq!(h2h.matches[0].away_score, 1);
}

#[test]
fn away_wins_count_for_the_perspective_player() {
    let fixtures = vec![fixture("S1", "bo", "amy", (Some(0), Some(2)), (Some(3), Some(1)))];
    let h2h = get_h2h(&fixtures, "amy", "bo");
    assert_eq!((h2h.wins, h2h.draws, h2h.losses), (1, 0, 1));

    let flipped = get_h2h(&fixtures, "bo", "amy");
    assert_eq!((flipped.wins, flipped.draws, flipped.losses), (1, 0, 1));
    assert_eq!(flipped.matches, h2h.matches);
}

#[test]
fn other_pairings_are_ignored() {
    let fixtures = vec![
        fixture("S1", "amy", "cy", (Some(5), Some(0)), (None, None)),
        fixture("S1", "cy", "bo", (Some(1), Some(0)), (None, None)),
    ];
    let h2h = get_h2h(&fixtures, "amy", "bo");
    assert!(h2h.matches.is_empty());
    assert_eq!((h2h.wins, h2h.draws, h2h.losses), (0, 0, 0));
}

#[test]
fn counts_add_up_across_seasons_and_competitions() {
    let fixtures = league_fixtures();
    let h2h = get_h2h(&fixtures, "amy", "bo");

    assert_eq!(h2h.matches.len(), 5);
    assert_eq!((h2h.wins, h2h.draws, h2h.losses), (1, 3, 1));
    assert_eq!(
        (h2h.wins + h2h.draws + h2h.losses) as usize,
        h2h.matches.len()
    );
    assert_eq!(h2h.matches[0].season, SeasonId::new("S4"));
    assert_eq!(h2h.matches[0].round.as_deref(), Some("Round 1"));
    let last = h2h.matches.last().expect("cup leg");
    assert_eq!(last.competition, Competition::Cup);
    assert_eq!(last.round.as_deref(), Some("R of 16"));
}

#[test]
fn every_pair_sums_to_its_match_count() {
    let fixtures = league_fixtures();
    let roster = players(&fixtures);
    for p1 in &roster {
        for p2 in &roster {
            let h2h = get_h2h(&fixtures, p1, p2);
            assert_eq!((h2h.wins + h2h.draws + h2h.losses) as usize, h2h.matches.len());
        }
    }
}

#[test]
fn leader_is_reported_first() {
    let fixtures = vec![fixture("S1", "amy", "bo", (Some(0), Some(2)), (Some(1), Some(1)))];
    let (left, right, h2h) = head_to_head_leader_first(&fixtures, "amy", "bo");
    assert_eq!(left, "bo");
    assert_eq!(right, "amy");
    assert_eq!((h2h.wins, h2h.draws, h2h.losses), (1, 1, 0));
}

#[test]
fn players_are_sorted_and_unique() {
    let fixtures = league_fixtures();
    assert_eq!(players(&fixtures), vec!["amy", "bo", "cy", "dee", "eve", "fay"]);
}

#[test]
fn profile_handles_feed_the_direct_record() {
    use h2h_dashboard::career::{SeasonTables, player_career};
    use h2h_dashboard::division::SectionMarkerClassifier;

    let fixtures = league_fixtures();
    let classifier = SectionMarkerClassifier::default();
    let left = player_career(" Amy ", &SeasonTables::new(), &fixtures, &classifier);
    let right = player_career("BO", &SeasonTables::new(), &fixtures, &classifier);

    let direct = get_h2h(&fixtures, &left.player, &right.player);
    assert_eq!(direct.matches.len(), 5);
    assert_eq!((direct.wins, direct.draws, direct.losses), (1, 3, 1));
}
