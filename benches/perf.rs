use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use h2h_dashboard::career::{SeasonTables, player_career};
use h2h_dashboard::division::SectionMarkerClassifier;
use h2h_dashboard::fixtures::{Competition, Fixture, parse_division_rows};
use h2h_dashboard::h2h::get_h2h;
use h2h_dashboard::season::SeasonId;
use h2h_dashboard::sheets::parse_csv_rows;
use h2h_dashboard::standings::parse_standings;

const PLAYERS: usize = 32;

fn handle(i: usize) -> String {
    format!("player{i}")
}

/// Double round robin laid out the way the division sheets are.
fn division_csv() -> String {
    let mut out = String::new();
    let mut match_no = 0;
    for round in 1..PLAYERS {
        out.push_str(&format!(",,ROUND {round},,,,,,\n"));
        for i in 0..PLAYERS / 2 {
            let home = (round + i) % PLAYERS;
            let away = (round + PLAYERS - 1 - i) % PLAYERS;
            match_no += 1;
            out.push_str(&format!(
                ",{match_no},{},{},{},{},,{},{}\n",
                handle(home),
                handle(away),
                i % 4,
                round % 3,
                round % 5,
                i % 2
            ));
        }
    }
    out
}

fn dashboard_csv(season: u32) -> String {
    let mut out = String::from("Position,Twitter Handles,MP,W,D,L,GF,GA,GD,Points\n");
    for i in 0..PLAYERS {
        if i == PLAYERS / 2 {
            out.push_str(&format!("FC26 SEASON {season} (DIV 2),,,,,,,,,\n"));
        }
        out.push_str(&format!(
            "{},{},62,30,12,20,90,70,20,102\n",
            i % (PLAYERS / 2) + 1,
            handle(i)
        ));
    }
    out
}

fn league(seasons: u32) -> (SeasonTables, Vec<Fixture>) {
    let division = parse_csv_rows(&division_csv()).expect("generated csv");
    let mut tables = SeasonTables::new();
    let mut fixtures = Vec::new();
    for n in 1..=seasons {
        let season = SeasonId::new(format!("S{n}"));
        let dashboard = parse_csv_rows(&dashboard_csv(n)).expect("generated csv");
        tables.insert(season.clone(), parse_standings(&dashboard));
        fixtures.extend(parse_division_rows(&division, &season, Competition::Division1));
    }
    (tables, fixtures)
}

fn bench_division_parse(c: &mut Criterion) {
    let rows = parse_csv_rows(&division_csv()).expect("generated csv");
    let season = SeasonId::new("S6");
    c.bench_function("division_sheet_parse", |b| {
        b.iter(|| {
            let fixtures = parse_division_rows(black_box(&rows), &season, Competition::Division1);
            black_box(fixtures.len());
        })
    });
}

fn bench_standings_parse(c: &mut Criterion) {
    let rows = parse_csv_rows(&dashboard_csv(6)).expect("generated csv");
    c.bench_function("standings_parse", |b| {
        b.iter(|| {
            let table = parse_standings(black_box(&rows));
            black_box(table.rows.len());
        })
    });
}

fn bench_head_to_head(c: &mut Criterion) {
    let (_, fixtures) = league(10);
    c.bench_function("head_to_head_10_seasons", |b| {
        b.iter(|| {
            let h2h = get_h2h(black_box(&fixtures), "player3", "player17");
            black_box(h2h.matches.len());
        })
    });
}

fn bench_player_career(c: &mut Criterion) {
    let (tables, fixtures) = league(10);
    let classifier = SectionMarkerClassifier::default();
    c.bench_function("player_career_10_seasons", |b| {
        b.iter(|| {
            let stats = player_career(black_box("player20"), &tables, &fixtures, &classifier);
            black_box(stats.totals.points);
        })
    });
}

criterion_group!(
    perf,
    bench_division_parse,
    bench_standings_parse,
    bench_head_to_head,
    bench_player_career
);
criterion_main!(perf);
