use std::collections::BTreeMap;
use std::path::PathBuf;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cache::{Clock, TtlCache, app_cache_dir};
use crate::career::SeasonTables;
use crate::config::{FixtureSheets, SheetLocation, SheetsAuth};
use crate::fixtures::{Competition, Fixture, parse_cup_rows, parse_division_rows};
use crate::h2h;
use crate::season::SeasonId;
use crate::sheets::{CsvDirectory, GoogleSheet, WorksheetSource};
use crate::standings::{StandingsTable, parse_standings};

const SEASON_CACHE_FILE: &str = "seasons.json";

/// Everything parsed out of one season's spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonData {
    pub fixtures: Vec<Fixture>,
    pub table: StandingsTable,
}

impl SeasonData {
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty() && self.table.is_empty()
    }
}

pub type SeasonCache = TtlCache<SeasonData>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeagueData {
    pub fixtures: Vec<Fixture>,
    pub tables: SeasonTables,
}

impl LeagueData {
    pub fn from_seasons(seasons: BTreeMap<SeasonId, SeasonData>) -> Self {
        let mut out = Self::default();
        for (season, data) in seasons {
            out.fixtures.extend(data.fixtures);
            out.tables.insert(season, data.table);
        }
        out
    }

    pub fn seasons(&self) -> Vec<SeasonId> {
        self.tables.keys().cloned().collect()
    }

    pub fn players(&self) -> Vec<String> {
        h2h::players(&self.fixtures)
    }

    /// The league cut down to its most recent `n` seasons.
    pub fn last_seasons(&self, n: usize) -> LeagueData {
        let keep = crate::career::last_seasons(&self.tables, n);
        LeagueData {
            fixtures: self
                .fixtures
                .iter()
                .filter(|f| keep.contains(&f.season))
                .cloned()
                .collect(),
            tables: self
                .tables
                .iter()
                .filter(|(season, _)| keep.contains(season))
                .map(|(season, table)| (season.clone(), table.clone()))
                .collect(),
        }
    }
}

pub fn dashboard_sheet_name(season: &SeasonId) -> String {
    format!("LEAGUE DASHBOARD-{season}")
}

pub fn open_source(
    location: &SheetLocation,
    auth: &SheetsAuth,
) -> Option<Box<dyn WorksheetSource>> {
    match location {
        SheetLocation::Google(raw) => GoogleSheet::from_url_or_id(raw)
            .map(|s| Box::new(s.with_auth(auth.clone())) as Box<dyn WorksheetSource>),
        SheetLocation::Directory(path) => Some(Box::new(CsvDirectory::new(path.clone()))),
    }
}

pub fn default_cache_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(SEASON_CACHE_FILE))
}

/// Fixtures from every configured division sheet plus the cup sheet. A sheet
/// that is missing or fails to load contributes nothing.
pub fn load_season_fixtures(
    source: &dyn WorksheetSource,
    season: &SeasonId,
    sheets: &FixtureSheets,
) -> Vec<Fixture> {
    let mut out = Vec::new();
    let divisions = [
        (sheets.division1.as_deref(), Competition::Division1),
        (sheets.division2.as_deref(), Competition::Division2),
    ];
    for (name, competition) in divisions {
        let Some(name) = name else {
            continue;
        };
        if let Some(rows) = fetch_rows(source, season, name) {
            out.extend(parse_division_rows(&rows, season, competition));
        }
    }
    if let Some(name) = sheets.cup.as_deref()
        && let Some(rows) = fetch_rows(source, season, name)
    {
        out.extend(parse_cup_rows(&rows, season));
    }
    out
}

pub fn load_season_table(source: &dyn WorksheetSource, season: &SeasonId) -> StandingsTable {
    fetch_rows(source, season, &dashboard_sheet_name(season))
        .map(|rows| parse_standings(&rows))
        .unwrap_or_default()
}

pub fn load_season(
    source: &dyn WorksheetSource,
    season: &SeasonId,
    sheets: &FixtureSheets,
) -> SeasonData {
    let data = SeasonData {
        fixtures: load_season_fixtures(source, season, sheets),
        table: load_season_table(source, season),
    };
    log::info!(
        "{season}: {} fixtures, {} table rows",
        data.fixtures.len(),
        data.table.rows.len()
    );
    data
}

/// Load every season, serving fresh cache entries and fetching the rest in
/// parallel. Empty seasons are not cached so a failed fetch is retried.
pub fn load_league(
    seasons: &[(SeasonId, Box<dyn WorksheetSource>)],
    sheets: &FixtureSheets,
    cache: &mut SeasonCache,
    clock: &dyn Clock,
    parallelism: usize,
) -> LeagueData {
    let mut loaded: BTreeMap<SeasonId, SeasonData> = BTreeMap::new();
    let mut misses = Vec::new();
    for (season, source) in seasons {
        match cache.get(&cache_key(season, source.as_ref(), sheets), clock) {
            Some(data) => {
                log::debug!("{season}: served from cache");
                loaded.insert(season.clone(), data);
            }
            None => misses.push((season, source.as_ref())),
        }
    }

    let fetched: Vec<(SeasonId, String, SeasonData)> = with_fetch_pool(parallelism, || {
        misses
            .par_iter()
            .map(|(season, source)| {
                (
                    (*season).clone(),
                    cache_key(season, *source, sheets),
                    load_season(*source, season, sheets),
                )
            })
            .collect()
    });

    for (season, key, data) in fetched {
        if !data.is_empty() {
            cache.insert(key, data.clone(), clock);
        }
        loaded.insert(season, data);
    }

    LeagueData::from_seasons(loaded)
}

/// Cache key for one season: the label plus where it was read from and which
/// fixture sheets were asked for, so a config change is a miss.
pub fn cache_key(season: &SeasonId, source: &dyn WorksheetSource, sheets: &FixtureSheets) -> String {
    let sheet = |name: &Option<String>| name.clone().unwrap_or_else(|| "-".to_string());
    format!(
        "{season}|{}|{}|{}|{}",
        source.describe(),
        sheet(&sheets.division1),
        sheet(&sheets.division2),
        sheet(&sheets.cup)
    )
}

fn fetch_rows(
    source: &dyn WorksheetSource,
    season: &SeasonId,
    name: &str,
) -> Option<Vec<Vec<String>>> {
    match source.worksheet(name) {
        Ok(Some(rows)) => Some(rows),
        Ok(None) => {
            log::warn!("{season}: worksheet '{name}' not found in {}", source.describe());
            None
        }
        Err(err) => {
            log::warn!("{season}: could not load worksheet '{name}': {err:#}");
            None
        }
    }
}

fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
