use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::division::DEFAULT_SPLIT_SEASON;
use crate::season::SeasonId;

const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 3600;

/// Where one season's spreadsheet lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetLocation {
    Google(String),
    Directory(PathBuf),
}

/// Credentials for the Sheets API: an API key for publicly shared sheets or
/// an OAuth access token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetsAuth {
    pub api_key: Option<String>,
    pub access_token: Option<String>,
}

impl SheetsAuth {
    pub fn from_env() -> Self {
        Self {
            api_key: env_secret("GOOGLE_API_KEY"),
            access_token: env_secret("GOOGLE_ACCESS_TOKEN"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.access_token.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSheets {
    pub division1: Option<String>,
    pub division2: Option<String>,
    pub cup: Option<String>,
}

impl Default for FixtureSheets {
    fn default() -> Self {
        Self {
            division1: Some("Div1_Fixtures".to_string()),
            division2: Some("Div2_Fixtures".to_string()),
            cup: Some("Cup_Fixtures".to_string()),
        }
    }
}

impl FixtureSheets {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            division1: env_sheet_name("FIXTURES_DIV1_SHEET", defaults.division1),
            division2: env_sheet_name("FIXTURES_DIV2_SHEET", defaults.division2),
            cup: env_sheet_name("FIXTURES_CUP_SHEET", defaults.cup),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_title: String,
    pub seasons: Vec<(SeasonId, SheetLocation)>,
    pub sheets_auth: SheetsAuth,
    pub fixture_sheets: FixtureSheets,
    pub division_split_season: u32,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub fetch_parallelism: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let app_title = env::var("APP_TITLE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "H2H".to_string());

        let mut seasons = env::var("SEASON_SHEETS")
            .map(|raw| parse_season_sheets(&raw))
            .unwrap_or_default();
        if let Ok(dir) = env::var("LOCAL_SHEETS_DIR")
            && !dir.trim().is_empty()
        {
            seasons.extend(discover_season_dirs(&PathBuf::from(dir.trim())));
        }
        seasons.sort_by(|a, b| a.0.cmp(&b.0));
        seasons.dedup_by(|a, b| a.0 == b.0);

        let division_split_season = env::var("DIVISION_SPLIT_SEASON")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_SPLIT_SEASON);
        let cache_ttl_secs = env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);

        Self {
            app_title,
            seasons,
            sheets_auth: SheetsAuth::from_env(),
            fixture_sheets: FixtureSheets::from_env(),
            division_split_season,
            cache_enabled: env_bool("CACHE_ENABLED", true),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            fetch_parallelism: fetch_parallelism(),
        }
    }
}

/// `"S1=https://...;S2=<id>"` -> season/location pairs. Values that look
/// like paths rather than sheet URLs or ids map to a CSV directory.
pub fn parse_season_sheets(raw: &str) -> Vec<(SeasonId, SheetLocation)> {
    raw.split([';', '\n'])
        .filter_map(|part| {
            let (season, value) = part.split_once('=')?;
            let season = season.trim();
            let value = value.trim();
            if season.is_empty() || value.is_empty() {
                return None;
            }
            let location = if value.starts_with("http") || !value.contains(['/', '\\']) {
                SheetLocation::Google(value.to_string())
            } else {
                SheetLocation::Directory(PathBuf::from(value))
            };
            Some((SeasonId::new(season), location))
        })
        .collect()
}

/// Every sub-directory of `root` is one season, named after the directory.
pub fn discover_season_dirs(root: &std::path::Path) -> Vec<(SeasonId, SheetLocation)> {
    let Ok(entries) = std::fs::read_dir(root) else {
        log::warn!("LOCAL_SHEETS_DIR {} is not readable", root.display());
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            Some((SeasonId::new(name), SheetLocation::Directory(entry.path())))
        })
        .collect()
}

fn env_secret(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_sheet_name(key: &str, default: Option<String>) -> Option<String> {
    match env::var(key) {
        Ok(raw) => Some(raw.trim().to_string()).filter(|s| !s.is_empty()),
        Err(_) => default,
    }
}

pub(crate) fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}

fn fetch_parallelism() -> usize {
    env::var("FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(6)
        .clamp(2, 32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_sheets_parse_urls_ids_and_paths() {
        let parsed = parse_season_sheets(
            "S1=https://docs.google.com/spreadsheets/d/abc/edit; S2 = xyz ;S3=./sheets/s3;broken",
        );
        assert_eq!(parsed.len(), 3);
        assert_eq!(
            parsed[0].1,
            SheetLocation::Google("https://docs.google.com/spreadsheets/d/abc/edit".to_string())
        );
        assert_eq!(parsed[1], (SeasonId::new("S2"), SheetLocation::Google("xyz".to_string())));
        assert_eq!(
            parsed[2].1,
            SheetLocation::Directory(PathBuf::from("./sheets/s3"))
        );
    }
}
