use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::config::SheetsAuth;
use crate::http_client::http_client;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const UNKNOWN_RANGE: &str = "Unable to parse range";

pub type RawRows = Vec<Vec<String>>;

/// The spreadsheet collaborator: raw text rows of one worksheet.
/// `Ok(None)` means the worksheet does not exist.
pub trait WorksheetSource: Send + Sync {
    fn worksheet(&self, name: &str) -> Result<Option<RawRows>>;

    fn describe(&self) -> String;
}

/// Google spreadsheet read through the Sheets v4 values endpoint, which
/// returns formatted cell text and rejects unknown worksheet names.
#[derive(Debug, Clone)]
pub struct GoogleSheet {
    spreadsheet_id: String,
    auth: SheetsAuth,
}

impl GoogleSheet {
    /// Accepts a full `/spreadsheets/d/<id>/edit` URL or a bare id.
    pub fn from_url_or_id(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let id = match trimmed.find("/spreadsheets/d/") {
            Some(idx) => trimmed[idx + "/spreadsheets/d/".len()..]
                .split(['/', '?', '#'])
                .next()
                .unwrap_or_default(),
            None if !trimmed.contains('/') => trimmed,
            None => "",
        };
        if id.is_empty() {
            return None;
        }
        Some(Self {
            spreadsheet_id: id.to_string(),
            auth: SheetsAuth::default(),
        })
    }

    pub fn with_auth(mut self, auth: SheetsAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn values_url(&self, worksheet: &str) -> Result<Url> {
        let mut url = Url::parse(SHEETS_API_BASE).context("invalid sheets api base")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("sheets api base cannot take a path"))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&quoted_range(worksheet));
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "FORMATTED_VALUE");
        if let Some(key) = self.auth.api_key.as_deref() {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }
}

impl WorksheetSource for GoogleSheet {
    fn worksheet(&self, name: &str) -> Result<Option<RawRows>> {
        if self.auth.is_empty() {
            return Err(anyhow!("GOOGLE_API_KEY or GOOGLE_ACCESS_TOKEN is not set"));
        }
        let client = http_client()?;
        let mut request = client.get(self.values_url(name)?);
        if let Some(token) = self.auth.access_token.as_deref() {
            request = request.bearer_auth(token);
        }
        let resp = request
            .send()
            .with_context(|| format!("request for worksheet '{name}' failed"))?;
        let status = resp.status();
        let body = resp.text().context("failed reading worksheet body")?;
        rows_from_values_response(status, &body)
            .with_context(|| format!("worksheet '{name}' of {}", self.spreadsheet_id))
    }

    fn describe(&self) -> String {
        format!("google sheet {}", self.spreadsheet_id)
    }
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Map a values response to rows. A 400 naming an unparseable range is the
/// API's answer for a worksheet that does not exist.
pub fn rows_from_values_response(status: StatusCode, body: &str) -> Result<Option<RawRows>> {
    if status.is_success() {
        let parsed: ValuesResponse =
            serde_json::from_str(body).context("invalid values response")?;
        let rows = parsed
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        return Ok(Some(rows));
    }
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_default();
    if status == StatusCode::BAD_REQUEST && message.contains(UNKNOWN_RANGE) {
        return Ok(None);
    }
    Err(anyhow!("http {status}: {message}"))
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A1 range covering a whole worksheet: the name in single quotes.
fn quoted_range(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

/// Directory of exported worksheets, one `<worksheet>.csv` per sheet.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    root: PathBuf,
}

impl CsvDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl WorksheetSource for CsvDirectory {
    fn worksheet(&self, name: &str) -> Result<Option<RawRows>> {
        let path = self.root.join(format!("{name}.csv"));
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("read worksheet {}", path.display()));
            }
        };
        parse_csv_rows(&raw)
            .with_context(|| format!("parse worksheet {}", path.display()))
            .map(Some)
    }

    fn describe(&self) -> String {
        format!("csv directory {}", self.root.display())
    }
}

/// Headerless CSV with ragged rows, every cell kept as text.
pub fn parse_csv_rows(raw: &str) -> Result<RawRows> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("invalid csv record")?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::{GoogleSheet, parse_csv_rows, rows_from_values_response};

    #[test]
    fn spreadsheet_id_from_url() {
        let sheet = GoogleSheet::from_url_or_id(
            "https://docs.google.com/spreadsheets/d/1AbC-xyz_9/edit#gid=0",
        )
        .expect("url should resolve");
        assert_eq!(sheet.spreadsheet_id(), "1AbC-xyz_9");
        assert_eq!(
            GoogleSheet::from_url_or_id("1AbC-xyz_9").map(|s| s.spreadsheet_id().to_string()),
            Some("1AbC-xyz_9".to_string())
        );
        assert!(GoogleSheet::from_url_or_id("https://example.com/x").is_none());
    }

    #[test]
    fn values_url_quotes_the_worksheet() {
        let sheet = GoogleSheet::from_url_or_id("abc").expect("bare id");
        let url = sheet.values_url("LEAGUE DASHBOARD-S4").expect("url");
        assert_eq!(
            url.path(),
            "/v4/spreadsheets/abc/values/'LEAGUE%20DASHBOARD-S4'"
        );
        assert!(url.query().is_some_and(|q| q.contains("valueRenderOption=FORMATTED_VALUE")));
    }

    #[test]
    fn values_response_keeps_raw_text() {
        let body = r#"{"range":"'Div1_Fixtures'!A1:I3","majorDimension":"ROWS",
            "values":[["","","ROUND 1"],["","1","Amy","Bo","2","1"],[]]}"#;
        let rows = rows_from_values_response(StatusCode::OK, body)
            .expect("ok response")
            .expect("worksheet exists");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][2], "Amy");
        assert!(rows[2].is_empty());

        let empty = rows_from_values_response(StatusCode::OK, r#"{"range":"'X'!A1:Z1000"}"#)
            .expect("ok response");
        assert_eq!(empty, Some(Vec::new()));
    }

    #[test]
    fn unknown_worksheet_is_missing_not_an_error() {
        let body = r#"{"error":{"code":400,"message":"Unable to parse range: 'Div2_Fixtures'","status":"INVALID_ARGUMENT"}}"#;
        let rows = rows_from_values_response(StatusCode::BAD_REQUEST, body).expect("missing sheet");
        assert!(rows.is_none());
    }

    #[test]
    fn other_failures_are_errors() {
        let denied = r#"{"error":{"code":403,"message":"The caller does not have permission"}}"#;
        assert!(rows_from_values_response(StatusCode::FORBIDDEN, denied).is_err());
        let bad = r#"{"error":{"code":400,"message":"API key not valid"}}"#;
        assert!(rows_from_values_response(StatusCode::BAD_REQUEST, bad).is_err());
        assert!(rows_from_values_response(StatusCode::NOT_FOUND, "<html>").is_err());
    }

    #[test]
    fn ragged_csv_rows_are_kept() {
        let rows = parse_csv_rows("a,b\n\"x, y\"\n,,,d\n").expect("csv should parse");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["x, y".to_string()]);
        assert_eq!(rows[2].len(), 4);
    }
}
