use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("h2h_dashboard/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared client for sheet reads and the roast call. Built on first use with
/// `HTTP_TIMEOUT_SECS` applied.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        let timeout = request_timeout(env::var("HTTP_TIMEOUT_SECS").ok().as_deref());
        log::debug!("building http client, timeout {}s", timeout.as_secs());
        Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}

fn request_timeout(raw: Option<&str>) -> Duration {
    let secs = raw
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
        .clamp(5, 300);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::request_timeout;

    #[test]
    fn timeout_defaults_and_clamps() {
        assert_eq!(request_timeout(None).as_secs(), 30);
        assert_eq!(request_timeout(Some(" 90 ")).as_secs(), 90);
        assert_eq!(request_timeout(Some("1")).as_secs(), 5);
        assert_eq!(request_timeout(Some("nope")).as_secs(), 30);
    }
}
