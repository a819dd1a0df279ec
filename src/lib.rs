pub mod cache;
pub mod career;
pub mod config;
pub mod division;
pub mod fixtures;
pub mod h2h;
pub mod http_client;
pub mod league;
pub mod roast;
pub mod round_label;
pub mod season;
pub mod sheets;
pub mod standings;
