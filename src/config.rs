//! Server configuration, read once from the environment at startup.

use crate::logic::validate_best_of;
use crate::models::{BracketSettings, TournamentFormat};
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// JSON file backing the bracket. In-memory when unset.
    pub data_path: Option<PathBuf>,
    pub format: TournamentFormat,
    pub settings: BracketSettings,
    /// How long a long-poll waits for a change before answering 304.
    pub poll_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_path: None,
            format: TournamentFormat::default(),
            settings: BracketSettings::default(),
            poll_timeout: Duration::from_secs(25),
        }
    }
}

impl AppConfig {
    /// Load from the environment; unset or blank variables keep their defaults.
    ///
    /// `HOST`, `PORT`, `BRACKET_DATA_PATH`, `TOURNAMENT_NAME`, `TOURNAMENT_FORMAT`,
    /// `TOURNAMENT_START_DATE` (YYYY-MM-DD), `MAX_TEAMS`, `BEST_OF`, `GRAND_FINAL_BEST_OF`,
    /// `POLL_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = parse(&port, "PORT")?;
        }
        config.data_path = get("BRACKET_DATA_PATH").map(PathBuf::from);
        if let Some(format) = get("TOURNAMENT_FORMAT") {
            config.format = format.parse()?;
        }
        if let Some(name) = get("TOURNAMENT_NAME") {
            config.settings.name = name;
        }
        if let Some(date) = get("TOURNAMENT_START_DATE") {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| format!("TOURNAMENT_START_DATE: {e}"))?;
            config.settings.start_date = Some(date);
        }
        if let Some(max) = get("MAX_TEAMS") {
            config.settings.max_teams = parse(&max, "MAX_TEAMS")?;
        }
        if let Some(bo) = get("BEST_OF") {
            config.settings.best_of = parse(&bo, "BEST_OF")?;
        }
        if let Some(bo) = get("GRAND_FINAL_BEST_OF") {
            config.settings.grand_final_best_of = parse(&bo, "GRAND_FINAL_BEST_OF")?;
        }
        if let Some(secs) = get("POLL_TIMEOUT_SECS") {
            config.poll_timeout = Duration::from_secs(parse(&secs, "POLL_TIMEOUT_SECS")?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_best_of(self.settings.best_of).map_err(|e| format!("BEST_OF: {e}"))?;
        validate_best_of(self.settings.grand_final_best_of)
            .map_err(|e| format!("GRAND_FINAL_BEST_OF: {e}"))?;
        let min = self.format.min_teams();
        if self.settings.max_teams < min {
            return Err(format!(
                "MAX_TEAMS must be at least {min} for {}, got {}",
                self.format, self.settings.max_teams
            ));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| format!("{key}: {e}"))
}
