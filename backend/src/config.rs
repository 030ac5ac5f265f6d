use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use shared::roster::{self, Roster, DEFAULT_CATEGORIES, DEFAULT_VOTERS};
use tracing::{info, warn};

pub struct AppConfig {
    pub votes_file: PathBuf,
    pub access_secret: Option<String>,
    pub admin_secret: Option<String>,
    pub roster: Roster,
    pub ballot_rate_limit: u32,
    pub ballot_rate_window_minutes: i64,
    pub allowed_origin_prefix: String,
}

impl AppConfig {
    /// Builds the configuration from any key source: Shuttle secrets for the
    /// service, the environment for the simulator.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let voters = var(&lookup, "ROSTER").map(|raw| roster::parse_list(&raw));
        let categories = var(&lookup, "CATEGORIES").map(|raw| roster::parse_list(&raw));
        let roster = Roster::new(
            voters.filter(|v| !v.is_empty()).unwrap_or_else(|| to_strings(&DEFAULT_VOTERS)),
            categories.filter(|c| !c.is_empty()).unwrap_or_else(|| to_strings(&DEFAULT_CATEGORIES)),
        );

        Self {
            votes_file: PathBuf::from(try_load(&lookup, "VOTES_FILE", String::from("votes.json"))),
            access_secret: secret(&lookup, "ACCESS_SECRET"),
            admin_secret: secret(&lookup, "ADMIN_SECRET"),
            roster,
            ballot_rate_limit: try_load(&lookup, "BALLOT_RATE_LIMIT", 3),
            ballot_rate_window_minutes: try_load(&lookup, "BALLOT_RATE_WINDOW_MINUTES", 1),
            allowed_origin_prefix: try_load(&lookup, "ALLOWED_ORIGIN_PREFIX", String::from("http://localhost")),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }
}

pub struct SimulationConfig {
    pub voters: usize,
    pub delay: Duration,
}

impl SimulationConfig {
    pub fn from_env() -> Self {
        Self {
            voters: try_load(&env_lookup, "SIMULATED_VOTERS", 10),
            delay: Duration::from_millis(try_load(&env_lookup, "SIMULATE_DELAY_MS", 0)),
        }
    }
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn var<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Falls back to `default` when the key is missing or does not parse.
fn try_load<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = var(lookup, key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}

fn secret<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<String> {
    let value = var(lookup, key);
    if value.is_none() {
        warn!("{key} not set");
    }
    value
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
