//! Service configuration
//!
//! Built-in defaults are layered under environment variables prefixed with
//! `SCHEDULING_`, e.g. `SCHEDULING_PORT=8080` or `SCHEDULING_STORAGE=memory`.

use anyhow::{Context, Result, bail};
use chrono::{FixedOffset, TimeDelta};
use ::config::{Config, Environment};
use serde::Deserialize;

use crate::use_cases::BookingPolicy;

/// Where the gateways keep their data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Scheduling service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Interface to listen on
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Gateway backend
    pub storage: StorageBackend,
    /// Booking horizon in days
    pub horizon_days: i64,
    /// Offset of the business time zone, in minutes east of UTC
    pub utc_offset_minutes: i32,
    /// Users preloaded in the memory backend, as `id:telefone` pairs
    /// separated by commas
    pub memory_users: String,
}

impl ServiceConfig {
    /// Load the configuration from defaults and `SCHEDULING_*` variables
    pub fn from_env() -> Result<Self> {
        let config = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3002_i64)?
            .set_default("storage", "postgres")?
            .set_default("horizon_days", 14_i64)?
            .set_default("utc_offset_minutes", 0_i64)?
            .set_default("memory_users", "")?
            .add_source(Environment::with_prefix("SCHEDULING").try_parsing(true))
            .build()
            .context("Failed to read scheduling configuration")?;

        config
            .try_deserialize()
            .context("Invalid scheduling configuration")
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Booking rules derived from the configuration
    pub fn booking_policy(&self) -> Result<BookingPolicy> {
        if self.horizon_days <= 0 {
            bail!("SCHEDULING_HORIZON_DAYS must be positive");
        }

        let horizon = TimeDelta::try_days(self.horizon_days)
            .context("SCHEDULING_HORIZON_DAYS is too large")?;
        let utc_offset = FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .context("SCHEDULING_UTC_OFFSET_MINUTES must be within one day of UTC")?;

        Ok(BookingPolicy {
            horizon,
            utc_offset,
        })
    }

    /// Parse `memory_users` into `(id, telefone)` pairs
    pub fn seeded_users(&self) -> Result<Vec<(String, String)>> {
        self.memory_users
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once(':') {
                Some((id, telefone)) if !id.is_empty() && !telefone.is_empty() => {
                    Ok((id.to_string(), telefone.to_string()))
                }
                _ => bail!("Invalid SCHEDULING_MEMORY_USERS entry: {}", entry),
            })
            .collect()
    }
}
