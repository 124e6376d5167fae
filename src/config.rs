use std::ops::RangeInclusive;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::catalog::DEFAULT_SUGGESTION_LIMIT;
use crate::spreadsheet::order_sheet::{
    DEFAULT_ITEM_COLUMNS, DEFAULT_UTC_OFFSET_HOURS, MAX_ITEM_COLUMNS,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env`) at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_key: String,
    pub host: String,
    pub port: u16,
    pub suggestion_limit: usize,
    pub export_item_columns: usize,
    pub report_utc_offset_hours: i32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        Ok(Self {
            supabase_url: required("SUPABASE_URL")?,
            supabase_key: required("SUPABASE_ANON_KEY")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(&lookup, "PORT", 8080)?,
            suggestion_limit: parsed(&lookup, "SUGGESTION_LIMIT", DEFAULT_SUGGESTION_LIMIT)?,
            export_item_columns: bounded(
                &lookup,
                "EXPORT_ITEM_COLUMNS",
                DEFAULT_ITEM_COLUMNS,
                0..=MAX_ITEM_COLUMNS,
            )?,
            report_utc_offset_hours: bounded(
                &lookup,
                "REPORT_UTC_OFFSET_HOURS",
                DEFAULT_UTC_OFFSET_HOURS,
                -23..=23,
            )?,
        })
    }
}

fn parsed<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// Like [`parsed`], but values outside `range` are invalid too.
fn bounded<F, T>(
    lookup: &F,
    name: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + ToString,
{
    let value = parsed(lookup, name, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        })
    }
}
