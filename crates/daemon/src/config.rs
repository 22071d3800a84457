//! Environment configuration
//!
//! Everything is read from environment variables; there are no CLI flags.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use thumbnailer_core::application::worker::constants::{
    DEFAULT_MAX_RECEIVE_COUNT, ERROR_RECOVERY_SLEEP_DURATION, MAX_WAIT_TIME,
};
use thumbnailer_core::application::PollSettings;
use thumbnailer_core::domain::{ThumbnailBounds, DEFAULT_THUMBNAIL_EDGE};
use thumbnailer_infra_sqs::{SqsSettings, StaticCredentials};

const DEFAULT_ORIGINALS_DIR: &str = "originals";
const DEFAULT_RESIZED_DIR: &str = "resized";
const DEFAULT_WAIT_TIME_SECS: u64 = 10;
const DEFAULT_IDLE_SLEEP_SECS: u64 = 5;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together")]
    PartialCredentials,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Directory for a daily-rolling JSON log file
    pub log_dir: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let format = match lookup("THUMBNAILER_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };
        let log_dir = non_empty(&lookup, "THUMBNAILER_LOG_DIR").map(|dir| expand_path(&dir));
        Self { format, log_dir }
    }
}

/// Worker configuration
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    pub queue_name: String,
    pub dead_letter_queue_name: String,
    pub sqs: SqsSettings,
    pub originals_dir: PathBuf,
    pub resized_dir: PathBuf,
    pub max_receive_count: u32,
    pub poll: PollSettings,
    pub fetch_timeout: Duration,
    pub bounds: ThumbnailBounds,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let queue_name = non_empty(&lookup, "QUEUE_NAME").ok_or(ConfigError::Missing("QUEUE_NAME"))?;
        let dead_letter_queue_name = non_empty(&lookup, "DEAD_LETTER_QUEUE_NAME")
            .ok_or(ConfigError::Missing("DEAD_LETTER_QUEUE_NAME"))?;

        let credentials = match (
            non_empty(&lookup, "AWS_ACCESS_KEY_ID"),
            non_empty(&lookup, "AWS_SECRET_ACCESS_KEY"),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialCredentials),
        };

        let sqs = SqsSettings {
            region: non_empty(&lookup, "REGION_NAME"),
            credentials,
            endpoint_url: non_empty(&lookup, "SQS_ENDPOINT_URL"),
        };

        let originals_dir = non_empty(&lookup, "THUMBNAILER_ORIGINALS_DIR")
            .map(|dir| expand_path(&dir))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ORIGINALS_DIR));
        let resized_dir = non_empty(&lookup, "THUMBNAILER_RESIZED_DIR")
            .map(|dir| expand_path(&dir))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESIZED_DIR));

        let max_receive_count = parse_or(
            &lookup,
            "THUMBNAILER_MAX_RECEIVE_COUNT",
            DEFAULT_MAX_RECEIVE_COUNT,
        )?;
        if max_receive_count == 0 {
            return Err(invalid(
                "THUMBNAILER_MAX_RECEIVE_COUNT",
                "0",
                "must be at least 1",
            ));
        }

        let wait_time_secs: u64 =
            parse_or(&lookup, "THUMBNAILER_WAIT_TIME_SECS", DEFAULT_WAIT_TIME_SECS)?;
        if wait_time_secs > MAX_WAIT_TIME.as_secs() {
            return Err(invalid(
                "THUMBNAILER_WAIT_TIME_SECS",
                &wait_time_secs.to_string(),
                "must be between 0 and 20",
            ));
        }
        let idle_sleep_secs: u64 =
            parse_or(&lookup, "THUMBNAILER_IDLE_SLEEP_SECS", DEFAULT_IDLE_SLEEP_SECS)?;
        let fetch_timeout_secs: u64 = parse_or(
            &lookup,
            "THUMBNAILER_FETCH_TIMEOUT_SECS",
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?;
        if fetch_timeout_secs == 0 {
            return Err(invalid(
                "THUMBNAILER_FETCH_TIMEOUT_SECS",
                "0",
                "must be at least 1",
            ));
        }

        let width = parse_or(&lookup, "THUMBNAILER_THUMBNAIL_WIDTH", DEFAULT_THUMBNAIL_EDGE)?;
        let height = parse_or(&lookup, "THUMBNAILER_THUMBNAIL_HEIGHT", DEFAULT_THUMBNAIL_EDGE)?;
        let bounds = ThumbnailBounds::new(width, height).map_err(|e| {
            invalid(
                "THUMBNAILER_THUMBNAIL_WIDTH/HEIGHT",
                &format!("{}x{}", width, height),
                &e.to_string(),
            )
        })?;

        Ok(Self {
            queue_name,
            dead_letter_queue_name,
            sqs,
            originals_dir,
            resized_dir,
            max_receive_count,
            poll: PollSettings {
                wait_time: Duration::from_secs(wait_time_secs),
                idle_sleep: Duration::from_secs(idle_sleep_secs),
                error_recovery_sleep: ERROR_RECOVERY_SLEEP_DURATION,
            },
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            bounds,
        })
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| invalid(key, &raw, &e.to_string())),
        None => Ok(default),
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
