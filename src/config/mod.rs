mod file_config;

pub use file_config::{FileConfig, ReportingConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

/// Largest UTC offset in use anywhere (UTC+14:00).
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    pub reporting: ReportingSettings,
}

/// Tunables of the reporting engine and its pagers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingSettings {
    pub default_page_limit: usize,
    pub max_page_limit: usize,
    pub default_growth_days: u32,
    pub max_growth_days: u32,
    pub report_utc_offset_minutes: i32,
    pub query_timeout: Duration,
    pub read_pool_size: usize,
}

impl Default for ReportingSettings {
    fn default() -> Self {
        Self {
            default_page_limit: 10,
            max_page_limit: 100,
            default_growth_days: 30,
            max_growth_days: 365,
            report_utc_offset_minutes: 0,
            query_timeout: Duration::from_secs(10),
            read_pool_size: 4,
        }
    }
}

impl ReportingSettings {
    fn from_file(file: ReportingConfig) -> Result<Self> {
        let defaults = Self::default();

        let max_page_limit = file.max_page_limit.unwrap_or(defaults.max_page_limit);
        if max_page_limit == 0 {
            bail!("reporting.max_page_limit must be at least 1");
        }
        let default_page_limit = file
            .default_page_limit
            .unwrap_or(defaults.default_page_limit)
            .clamp(1, max_page_limit);

        let max_growth_days = file.max_growth_days.unwrap_or(defaults.max_growth_days);
        let default_growth_days = file
            .default_growth_days
            .unwrap_or(defaults.default_growth_days)
            .min(max_growth_days);

        let report_utc_offset_minutes = file
            .report_utc_offset_minutes
            .unwrap_or(defaults.report_utc_offset_minutes);
        if report_utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            bail!(
                "reporting.report_utc_offset_minutes {} is out of range (+/-{})",
                report_utc_offset_minutes,
                MAX_UTC_OFFSET_MINUTES
            );
        }

        let query_timeout_secs = file
            .query_timeout_secs
            .unwrap_or(defaults.query_timeout.as_secs());
        if query_timeout_secs == 0 {
            bail!("reporting.query_timeout_secs must be at least 1");
        }

        Ok(Self {
            default_page_limit,
            max_page_limit,
            default_growth_days,
            max_growth_days,
            report_utc_offset_minutes,
            query_timeout: Duration::from_secs(query_timeout_secs),
            read_pool_size: file
                .read_pool_size
                .unwrap_or(defaults.read_pool_size)
                .max(1),
        })
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let reporting = ReportingSettings::from_file(file.reporting.unwrap_or_default())?;

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            frontend_dir_path,
            reporting,
        })
    }

    pub fn lessons_db_path(&self) -> PathBuf {
        self.db_dir.join("lessons.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
