// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::logging::{LogLevel, LogSettings};
use anyhow::{Context, Result, anyhow, bail};
use screener_app::{AppSettings, DEFAULT_NOTIFICATION_DURATION, FetchOrdering};
use screener_client::{DEFAULT_BASE_URL, DEFAULT_DETAIL_PATH};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "screener";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "5s";
const DEFAULT_NOTIFICATION: &str = "3s";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub detail: Detail,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: Server::default(),
            ui: Ui::default(),
            detail: Detail::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub base_url: Option<String>,
    pub detail_path: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            detail_path: Some(DEFAULT_DETAIL_PATH.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

/// `initial_top_n` may be written as a number or as raw input text. Any value
/// is accepted and goes through the same lenient parse as typed input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TopN {
    Count(i64),
    Decimal(f64),
    Raw(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub initial_top_n: Option<TopN>,
    pub notification_duration: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            initial_top_n: None,
            notification_duration: Some(DEFAULT_NOTIFICATION.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Detail {
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("SCREENER_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set SCREENER_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and place values under [server], [ui], [detail], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.server.base_url
            && base_url.trim().is_empty()
        {
            bail!("server.base_url in {} must not be empty", path.display());
        }

        if let Some(detail_path) = &self.server.detail_path
            && detail_path.trim().is_empty()
        {
            bail!("server.detail_path in {} must not be empty", path.display());
        }

        for (key, value) in [
            ("server.timeout", &self.server.timeout),
            ("ui.notification_duration", &self.ui.notification_duration),
        ] {
            let Some(value) = value else {
                continue;
            };
            let parsed = parse_duration(value)
                .with_context(|| format!("{key} in {}", path.display()))?;
            if parsed <= Duration::ZERO {
                bail!("{key} in {} must be positive, got {value}", path.display());
            }
        }

        if let Some(ordering) = &self.detail.ordering
            && FetchOrdering::parse(ordering).is_none()
        {
            bail!(
                "detail.ordering in {} must be \"last-resolved\" or \"sequenced\", got {ordering:?}",
                path.display()
            );
        }

        if let Some(level) = &self.log.level
            && LogLevel::parse(level).is_none()
        {
            bail!(
                "log.level in {} must be one of error, warn, info, debug, trace; got {level:?}",
                path.display()
            );
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.server
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn detail_path(&self) -> &str {
        self.server
            .detail_path
            .as_deref()
            .unwrap_or(DEFAULT_DETAIL_PATH)
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.server.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn notification_duration(&self) -> Result<Duration> {
        match &self.ui.notification_duration {
            Some(raw) => parse_duration(raw),
            None => Ok(DEFAULT_NOTIFICATION_DURATION),
        }
    }

    pub fn initial_top_n(&self) -> String {
        match &self.ui.initial_top_n {
            Some(TopN::Count(count)) => count.to_string(),
            Some(TopN::Decimal(value)) => value.to_string(),
            Some(TopN::Raw(raw)) => raw.clone(),
            None => String::new(),
        }
    }

    pub fn ordering(&self) -> FetchOrdering {
        self.detail
            .ordering
            .as_deref()
            .and_then(FetchOrdering::parse)
            .unwrap_or_default()
    }

    pub fn app_settings(&self) -> Result<AppSettings> {
        Ok(AppSettings {
            initial_top_n: self.initial_top_n(),
            ordering: self.ordering(),
            notification_duration: self.notification_duration()?,
        })
    }

    pub fn log_settings(&self) -> Result<LogSettings> {
        let level = self
            .log
            .level
            .as_deref()
            .and_then(LogLevel::parse)
            .unwrap_or_default();
        let file = match &self.log.file {
            Some(path) => PathBuf::from(path),
            None => default_log_path()?,
        };
        Ok(LogSettings { level, file })
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# screener config\n# Place this file at: {}\n\nversion = 1\n\n[server]\nbase_url = \"{}\"\ndetail_path = \"{}\"\ntimeout = \"{}\"\n\n[ui]\n# Optional. Prefills the top-n box; leave unset to show every row.\n# initial_top_n = 10\nnotification_duration = \"{}\"\n\n[detail]\n# \"last-resolved\" shows whichever lookup answers last.\n# \"sequenced\" drops answers older than the one on screen or issued before a close.\nordering = \"{}\"\n\n[log]\nlevel = \"{}\"\n# Optional. Default is the platform state dir (for example ~/.local/state/screener/screener.log)\n# file = \"/absolute/path/to/screener.log\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_DETAIL_PATH,
            DEFAULT_TIMEOUT,
            DEFAULT_NOTIFICATION,
            FetchOrdering::default().as_str(),
            LogLevel::default().as_str(),
        )
    }
}

fn default_log_path() -> Result<PathBuf> {
    let root = dirs::state_dir()
        .or_else(dirs::cache_dir)
        .ok_or_else(|| anyhow!("cannot resolve a log directory; set [log].file in the config"))?;
    Ok(root.join(APP_NAME).join("screener.log"))
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
