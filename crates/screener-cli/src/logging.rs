// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "SCREENER_LOG";

const WORKSPACE_TARGETS: [&str; 4] = ["screener", "screener_app", "screener_client", "screener_tui"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    pub const fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LogLevel,
    pub file: PathBuf,
}

/// Installs the global subscriber. Output always goes to `settings.file`
/// because the terminal belongs to the TUI. Keep the guard alive until exit
/// so buffered lines are flushed.
pub fn init(settings: &LogSettings) -> Result<WorkerGuard> {
    if let Some(parent) = settings.file.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.file)
        .with_context(|| format!("open log file {}", settings.file.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(settings.level))
        .with_level(true)
        .with_target(settings.level >= LogLevel::Debug)
        .with_thread_names(settings.level >= LogLevel::Trace)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|error| anyhow!("configure logging: {error}"))?;
    Ok(guard)
}

fn build_env_filter(level: LogLevel) -> EnvFilter {
    let filter = match std::env::var(LOG_FILTER_ENV) {
        Ok(filter) if !filter.trim().is_empty() => filter,
        _ => default_filter(level),
    };
    EnvFilter::builder()
        .with_default_directive(level.to_filter().into())
        .parse_lossy(filter)
}

/// Debug and trace stay scoped to workspace crates; dependencies keep `info`.
fn default_filter(level: LogLevel) -> String {
    if level < LogLevel::Debug {
        return level.as_str().to_owned();
    }
    let mut filter = "info".to_owned();
    for target in WORKSPACE_TARGETS {
        filter.push(',');
        filter.push_str(target);
        filter.push('=');
        filter.push_str(level.as_str());
    }
    filter
}
