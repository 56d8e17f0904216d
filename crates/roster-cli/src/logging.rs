// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! File-backed tracing setup. The terminal belongs to the TUI, so nothing is
//! written to stdout or stderr once logging is installed.

use anyhow::{Context, Result, anyhow};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const DEFAULT_LOG_FILTER: &str = "roster=info";
pub const LOG_ENV: &str = "ROSTER_LOG";
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub fn default_log_path() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set [log].file to a writable log path")
    })?;
    let app_dir = data_root.join(roster_db::APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("roster.log"))
}

pub fn parse_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter).with_context(|| format!("parse log filter {filter:?}"))
}

/// `ROSTER_LOG` wins over the configured filter when it is set and parses.
pub fn resolve_filter(configured: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => Ok(filter),
        Err(_) => parse_filter(configured),
    }
}

pub fn init(path: &Path, configured_filter: &str) -> Result<()> {
    let file = open_log_file(path)?;
    let filter = resolve_filter(configured_filter)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(filter),
        )
        .try_init()
        .context("install tracing subscriber")
}

/// Opens `path` for appending, moving an oversized file aside to `<name>.1`.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }

    if let Ok(metadata) = fs::metadata(path)
        && metadata.len() > MAX_LOG_FILE_SIZE
    {
        let rotated = rotated_path(path);
        fs::rename(path, &rotated)
            .with_context(|| format!("rotate log file to {}", rotated.display()))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

fn rotated_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".1");
    path.with_file_name(name)
}
