//! Initialisation du logging
//!
//! Un `Registry` avec un filtre de niveau rechargeable, une sortie console
//! optionnelle et une sortie fichier optionnelle (mode ajout, sans
//! couleurs). Chaque ligne est horodatée.

use anyhow::{Context, Result, anyhow};
use jbxconfig::Config;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{
    Registry, filter::LevelFilter, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

/// Permet de changer le niveau de log pendant l'exécution
#[derive(Clone)]
pub struct LogHandle {
    reload_handle: reload::Handle<LevelFilter, Registry>,
}

impl LogHandle {
    /// Niveau actuellement appliqué
    pub fn level(&self) -> Option<LevelFilter> {
        self.reload_handle.clone_current()
    }

    /// Change le niveau (`ERROR`, `WARN`, `INFO`, `DEBUG`, `TRACE`)
    pub fn set_level(&self, level: &str) -> Result<()> {
        let filter =
            parse_level(level).ok_or_else(|| anyhow!("Unknown log level '{}'", level))?;
        self.reload_handle
            .reload(filter)
            .map_err(|e| anyhow!("Failed to reload log level filter: {}", e))?;
        tracing::info!("Log level set to {}", filter);
        Ok(())
    }
}

/// Convertit un nom de niveau, sans tenir compte de la casse
pub fn parse_level(s: &str) -> Option<LevelFilter> {
    let level = match s.trim().to_uppercase().as_str() {
        "ERROR" => Level::ERROR,
        "WARN" => Level::WARN,
        "INFO" => Level::INFO,
        "DEBUG" => Level::DEBUG,
        "TRACE" => Level::TRACE,
        "OFF" => return Some(LevelFilter::OFF),
        _ => return None,
    };
    Some(LevelFilter::from_level(level))
}

/// Installe le subscriber global à partir de `host.logger.*`
pub fn init_logging(config: &Config) -> Result<LogHandle> {
    let min_level = config.get_log_min_level();
    let level = parse_level(&min_level).unwrap_or_else(|| {
        eprintln!("Unknown log level '{}', using INFO", min_level);
        LevelFilter::INFO
    });
    let (filter, reload_handle) = reload::Layer::new(level);

    let console = config.get_log_enable_console().then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
    });

    let file = match config.get_log_file() {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    Registry::default()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(LogHandle { reload_handle })
}
