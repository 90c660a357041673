//! Startup helpers shared by `serve`, `chat` and `sessions`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cb_domain::config::{Config, ConfigSeverity, StorageConfig, TelegramConfig};
use cb_sessions::SessionStore;

/// Log every config issue and refuse to continue when any is an error.
pub fn check_config(config: &Config) -> anyhow::Result<()> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }

    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }
    Ok(())
}

/// Read the bot token from the configured environment variable.
pub fn read_token(cfg: &TelegramConfig) -> anyhow::Result<String> {
    match std::env::var(&cfg.token_env) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_owned()),
        Ok(_) => anyhow::bail!("{} is set but empty", cfg.token_env),
        Err(_) => anyhow::bail!(
            "{} is not set; export the bot token before running `serve`",
            cfg.token_env
        ),
    }
}

/// Pick the snapshot file: the configured path when its directory exists or
/// can be created, the fallback otherwise.
pub fn resolve_snapshot_path(cfg: &StorageConfig) -> PathBuf {
    match ensure_parent(&cfg.snapshot_path) {
        Ok(()) => cfg.snapshot_path.clone(),
        Err(e) => {
            tracing::warn!(
                path = %cfg.snapshot_path.display(),
                fallback = %cfg.fallback_path.display(),
                error = %e,
                "snapshot directory unavailable, using fallback"
            );
            cfg.fallback_path.clone()
        }
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

/// Resolve the snapshot path and load the store from it.
pub fn open_store(cfg: &StorageConfig) -> (Arc<SessionStore>, PathBuf) {
    let path = resolve_snapshot_path(cfg);
    let store = SessionStore::open(&path, cfg.atomic_writes);
    tracing::info!(
        path = %path.display(),
        sessions = store.len(),
        "session store ready"
    );
    (Arc::new(store), path)
}
