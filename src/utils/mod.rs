pub mod persistence;

use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Once,
};

use dirs::home_dir;

use crate::errors::Result;

pub const DEFAULT_LOG_FILTER: &str = "finans_core=info";

const HOME_ENV: &str = "FINANS_CORE_HOME";
const DEFAULT_DIR_NAME: &str = ".finans_core";
const LEDGER_DIR: &str = "ledgers";
const BACKUP_DIR: &str = "backups";
const CONFIG_FILE: &str = "config.json";

static TRACING_INIT: Once = Once::new();

/// Installs the global tracing subscriber once. `RUST_LOG` directives are applied on top
/// of `filter`, which falls back to [`DEFAULT_LOG_FILTER`].
pub fn init_tracing(filter: Option<&str>) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let directives = filter.unwrap_or(DEFAULT_LOG_FILTER);
        let mut env_filter = EnvFilter::from_default_env();
        for directive in directives.split(',').filter(|d| !d.trim().is_empty()) {
            match directive.trim().parse() {
                Ok(parsed) => env_filter = env_filter.add_directive(parsed),
                Err(err) => eprintln!("ignoring log directive `{}`: {}", directive, err),
            }
        }

        // A subscriber installed by the host application wins.
        let _ = fmt().with_env_filter(env_filter).try_init();
    });
}

/// Application data directory: `$FINANS_CORE_HOME`, else `~/.finans_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn ledgers_dir_in(base: &Path) -> PathBuf {
    base.join(LEDGER_DIR)
}

pub fn backups_dir_in(base: &Path) -> PathBuf {
    base.join(BACKUP_DIR)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}
