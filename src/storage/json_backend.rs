use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    errors::{FinanceError, Result},
    ledger::Ledger,
    utils::{
        app_data_dir, backups_dir_in, ensure_dir, ledgers_dir_in,
        persistence::{read_json, sanitize_label, write_json_atomic},
    },
};

use super::StorageBackend;

const LEDGER_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%3f";
pub const DEFAULT_RETENTION: usize = 5;

/// File backend: one pretty-printed JSON document per ledger plus timestamped backups.
///
/// Every save first copies the previous file into the backup directory and prunes
/// backups beyond the retention count.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    ledgers_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let root = root.unwrap_or_else(app_data_dir);
        let ledgers_dir = ledgers_dir_in(&root);
        let backups_dir = backups_dir_in(&root);
        ensure_dir(&ledgers_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root,
            ledgers_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.ledgers_dir
            .join(format!("{}.{}", canonical_name(name), LEDGER_EXTENSION))
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    fn next_backup_path(&self, name: &str, note: Option<&str>) -> Result<PathBuf> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let mut stem = format!(
            "{}_{}",
            canonical_name(name),
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT)
        );
        if let Some(label) = sanitize_label(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let mut path = dir.join(format!("{}.{}", stem, LEDGER_EXTENSION));
        let mut attempt = 1;
        while path.exists() {
            path = dir.join(format!("{}-{}.{}", stem, attempt, LEDGER_EXTENSION));
            attempt += 1;
        }
        Ok(path)
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let backup_path = self.next_backup_path(name, None)?;
        fs::copy(path, &backup_path)?;
        self.prune_backups(name)
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        for stale in backups.iter().skip(self.retention) {
            let path = self.backup_dir(name).join(stale);
            if let Err(err) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self, name: &str) -> Result<Ledger> {
        let path = self.ledger_path(name);
        match read_json::<Ledger>(&path)? {
            Some(ledger) => {
                debug!(path = %path.display(), "ledger loaded");
                Ok(ledger)
            }
            None => {
                info!(path = %path.display(), "no ledger file yet; starting empty");
                Ok(Ledger::new())
            }
        }
    }

    fn save(&self, ledger: &Ledger, name: &str) -> Result<()> {
        let path = self.ledger_path(name);
        self.backup_existing_file(name, &path)?;
        write_json_atomic(&path, ledger)?;
        debug!(path = %path.display(), "ledger saved");
        Ok(())
    }

    fn backup(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<String> {
        let path = self.next_backup_path(name, note)?;
        write_json_atomic(&path, ledger)?;
        self.prune_backups(name)?;
        let backup_name = file_name(&path)?;
        info!(backup = %backup_name, "ledger backup written");
        Ok(backup_name)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            if let Some(file) = path.file_name().and_then(|file| file.to_str()) {
                entries.push(file.to_string());
            }
        }
        // Names share one prefix followed by a fixed-width timestamp.
        entries.sort_by(|a, b| b.cmp(a));
        Ok(entries)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger> {
        let backup_path = self.backup_dir(name).join(backup_name);
        let ledger: Ledger = read_json(&backup_path)?.ok_or_else(|| {
            FinanceError::Storage(format!("backup `{}` not found", backup_name))
        })?;
        self.save(&ledger, name)?;
        info!(backup = %backup_name, "ledger restored from backup");
        Ok(ledger)
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|file| file.to_str())
        .map(str::to_string)
        .ok_or_else(|| FinanceError::Storage(format!("invalid path `{}`", path.display())))
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "ledger".into()
    } else {
        sanitized
    }
}
