use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use chrono::Utc;

use crate::{
    errors::{FinanceError, Result},
    ledger::Ledger,
};

use super::StorageBackend;

/// Non-durable backend keeping ledgers in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    ledgers: HashMap<String, Ledger>,
    backups: HashMap<String, Vec<(String, Ledger)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.inner
            .lock()
            .map_err(|_| FinanceError::Storage("memory storage lock poisoned".into()))
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self, name: &str) -> Result<Ledger> {
        Ok(self
            .state()?
            .ledgers
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    fn save(&self, ledger: &Ledger, name: &str) -> Result<()> {
        self.state()?
            .ledgers
            .insert(name.to_string(), ledger.clone());
        Ok(())
    }

    fn backup(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<String> {
        let mut state = self.state()?;
        let snapshots = state.backups.entry(name.to_string()).or_default();
        let mut backup_name = format!(
            "{}_{}_{}",
            name,
            Utc::now().format("%Y%m%dT%H%M%S%3f"),
            snapshots.len()
        );
        if let Some(note) = note.filter(|note| !note.trim().is_empty()) {
            backup_name.push('_');
            backup_name.push_str(note.trim());
        }
        snapshots.push((backup_name.clone(), ledger.clone()));
        Ok(backup_name)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .state()?
            .backups
            .get(name)
            .map(|snapshots| {
                snapshots
                    .iter()
                    .rev()
                    .map(|(backup, _)| backup.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger> {
        let mut state = self.state()?;
        let ledger = state
            .backups
            .get(name)
            .and_then(|snapshots| snapshots.iter().find(|(backup, _)| backup == backup_name))
            .map(|(_, ledger)| ledger.clone())
            .ok_or_else(|| FinanceError::Storage(format!("backup `{}` not found", backup_name)))?;
        state.ledgers.insert(name.to_string(), ledger.clone());
        Ok(ledger)
    }
}
