pub mod json_backend;
pub mod memory;

use crate::{errors::Result, ledger::Ledger};

/// Abstraction over persistence backends capable of storing named ledgers and snapshots.
///
/// Business logic never talks to a backend directly; the manager persists staged
/// ledgers through it before publishing them.
pub trait StorageBackend: Send + Sync {
    /// Loads a ledger. A ledger that was never saved loads as an empty one.
    fn load(&self, name: &str) -> Result<Ledger>;
    fn save(&self, ledger: &Ledger, name: &str) -> Result<()>;
    /// Writes a snapshot and returns its backup name.
    fn backup(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<String>;
    /// Backup names, newest first.
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger>;
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
