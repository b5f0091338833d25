use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    currency::{FixedRateTable, RateProvider},
    errors::{FinanceError, Result},
    ledger::{ledger::CURRENT_SCHEMA_VERSION, BusinessUser, Ledger},
    storage::{JsonStorage, MemoryStorage, StorageBackend},
};

use super::{
    scope::UserScope,
    time::{Clock, SystemClock},
};

/// Facade that owns the ledger, its persistence backend, the rate provider and the clock.
///
/// Writes hold the write lock for their whole duration, run against a staged copy,
/// persist it, and only then publish it. A failed operation or a failed save leaves
/// the visible ledger untouched.
pub struct LedgerManager {
    ledger: RwLock<Ledger>,
    name: String,
    storage: Box<dyn StorageBackend>,
    rates: Arc<dyn RateProvider>,
    clock: Arc<dyn Clock>,
}

impl LedgerManager {
    /// Loads `name` from `storage`, starting empty if it was never saved.
    pub fn load(storage: Box<dyn StorageBackend>, name: &str) -> Result<Self> {
        let ledger = storage.load(name)?;
        ensure_schema_support(ledger.schema_version)?;
        info!(ledger = %name, accounts = ledger.accounts.len(), "ledger opened");
        Ok(Self::from_ledger(ledger, name, storage))
    }

    pub fn from_ledger(ledger: Ledger, name: &str, storage: Box<dyn StorageBackend>) -> Self {
        Self {
            ledger: RwLock::new(ledger),
            name: name.to_string(),
            storage,
            rates: Arc::new(FixedRateTable::danish_demo()),
            clock: Arc::new(SystemClock),
        }
    }

    /// An empty, non-durable manager.
    pub fn in_memory() -> Self {
        Self::from_ledger(Ledger::new(), "memory", Box::new(MemoryStorage::new()))
    }

    /// Opens the configured ledger from the JSON store in the application data directory.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        let storage = JsonStorage::new(None, Some(config.backup_retention))?;
        Ok(Self::load(Box::new(storage), &config.ledger_name)?
            .with_rates(Arc::new(config.rate_table())))
    }

    pub fn with_rates(mut self, rates: Arc<dyn RateProvider>) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn rates(&self) -> &dyn RateProvider {
        self.rates.as_ref()
    }

    /// Request-scoped view bound to one authenticated user.
    pub fn scope(&self, user_id: Uuid) -> UserScope<'_> {
        UserScope::new(self, user_id)
    }

    /// Stores a business profile; emails are unique.
    pub fn register_user(&self, user: BusinessUser) -> Result<BusinessUser> {
        self.write(|ledger| {
            let email = user.email.trim().to_lowercase();
            if email.is_empty() {
                return Err(FinanceError::validation("email is required"));
            }
            if ledger
                .users
                .iter()
                .any(|existing| existing.email.to_lowercase() == email)
            {
                return Err(FinanceError::Conflict(format!(
                    "a user with email `{}` already exists",
                    user.email
                )));
            }
            ledger.add_user(user.clone());
            info!(user = %user.id, company = %user.company_name, "user registered");
            Ok(user)
        })
    }

    /// A copy of the current ledger.
    pub fn snapshot(&self) -> Result<Ledger> {
        self.read(Ledger::clone)
    }

    /// Replaces the in-memory ledger with the persisted one.
    pub fn reload(&self) -> Result<()> {
        let fresh = self.storage.load(&self.name)?;
        ensure_schema_support(fresh.schema_version)?;
        let mut guard = self.ledger.write().map_err(|_| poisoned())?;
        *guard = fresh;
        info!(ledger = %self.name, "ledger reloaded");
        Ok(())
    }

    pub fn backup(&self, note: Option<&str>) -> Result<String> {
        let guard = self.ledger.read().map_err(|_| poisoned())?;
        self.storage.backup(&guard, &self.name, note)
    }

    pub fn list_backups(&self) -> Result<Vec<String>> {
        self.storage.list_backups(&self.name)
    }

    pub fn restore_backup(&self, backup_name: &str) -> Result<()> {
        let mut guard = self.ledger.write().map_err(|_| poisoned())?;
        let restored = self.storage.restore(&self.name, backup_name)?;
        ensure_schema_support(restored.schema_version)?;
        *guard = restored;
        info!(ledger = %self.name, backup = %backup_name, "ledger restored");
        Ok(())
    }

    pub(crate) fn read<T>(&self, f: impl FnOnce(&Ledger) -> T) -> Result<T> {
        let guard = self.ledger.read().map_err(|_| poisoned())?;
        Ok(f(&guard))
    }

    pub(crate) fn write<T>(&self, f: impl FnOnce(&mut Ledger) -> Result<T>) -> Result<T> {
        let mut guard = self.ledger.write().map_err(|_| poisoned())?;
        let mut staged = guard.clone();
        let value = f(&mut staged)?;
        if let Err(err) = self.storage.save(&staged, &self.name) {
            warn!(ledger = %self.name, error = %err, "persist failed; changes discarded");
            return Err(err);
        }
        *guard = staged;
        Ok(value)
    }
}

fn ensure_schema_support(schema_version: u8) -> Result<()> {
    if schema_version > CURRENT_SCHEMA_VERSION {
        return Err(FinanceError::Storage(format!(
            "ledger schema v{} is newer than supported v{}",
            schema_version, CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(())
}

fn poisoned() -> FinanceError {
    FinanceError::Storage("ledger lock poisoned".into())
}
