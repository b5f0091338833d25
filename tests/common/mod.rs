#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use chrono::{DateTime, TimeZone, Utc};
use finans_core::{
    config::ConfigManager,
    core::{Clock, LedgerManager},
    currency::Currency,
    errors::{FinanceError, Result},
    ledger::{AccountKind, BusinessUser, Ledger},
    storage::{JsonStorage, MemoryStorage, StorageBackend},
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a JSON-backed manager and a config manager in a fresh directory.
pub fn setup_test_env() -> (LedgerManager, ConfigManager, PathBuf) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let storage = JsonStorage::new(Some(base.clone()), Some(3)).expect("create json storage");
    let ledger_manager =
        LedgerManager::load(Box::new(storage), "test-ledger").expect("open ledger");
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");

    (ledger_manager, config_manager, base)
}

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
}

/// Clock that tests move by hand.
#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn starting(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().expect("clock lock") = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}

/// In-memory manager driven by a manual clock.
pub fn memory_manager(now: DateTime<Utc>) -> (LedgerManager, Arc<ManualClock>) {
    let clock = ManualClock::starting(now);
    let manager = LedgerManager::in_memory().with_clock(clock.clone());
    (manager, clock)
}

pub fn register_business(manager: &LedgerManager, company: &str) -> Uuid {
    let email = format!("{}@example.dk", company.to_lowercase().replace(' ', "."));
    manager
        .register_user(BusinessUser::new("Owner", email, company, "12345678"))
        .expect("register user")
        .id
}

/// Opens a DKK business account and funds it through an incoming receipt.
pub fn funded_account(manager: &LedgerManager, user: Uuid, number: &str, amount: Decimal) -> Uuid {
    let scope = manager.scope(user);
    let account = scope
        .open_account(number, Currency::DKK, AccountKind::Business)
        .expect("open account");
    if amount > Decimal::ZERO {
        scope
            .receive_payment(finans_core::core::services::ReceivePayment::new(
                account.id,
                "Opening deposit",
                amount,
            ))
            .expect("fund account");
    }
    account.id
}

/// Backend whose saves can be switched to fail.
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    failing: AtomicBool,
}

impl FlakyStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_saves(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

/// Shares one flaky backend between the manager and the test.
pub struct SharedStorage(pub Arc<FlakyStorage>);

impl StorageBackend for SharedStorage {
    fn load(&self, name: &str) -> Result<Ledger> {
        self.0.inner.load(name)
    }

    fn save(&self, ledger: &Ledger, name: &str) -> Result<()> {
        if self.0.failing.load(Ordering::SeqCst) {
            return Err(FinanceError::Storage("disk full".into()));
        }
        self.0.inner.save(ledger, name)
    }

    fn backup(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<String> {
        self.0.inner.backup(ledger, name, note)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        self.0.inner.list_backups(name)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger> {
        self.0.inner.restore(name, backup_name)
    }
}
