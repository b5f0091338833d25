use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::currency::Currency;
use crate::errors::{FinanceError, Result};
use crate::ledger::{Account, AccountKind, Ledger};

pub struct AccountService;

impl AccountService {
    /// Opens an active, zero-balance account for `owner`.
    pub fn open(
        ledger: &mut Ledger,
        owner: Uuid,
        account_number: &str,
        currency: Currency,
        kind: AccountKind,
        now: DateTime<Utc>,
    ) -> Result<Account> {
        let number = account_number.trim();
        Self::validate_number(ledger, number)?;
        let mut account = Account::new(owner, number, currency, kind);
        account.created_at = now;
        ledger.add_account(account.clone());
        info!(
            account = %account.id,
            owner = %owner,
            number = %account.account_number,
            "account opened"
        );
        Ok(account)
    }

    pub fn list(ledger: &Ledger, owner: Uuid) -> Vec<Account> {
        ledger.accounts_of(owner).cloned().collect()
    }

    pub fn get(ledger: &Ledger, owner: Uuid, id: Uuid) -> Result<Account> {
        ledger.owned_account(owner, id).cloned()
    }

    fn validate_number(ledger: &Ledger, number: &str) -> Result<()> {
        if number.is_empty() {
            return Err(FinanceError::validation("account number is required"));
        }
        if !number.chars().all(|c| c.is_ascii_digit() || c == '-' || c == ' ') {
            return Err(FinanceError::validation(format!(
                "account number `{}` may only contain digits, spaces and dashes",
                number
            )));
        }
        if ledger
            .accounts
            .iter()
            .any(|account| account.account_number == number)
        {
            return Err(FinanceError::Conflict(format!(
                "account number `{}` is already in use",
                number
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn open_creates_zero_balance_active_account() {
        let mut ledger = Ledger::new();
        let owner = Uuid::new_v4();
        let account = AccountService::open(
            &mut ledger,
            owner,
            " 5500-0012345 ",
            Currency::DKK,
            AccountKind::Business,
            Utc::now(),
        )
        .expect("open account");
        assert_eq!(account.balance, Decimal::ZERO);
        assert!(account.is_active());
        assert_eq!(account.account_number, "5500-0012345");
        assert_eq!(AccountService::list(&ledger, owner).len(), 1);
    }

    #[test]
    fn open_rejects_bad_and_duplicate_numbers() {
        let mut ledger = Ledger::new();
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let (dkk, kind) = (Currency::DKK, AccountKind::Business);
        let mut open =
            |number: &str| AccountService::open(&mut ledger, owner, number, dkk, kind, now);
        assert!(matches!(open(""), Err(FinanceError::Validation(_))));
        assert!(matches!(open("12ab"), Err(FinanceError::Validation(_))));
        open("1111").unwrap();
        assert!(matches!(open("1111"), Err(FinanceError::Conflict(_))));
    }

    #[test]
    fn get_hides_foreign_accounts() {
        let mut ledger = Ledger::new();
        let owner = Uuid::new_v4();
        let account = AccountService::open(
            &mut ledger,
            owner,
            "2222",
            Currency::DKK,
            AccountKind::Business,
            Utc::now(),
        )
        .unwrap();
        assert!(AccountService::get(&ledger, owner, account.id).is_ok());
        assert!(matches!(
            AccountService::get(&ledger, Uuid::new_v4(), account.id),
            Err(FinanceError::NotFound(_))
        ));
    }
}
