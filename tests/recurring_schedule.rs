mod common;

use chrono::NaiveDate;
use common::{at, funded_account, memory_manager, register_business};
use finans_core::{
    core::services::CreateRecurring,
    errors::FinanceError,
    ledger::{Category, Frequency, RecurringStatus, MAX_PREVIEW_DATES},
};
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn standing_order_lifecycle() {
    let (manager, _clock) = memory_manager(at(2025, 1, 5));
    let user = register_business(&manager, "Husleje");
    let account = funded_account(&manager, user, "9100-1", dec!(50000));
    let scope = manager.scope(user);

    let rent = scope
        .create_recurring(
            CreateRecurring::new(
                account,
                "Udlejer ApS",
                dec!(8500),
                Frequency::Monthly,
                date(2025, 2, 1),
            )
            .category(Category::Rent),
        )
        .unwrap();
    assert_eq!(rent.status, RecurringStatus::Active);
    assert_eq!(rent.next_payment_date, date(2025, 2, 1));

    assert!(scope.due_recurring(date(2025, 1, 31)).unwrap().is_empty());
    assert_eq!(scope.due_recurring(date(2025, 2, 1)).unwrap().len(), 1);

    let paused = scope.pause_recurring(rent.id).unwrap();
    assert_eq!(paused.status, RecurringStatus::Paused);
    assert!(scope.due_recurring(date(2025, 2, 1)).unwrap().is_empty());

    let resumed = scope.resume_recurring(rent.id).unwrap();
    assert_eq!(resumed.status, RecurringStatus::Active);

    let cancelled = scope.cancel_recurring(rent.id).unwrap();
    assert_eq!(cancelled.status, RecurringStatus::Cancelled);
    assert!(matches!(
        scope.resume_recurring(rent.id),
        Err(FinanceError::Validation(_))
    ));
    assert!(matches!(
        scope.set_recurring_status(rent.id, RecurringStatus::Paused),
        Err(FinanceError::Validation(_))
    ));

    // Scheduling never moves money.
    assert_eq!(scope.account(account).unwrap().balance, dec!(50000));
    assert!(scope.payments().unwrap().is_empty());
}

#[test]
fn preview_stops_at_end_date() {
    let (manager, _clock) = memory_manager(at(2025, 1, 5));
    let user = register_business(&manager, "Forsikring");
    let account = funded_account(&manager, user, "9100-2", dec!(0));
    let scope = manager.scope(user);

    let insurance = scope
        .create_recurring(
            CreateRecurring::new(
                account,
                "Tryg",
                dec!(1200),
                Frequency::Quarterly,
                date(2025, 1, 15),
            )
            .until(date(2025, 9, 30)),
        )
        .unwrap();
    assert_eq!(
        scope.preview_recurring(insurance.id, 6).unwrap(),
        vec![date(2025, 1, 15), date(2025, 4, 15), date(2025, 7, 15)]
    );

    let weekly = scope
        .create_recurring(CreateRecurring::new(
            account,
            "Rengøring",
            dec!(400),
            Frequency::Weekly,
            date(2025, 1, 6),
        ))
        .unwrap();
    assert_eq!(
        scope.preview_recurring(weekly.id, 3).unwrap(),
        vec![date(2025, 1, 6), date(2025, 1, 13), date(2025, 1, 20)]
    );
    assert_eq!(
        scope.preview_recurring(weekly.id, MAX_PREVIEW_DATES).unwrap().len(),
        MAX_PREVIEW_DATES
    );
    assert!(matches!(
        scope.preview_recurring(weekly.id, usize::MAX),
        Err(FinanceError::Validation(_))
    ));

    let listed: Vec<_> = scope
        .recurring_payments()
        .unwrap()
        .into_iter()
        .map(|rp| rp.id)
        .collect();
    assert_eq!(listed, vec![weekly.id, insurance.id]);
}

#[test]
fn invalid_schedules_are_rejected() {
    let (manager, _clock) = memory_manager(at(2025, 1, 5));
    let user = register_business(&manager, "Ugyldig");
    let stranger = register_business(&manager, "Fremmed");
    let account = funded_account(&manager, user, "9100-3", dec!(0));
    let scope = manager.scope(user);

    let monthly =
        |amount, start| CreateRecurring::new(account, "X", amount, Frequency::Monthly, start);

    let zero = monthly(dec!(0), date(2025, 1, 1));
    assert!(matches!(scope.create_recurring(zero), Err(FinanceError::Validation(_))));

    let backwards = monthly(dec!(10), date(2025, 3, 1)).until(date(2025, 2, 1));
    assert!(matches!(scope.create_recurring(backwards), Err(FinanceError::Validation(_))));

    let foreign = monthly(dec!(10), date(2025, 3, 1));
    assert!(matches!(
        manager.scope(stranger).create_recurring(foreign),
        Err(FinanceError::NotFound(_))
    ));
    assert!(scope.recurring_payments().unwrap().is_empty());
}

#[test]
fn deleted_schedules_disappear() {
    let (manager, _clock) = memory_manager(at(2025, 1, 5));
    let user = register_business(&manager, "Sletning");
    let account = funded_account(&manager, user, "9100-4", dec!(0));
    let scope = manager.scope(user);

    let order = scope
        .create_recurring(CreateRecurring::new(
            account,
            "Telefoni",
            dec!(299),
            Frequency::Yearly,
            date(2025, 6, 1),
        ))
        .unwrap();
    let removed = scope.delete_recurring(order.id).unwrap();
    assert_eq!(removed.id, order.id);
    assert!(matches!(
        scope.recurring_payment(order.id),
        Err(FinanceError::NotFound(_))
    ));
}
