mod common;

use std::{collections::HashSet, sync::Arc, thread};

use chrono::NaiveDate;
use common::{at, memory_manager, register_business};
use finans_core::{
    core::services::{CreateInvoice, RecordInvoicePayment},
    errors::FinanceError,
    ledger::{InvoiceItem, InvoiceStatus},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn consulting_invoice(subtotal_hours: Decimal) -> CreateInvoice {
    CreateInvoice {
        customer_name: "Aarhus Bryghus A/S".into(),
        customer_email: "bogholderi@bryghus.dk".into(),
        customer_cvr: Some("87654321".into()),
        items: vec![InvoiceItem::new("Consulting", subtotal_hours, dec!(100))],
        currency: None,
        due_date: NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
    }
}

#[test]
fn partial_payments_reconcile_to_paid() {
    let (manager, clock) = memory_manager(at(2025, 3, 1));
    let user = register_business(&manager, "Konsulent");
    let scope = manager.scope(user);

    let invoice = scope.create_invoice(consulting_invoice(dec!(10))).unwrap();
    assert_eq!(
        (invoice.subtotal, invoice.tax, invoice.total),
        (dec!(1000), dec!(250), dec!(1250))
    );
    assert_eq!(invoice.status, InvoiceStatus::Draft);

    scope
        .set_invoice_status(invoice.id, InvoiceStatus::Sent)
        .unwrap();
    let partial = scope
        .record_invoice_payment(invoice.id, RecordInvoicePayment::amount(dec!(500)))
        .unwrap();
    assert_eq!(partial.amount_paid, dec!(500));
    assert_eq!(partial.status, InvoiceStatus::PartiallyPaid);

    let err = scope
        .record_invoice_payment(invoice.id, RecordInvoicePayment::amount(dec!(800)))
        .expect_err("overpayment");
    assert!(matches!(err, FinanceError::Overpayment { remaining } if remaining == dec!(750)));
    assert_eq!(err.to_string(), "Payment exceeds the remaining amount of 750");
    assert_eq!(scope.invoice(invoice.id).unwrap(), partial);

    clock.set(at(2025, 3, 20));
    let paid = scope
        .record_invoice_payment(
            invoice.id,
            RecordInvoicePayment {
                amount: dec!(750),
                method: Some("MobilePay".into()),
                reference: Some("FIK 71".into()),
            },
        )
        .unwrap();
    assert_eq!(paid.amount_paid, dec!(1250));
    assert_eq!(paid.status, InvoiceStatus::Paid);
    assert_eq!(paid.paid_at, Some(at(2025, 3, 20)));
    assert_eq!(paid.payments[1].method, "MobilePay");
    assert_eq!(paid.payments[1].reference, "FIK 71");
}

#[test]
fn amount_paid_always_matches_payment_history() {
    let (manager, _clock) = memory_manager(at(2025, 5, 1));
    let user = register_business(&manager, "Historik");
    let scope = manager.scope(user);
    let invoice = scope.create_invoice(consulting_invoice(dec!(4))).unwrap();

    let attempts = [
        (dec!(100), Ok(())),
        (dec!(0), Err("validation")),
        (dec!(-5), Err("validation")),
        (dec!(1000), Err("overpayment")),
        (dec!(200), Ok(())),
        (dec!(200.01), Err("overpayment")),
        (dec!(200), Ok(())),
    ];
    for (amount, expected) in attempts {
        let payment = RecordInvoicePayment::amount(amount);
        let outcome = scope.record_invoice_payment(invoice.id, payment);
        match (outcome, expected) {
            (Ok(_), Ok(())) => {}
            (Err(FinanceError::Validation(_)), Err("validation")) => {}
            (Err(FinanceError::Overpayment { .. }), Err("overpayment")) => {}
            (outcome, expected) => panic!("paying {amount}: got {outcome:?}, wanted {expected:?}"),
        }
        let current = scope.invoice(invoice.id).unwrap();
        let history: Decimal = current.payments.iter().map(|p| p.amount).sum();
        assert_eq!(current.amount_paid, history);
        assert!(current.amount_paid <= current.total);
    }
    let settled = scope.invoice(invoice.id).unwrap();
    assert_eq!(settled.amount_paid, dec!(500));
    assert_eq!(settled.status, InvoiceStatus::Paid);
}

#[test]
fn concurrent_invoice_payments_never_overpay() {
    let (manager, _clock) = memory_manager(at(2025, 6, 1));
    let manager = Arc::new(manager);
    let user = register_business(&manager, "Samtidig");
    let invoice = manager
        .scope(user)
        .create_invoice(consulting_invoice(dec!(10)))
        .unwrap();
    assert_eq!(invoice.total, dec!(1250));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let mut accepted = 0usize;
                for _ in 0..10 {
                    match manager
                        .scope(user)
                        .record_invoice_payment(invoice.id, RecordInvoicePayment::amount(dec!(30)))
                    {
                        Ok(_) => accepted += 1,
                        Err(FinanceError::Overpayment { .. }) => {}
                        Err(err) => panic!("unexpected error: {err}"),
                    }
                }
                accepted
            })
        })
        .collect();
    let accepted: usize = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker"))
        .sum();

    // 41 * 30 = 1230 fits; a 42nd payment would exceed 1250.
    assert_eq!(accepted, 41);
    let settled = manager.scope(user).invoice(invoice.id).unwrap();
    let history: Decimal = settled.payments.iter().map(|p| p.amount).sum();
    assert_eq!(settled.payments.len(), 41);
    assert_eq!(settled.amount_paid, history);
    assert_eq!(settled.amount_paid, dec!(1230));
    assert_eq!(settled.status, InvoiceStatus::PartiallyPaid);
}

#[test]
fn oversized_invoice_is_rejected_and_manager_stays_usable() {
    let (manager, _clock) = memory_manager(at(2025, 6, 1));
    let user = register_business(&manager, "Stor");
    let scope = manager.scope(user);

    let mut huge = consulting_invoice(dec!(1));
    huge.items = vec![InvoiceItem::new("Alt", Decimal::MAX, dec!(2))];
    assert!(matches!(scope.create_invoice(huge), Err(FinanceError::Validation(_))));

    let mut crowded = consulting_invoice(dec!(1));
    crowded.items = vec![
        InvoiceItem::new("Første", Decimal::MAX, dec!(1)),
        InvoiceItem::new("Anden", Decimal::MAX, dec!(1)),
    ];
    assert!(matches!(scope.create_invoice(crowded), Err(FinanceError::Validation(_))));

    let mut taxed = consulting_invoice(dec!(1));
    taxed.items = vec![InvoiceItem::new("Moms", Decimal::MAX, dec!(1))];
    assert!(matches!(scope.create_invoice(taxed), Err(FinanceError::Validation(_))));

    assert!(scope.invoices().unwrap().is_empty());
    let ordinary = scope.create_invoice(consulting_invoice(dec!(2))).unwrap();
    assert_eq!(ordinary.total, dec!(250));
    assert_eq!(ordinary.invoice_number, "2025-001");
}

#[test]
fn manual_paid_override_leaves_payments_alone() {
    let (manager, _clock) = memory_manager(at(2025, 5, 1));
    let user = register_business(&manager, "Manuel");
    let scope = manager.scope(user);
    let invoice = scope.create_invoice(consulting_invoice(dec!(2))).unwrap();

    let paid = scope
        .set_invoice_status(invoice.id, InvoiceStatus::Paid)
        .unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);
    assert_eq!(paid.paid_at, Some(at(2025, 5, 1)));
    assert_eq!(paid.amount_paid, Decimal::ZERO);
    assert!(paid.payments.is_empty());
}

#[test]
fn invoice_numbers_are_sequential_per_user() {
    let (manager, clock) = memory_manager(at(2025, 1, 10));
    let alice = register_business(&manager, "Alice");
    let bob = register_business(&manager, "Bob");

    let numbers: Vec<String> = (0..3)
        .map(|_| {
            manager
                .scope(alice)
                .create_invoice(consulting_invoice(dec!(1)))
                .unwrap()
                .invoice_number
        })
        .collect();
    assert_eq!(numbers, vec!["2025-001", "2025-002", "2025-003"]);

    let bobs = manager
        .scope(bob)
        .create_invoice(consulting_invoice(dec!(1)))
        .unwrap();
    assert_eq!(bobs.invoice_number, "2025-001");

    clock.set(at(2026, 1, 2));
    let next_year = manager
        .scope(alice)
        .create_invoice(consulting_invoice(dec!(1)))
        .unwrap();
    assert_eq!(next_year.invoice_number, "2026-001");
}

#[test]
fn concurrent_creation_hands_out_unique_numbers() {
    let (manager, _clock) = memory_manager(at(2025, 6, 1));
    let manager = Arc::new(manager);
    let user = register_business(&manager, "Travl");

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                (0..10)
                    .map(|_| {
                        manager
                            .scope(user)
                            .create_invoice(consulting_invoice(dec!(1)))
                            .unwrap()
                            .invoice_number
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let numbers: HashSet<String> = handles
        .into_iter()
        .flat_map(|handle| handle.join().expect("worker"))
        .collect();
    assert_eq!(numbers.len(), 60);
    assert!(numbers.contains("2025-060"));
}

#[test]
fn document_carries_issuer_and_hides_foreign_invoices() {
    let (manager, _clock) = memory_manager(at(2025, 5, 1));
    let owner = register_business(&manager, "Issuer");
    let stranger = register_business(&manager, "Stranger");
    let invoice = manager
        .scope(owner)
        .create_invoice(consulting_invoice(dec!(3)))
        .unwrap();

    let document = manager.scope(owner).invoice_document(invoice.id).unwrap();
    assert_eq!(document.invoice.id, invoice.id);
    assert_eq!(document.issuer.map(|user| user.company_name), Some("Issuer".to_string()));

    let foreign = manager.scope(stranger);
    assert!(matches!(
        foreign.invoice_document(invoice.id),
        Err(FinanceError::NotFound(_))
    ));
    assert!(matches!(
        foreign.set_invoice_status(invoice.id, InvoiceStatus::Cancelled),
        Err(FinanceError::NotFound(_))
    ));
}

#[test]
fn overdue_candidates_list_open_invoices_past_due() {
    let (manager, clock) = memory_manager(at(2025, 4, 1));
    let user = register_business(&manager, "Rykker");
    let scope = manager.scope(user);
    let sent = scope.create_invoice(consulting_invoice(dec!(1))).unwrap();
    scope.set_invoice_status(sent.id, InvoiceStatus::Sent).unwrap();
    scope.create_invoice(consulting_invoice(dec!(1))).unwrap();

    assert!(scope.overdue_candidates().unwrap().is_empty());
    clock.set(at(2025, 5, 2));
    let candidates = scope.overdue_candidates().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, sent.id);
}
