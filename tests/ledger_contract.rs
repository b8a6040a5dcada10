//! Behaviour shared by every `Marketplace` implementation
//!
//! Each test runs against the single-writer `Ledger` and the
//! `ConcurrentLedger` through the trait object.

use marketplace_ledger::{
    ConcurrentLedger, ErrorKind, Identity, Ledger, LedgerConfig, LedgerError, Marketplace,
    OverpaymentPolicy,
};
use rstest::rstest;
use rust_decimal::Decimal;

fn ledger(kind: &str, config: LedgerConfig) -> Box<dyn Marketplace> {
    match kind {
        "sync" => Box::new(Ledger::with_config(config)),
        "concurrent" => Box::new(ConcurrentLedger::with_config(config)),
        other => panic!("Unknown ledger kind: {}", other),
    }
}

fn seller() -> Identity {
    Identity::from("0xseller")
}

fn buyer() -> Identity {
    Identity::from("0xbuyer")
}

fn list_good_product(ledger: &mut dyn Marketplace) -> u64 {
    ledger
        .list_product(
            "Good Product",
            "This is the best shampoo",
            Decimal::new(15, 1),
            &seller(),
        )
        .unwrap()
}

#[rstest]
fn test_listing_then_purchase(#[values("sync", "concurrent")] kind: &str) {
    let mut ledger = ledger(kind, LedgerConfig::default());

    let product_id = list_good_product(ledger.as_mut());
    assert_eq!(product_id, 1);
    assert!(!ledger.get_product(1).unwrap().sold);

    let order_id = ledger
        .buy_product(1, Decimal::new(16, 1), &buyer())
        .unwrap();
    assert_eq!(order_id, 1);

    let order = ledger.get_order(1).unwrap();
    assert_eq!(order.product_id, 1);
    assert_eq!(order.amount_paid, Decimal::new(16, 1));
    assert_eq!(order.buyer, buyer());
    assert_eq!(order.seller, seller());

    let product = ledger.get_product(1).unwrap();
    assert!(product.sold);
    assert_eq!(product.buyer, Some(buyer()));
}

#[rstest]
fn test_repeat_purchase_is_already_sold(#[values("sync", "concurrent")] kind: &str) {
    let mut ledger = ledger(kind, LedgerConfig::default());
    list_good_product(ledger.as_mut());
    ledger
        .buy_product(1, Decimal::new(16, 1), &buyer())
        .unwrap();
    let product_before = ledger.get_product(1).unwrap();

    let result = ledger.buy_product(1, Decimal::new(16, 1), &buyer());

    assert_eq!(result, Err(LedgerError::already_sold(1)));
    assert_eq!(ledger.get_order_count(), 1);
    assert_eq!(ledger.get_product(1).unwrap(), product_before);
}

#[rstest]
fn test_unknown_product_is_not_found(#[values("sync", "concurrent")] kind: &str) {
    let mut ledger = ledger(kind, LedgerConfig::default());
    list_good_product(ledger.as_mut());

    let result = ledger.buy_product(99, Decimal::new(16, 1), &buyer());

    assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(ledger.get_order_count(), 0);
}

#[rstest]
fn test_empty_ledger(#[values("sync", "concurrent")] kind: &str) {
    let ledger = ledger(kind, LedgerConfig::default());

    assert_eq!(ledger.get_product_count(), 0);
    assert_eq!(ledger.get_order_count(), 0);
    assert_eq!(
        ledger.get_product(1),
        Err(LedgerError::product_not_found(1))
    );
    assert_eq!(ledger.get_order(1), Err(LedgerError::order_not_found(1)));
    assert_eq!(ledger.snapshot(), Default::default());
}

#[rstest]
fn test_failures_change_nothing(#[values("sync", "concurrent")] kind: &str) {
    let mut ledger = ledger(kind, LedgerConfig::default());
    list_good_product(ledger.as_mut());
    let before = ledger.snapshot();

    let attempts = [
        ledger.list_product("", "desc", Decimal::ONE, &seller()).map(|_| ()),
        ledger.list_product("title", " ", Decimal::ONE, &seller()).map(|_| ()),
        ledger
            .list_product("title", "desc", Decimal::new(-5, 0), &seller())
            .map(|_| ()),
        ledger.buy_product(0, Decimal::TEN, &buyer()).map(|_| ()),
        ledger.buy_product(2, Decimal::TEN, &buyer()).map(|_| ()),
        ledger.buy_product(1, Decimal::new(149, 2), &buyer()).map(|_| ()),
    ];

    let kinds: Vec<ErrorKind> = attempts
        .iter()
        .map(|r| r.clone().unwrap_err().kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::InvalidInput,
            ErrorKind::InvalidInput,
            ErrorKind::InvalidInput,
            ErrorKind::NotFound,
            ErrorKind::NotFound,
            ErrorKind::InsufficientPayment,
        ]
    );
    assert_eq!(ledger.snapshot(), before);
}

#[rstest]
fn test_ids_are_dense_and_counts_track_them(#[values("sync", "concurrent")] kind: &str) {
    let mut ledger = ledger(kind, LedgerConfig::default());
    for i in 1..=5u64 {
        let id = ledger
            .list_product(&format!("Item {}", i), "desc", Decimal::from(i), &seller())
            .unwrap();
        assert_eq!(id, i);
        assert_eq!(ledger.get_product_count(), i);
    }

    for (n, product) in [5u64, 1, 3].into_iter().enumerate() {
        let order_id = ledger
            .buy_product(product, Decimal::from(10), &buyer())
            .unwrap();
        assert_eq!(order_id, n as u64 + 1);
    }

    assert_eq!(ledger.get_order_count(), 3);
    assert_eq!(ledger.get_order(2).unwrap().product_id, 1);
    assert_eq!(ledger.get_order(4), Err(LedgerError::order_not_found(4)));
}

#[rstest]
#[case::refund(OverpaymentPolicy::Refund, Decimal::new(15, 1), Decimal::new(1, 1))]
#[case::retain(OverpaymentPolicy::Retain, Decimal::new(16, 1), Decimal::ZERO)]
fn test_overpayment_settlement(
    #[values("sync", "concurrent")] kind: &str,
    #[case] overpayment: OverpaymentPolicy,
    #[case] seller_earned: Decimal,
    #[case] buyer_refunded: Decimal,
) {
    let mut ledger = ledger(kind, LedgerConfig { overpayment });
    list_good_product(ledger.as_mut());

    ledger
        .buy_product(1, Decimal::new(16, 1), &buyer())
        .unwrap();

    let seller_account = ledger.get_account(&seller()).unwrap();
    let buyer_account = ledger.get_account(&buyer()).unwrap();
    assert_eq!(seller_account.earned, seller_earned);
    assert_eq!(buyer_account.spent, Decimal::new(16, 1));
    assert_eq!(buyer_account.refunded, buyer_refunded);
    assert_eq!(
        buyer_account.spent,
        seller_account.earned + buyer_account.refunded
    );
}

#[rstest]
fn test_order_records_are_immutable(#[values("sync", "concurrent")] kind: &str) {
    let mut ledger = ledger(kind, LedgerConfig::default());
    list_good_product(ledger.as_mut());
    ledger
        .list_product("Other", "desc", Decimal::ONE, &seller())
        .unwrap();
    ledger.buy_product(1, Decimal::TWO, &buyer()).unwrap();
    let first = ledger.get_order(1).unwrap();

    ledger
        .buy_product(2, Decimal::ONE, &Identity::from("0xother"))
        .unwrap();

    assert_eq!(ledger.get_order(1).unwrap(), first);
    assert!(ledger.get_order(2).unwrap().timestamp > first.timestamp);
}
