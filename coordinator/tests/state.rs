use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use fxbook_common::{CurrencyError, CurrencyRegistry};
use fxbook_coordinator::{State, StateConfig};

fn create_state(balances: &[(&str, Decimal)]) -> Arc<State> {
    let config = StateConfig {
        balances: balances
            .iter()
            .map(|(name, amount)| (name.to_string(), *amount))
            .collect(),
        base_currency: "RUB".to_string(),
    };
    Arc::new(State::new(&CurrencyRegistry::standard(), &config).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_are_not_lost() {
    const TASKS: usize = 64;
    const ADDS: usize = 50;

    let state = create_state(&[("USD", Decimal::ZERO)]);

    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let state = state.clone();
            tokio::spawn(async move {
                for _ in 0..ADDS {
                    state.add_balance("USD", dec!(0.01)).unwrap();
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(
        state.get_balance("USD").unwrap(),
        dec!(0.01) * Decimal::from(TASKS * ADDS)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_removes_never_overdraw() {
    let state = create_state(&[("EUR", dec!(100))]);

    let handles: Vec<_> = (0..40)
        .map(|_| {
            let state = state.clone();
            tokio::spawn(async move { state.remove_balance("EUR", dec!(3)) })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => succeeded += 1,
            Err(e) => assert!(matches!(e, CurrencyError::InsufficientAmount { .. })),
        }
    }

    assert_eq!(succeeded, 33);
    assert_eq!(state.get_balance("EUR").unwrap(), dec!(1));
}

#[test]
fn report_with_all_rates() {
    let state = create_state(&[("RUB", dec!(100)), ("USD", dec!(10))]);
    state.set_exchange_rate("USD", dec!(90.0)).unwrap();

    let report = state.generate_report();
    let text = report.text();

    assert!(text.starts_with("rub: 100\nusd: 10\n\n"));
    assert!(text.contains("usd-rub: 90\n"));
    assert!(text.contains("sum: 1000 rub / "));
    assert!(text.ends_with(" usd"));
    assert!(report.skipped().is_empty());
}

#[test]
fn report_without_eur_rate() {
    let state = create_state(&[("RUB", dec!(100)), ("USD", dec!(10)), ("EUR", dec!(5))]);
    state.set_exchange_rate("USD", dec!(90)).unwrap();

    let report = state.generate_report();

    assert!(!report.text().contains("eur-"));
    assert!(report.text().ends_with(" / 5 eur"));
    assert_eq!(report.skipped().len(), 4);
}

#[test]
fn fingerprint_tracks_changes() {
    let state = create_state(&[("RUB", dec!(1)), ("USD", dec!(2))]);
    let initial = state.fingerprint();

    state.add_balance("USD", dec!(1)).unwrap();
    let changed = state.fingerprint();
    assert_ne!(initial, changed);

    state.remove_balance("USD", dec!(1)).unwrap();
    assert_eq!(state.fingerprint(), initial);

    state.set_exchange_rate("USD", dec!(90)).unwrap();
    assert_ne!(state.fingerprint(), initial);
}
