//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV
//! fixtures. Each test:
//! 1. Reads input.csv from a fixture directory
//! 2. Replays all commands through the selected strategy
//! 3. Renders products, orders and accounts as CSV
//! 4. Compares them with the expected_*.csv files
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Happy path listing and purchasing
//! - Underpayment and repeated purchases
//! - Rejected listings
//! - Unknown product ids
//! - Malformed rows
//! - Purchases contested across batches
//!
//! Every fixture runs with both strategies. The concurrent strategy may number
//! orders of different products in a different sequence, so its orders are
//! compared without the id and timestamp columns.

#[cfg(test)]
mod tests {
    use marketplace_ledger::cli::StrategyType;
    use marketplace_ledger::core::LedgerConfig;
    use marketplace_ledger::io::{write_accounts_csv, write_orders_csv, write_products_csv};
    use marketplace_ledger::strategy::{create_strategy, BatchConfig};
    use marketplace_ledger::types::LedgerError;
    use rstest::rstest;
    use std::fs;
    use std::path::Path;

    fn read_expected(fixture_dir: &str, name: &str) -> String {
        let path = format!("{}/{}", fixture_dir, name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", path, e))
    }

    type CsvWriterFn<T> = fn(&[T], &mut dyn std::io::Write) -> Result<(), LedgerError>;

    fn render<T>(items: &[T], write: CsvWriterFn<T>) -> String {
        let mut output = Vec::new();
        write(items, &mut output).expect("Failed to render CSV");
        String::from_utf8(output).expect("CSV output is not UTF-8")
    }

    /// Drop the id and timestamp columns and sort the rows
    fn normalize_orders(csv: &str) -> Vec<Vec<String>> {
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let mut rows: Vec<Vec<String>> = reader
            .records()
            .map(|record| {
                let record = record.expect("Failed to parse orders CSV");
                let last = record.len() - 1;
                record
                    .iter()
                    .take(last)
                    .skip(1)
                    .map(str::to_string)
                    .collect()
            })
            .collect();
        rows.sort();
        rows
    }

    /// Run a test fixture and compare every output with the expected files
    ///
    /// # Panics
    ///
    /// Panics if fixture files cannot be read or any output does not match.
    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );

        // Small batches so fixtures span several of them
        let strategy = create_strategy(
            strategy_type,
            LedgerConfig::default(),
            Some(BatchConfig::new(3, 4)),
        );
        let snapshot = strategy
            .process(Path::new(&input_path))
            .unwrap_or_else(|e| panic!("Failed to replay script: {}", e));

        let products = render(&snapshot.products, write_products_csv);
        let expected_products = read_expected(&fixture_dir, "expected_products.csv");
        assert_eq!(
            products, expected_products,
            "\n\nProducts mismatch for fixture: {} (strategy: {:?})\n",
            fixture_name, strategy_type
        );

        let accounts = render(&snapshot.accounts, write_accounts_csv);
        let expected_accounts = read_expected(&fixture_dir, "expected_accounts.csv");
        assert_eq!(
            accounts, expected_accounts,
            "\n\nAccounts mismatch for fixture: {} (strategy: {:?})\n",
            fixture_name, strategy_type
        );

        let orders = render(&snapshot.orders, write_orders_csv);
        let expected_orders = read_expected(&fixture_dir, "expected_orders.csv");
        match strategy_type {
            StrategyType::Sync => assert_eq!(
                orders, expected_orders,
                "\n\nOrders mismatch for fixture: {}\n",
                fixture_name
            ),
            StrategyType::Concurrent => assert_eq!(
                normalize_orders(&orders),
                normalize_orders(&expected_orders),
                "\n\nOrders mismatch for fixture: {} (concurrent)\n",
                fixture_name
            ),
        }

        // Order ids stay dense whatever the strategy
        let ids: Vec<u64> = snapshot.orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, (1..=ids.len() as u64).collect::<Vec<_>>());
    }

    /// End-to-end test for all fixtures with both strategies
    #[rstest]
    #[case("happy_path")]
    #[case("insufficient_payment")]
    #[case("invalid_listings")]
    #[case("not_found")]
    #[case("malformed_data")]
    #[case("contested_purchases")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Concurrent)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy);
    }

    #[test]
    fn test_normalize_orders_respects_quoting() {
        let csv = "id,product,buyer,seller,amount_paid,timestamp\n\
                   2,5,\"Doe, Jane\",alice,1.0000,9\n\
                   1,3,bob,alice,2.0000,4\n";

        assert_eq!(
            normalize_orders(csv),
            vec![
                vec!["3", "bob", "alice", "2.0000"],
                vec!["5", "Doe, Jane", "alice", "1.0000"],
            ]
        );
    }

    #[test]
    fn test_missing_input_is_fatal() {
        for strategy_type in [StrategyType::Sync, StrategyType::Concurrent] {
            let strategy = create_strategy(strategy_type, LedgerConfig::default(), None);

            let result = strategy.process(Path::new("tests/fixtures/does_not_exist.csv"));

            assert!(matches!(result, Err(LedgerError::FileNotFound { .. })));
        }
    }
}
