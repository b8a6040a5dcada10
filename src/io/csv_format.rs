//! CSV format handling for command scripts and ledger output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to ledger commands
//! - Product, order and account output serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{Account, Identity, LedgerCommand, LedgerError, Order, Product, ProductId};
use csv::Writer;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: op, caller, product, title,
/// description, amount. Which optional columns are required depends on `op`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub op: String,
    pub caller: String,
    pub product: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount: Option<String>,
}

/// Convert a CsvRecord to a LedgerCommand
///
/// This function:
/// - Parses the op string case-insensitively (`list` or `buy`)
/// - Requires a non-empty caller
/// - Requires title, description and amount for `list`
/// - Requires product and amount for `buy`
///
/// Listing fields are only checked for presence here; the ledger decides
/// whether their values are acceptable.
///
/// # Arguments
///
/// * `csv_record` - The deserialized CSV record
///
/// # Returns
///
/// * `Ok(LedgerCommand)` - Successfully converted record
/// * `Err(LedgerError::InvalidCommand)` - Describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<LedgerCommand, LedgerError> {
    let caller = csv_record.caller.trim();
    if caller.is_empty() {
        return Err(LedgerError::invalid_command(format!(
            "{} row is missing a caller",
            csv_record.op
        )));
    }
    let caller = Identity::new(caller);

    match csv_record.op.trim().to_lowercase().as_str() {
        "list" => {
            let title = required(csv_record.title, "list", "title")?;
            let description = required(csv_record.description, "list", "description")?;
            let price = parse_amount(required(csv_record.amount, "list", "amount")?)?;
            Ok(LedgerCommand::List {
                caller,
                title,
                description,
                price,
            })
        }
        "buy" => {
            let product = parse_product(required(csv_record.product, "buy", "product")?)?;
            let paid = parse_amount(required(csv_record.amount, "buy", "amount")?)?;
            Ok(LedgerCommand::Buy {
                caller,
                product,
                paid,
            })
        }
        _ => Err(LedgerError::invalid_command(format!(
            "Invalid operation: '{}'",
            csv_record.op
        ))),
    }
}

fn required(field: Option<String>, op: &str, name: &str) -> Result<String, LedgerError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(LedgerError::invalid_command(format!(
            "{} requires {}",
            op, name
        ))),
    }
}

fn parse_amount(raw: String) -> Result<Decimal, LedgerError> {
    Decimal::from_str(&raw)
        .map_err(|_| LedgerError::invalid_command(format!("Invalid amount '{}'", raw)))
}

fn parse_product(raw: String) -> Result<ProductId, LedgerError> {
    raw.parse::<ProductId>()
        .map_err(|_| LedgerError::invalid_command(format!("Invalid product id '{}'", raw)))
}

/// Write products to CSV format
///
/// Columns: id, title, description, price, seller, sold, buyer. The buyer
/// column is empty for unsold products. Products are written in id order.
///
/// # Arguments
///
/// * `products` - Slice of products to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(LedgerError::IoError)` if a write error occurred
pub fn write_products_csv(products: &[Product], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = Writer::from_writer(output);

    writer
        .write_record([
            "id",
            "title",
            "description",
            "price",
            "seller",
            "sold",
            "buyer",
        ])
        .map_err(|e| LedgerError::io(format!("Failed to write CSV header: {}", e)))?;

    let mut sorted_products: Vec<&Product> = products.iter().collect();
    sorted_products.sort_by_key(|product| product.id);

    for product in sorted_products {
        writer
            .write_record(&[
                product.id.to_string(),
                product.title.clone(),
                product.description.clone(),
                format!("{:.4}", product.price),
                product.seller.to_string(),
                product.sold.to_string(),
                product
                    .buyer
                    .as_ref()
                    .map(Identity::to_string)
                    .unwrap_or_default(),
            ])
            .map_err(|e| LedgerError::io(format!("Failed to write product record: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| LedgerError::io(format!("Failed to flush output: {}", e)))
}

/// Write orders to CSV format
///
/// Columns: id, product, buyer, seller, amount_paid, timestamp, in id order.
pub fn write_orders_csv(orders: &[Order], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = Writer::from_writer(output);

    writer
        .write_record([
            "id",
            "product",
            "buyer",
            "seller",
            "amount_paid",
            "timestamp",
        ])
        .map_err(|e| LedgerError::io(format!("Failed to write CSV header: {}", e)))?;

    let mut sorted_orders: Vec<&Order> = orders.iter().collect();
    sorted_orders.sort_by_key(|order| order.id);

    for order in sorted_orders {
        writer
            .write_record(&[
                order.id.to_string(),
                order.product_id.to_string(),
                order.buyer.to_string(),
                order.seller.to_string(),
                format!("{:.4}", order.amount_paid),
                order.timestamp.to_string(),
            ])
            .map_err(|e| LedgerError::io(format!("Failed to write order record: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| LedgerError::io(format!("Failed to flush output: {}", e)))
}

/// Write settlement accounts to CSV format
///
/// Columns: owner, spent, earned, refunded. Accounts are sorted by owner for
/// deterministic output.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["owner", "spent", "earned", "refunded"])
        .map_err(|e| LedgerError::io(format!("Failed to write CSV header: {}", e)))?;

    let mut sorted_accounts: Vec<&Account> = accounts.iter().collect();
    sorted_accounts.sort_by(|a, b| a.owner.cmp(&b.owner));

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.owner.to_string(),
                format!("{:.4}", account.spent),
                format!("{:.4}", account.earned),
                format!("{:.4}", account.refunded),
            ])
            .map_err(|e| LedgerError::io(format!("Failed to write account record: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| LedgerError::io(format!("Failed to flush output: {}", e)))
}
