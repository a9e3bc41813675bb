//! Pure replay of a transaction ledger into a position and its realized
//! gains, using a moving-average cost basis: every BUY re-averages the
//! per-unit cost across all held units, a SELL never changes it.
//!
//! Everything here is side-effect free; persistence and atomicity live in
//! the service and repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use super::accounting_errors::AccountingError;
use super::accounting_model::{Position, RealizedGain, ReplayOutcome};
use crate::transactions::{Transaction, TransactionSide};

pub type Result<T> = std::result::Result<T, AccountingError>;

/// Replays a single ticker's transactions, oldest first.
///
/// Ordering by `(transaction_date, sequence)` is enforced here rather than
/// assumed of the caller; replaying the same ledger twice yields identical
/// output, which is what makes wholesale rebuilds safe.
pub fn replay(transactions: &[Transaction]) -> Result<ReplayOutcome> {
    let mut position: Option<Position> = None;
    let mut realized_gains = Vec::new();

    for transaction in ordered(transactions) {
        let (next, gain) = apply(position, transaction)?;
        position = next;
        if let Some(gain) = gain {
            realized_gains.push(gain);
        }
    }

    Ok(ReplayOutcome {
        position,
        realized_gains,
    })
}

/// Applies one transaction to the carried state. `replay` is a fold of this
/// function; ingestion uses it directly for incremental application.
pub fn apply(
    position: Option<Position>,
    transaction: &Transaction,
) -> Result<(Option<Position>, Option<RealizedGain>)> {
    if transaction.quantity <= Decimal::ZERO {
        return Err(AccountingError::InvalidTransaction(format!(
            "Non-positive quantity {} in transaction {}",
            transaction.quantity, transaction.id
        )));
    }

    match transaction.side {
        TransactionSide::Buy => Ok((Some(apply_buy(position, transaction)), None)),
        TransactionSide::Sell => apply_sell(position, transaction),
    }
}

fn apply_buy(position: Option<Position>, transaction: &Transaction) -> Position {
    let cost = transaction.effective_cost();

    match position {
        Some(mut position) => {
            position.absorb_buy(transaction.quantity, cost);
            if position.security_name.is_none() {
                position.security_name = transaction.security_name.clone();
            }
            position
        }
        None => Position::open(
            &transaction.ticker,
            transaction.security_name.clone(),
            transaction.quantity,
            cost,
            &transaction.trade_currency,
        ),
    }
}

fn apply_sell(
    position: Option<Position>,
    transaction: &Transaction,
) -> Result<(Option<Position>, Option<RealizedGain>)> {
    let mut position = match position {
        Some(position) => position,
        None => {
            return Err(AccountingError::InsufficientPosition {
                ticker: transaction.ticker.clone(),
                requested: transaction.quantity,
                held: Decimal::ZERO,
            })
        }
    };

    if transaction.quantity > position.quantity {
        return Err(AccountingError::InsufficientPosition {
            ticker: transaction.ticker.clone(),
            requested: transaction.quantity,
            held: position.quantity,
        });
    }

    let average_cost_at_sale = position.average_cost;
    let cost_basis_removed = position.release(transaction.quantity);
    let proceeds = transaction.effective_proceeds();
    let realized_pnl = proceeds - cost_basis_removed;
    let realized_pnl_pct = if cost_basis_removed.is_zero() {
        None
    } else {
        Some(realized_pnl / cost_basis_removed * dec!(100))
    };

    let gain = RealizedGain {
        id: transaction.id.clone(),
        ticker: transaction.ticker.clone(),
        sell_date: transaction.transaction_date,
        quantity: transaction.quantity,
        average_cost: average_cost_at_sale,
        sell_price: transaction.unit_price,
        realized_pnl,
        realized_pnl_pct,
        commission: transaction.commission,
        currency: transaction.trade_currency.clone(),
        created_at: transaction.created_at,
    };

    let position = if position.quantity.is_zero() {
        None
    } else {
        Some(position)
    };

    Ok((position, Some(gain)))
}

/// Net quantity held of a single ticker as of `date`, inclusive.
pub fn quantity_as_of(transactions: &[Transaction], date: NaiveDate) -> Decimal {
    let mut quantity = Decimal::ZERO;
    for transaction in ordered(transactions) {
        if transaction.transaction_date > date {
            break;
        }
        match transaction.side {
            TransactionSide::Buy => quantity += transaction.quantity,
            TransactionSide::Sell => quantity -= transaction.quantity,
        }
    }
    quantity
}

/// Net quantity per ticker as of `date`, inclusive, over a mixed-ticker
/// slice. Tickers whose net quantity is zero or negative are omitted.
pub fn quantities_as_of(
    transactions: &[Transaction],
    date: NaiveDate,
) -> HashMap<String, Decimal> {
    let mut quantities: HashMap<String, Decimal> = HashMap::new();
    for transaction in ordered(transactions) {
        if transaction.transaction_date > date {
            break;
        }
        let entry = quantities
            .entry(transaction.ticker.clone())
            .or_insert(Decimal::ZERO);
        match transaction.side {
            TransactionSide::Buy => *entry += transaction.quantity,
            TransactionSide::Sell => *entry -= transaction.quantity,
        }
    }
    quantities.retain(|_, quantity| *quantity > Decimal::ZERO);
    quantities
}

fn ordered(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by_key(|t| (t.transaction_date, t.sequence));
    sorted
}
