use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use skyroute_shared::{BookingRecord, TransactionRecord};

use crate::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Insufficient wallet balance: {balance} available, {required} required")]
    InsufficientFunds { balance: Decimal, required: Decimal },
    #[error("Ledger amounts must be positive, got {0}")]
    InvalidAmount(Decimal),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of comparing the stored balance with the transaction history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAudit {
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub transaction_total: Decimal,
    /// `balance - transaction_total`; non-zero when the two have drifted apart.
    #[serde(with = "rust_decimal::serde::float")]
    pub drift: Decimal,
    pub transaction_count: usize,
}

impl LedgerAudit {
    pub fn is_reconciled(&self) -> bool {
        self.drift.is_zero()
    }
}

/// Wallet balance plus its audit trail
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn balance(&self) -> Result<Decimal, LedgerError>;

    /// Debit the wallet, returning the new balance. Refuses to go negative.
    async fn debit(&self, amount: Decimal) -> Result<Decimal, LedgerError>;

    /// Give back an earlier debit whose purchase could not be completed.
    /// Like `debit`, this leaves no transaction record.
    async fn refund(&self, amount: Decimal) -> Result<Decimal, LedgerError>;

    /// Credit the wallet and record the top-up.
    async fn credit(&self, amount: Decimal, method: &str) -> Result<TransactionRecord, LedgerError>;

    async fn transactions(&self) -> Result<Vec<TransactionRecord>, LedgerError>;

    async fn audit(&self) -> Result<LedgerAudit, LedgerError>;
}

/// Append-only list of confirmed bookings
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn append(&self, record: &BookingRecord) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<BookingRecord>, StoreError>;

    async fn find(&self, id: &str) -> Result<Option<BookingRecord>, StoreError>;
}
