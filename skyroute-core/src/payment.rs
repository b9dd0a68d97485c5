use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use skyroute_shared::{Masked, PaymentMethod};

use crate::repository::LedgerError;
use crate::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: Masked<String>,
    pub name: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvv: Masked<String>,
}

/// Method-specific payment input, tagged by `method` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentDetails {
    Wallet,
    Card(CardDetails),
    Upi {
        #[serde(rename = "upiId")]
        upi_id: String,
    },
}

impl PaymentDetails {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentDetails::Wallet => PaymentMethod::Wallet,
            PaymentDetails::Card(_) => PaymentMethod::Card,
            PaymentDetails::Upi { .. } => PaymentMethod::Upi,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub amount: Decimal,
    pub details: PaymentDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub method: PaymentMethod,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub reference: String,
    /// Wallet balance after the debit; `None` for external methods.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub balance_after: Option<Decimal>,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment amount must be positive, got {0}")]
    InvalidAmount(Decimal),
    #[error("Insufficient wallet balance: {balance} available, {required} required")]
    InsufficientFunds { balance: Decimal, required: Decimal },
    #[error("Invalid card details: {0}")]
    InvalidCardDetails(String),
    #[error("Invalid UPI ID: {0}")]
    InvalidUpiId(String),
    #[error("Payment method '{0}' is not accepted here")]
    UnsupportedMethod(PaymentMethod),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<LedgerError> for PaymentError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds { balance, required } => {
                PaymentError::InsufficientFunds { balance, required }
            }
            LedgerError::InvalidAmount(amount) => PaymentError::InvalidAmount(amount),
            LedgerError::Store(e) => PaymentError::Store(e),
        }
    }
}

/// One payment method. Validation is purely syntactic; `capture` is where
/// money moves (or, for external methods, where the gateway would be called).
#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    fn method(&self) -> PaymentMethod;

    fn validate(&self, details: &PaymentDetails) -> Result<(), PaymentError>;

    async fn capture(
        &self,
        amount: Decimal,
        details: &PaymentDetails,
    ) -> Result<PaymentReceipt, PaymentError>;

    /// Undo a capture whose purchase could not be recorded. Methods that
    /// move no money have nothing to undo.
    async fn refund(&self, _receipt: &PaymentReceipt) -> Result<(), PaymentError> {
        Ok(())
    }
}
