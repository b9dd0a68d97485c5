use rust_decimal::Decimal;
use skyroute_core::payment::{PaymentDetails, PaymentError};
use skyroute_core::repository::{LedgerAudit, LedgerError, LedgerStore};
use skyroute_shared::money::round_money;
use skyroute_shared::{PaymentMethod, TransactionRecord};
use std::sync::Arc;
use tracing::{info, warn};

use crate::payment::PaymentResolver;

/// Wallet top-ups and read access to the ledger.
pub struct WalletService {
    ledger: Arc<dyn LedgerStore>,
    resolver: Arc<PaymentResolver>,
}

impl WalletService {
    pub fn new(ledger: Arc<dyn LedgerStore>, resolver: Arc<PaymentResolver>) -> Self {
        Self { ledger, resolver }
    }

    /// Add money from an external method, rounded to paise. Card/UPI details are checked with
    /// the same rules as a booking payment; the wallet cannot top itself up.
    pub async fn top_up(
        &self,
        amount: Decimal,
        details: &PaymentDetails,
    ) -> Result<TransactionRecord, PaymentError> {
        let amount = round_money(amount);
        if amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(amount));
        }
        let method = details.method();
        if method == PaymentMethod::Wallet {
            return Err(PaymentError::UnsupportedMethod(method));
        }
        let adapter = self.resolver.adapter(method)?;

        self.resolver.simulate_processing().await;

        if let Err(e) = adapter.validate(details) {
            warn!("Wallet top-up via {} rejected: {}", method, e);
            return Err(e);
        }
        let record = self.ledger.credit(amount, method.as_str()).await?;
        info!("Wallet top-up {} of {} via {}", record.id, amount, method);
        Ok(record)
    }

    pub async fn balance(&self) -> Result<Decimal, LedgerError> {
        self.ledger.balance().await
    }

    pub async fn transactions(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.ledger.transactions().await
    }

    pub async fn audit(&self) -> Result<LedgerAudit, LedgerError> {
        self.ledger.audit().await
    }
}
