use async_trait::async_trait;
use rust_decimal::Decimal;
use skyroute_core::payment::{PaymentAdapter, PaymentDetails, PaymentError, PaymentReceipt, PaymentRequest};
use skyroute_core::repository::LedgerStore;
use skyroute_shared::{ids, PaymentMethod};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const MIN_CARD_NUMBER_LEN: usize = 16;
pub const MIN_CARD_NAME_LEN: usize = 3;
pub const MIN_CARD_EXPIRY_LEN: usize = 5;
pub const MIN_CARD_CVV_LEN: usize = 3;

/// Routes a payment to the adapter for its method after the simulated
/// processing delay.
pub struct PaymentResolver {
    adapters: HashMap<PaymentMethod, Arc<dyn PaymentAdapter>>,
    processing_delay: Duration,
}

impl PaymentResolver {
    /// Resolver with the wallet, card and UPI adapters registered.
    pub fn new(ledger: Arc<dyn LedgerStore>, processing_delay: Duration) -> Self {
        Self {
            adapters: HashMap::new(),
            processing_delay,
        }
        .with_adapter(Arc::new(WalletAdapter::new(ledger)))
        .with_adapter(Arc::new(CardAdapter))
        .with_adapter(Arc::new(UpiAdapter))
    }

    /// Register (or replace) the adapter for its method.
    pub fn with_adapter(mut self, adapter: Arc<dyn PaymentAdapter>) -> Self {
        self.adapters.insert(adapter.method(), adapter);
        self
    }

    pub fn processing_delay(&self) -> Duration {
        self.processing_delay
    }

    pub fn adapter(&self, method: PaymentMethod) -> Result<&Arc<dyn PaymentAdapter>, PaymentError> {
        self.adapters
            .get(&method)
            .ok_or(PaymentError::UnsupportedMethod(method))
    }

    /// Wait out the processing delay, then validate and capture.
    ///
    /// Nothing is written anywhere before the delay has elapsed.
    pub async fn resolve(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        if request.amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(request.amount));
        }

        let method = request.details.method();
        let adapter = self.adapter(method)?;
        info!("Processing {} payment of {}", method, request.amount);

        self.simulate_processing().await;

        let result = match adapter.validate(&request.details) {
            Ok(()) => adapter.capture(request.amount, &request.details).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(receipt) => info!("Payment {} succeeded via {}", receipt.reference, method),
            Err(e) => warn!("Payment via {} rejected: {}", method, e),
        }
        result
    }

    /// Give the money of a captured payment back, if the method moved any.
    pub async fn refund(&self, receipt: &PaymentReceipt) -> Result<(), PaymentError> {
        self.adapter(receipt.method)?.refund(receipt).await?;
        info!("Payment {} via {} refunded", receipt.reference, receipt.method);
        Ok(())
    }

    pub(crate) async fn simulate_processing(&self) {
        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }
    }
}

/// Pays from the stored wallet balance.
pub struct WalletAdapter {
    ledger: Arc<dyn LedgerStore>,
}

impl WalletAdapter {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl PaymentAdapter for WalletAdapter {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Wallet
    }

    fn validate(&self, details: &PaymentDetails) -> Result<(), PaymentError> {
        match details {
            PaymentDetails::Wallet => Ok(()),
            other => Err(PaymentError::UnsupportedMethod(other.method())),
        }
    }

    async fn capture(&self, amount: Decimal, _details: &PaymentDetails) -> Result<PaymentReceipt, PaymentError> {
        let balance_after = self.ledger.debit(amount).await?;
        Ok(PaymentReceipt {
            method: PaymentMethod::Wallet,
            amount,
            reference: ids::transaction_id(),
            balance_after: Some(balance_after),
        })
    }

    async fn refund(&self, receipt: &PaymentReceipt) -> Result<(), PaymentError> {
        self.ledger.refund(receipt.amount).await?;
        Ok(())
    }
}

/// Simulated card gateway: syntactic checks only, no money moves.
pub struct CardAdapter;

#[async_trait]
impl PaymentAdapter for CardAdapter {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Card
    }

    fn validate(&self, details: &PaymentDetails) -> Result<(), PaymentError> {
        let PaymentDetails::Card(card) = details else {
            return Err(PaymentError::UnsupportedMethod(details.method()));
        };

        // Lengths are of the raw input, separators included.
        if card.number.expose().chars().count() < MIN_CARD_NUMBER_LEN {
            return Err(PaymentError::InvalidCardDetails(format!(
                "card number must have at least {} characters",
                MIN_CARD_NUMBER_LEN
            )));
        }
        if card.name.chars().count() < MIN_CARD_NAME_LEN {
            return Err(PaymentError::InvalidCardDetails(format!(
                "cardholder name must have at least {} characters",
                MIN_CARD_NAME_LEN
            )));
        }
        if card.expiry.chars().count() < MIN_CARD_EXPIRY_LEN {
            return Err(PaymentError::InvalidCardDetails("expiry must be in MM/YY form".into()));
        }
        if card.cvv.expose().chars().count() < MIN_CARD_CVV_LEN {
            return Err(PaymentError::InvalidCardDetails(format!(
                "CVV must have at least {} digits",
                MIN_CARD_CVV_LEN
            )));
        }
        Ok(())
    }

    async fn capture(&self, amount: Decimal, details: &PaymentDetails) -> Result<PaymentReceipt, PaymentError> {
        if let PaymentDetails::Card(card) = details {
            info!("Card {} authorised for {}", card.number, amount);
        }
        Ok(PaymentReceipt {
            method: PaymentMethod::Card,
            amount,
            reference: ids::transaction_id(),
            balance_after: None,
        })
    }
}

/// Simulated UPI collect request.
pub struct UpiAdapter;

#[async_trait]
impl PaymentAdapter for UpiAdapter {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Upi
    }

    fn validate(&self, details: &PaymentDetails) -> Result<(), PaymentError> {
        match details {
            PaymentDetails::Upi { upi_id } if upi_id.contains('@') => Ok(()),
            PaymentDetails::Upi { upi_id } => Err(PaymentError::InvalidUpiId(upi_id.clone())),
            other => Err(PaymentError::UnsupportedMethod(other.method())),
        }
    }

    async fn capture(&self, amount: Decimal, _details: &PaymentDetails) -> Result<PaymentReceipt, PaymentError> {
        Ok(PaymentReceipt {
            method: PaymentMethod::Upi,
            amount,
            reference: ids::transaction_id(),
            balance_after: None,
        })
    }
}
