use skyroute_catalog::FlightCatalog;
use skyroute_core::repository::{BookingStore, LedgerStore};
use skyroute_core::storage::KeyValueStore;
use skyroute_core::StoreError;
use skyroute_order::{BookingWizard, PaymentResolver, WalletService};
use skyroute_store::app_config::BusinessRules;
use skyroute_store::{LocalBookingStore, LocalLedger};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<FlightCatalog>,
    pub wizard: Arc<BookingWizard>,
    pub wallet: Arc<WalletService>,
    pub bookings: Arc<dyn BookingStore>,
}

impl AppState {
    /// Wire the stores, resolver and wizard over one storage backend.
    pub async fn build(storage: Arc<dyn KeyValueStore>, rules: BusinessRules) -> Result<Self, StoreError> {
        let ledger = Arc::new(LocalLedger::new(storage.clone()));
        ledger.seed_opening_balance(rules.opening_balance).await?;
        let ledger: Arc<dyn LedgerStore> = ledger;

        let bookings: Arc<dyn BookingStore> = Arc::new(LocalBookingStore::new(storage));
        let resolver = Arc::new(PaymentResolver::new(ledger.clone(), rules.payment_delay()));
        let wallet = Arc::new(WalletService::new(ledger, resolver.clone()));
        let wizard = Arc::new(BookingWizard::new(resolver, bookings.clone(), rules));

        Ok(Self {
            catalog: Arc::new(FlightCatalog::builtin()),
            wizard,
            wallet,
            bookings,
        })
    }
}
