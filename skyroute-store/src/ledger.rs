use async_trait::async_trait;
use rust_decimal::Decimal;
use skyroute_core::repository::{LedgerAudit, LedgerError, LedgerStore};
use skyroute_core::storage::{append_json, keys, read_json_list, KeyValueStore};
use skyroute_core::StoreResult;
use skyroute_shared::money::round_money;
use skyroute_shared::{TransactionRecord, TransactionType};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Wallet ledger over the `wallet` and `transactions` storage keys.
///
/// The balance and the transaction list are separate values and are not
/// reconciled against each other; [`LedgerStore::audit`] reports any drift.
pub struct LocalLedger {
    storage: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write cycles on the balance.
    write_lock: Mutex<()>,
}

impl LocalLedger {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Store `amount` as the balance if the wallet has never been written.
    pub async fn seed_opening_balance(&self, amount: Decimal) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        if self.storage.get(keys::WALLET)?.is_some() {
            return Ok(false);
        }
        let amount = round_money(amount.max(Decimal::ZERO));
        self.write_balance(amount)?;
        info!("Wallet seeded with opening balance {}", amount);
        Ok(true)
    }

    fn read_balance(&self) -> StoreResult<Decimal> {
        let Some(raw) = self.storage.get(keys::WALLET)? else {
            return Ok(Decimal::ZERO);
        };

        match Decimal::from_str(raw.trim()) {
            Ok(balance) if balance.is_sign_negative() => {
                warn!("Stored wallet balance {} is negative, reading as zero", balance);
                Ok(Decimal::ZERO)
            }
            Ok(balance) => Ok(balance),
            Err(e) => {
                warn!("Stored wallet balance {:?} is unreadable, reading as zero: {}", raw, e);
                Ok(Decimal::ZERO)
            }
        }
    }

    fn write_balance(&self, balance: Decimal) -> StoreResult<()> {
        self.storage.set(keys::WALLET, &balance.to_string())
    }
}

#[async_trait]
impl LedgerStore for LocalLedger {
    async fn balance(&self) -> Result<Decimal, LedgerError> {
        Ok(self.read_balance()?)
    }

    async fn debit(&self, amount: Decimal) -> Result<Decimal, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let _guard = self.write_lock.lock().await;
        let balance = self.read_balance()?;
        if balance < amount {
            debug!("Wallet debit of {} refused, balance {}", amount, balance);
            return Err(LedgerError::InsufficientFunds {
                balance,
                required: amount,
            });
        }

        let new_balance = balance - amount;
        self.write_balance(new_balance)?;
        info!("Wallet debited {} (balance {} -> {})", amount, balance, new_balance);
        Ok(new_balance)
    }

    async fn refund(&self, amount: Decimal) -> Result<Decimal, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let _guard = self.write_lock.lock().await;
        let balance = self.read_balance()?;
        let new_balance = balance + amount;
        self.write_balance(new_balance)?;
        info!("Wallet refunded {} (balance {} -> {})", amount, balance, new_balance);
        Ok(new_balance)
    }

    async fn credit(&self, amount: Decimal, method: &str) -> Result<TransactionRecord, LedgerError> {
        let amount = round_money(amount);
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let _guard = self.write_lock.lock().await;
        let balance = self.read_balance()?;
        let new_balance = balance + amount;

        // A credited balance always has its transaction record.
        let record = TransactionRecord::new(TransactionType::Credit, amount, method);
        let previous_history = self.storage.get(keys::TRANSACTIONS)?;
        append_json(self.storage.as_ref(), keys::TRANSACTIONS, &record)?;

        if let Err(e) = self.write_balance(new_balance) {
            let restored = match previous_history {
                Some(raw) => self.storage.set(keys::TRANSACTIONS, &raw),
                None => self.storage.remove(keys::TRANSACTIONS),
            };
            if let Err(restore_err) = restored {
                warn!("Could not withdraw transaction {} after a failed credit: {}", record.id, restore_err);
            }
            return Err(e.into());
        }

        info!(
            "Wallet credited {} via {} as {} (balance {} -> {})",
            amount, method, record.id, balance, new_balance
        );
        Ok(record)
    }

    async fn transactions(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(read_json_list(self.storage.as_ref(), keys::TRANSACTIONS)?)
    }

    async fn audit(&self) -> Result<LedgerAudit, LedgerError> {
        let balance = self.read_balance()?;
        let history: Vec<TransactionRecord> =
            read_json_list(self.storage.as_ref(), keys::TRANSACTIONS)?;
        let transaction_total: Decimal = history.iter().map(TransactionRecord::signed_amount).sum();

        let audit = LedgerAudit {
            balance,
            transaction_total,
            drift: balance - transaction_total,
            transaction_count: history.len(),
        };
        if !audit.is_reconciled() {
            warn!(
                "Wallet balance {} differs from transaction history total {} by {}",
                balance, transaction_total, audit.drift
            );
        }
        Ok(audit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ledger_with(balance: Option<&str>) -> (Arc<MemoryStorage>, LocalLedger) {
        let storage = Arc::new(MemoryStorage::new());
        if let Some(balance) = balance {
            storage.set(keys::WALLET, balance).unwrap();
        }
        let ledger = LocalLedger::new(storage.clone());
        (storage, ledger)
    }

    #[tokio::test]
    async fn test_missing_wallet_reads_zero() {
        let (_, ledger) = ledger_with(None);
        assert_eq!(ledger.balance().await.unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_unreadable_or_negative_wallet_reads_zero() {
        let (_, ledger) = ledger_with(Some("lots"));
        assert_eq!(ledger.balance().await.unwrap(), Decimal::ZERO);

        let (_, ledger) = ledger_with(Some("-50"));
        assert_eq!(ledger.balance().await.unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_debit_reduces_balance_exactly() {
        let (storage, ledger) = ledger_with(Some("20000"));
        let new_balance = ledger.debit(dec("13900.40")).await.unwrap();

        assert_eq!(new_balance, dec("6099.60"));
        assert_eq!(ledger.balance().await.unwrap(), dec("6099.60"));
        assert_eq!(storage.get(keys::WALLET).unwrap().as_deref(), Some("6099.60"));
    }

    #[tokio::test]
    async fn test_debit_refused_when_short() {
        let (_, ledger) = ledger_with(Some("10000"));
        let err = ledger.debit(dec("13900.40")).await.unwrap_err();

        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(ledger.balance().await.unwrap(), dec("10000"));
    }

    #[tokio::test]
    async fn test_debit_of_entire_balance_leaves_zero() {
        let (_, ledger) = ledger_with(Some("100.00"));
        assert_eq!(ledger.debit(dec("100")).await.unwrap(), Decimal::ZERO);
        assert!(ledger.debit(dec("0.01")).await.is_err());
    }

    #[tokio::test]
    async fn test_non_positive_amounts_rejected() {
        let (_, ledger) = ledger_with(Some("100"));
        assert!(matches!(ledger.debit(Decimal::ZERO).await, Err(LedgerError::InvalidAmount(_))));
        assert!(matches!(ledger.credit(dec("-5"), "card").await, Err(LedgerError::InvalidAmount(_))));
        assert_eq!(ledger.balance().await.unwrap(), dec("100"));
    }

    #[tokio::test]
    async fn test_credit_appends_transaction() {
        let (_, ledger) = ledger_with(None);
        let record = ledger.credit(dec("2500"), "upi").await.unwrap();

        assert_eq!(record.kind, TransactionType::Credit);
        assert_eq!(ledger.balance().await.unwrap(), dec("2500"));

        let history = ledger.transactions().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, record.id);
        assert_eq!(history[0].amount, dec("2500"));
    }

    #[tokio::test]
    async fn test_audit_reports_drift_after_debit() {
        let (_, ledger) = ledger_with(None);
        ledger.credit(dec("1000"), "card").await.unwrap();
        assert!(ledger.audit().await.unwrap().is_reconciled());

        ledger.debit(dec("250")).await.unwrap();
        let audit = ledger.audit().await.unwrap();
        assert_eq!(audit.balance, dec("750"));
        assert_eq!(audit.transaction_total, dec("1000"));
        assert_eq!(audit.drift, dec("-250"));
        assert_eq!(audit.transaction_count, 1);
    }

    #[tokio::test]
    async fn test_seed_only_when_wallet_absent() {
        let (_, ledger) = ledger_with(None);
        assert!(ledger.seed_opening_balance(dec("20000")).await.unwrap());
        assert!(!ledger.seed_opening_balance(dec("5")).await.unwrap());
        assert_eq!(ledger.balance().await.unwrap(), dec("20000"));
    }

    #[tokio::test]
    async fn test_concurrent_debits_never_overdraw() {
        let (_, ledger) = ledger_with(Some("100"));
        let ledger = Arc::new(ledger);

        let mut handles = Vec::new();
        for _ in 0..10 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move { ledger.debit(dec("30")).await.is_ok() }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap() {
                succeeded += 1;
            }
        }
        assert_eq!(succeeded, 3);
        assert_eq!(ledger.balance().await.unwrap(), dec("10"));
    }

    #[tokio::test]
    async fn test_refund_restores_balance_without_record() {
        let (_, ledger) = ledger_with(Some("20000"));
        ledger.debit(dec("13900.40")).await.unwrap();

        assert_eq!(ledger.refund(dec("13900.40")).await.unwrap(), dec("20000.00"));
        assert!(ledger.transactions().await.unwrap().is_empty());
        assert!(matches!(ledger.refund(Decimal::ZERO).await, Err(LedgerError::InvalidAmount(_))));
    }

    #[tokio::test]
    async fn test_credit_rounds_to_paise() {
        let (_, ledger) = ledger_with(Some("100"));

        let record = ledger.credit(dec("10.005"), "card").await.unwrap();
        assert_eq!(record.amount, dec("10.01"));
        assert_eq!(ledger.balance().await.unwrap(), dec("110.01"));

        assert!(matches!(ledger.credit(dec("0.004"), "card").await, Err(LedgerError::InvalidAmount(_))));
        assert_eq!(ledger.transactions().await.unwrap().len(), 1);
    }

    /// Memory storage whose wallet key can be made read-only.
    #[derive(Default)]
    struct WalletWriteFails {
        inner: MemoryStorage,
        failing: std::sync::atomic::AtomicBool,
    }

    impl KeyValueStore for WalletWriteFails {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            if key == keys::WALLET && self.failing.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(skyroute_core::StoreError::Unavailable("wallet is read-only".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> StoreResult<()> {
            self.inner.remove(key)
        }
    }

    #[tokio::test]
    async fn test_failed_credit_leaves_no_transaction() {
        let storage = Arc::new(WalletWriteFails::default());
        let ledger = LocalLedger::new(storage.clone());
        ledger.credit(dec("500"), "upi").await.unwrap();

        storage.failing.store(true, std::sync::atomic::Ordering::SeqCst);
        let err = ledger.credit(dec("250"), "card").await.unwrap_err();

        assert!(matches!(err, LedgerError::Store(_)));
        assert_eq!(ledger.balance().await.unwrap(), dec("500"));
        let history = ledger.transactions().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount, dec("500"));
    }
}
