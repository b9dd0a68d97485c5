pub mod app_config;
pub mod bookings;
pub mod ledger;
pub mod storage;

pub use bookings::LocalBookingStore;
pub use ledger::LocalLedger;
pub use storage::{open_storage, FileStorage, MemoryStorage};
