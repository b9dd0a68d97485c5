pub mod booking;
pub mod flight;
pub mod passenger;
pub mod transaction;

pub use booking::BookingRecord;
pub use flight::{FlightEndpoint, FlightOffer};
pub use passenger::{FieldError, Passenger, PassengerField, PassengerInput};
pub use transaction::{PaymentMethod, TransactionRecord, TransactionType};
