pub mod ids;
pub mod models;
pub mod money;
pub mod pii;

pub use models::{
    BookingRecord, FieldError, FlightEndpoint, FlightOffer, Passenger, PassengerField,
    PassengerInput, PaymentMethod, TransactionRecord, TransactionType,
};
pub use pii::Masked;
