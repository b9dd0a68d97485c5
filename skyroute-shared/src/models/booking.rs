use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids;
use crate::models::{FlightOffer, Passenger};

/// A confirmed purchase. Written once when payment succeeds and never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub id: String,
    pub flight: FlightOffer,
    pub passengers: Vec<Passenger>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub date: DateTime<Utc>,
}

impl BookingRecord {
    pub fn new(flight: FlightOffer, passengers: Vec<Passenger>, total_amount: Decimal) -> Self {
        Self {
            id: ids::booking_id(),
            flight,
            passengers,
            total_amount,
            date: Utc::now(),
        }
    }

    pub fn passenger_count(&self) -> usize {
        self.passengers.len()
    }
}
