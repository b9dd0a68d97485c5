use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use skyroute_shared::money::format_money;
use skyroute_shared::BookingRecord;
use std::fmt;

pub const MAX_SEAT_ROW: u8 = 30;

/// One printed line per passenger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRow {
    pub name: String,
    pub age: String,
    pub seat: String,
}

/// Printable e-ticket for a confirmed booking
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub booking_id: String,
    pub airline: String,
    pub flight_number: String,
    pub from: String,
    pub to: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub travel_date: String,
    pub booked_at: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub rows: Vec<TicketRow>,
}

impl Ticket {
    pub fn file_name(&self) -> String {
        format!("ticket-{}.txt", self.booking_id)
    }

    /// Plain-text document suitable for printing or saving.
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(56);
        let divider = "-".repeat(56);

        writeln!(f, "{rule}")?;
        writeln!(f, "  E-TICKET  {}", self.booking_id)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "  {} {}", self.airline, self.flight_number)?;
        writeln!(f, "  {} {}  ->  {} {}", self.from, self.departure_time, self.to, self.arrival_time)?;
        writeln!(f, "  Date: {}    Duration: {}", self.travel_date, self.duration)?;
        writeln!(f, "  Booked: {}", self.booked_at.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(f, "{divider}")?;
        writeln!(f, "  {:<4}{:<32}{:<6}{}", "#", "Passenger", "Age", "Seat")?;
        for (i, row) in self.rows.iter().enumerate() {
            writeln!(f, "  {:<4}{:<32}{:<6}{}", i + 1, row.name, row.age, row.seat)?;
        }
        writeln!(f, "{divider}")?;
        writeln!(f, "  Total paid (incl. taxes): {}", format_money(self.total_amount))?;
        writeln!(f, "{rule}")
    }
}

/// Turns a confirmed booking into a [`Ticket`].
///
/// Seats are decorative: letter by passenger position, random row, drawn
/// again on every render and never stored or checked for collisions.
pub struct TicketMaterializer;

impl TicketMaterializer {
    pub fn materialize(booking: &BookingRecord) -> Ticket {
        Self::materialize_with(booking, &mut rand::thread_rng())
    }

    pub fn materialize_with<R: Rng>(booking: &BookingRecord, rng: &mut R) -> Ticket {
        let rows = booking
            .passengers
            .iter()
            .enumerate()
            .map(|(index, passenger)| TicketRow {
                name: passenger.full_name(),
                age: passenger.age.clone(),
                seat: Self::seat_for(index, rng),
            })
            .collect();

        let flight = &booking.flight;
        Ticket {
            booking_id: booking.id.clone(),
            airline: flight.airline.clone(),
            flight_number: flight.flight_number.clone(),
            from: flight.departure.city.clone(),
            to: flight.arrival.city.clone(),
            departure_time: flight.departure.time.clone(),
            arrival_time: flight.arrival.time.clone(),
            duration: flight.duration.clone(),
            travel_date: flight.date.clone(),
            booked_at: booking.date,
            total_amount: booking.total_amount,
            rows,
        }
    }

    fn seat_for<R: Rng>(index: usize, rng: &mut R) -> String {
        let letter = (b'A' + (index % 26) as u8) as char;
        let number = rng.gen_range(1..=MAX_SEAT_ROW);
        format!("{}{}", letter, number)
    }
}
