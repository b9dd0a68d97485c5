//! Booking wizard: `Passengers -> Summary -> Payment -> Completed`.
//!
//! One wizard drives one flight purchase for the session. Every step change
//! runs under a transition flag; while it is set any other step change is
//! refused with [`WizardError::TransitionInProgress`]. `close` is not a step
//! change and is always accepted.

use rust_decimal::Decimal;
use serde::Serialize;
use skyroute_catalog::FareBreakdown;
use skyroute_core::payment::{PaymentDetails, PaymentError, PaymentReceipt, PaymentRequest};
use skyroute_core::repository::BookingStore;
use skyroute_core::StoreError;
use skyroute_shared::{BookingRecord, FieldError, FlightOffer, Passenger, PassengerInput};
use skyroute_store::app_config::BusinessRules;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

use crate::payment::PaymentResolver;
use crate::ticket::{Ticket, TicketMaterializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStage {
    #[default]
    Passengers,
    Summary,
    Payment,
    Completed,
}

impl WizardStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStage::Passengers => "passengers",
            WizardStage::Summary => "summary",
            WizardStage::Payment => "payment",
            WizardStage::Completed => "completed",
        }
    }
}

impl fmt::Display for WizardStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("No flight selected")]
    NoFlightSelected,

    #[error("Between 1 and {max} passengers are required, got {count}")]
    PassengerCount { count: usize, max: usize },

    #[error("Passenger details are invalid ({} problems)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Cannot {action} at the {from} step")]
    InvalidTransition { from: WizardStage, action: &'static str },

    #[error("Another step transition is still in progress")]
    TransitionInProgress,

    #[error("The booking dialog was closed before the step completed")]
    Abandoned,

    #[error("No confirmed booking to show")]
    NoConfirmation,

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read-only view of the wizard for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub stage: WizardStage,
    pub flight: Option<FlightOffer>,
    pub passengers: Vec<Passenger>,
    pub fare: Option<FareBreakdown>,
    pub confirmation: Option<BookingRecord>,
    pub transitioning: bool,
}

impl WizardSnapshot {
    pub fn total_amount(&self) -> Option<Decimal> {
        self.fare.as_ref().map(|f| f.total)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub booking: BookingRecord,
    pub receipt: PaymentReceipt,
}

#[derive(Debug, Default)]
struct WizardState {
    stage: WizardStage,
    flight: Option<FlightOffer>,
    passengers: Vec<Passenger>,
    fare: Option<FareBreakdown>,
    confirmation: Option<BookingRecord>,
    // Bumped on open/close; a transition that started under an older
    // generation must not write into the reset wizard.
    generation: u64,
}

impl WizardState {
    fn reset(&mut self) {
        self.stage = WizardStage::Passengers;
        self.passengers.clear();
        self.fare = None;
        self.confirmation = None;
        self.generation += 1;
    }

    fn expect_stage(&self, expected: WizardStage, action: &'static str) -> Result<(), WizardError> {
        if self.stage != expected {
            return Err(WizardError::InvalidTransition { from: self.stage, action });
        }
        Ok(())
    }

    fn ensure_current(&self, generation: u64) -> Result<(), WizardError> {
        if self.generation != generation {
            return Err(WizardError::Abandoned);
        }
        Ok(())
    }
}

/// Holds the transition flag for the duration of one step change.
struct TransitionGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> TransitionGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, WizardError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| WizardError::TransitionInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct BookingWizard {
    state: Mutex<WizardState>,
    transitioning: AtomicBool,
    resolver: Arc<PaymentResolver>,
    bookings: Arc<dyn BookingStore>,
    rules: BusinessRules,
}

impl BookingWizard {
    pub fn new(
        resolver: Arc<PaymentResolver>,
        bookings: Arc<dyn BookingStore>,
        rules: BusinessRules,
    ) -> Self {
        Self {
            state: Mutex::new(WizardState::default()),
            transitioning: AtomicBool::new(false),
            resolver,
            bookings,
            rules,
        }
    }

    /// Start a purchase for `flight`, discarding any previous progress.
    pub fn open(&self, flight: FlightOffer) -> WizardSnapshot {
        {
            let mut state = self.state();
            state.reset();
            info!("Booking wizard opened for flight {} ({})", flight.flight_number, flight.id);
            state.flight = Some(flight);
        }
        self.snapshot()
    }

    /// Reset to an empty passenger step. Stored bookings are not affected.
    pub fn close(&self) -> WizardSnapshot {
        {
            let mut state = self.state();
            debug!("Booking wizard closed at the {} step", state.stage);
            state.reset();
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let state = self.state();
        WizardSnapshot {
            stage: state.stage,
            flight: state.flight.clone(),
            passengers: state.passengers.clone(),
            fare: state.fare.clone(),
            confirmation: state.confirmation.clone(),
            transitioning: self.transitioning.load(Ordering::Acquire),
        }
    }

    /// `Passengers -> Summary`.
    pub async fn submit_passengers(&self, inputs: &[PassengerInput]) -> Result<WizardSnapshot, WizardError> {
        let transition = TransitionGuard::acquire(&self.transitioning)?;

        let (generation, price) = {
            let state = self.state();
            let flight = state.flight.as_ref().ok_or(WizardError::NoFlightSelected)?;
            state.expect_stage(WizardStage::Passengers, "submit passengers")?;
            (state.generation, flight.price)
        };

        let passengers = self.validate_passengers(inputs)?;
        let fare = FareBreakdown::new(price, passengers.len(), self.rules.tax_rate);

        self.animate().await;

        {
            let mut state = self.state();
            state.ensure_current(generation)?;
            info!("{} passengers entered, total {}", passengers.len(), fare.total);
            state.passengers = passengers;
            state.fare = Some(fare);
            state.stage = WizardStage::Summary;
        }
        drop(transition);
        Ok(self.snapshot())
    }

    /// `Summary -> Payment`.
    pub async fn confirm_summary(&self) -> Result<WizardSnapshot, WizardError> {
        self.step(WizardStage::Summary, WizardStage::Payment, "confirm the summary").await
    }

    /// `Summary -> Passengers` or `Payment -> Summary`; entered data is kept.
    pub async fn back(&self) -> Result<WizardSnapshot, WizardError> {
        let from = self.state().stage;
        match from {
            WizardStage::Summary => self.step(from, WizardStage::Passengers, "go back").await,
            WizardStage::Payment => self.step(from, WizardStage::Summary, "go back").await,
            _ => Err(WizardError::InvalidTransition { from, action: "go back" }),
        }
    }

    /// `Payment -> Completed`, only if the payment goes through.
    ///
    /// On success the booking is appended to the store before the wizard
    /// moves on. If the booking cannot be stored the payment is refunded and
    /// the wizard stays at payment. If the wizard is closed while the payment is processing, the
    /// booking is still stored but the wizard stays reset.
    pub async fn pay(&self, details: PaymentDetails) -> Result<BookingConfirmation, WizardError> {
        let transition = TransitionGuard::acquire(&self.transitioning)?;

        let (generation, flight, passengers, total) = {
            let state = self.state();
            state.expect_stage(WizardStage::Payment, "pay")?;
            let flight = state.flight.clone().ok_or(WizardError::NoFlightSelected)?;
            let total = state
                .fare
                .as_ref()
                .map(|f| f.total)
                .ok_or(WizardError::InvalidTransition { from: state.stage, action: "pay" })?;
            (state.generation, flight, state.passengers.clone(), total)
        };

        let request = PaymentRequest { amount: total, details };
        let receipt = match self.resolver.resolve(&request).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("Payment for flight {} failed, staying at payment: {}", flight.flight_number, e);
                return Err(e.into());
            }
        };

        let booking = BookingRecord::new(flight, passengers, total);
        if let Err(e) = self.bookings.append(&booking).await {
            warn!(
                "Booking {} could not be stored, refunding payment {}: {}",
                booking.id, receipt.reference, e
            );
            if let Err(refund_err) = self.resolver.refund(&receipt).await {
                error!(
                    "Payment {} of {} was captured for unstored booking {} and could not be refunded: {}",
                    receipt.reference, receipt.amount, booking.id, refund_err
                );
            }
            return Err(e.into());
        }

        self.animate().await;

        {
            let mut state = self.state();
            if state.generation == generation {
                state.stage = WizardStage::Completed;
                state.confirmation = Some(booking.clone());
                info!("Booking {} confirmed", booking.id);
            } else {
                info!("Booking {} confirmed after the wizard was closed", booking.id);
            }
        }
        drop(transition);

        Ok(BookingConfirmation { booking, receipt })
    }

    /// Render the active confirmation as a ticket. Seats are drawn fresh on
    /// every call.
    pub fn ticket(&self) -> Result<Ticket, WizardError> {
        let state = self.state();
        match (&state.stage, &state.confirmation) {
            (WizardStage::Completed, Some(booking)) => Ok(TicketMaterializer::materialize(booking)),
            _ => Err(WizardError::NoConfirmation),
        }
    }

    async fn step(
        &self,
        from: WizardStage,
        to: WizardStage,
        action: &'static str,
    ) -> Result<WizardSnapshot, WizardError> {
        let transition = TransitionGuard::acquire(&self.transitioning)?;

        let generation = {
            let state = self.state();
            state.flight.as_ref().ok_or(WizardError::NoFlightSelected)?;
            state.expect_stage(from, action)?;
            state.generation
        };

        self.animate().await;

        {
            let mut state = self.state();
            state.ensure_current(generation)?;
            debug!("Wizard step {} -> {}", from, to);
            state.stage = to;
        }
        drop(transition);
        Ok(self.snapshot())
    }

    fn validate_passengers(&self, inputs: &[PassengerInput]) -> Result<Vec<Passenger>, WizardError> {
        let max = self.rules.max_passengers;
        if inputs.is_empty() || inputs.len() > max {
            return Err(WizardError::PassengerCount { count: inputs.len(), max });
        }

        let mut passengers = Vec::with_capacity(inputs.len());
        let mut errors = Vec::new();
        for (index, input) in inputs.iter().enumerate() {
            match input.validate(index) {
                Ok(passenger) => passengers.push(passenger),
                Err(mut problems) => errors.append(&mut problems),
            }
        }

        if !errors.is_empty() {
            debug!("Passenger form rejected with {} problems", errors.len());
            return Err(WizardError::Validation(errors));
        }
        Ok(passengers)
    }

    async fn animate(&self) {
        let delay = self.rules.transition_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn state(&self) -> MutexGuard<'_, WizardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
