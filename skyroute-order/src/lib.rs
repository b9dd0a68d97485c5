pub mod payment;
pub mod ticket;
pub mod wallet;
pub mod wizard;

pub use payment::PaymentResolver;
pub use ticket::{Ticket, TicketMaterializer};
pub use wallet::WalletService;
pub use wizard::{BookingWizard, WizardError, WizardSnapshot, WizardStage};
