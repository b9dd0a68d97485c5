pub mod fare;
pub mod flights;

pub use fare::{tax_multiplier, total_amount, FareBreakdown};
pub use flights::FlightCatalog;
