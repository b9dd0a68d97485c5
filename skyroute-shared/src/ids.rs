use rand::Rng;

pub const BOOKING_ID_PREFIX: &str = "SRA";
pub const TRANSACTION_ID_PREFIX: &str = "TXN";

/// Booking reference: `SRA` followed by six digits.
pub fn booking_id() -> String {
    booking_id_with(&mut rand::thread_rng())
}

pub fn booking_id_with<R: Rng>(rng: &mut R) -> String {
    format!("{}{}", BOOKING_ID_PREFIX, rng.gen_range(100_000..1_000_000u32))
}

/// Transaction reference: `TXN` followed by ten random digits.
pub fn transaction_id() -> String {
    transaction_id_with(&mut rand::thread_rng())
}

pub fn transaction_id_with<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}{}",
        TRANSACTION_ID_PREFIX,
        rng.gen_range(1_000_000_000..10_000_000_000u64)
    )
}
