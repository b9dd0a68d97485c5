use async_trait::async_trait;
use skyroute_core::repository::BookingStore;
use skyroute_core::storage::{append_json, keys, read_json_list, KeyValueStore};
use skyroute_core::StoreError;
use skyroute_shared::BookingRecord;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Append-only booking list under the `bookings` storage key.
pub struct LocalBookingStore {
    storage: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl LocalBookingStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl BookingStore for LocalBookingStore {
    async fn append(&self, record: &BookingRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        append_json(self.storage.as_ref(), keys::BOOKINGS, record)?;

        info!(
            "Booking {} stored for flight {} ({} passengers, total {})",
            record.id,
            record.flight.flight_number,
            record.passengers.len(),
            record.total_amount
        );
        Ok(())
    }

    async fn list(&self) -> Result<Vec<BookingRecord>, StoreError> {
        read_json_list(self.storage.as_ref(), keys::BOOKINGS)
    }

    async fn find(&self, id: &str) -> Result<Option<BookingRecord>, StoreError> {
        Ok(self.list().await?.into_iter().find(|b| b.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use rust_decimal::Decimal;
    use skyroute_shared::{FlightEndpoint, FlightOffer, Passenger};
    use std::str::FromStr;

    fn sample_record() -> BookingRecord {
        let flight = FlightOffer {
            id: "FL-101".to_string(),
            flight_number: "6E 2134".to_string(),
            airline: "IndiGo".to_string(),
            departure: FlightEndpoint { city: "Delhi".to_string(), time: "06:15".to_string() },
            arrival: FlightEndpoint { city: "Mumbai".to_string(), time: "08:25".to_string() },
            duration: "2h 10m".to_string(),
            price: Decimal::from(5890),
            date: "2024-12-25".to_string(),
        };
        let passengers = vec![Passenger {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            age: "34".to_string(),
        }];
        BookingRecord::new(flight, passengers, Decimal::from_str("6950.20").unwrap())
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let store = LocalBookingStore::new(Arc::new(MemoryStorage::new()));
        let first = sample_record();
        let second = sample_record();

        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);
        assert_eq!(all[0].total_amount, Decimal::from_str("6950.20").unwrap());
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let store = LocalBookingStore::new(Arc::new(MemoryStorage::new()));
        let record = sample_record();
        store.append(&record).await.unwrap();

        let found = store.find(&record.id).await.unwrap().unwrap();
        assert_eq!(found.passengers, record.passengers);
        assert!(store.find("SRA000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_bookings_read_empty_then_recover() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::BOOKINGS, "{\"oops\":").unwrap();
        let store = LocalBookingStore::new(storage.clone());

        assert!(store.list().await.unwrap().is_empty());

        store.append(&sample_record()).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_persisted_shape_is_camel_case() {
        let storage = Arc::new(MemoryStorage::new());
        let store = LocalBookingStore::new(storage.clone());
        store.append(&sample_record()).await.unwrap();

        let raw = storage.get(keys::BOOKINGS).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &value[0];
        assert!(entry["id"].as_str().unwrap().starts_with("SRA"));
        assert!(entry["totalAmount"].is_number());
        assert_eq!(entry["flight"]["flightNumber"], "6E 2134");
        assert_eq!(entry["passengers"][0]["firstName"], "Asha");
    }

    #[tokio::test]
    async fn test_append_keeps_entries_that_fail_to_parse() {
        let storage = Arc::new(MemoryStorage::new());
        let kept = sample_record();
        let mut legacy = serde_json::to_value(sample_record()).unwrap();
        legacy["date"] = serde_json::Value::from("2025-04-22T10:30:00");
        let seeded = serde_json::to_string(&vec![serde_json::to_value(&kept).unwrap(), legacy]).unwrap();
        storage.set(keys::BOOKINGS, &seeded).unwrap();
        let store = LocalBookingStore::new(storage.clone());

        assert_eq!(store.list().await.unwrap().len(), 1);

        let added = sample_record();
        store.append(&added).await.unwrap();

        let raw = storage.get(keys::BOOKINGS).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
        assert_eq!(value[1]["date"], "2025-04-22T10:30:00");

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, kept.id);
        assert_eq!(all[1].id, added.id);
    }
}
