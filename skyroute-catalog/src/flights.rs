use rust_decimal::Decimal;
use skyroute_shared::{FlightEndpoint, FlightOffer};

/// Static, read-only flight offers served to search and booking.
#[derive(Debug, Clone)]
pub struct FlightCatalog {
    offers: Vec<FlightOffer>,
}

impl FlightCatalog {
    pub fn new(offers: Vec<FlightOffer>) -> Self {
        Self { offers }
    }

    /// The demo schedule.
    pub fn builtin() -> Self {
        let rows: [(&str, &str, &str, &str, &str, &str, &str, &str, i64, &str); 8] = [
            ("FL-101", "6E 2134", "IndiGo", "Delhi", "06:15", "Mumbai", "08:25", "2h 10m", 5890, "2024-12-25"),
            ("FL-102", "AI 665", "Air India", "Delhi", "09:40", "Mumbai", "11:55", "2h 15m", 6420, "2024-12-25"),
            ("FL-103", "UK 981", "Vistara", "Mumbai", "07:05", "Bengaluru", "08:50", "1h 45m", 4250, "2024-12-26"),
            ("FL-104", "SG 8169", "SpiceJet", "Bengaluru", "13:20", "Kolkata", "15:55", "2h 35m", 5175, "2024-12-26"),
            ("FL-105", "6E 6113", "IndiGo", "Chennai", "18:45", "Delhi", "21:35", "2h 50m", 7310, "2024-12-27"),
            ("FL-106", "AI 539", "Air India", "Hyderabad", "10:10", "Chennai", "11:25", "1h 15m", 3380, "2024-12-27"),
            ("FL-107", "UK 837", "Vistara", "Kolkata", "16:30", "Delhi", "18:55", "2h 25m", 6890, "2024-12-28"),
            ("FL-108", "QP 1402", "Akasa Air", "Mumbai", "20:15", "Goa", "21:25", "1h 10m", 3140, "2024-12-28"),
        ];

        let offers = rows
            .iter()
            .map(|&(id, number, airline, from, dep, to, arr, duration, price, date)| FlightOffer {
                id: id.to_string(),
                flight_number: number.to_string(),
                airline: airline.to_string(),
                departure: FlightEndpoint { city: from.to_string(), time: dep.to_string() },
                arrival: FlightEndpoint { city: to.to_string(), time: arr.to_string() },
                duration: duration.to_string(),
                price: Decimal::from(price),
                date: date.to_string(),
            })
            .collect();

        Self::new(offers)
    }

    pub fn all(&self) -> &[FlightOffer] {
        &self.offers
    }

    pub fn find(&self, id: &str) -> Option<&FlightOffer> {
        self.offers.iter().find(|o| o.id == id)
    }

    /// Case-insensitive city match; a missing or blank filter matches everything.
    pub fn search(&self, from: Option<&str>, to: Option<&str>) -> Vec<&FlightOffer> {
        self.offers
            .iter()
            .filter(|o| city_matches(&o.departure.city, from))
            .filter(|o| city_matches(&o.arrival.city, to))
            .collect()
    }
}

impl Default for FlightCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn city_matches(city: &str, filter: Option<&str>) -> bool {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(wanted) => city.eq_ignore_ascii_case(wanted),
        None => true,
    }
}
