use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_PASSENGER_AGE: u8 = 120;

/// A validated traveller. Only built through [`PassengerInput::validate`] (or
/// read back from storage), so every field is known to be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub first_name: String,
    pub last_name: String,
    pub age: String,
}

impl Passenger {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Raw form input for one passenger row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub age: String,
}

impl PassengerInput {
    pub fn new(first_name: &str, last_name: &str, age: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age: age.to_string(),
        }
    }

    /// Validate the row at `index`, collecting every field problem at once.
    pub fn validate(&self, index: usize) -> Result<Passenger, Vec<FieldError>> {
        let mut errors = Vec::new();

        let first_name = self.first_name.trim();
        if first_name.is_empty() {
            errors.push(FieldError::new(index, PassengerField::FirstName, "First name is required"));
        }

        let last_name = self.last_name.trim();
        if last_name.is_empty() {
            errors.push(FieldError::new(index, PassengerField::LastName, "Last name is required"));
        }

        let age = self.age.trim();
        if age.is_empty() {
            errors.push(FieldError::new(index, PassengerField::Age, "Age is required"));
        } else {
            match age.parse::<u8>() {
                Ok(years) if years <= MAX_PASSENGER_AGE => {}
                _ => errors.push(FieldError::new(
                    index,
                    PassengerField::Age,
                    "Age must be a whole number between 0 and 120",
                )),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Passenger {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age: age.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassengerField {
    FirstName,
    LastName,
    Age,
}

impl PassengerField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerField::FirstName => "firstName",
            PassengerField::LastName => "lastName",
            PassengerField::Age => "age",
        }
    }
}

/// One per-field validation message, addressed by passenger position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub passenger: usize,
    pub field: PassengerField,
    pub message: String,
}

impl FieldError {
    pub fn new(passenger: usize, field: PassengerField, message: &str) -> Self {
        Self {
            passenger,
            field,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "passenger {} {}: {}",
            self.passenger + 1,
            self.field.as_str(),
            self.message
        )
    }
}
