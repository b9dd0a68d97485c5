use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps sensitive payment input (card numbers, CVVs) so it never shows up in
/// `Debug`/`Display` output or serialized responses. Only the last four
/// characters survive masking.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T: AsRef<str>> Masked<T> {
    pub fn expose(&self) -> &str {
        self.0.as_ref()
    }

    pub fn masked(&self) -> String {
        let value = self.0.as_ref();
        let visible: String = {
            let chars: Vec<char> = value.chars().filter(|c| !c.is_whitespace()).collect();
            let start = chars.len().saturating_sub(4);
            if chars.len() > 4 {
                chars[start..].iter().collect()
            } else {
                String::new()
            }
        };
        format!("********{}", visible)
    }
}

impl<T: AsRef<str>> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl<T: AsRef<str>> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl<T: AsRef<str>> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.masked())
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl From<&str> for Masked<String> {
    fn from(value: &str) -> Self {
        Masked(value.to_string())
    }
}
