//! Lenient scalar fields
//!
//! Bulk CSV files carry every cell as text, so typed fields also accept
//! their textual form: `"1500"` for a number, `"yes"` for a flag, a single
//! name for a list. Text fields accept bare numbers in turn, which keeps a
//! phone number like `0712345678` intact when it arrives as a string and
//! readable when a JSON file writes it as a number.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar<T> {
    Typed(T),
    Text(String),
}

/// `Option<number>` that also reads numeric text; blank text is `None`
pub mod option_number {
    use super::*;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: Display,
    {
        match Option::<Scalar<T>>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Scalar::Typed(n)) => Ok(Some(n)),
            Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(Scalar::Text(s)) => s
                .trim()
                .replace(',', "")
                .parse()
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid number '{}': {}", s, e))),
        }
    }
}

/// `bool` that also reads yes/no, true/false, y/n and 1/0
pub mod flag {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Scalar<bool>>::deserialize(deserializer)? {
            None => Ok(false),
            Some(Scalar::Typed(b)) => Ok(b),
            Some(Scalar::Text(s)) => match s.trim().to_lowercase().as_str() {
                "" | "false" | "no" | "n" | "0" => Ok(false),
                "true" | "yes" | "y" | "1" => Ok(true),
                other => Err(D::Error::custom(format!("'{}' is not yes or no", other))),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl TextOrNumber {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
        }
    }
}

/// `Option<String>` that also takes a bare number
pub mod option_text {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<TextOrNumber>::deserialize(deserializer)?.map(TextOrNumber::into_text))
    }
}

/// `String` that also takes a bare number
pub mod text {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        TextOrNumber::deserialize(deserializer).map(TextOrNumber::into_text)
    }
}

/// `Vec<String>` that also takes one string for a one-item list
pub mod string_list {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<TextOrNumber>),
        One(TextOrNumber),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(OneOrMany::Many(items)) => items.into_iter().map(TextOrNumber::into_text).collect(),
            Some(OneOrMany::One(item)) => {
                let item = item.into_text();
                if item.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![item]
                }
            }
        })
    }
}
