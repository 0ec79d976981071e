//! Deserializers for catalog identifiers
//!
//! CleanStation part numbers look like decimals (`715.120`, `300.010`). Left
//! unquoted in YAML they resolve to floats and lose trailing zeros, so these
//! fields accept string scalars only and reject numbers with a message naming
//! the field.

use serde::de::{self, Deserializer, Visitor};
use std::fmt;

struct QuotedScalar {
    field: &'static str,
}

impl QuotedScalar {
    fn reject<E: de::Error>(&self, found: impl fmt::Display) -> E {
        E::custom(format!(
            "`{}` must be a string, found {}; quote numeric-looking ids (e.g. {}: \"715.120\")",
            self.field, found, self.field
        ))
    }
}

impl<'de> Visitor<'de> for QuotedScalar {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a string for `{}`", self.field)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Err(self.reject(format_args!("number {}", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Err(self.reject(format_args!("number {}", v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Err(self.reject(format_args!("number {}", v)))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Err(self.reject(format_args!("boolean {}", v)))
    }
}

fn quoted<'de, D: Deserializer<'de>>(d: D, field: &'static str) -> Result<String, D::Error> {
    d.deserialize_any(QuotedScalar { field })
}

/// `id` of an assembly, part or component reference
pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    quoted(d, "id")
}

pub fn part_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    quoted(d, "part_number")
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(deserialize_with = "super::part_number")]
        part_number: String,
    }

    #[test]
    fn test_quoted_number_keeps_trailing_zero() {
        let row: Row = serde_yml::from_str("part_number: \"715.120\"").unwrap();
        assert_eq!(row.part_number, "715.120");
    }

    #[test]
    fn test_plain_text_accepted() {
        let row: Row = serde_yml::from_str("part_number: 950.001-EN").unwrap();
        assert_eq!(row.part_number, "950.001-EN");
    }

    #[test]
    fn test_unquoted_number_rejected() {
        let err = serde_yml::from_str::<Row>("part_number: 715.120").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("`part_number`"), "{}", message);
        assert!(message.contains("quote"), "{}", message);
    }
}
