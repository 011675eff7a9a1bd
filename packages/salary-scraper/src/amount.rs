//! Salary figure normalization.
//!
//! Indian compensation posts quote figures in lakhs and crores ("12L",
//! "1.5 Cr", "18,00,000"). Everything is converted to plain currency units:
//! 1 lakh = 100,000 and 1 crore = 10,000,000.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};

pub const LAKH: f64 = 100_000.0;
pub const CRORE: f64 = 10_000_000.0;
pub const THOUSAND: f64 = 1_000.0;

lazy_static! {
    static ref AMOUNT_REGEX: Regex = Regex::new(
        r"^(?P<value>\d+(?:\.\d+)?)(?P<unit>crores?|cr|lakhs?|lacs?|lpa|l|k)?$"
    )
    .unwrap();
}

const CURRENCY_PREFIXES: &[&str] = &["₹", "inr", "rs.", "rs", "usd", "$"];
const PERIOD_SUFFIXES: &[&str] = &["/-", "perannum", "peryear", "/year", "/yr", "p.a.", "pa", "inr", "usd"];

/// Parse a human-written salary figure into currency units.
///
/// Returns `None` for anything that is not a single figure (ranges, words,
/// empty strings); unknown stays unknown.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut text: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    if let Some(rest) = CURRENCY_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
    {
        text = rest.to_string();
    }
    if let Some(rest) = PERIOD_SUFFIXES
        .iter()
        .find_map(|suffix| text.strip_suffix(suffix))
    {
        text = rest.to_string();
    }
    let text = text.trim_end_matches('.');

    let caps = AMOUNT_REGEX.captures(text)?;
    let value: f64 = caps.name("value")?.as_str().parse().ok()?;
    let scale = caps.name("unit").map_or(1.0, |unit| unit_scale(unit.as_str()));

    if scale == 1.0 {
        Some(value)
    } else {
        Some((value * scale).round())
    }
}

fn unit_scale(unit: &str) -> f64 {
    match unit {
        "cr" | "crore" | "crores" => CRORE,
        "k" => THOUSAND,
        _ => LAKH,
    }
}

/// Serde helper for amount fields: accepts a number, a string in any form
/// [`parse_amount`] understands, or null.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => parse_amount(&s),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lakh_suffix() {
        assert_eq!(parse_amount("12L"), Some(1_200_000.0));
        assert_eq!(parse_amount("12 lakhs"), Some(1_200_000.0));
        assert_eq!(parse_amount("12.5 LPA"), Some(1_250_000.0));
        assert_eq!(parse_amount("8 lacs"), Some(800_000.0));
    }

    #[test]
    fn test_crore_suffix() {
        assert_eq!(parse_amount("1.5Cr"), Some(15_000_000.0));
        assert_eq!(parse_amount("1 crore"), Some(10_000_000.0));
        assert_eq!(parse_amount("2 crores"), Some(20_000_000.0));
    }

    #[test]
    fn test_plain_and_grouped_numbers() {
        assert_eq!(parse_amount("1800000"), Some(1_800_000.0));
        assert_eq!(parse_amount("18,00,000"), Some(1_800_000.0));
        assert_eq!(parse_amount("₹12,00,000/-"), Some(1_200_000.0));
        assert_eq!(parse_amount("Rs. 12,00,000/-"), Some(1_200_000.0));
        assert_eq!(parse_amount("1.5 Cr."), Some(15_000_000.0));
        assert_eq!(parse_amount("45 LPA."), Some(4_500_000.0));
        assert_eq!(parse_amount("₹ 18,00,000"), Some(1_800_000.0));
        assert_eq!(parse_amount("Rs. 25L p.a."), Some(2_500_000.0));
        assert_eq!(parse_amount("250k"), Some(250_000.0));
        assert_eq!(parse_amount("1200000 INR"), Some(1_200_000.0));
    }

    #[test]
    fn test_unparsable_is_none() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("not disclosed"), None);
        assert_eq!(parse_amount("12-15L"), None);
        assert_eq!(parse_amount("L12"), None);
    }

    #[test]
    fn test_deserialize_amount_variants() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "deserialize_amount")]
            v: Option<f64>,
        }

        let parse = |json: &str| serde_json::from_str::<Row>(json).unwrap().v;

        assert_eq!(parse(r#"{"v": 1200000}"#), Some(1_200_000.0));
        assert_eq!(parse(r#"{"v": 0}"#), Some(0.0));
        assert_eq!(parse(r#"{"v": "12L"}"#), Some(1_200_000.0));
        assert_eq!(parse(r#"{"v": "unknown"}"#), None);
        assert_eq!(parse(r#"{"v": null}"#), None);
        assert_eq!(parse(r#"{}"#), None);
    }
}
