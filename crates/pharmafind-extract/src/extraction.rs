//! Parsing of collaborator replies into structured records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Collaborator service error: {0}")]
    Service(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Raw price-slip reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlipOutput {
    pub items: Vec<RawSlipItem>,
}

/// One row as returned by the extractor, before cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSlipItem {
    pub medicine_name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: Option<String>,
}

/// Availability as read from a slip.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SlipStock {
    Available,
    Unavailable,
}

/// A cleaned-up slip row, ready to become an inventory upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlipItem {
    pub medicine_name: String,
    pub price: f64,
    /// None when the slip does not say
    pub stock: Option<SlipStock>,
}

/// Prescription reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionOutput {
    #[serde(default)]
    pub medicine_name: Option<String>,
}

/// Name-validation reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NameValidation {
    pub valid: bool,
    #[serde(default)]
    pub corrected_name: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl NameValidation {
    /// The name to search with: the correction if one was offered.
    pub fn effective_name<'a>(&'a self, typed: &'a str) -> &'a str {
        match &self.corrected_name {
            Some(corrected) if self.valid && !corrected.trim().is_empty() => corrected.trim(),
            _ => typed,
        }
    }
}

/// Cut the outermost JSON object out of a reply that may carry extra prose.
fn json_object_slice(text: &str) -> ExtractionResult<&str> {
    let start = text.find('{').ok_or_else(|| {
        ExtractionError::InvalidFormat("No JSON object found in response".into())
    })?;
    let end = text.rfind('}').ok_or_else(|| {
        ExtractionError::InvalidFormat("No closing brace found in response".into())
    })?;
    if end < start {
        return Err(ExtractionError::InvalidFormat(
            "Closing brace precedes opening brace".into(),
        ));
    }
    Ok(&text[start..=end])
}

/// Parse a price-slip reply.
pub fn parse_price_slip_output(text: &str) -> ExtractionResult<SlipOutput> {
    let output: SlipOutput = serde_json::from_str(json_object_slice(text)?)?;
    Ok(output)
}

/// Parse a prescription reply into the medicine name.
pub fn parse_prescription_output(text: &str) -> ExtractionResult<String> {
    let output: PrescriptionOutput = serde_json::from_str(json_object_slice(text)?)?;
    output
        .medicine_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ExtractionError::InvalidFormat("No medicine name in prescription".into()))
}

/// Parse a name-validation reply.
pub fn parse_validation_output(text: &str) -> ExtractionResult<NameValidation> {
    let validation: NameValidation = serde_json::from_str(json_object_slice(text)?)?;
    Ok(validation)
}

/// Interpret a free-form stock label.
pub fn parse_stock(label: &str) -> Option<SlipStock> {
    match label.trim().to_lowercase().as_str() {
        "available" | "in stock" | "yes" => Some(SlipStock::Available),
        "unavailable" | "out of stock" | "no" | "not available" => Some(SlipStock::Unavailable),
        _ => None,
    }
}

/// Clean raw rows: drop unnamed rows and rows without a positive price.
pub fn to_slip_items(output: &SlipOutput) -> Vec<SlipItem> {
    output
        .items
        .iter()
        .filter_map(|raw| {
            let name = raw.medicine_name.trim();
            let price = raw.price.filter(|p| p.is_finite() && *p > 0.0);
            match (name.is_empty(), price) {
                (false, Some(price)) => Some(SlipItem {
                    medicine_name: name.to_string(),
                    price,
                    stock: raw.stock.as_deref().and_then(parse_stock),
                }),
                _ => {
                    tracing::debug!(medicine = %raw.medicine_name, price = ?raw.price, "skipping slip row");
                    None
                }
            }
        })
        .collect()
}

/// Line-based extractor for plain-text slips (for testing).
pub struct MockExtractor;

impl MockExtractor {
    /// Read lines shaped like `Name - 45.50` or `Name Rs 30 (out of stock)`.
    pub fn extract(slip: &str) -> SlipOutput {
        let items = slip.lines().filter_map(parse_slip_line).collect();
        SlipOutput { items }
    }
}

fn parse_slip_line(line: &str) -> Option<RawSlipItem> {
    let mut text = line.trim().to_string();
    let lower = text.to_ascii_lowercase();
    if text.is_empty() || lower.starts_with("total") {
        return None;
    }

    let mut stock = None;
    for marker in ["(out of stock)", "(unavailable)"] {
        if let Some(pos) = lower.find(marker) {
            text.replace_range(pos..pos + marker.len(), "");
            stock = Some("Unavailable".to_string());
            break;
        }
    }

    let mut words: Vec<&str> = text.split_whitespace().collect();
    let price_word = words.pop()?;
    let price: f64 = price_word
        .trim_start_matches("Rs.")
        .trim_start_matches("Rs")
        .trim_start_matches('₹')
        .parse()
        .ok()?;

    while let Some(last) = words.last() {
        if matches!(*last, "-" | "Rs" | "Rs." | "₹" | ":" | "|") || last.chars().all(|c| c == '.') {
            words.pop();
        } else {
            break;
        }
    }
    if words.is_empty() {
        return None;
    }

    Some(RawSlipItem {
        medicine_name: words.join(" "),
        price: Some(price),
        stock,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_slip_output() {
        let json = r#"{"items":[{"medicine_name":"Dolo 650","price":30,"stock":null}]}"#;

        let output = parse_price_slip_output(json).unwrap();
        assert_eq!(output.items.len(), 1);
        assert_eq!(output.items[0].medicine_name, "Dolo 650");
        assert_eq!(output.items[0].price, Some(30.0));
    }

    #[test]
    fn test_parse_price_slip_output_with_prefix() {
        let json = r#"Here is what I found:
{"items":[{"medicine_name":"Azee 500","price":119.5}]}
Let me know if you need anything else."#;

        let output = parse_price_slip_output(json).unwrap();
        assert_eq!(output.items.len(), 1);
        assert_eq!(output.items[0].stock, None);
    }

    #[test]
    fn test_parse_price_slip_output_no_json() {
        assert!(matches!(
            parse_price_slip_output("I could not read the image"),
            Err(ExtractionError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_price_slip_output("} backwards {"),
            Err(ExtractionError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_to_slip_items_filters_rows() {
        let output = SlipOutput {
            items: vec![
                RawSlipItem {
                    medicine_name: " Crocin ".into(),
                    price: Some(20.0),
                    stock: Some("out of stock".into()),
                },
                RawSlipItem {
                    medicine_name: "Free Sample".into(),
                    price: Some(0.0),
                    stock: None,
                },
                RawSlipItem {
                    medicine_name: "".into(),
                    price: Some(10.0),
                    stock: None,
                },
                RawSlipItem {
                    medicine_name: "No Price".into(),
                    price: None,
                    stock: None,
                },
            ],
        };

        let items = to_slip_items(&output);
        assert_eq!(
            items,
            vec![SlipItem {
                medicine_name: "Crocin".into(),
                price: 20.0,
                stock: Some(SlipStock::Unavailable),
            }]
        );
    }

    #[test]
    fn test_parse_stock() {
        assert_eq!(parse_stock("Available"), Some(SlipStock::Available));
        assert_eq!(parse_stock(" In Stock "), Some(SlipStock::Available));
        assert_eq!(parse_stock("UNAVAILABLE"), Some(SlipStock::Unavailable));
        assert_eq!(parse_stock("maybe"), None);
    }

    #[test]
    fn test_parse_prescription_output() {
        let name = parse_prescription_output(r#"{"medicine_name": " Amoxicillin 500 "}"#).unwrap();
        assert_eq!(name, "Amoxicillin 500");

        assert!(parse_prescription_output(r#"{"medicine_name": null}"#).is_err());
        assert!(parse_prescription_output(r#"{"medicine_name": "  "}"#).is_err());
    }

    #[test]
    fn test_parse_validation_output() {
        let validation = parse_validation_output(
            r#"{"valid": true, "corrected_name": "Paracetamol", "reason": null}"#,
        )
        .unwrap();
        assert!(validation.valid);
        assert_eq!(validation.effective_name("paracetmol"), "Paracetamol");

        let rejected =
            parse_validation_output(r#"{"valid": false, "reason": "Not a medicine"}"#).unwrap();
        assert!(!rejected.valid);
        assert_eq!(rejected.reason.as_deref(), Some("Not a medicine"));
        assert_eq!(rejected.effective_name("banana"), "banana");
    }

    #[test]
    fn test_mock_extractor() {
        let slip = "Dolo 650 - 30\nAzee 500 Rs 119.50 (out of stock)\nCough syrup ...... ₹85\n\nTotal 234.5";
        let output = MockExtractor::extract(slip);

        assert_eq!(output.items.len(), 3);
        assert_eq!(output.items[0].medicine_name, "Dolo 650");
        assert_eq!(output.items[0].price, Some(30.0));
        assert_eq!(output.items[0].stock, None);

        assert_eq!(output.items[1].medicine_name, "Azee 500");
        assert_eq!(output.items[1].price, Some(119.5));
        assert_eq!(output.items[1].stock.as_deref(), Some("Unavailable"));

        assert_eq!(output.items[2].medicine_name, "Cough syrup");
        assert_eq!(output.items[2].price, Some(85.0));
    }

    #[test]
    fn test_mock_extractor_skips_unpriced_lines() {
        let output = MockExtractor::extract("City Medicals\nPhone 555\nDolo 30");
        let names: Vec<&str> = output.items.iter().map(|i| i.medicine_name.as_str()).collect();
        assert_eq!(names, vec!["Phone", "Dolo"]);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_mock_extractor_reads_dash_lines(
                name in "[A-Z][a-z]{2,10}( [0-9]{2,3})?",
                paise in 1u32..100_000,
            ) {
                prop_assume!(!name.to_ascii_lowercase().starts_with("total"));
                let price = f64::from(paise) / 100.0;
                let output = MockExtractor::extract(&format!("{name} - {price}"));
                prop_assert_eq!(output.items.len(), 1);
                prop_assert_eq!(&output.items[0].medicine_name, &name);
                prop_assert_eq!(output.items[0].price, Some(price));
            }
        }
    }
}
