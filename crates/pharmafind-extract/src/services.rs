//! Contracts for the external collaborators the app talks to.
//!
//! Implementations live in the host application (vision model, geocoding
//! service, device location). The core only needs their results.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extraction::{ExtractionResult, NameValidation, SlipItem};

/// A latitude/longitude pair as reported by a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Checks a typed medicine name before searching.
pub trait NameValidator {
    fn validate(&self, name: &str) -> ExtractionResult<NameValidation>;
}

/// Reads images uploaded by owners and patients.
pub trait ItemExtractor {
    /// Price-slip photo to inventory rows.
    fn extract_items(&self, image: &[u8]) -> ExtractionResult<Vec<SlipItem>>;

    /// Prescription photo to a single medicine name.
    fn extract_medicine_name(&self, image: &[u8]) -> ExtractionResult<String>;
}

/// Converts between addresses and coordinates.
pub trait Geocoder {
    /// `Ok(None)` when the address cannot be resolved.
    fn address_to_coordinate(&self, address: &str) -> ExtractionResult<Option<GeoPoint>>;

    fn coordinate_to_address(&self, point: GeoPoint) -> ExtractionResult<String>;
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// Reports where the device currently is.
pub trait LocationProvider {
    fn current_location(&self) -> Result<GeoPoint, LocationError>;
}

/// Resolve the search origin: the device location when granted, otherwise
/// the geocoded fallback address.
pub fn resolve_origin(
    provider: &dyn LocationProvider,
    geocoder: &dyn Geocoder,
    fallback_address: &str,
) -> Result<GeoPoint, LocationError> {
    match provider.current_location() {
        Ok(point) => Ok(point),
        Err(err) => {
            tracing::info!(error = %err, "falling back to geocoded address");
            match geocoder.address_to_coordinate(fallback_address) {
                Ok(Some(point)) => Ok(point),
                Ok(None) => Err(err),
                Err(geocode_err) => Err(LocationError::Unavailable(geocode_err.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{parse_validation_output, to_slip_items, MockExtractor};

    struct FixedLocation(Result<GeoPoint, LocationError>);

    impl LocationProvider for FixedLocation {
        fn current_location(&self) -> Result<GeoPoint, LocationError> {
            self.0.clone()
        }
    }

    struct OneAddress;

    impl Geocoder for OneAddress {
        fn address_to_coordinate(&self, address: &str) -> ExtractionResult<Option<GeoPoint>> {
            match address {
                "" => Err(crate::ExtractionError::Service("empty query".into())),
                "MG Road" => Ok(Some(GeoPoint { lat: 12.97, lon: 77.6 })),
                _ => Ok(None),
            }
        }

        fn coordinate_to_address(&self, point: GeoPoint) -> ExtractionResult<String> {
            if point.lat > 12.0 {
                Ok("MG Road".to_string())
            } else {
                Err(crate::ExtractionError::Service("no address here".into()))
            }
        }
    }

    /// Treats image bytes as UTF-8 slip text.
    struct TextSlips;

    impl ItemExtractor for TextSlips {
        fn extract_items(&self, image: &[u8]) -> ExtractionResult<Vec<SlipItem>> {
            let text = std::str::from_utf8(image)
                .map_err(|e| crate::ExtractionError::Service(e.to_string()))?;
            Ok(to_slip_items(&MockExtractor::extract(text)))
        }

        fn extract_medicine_name(&self, image: &[u8]) -> ExtractionResult<String> {
            let items = self.extract_items(image)?;
            items
                .into_iter()
                .next()
                .map(|item| item.medicine_name)
                .ok_or_else(|| crate::ExtractionError::InvalidFormat("empty prescription".into()))
        }
    }

    struct CannedValidator(&'static str);

    impl NameValidator for CannedValidator {
        fn validate(&self, _name: &str) -> ExtractionResult<NameValidation> {
            parse_validation_output(self.0)
        }
    }

    #[test]
    fn test_resolve_origin_prefers_device() {
        let device = GeoPoint { lat: 1.0, lon: 2.0 };
        let origin = resolve_origin(&FixedLocation(Ok(device)), &OneAddress, "MG Road").unwrap();
        assert_eq!(origin, device);
    }

    #[test]
    fn test_resolve_origin_falls_back() {
        let denied = FixedLocation(Err(LocationError::PermissionDenied));

        let origin = resolve_origin(&denied, &OneAddress, "MG Road").unwrap();
        assert_eq!(origin, GeoPoint { lat: 12.97, lon: 77.6 });

        assert_eq!(
            resolve_origin(&denied, &OneAddress, "Nowhere"),
            Err(LocationError::PermissionDenied)
        );
        assert!(matches!(
            resolve_origin(&denied, &OneAddress, ""),
            Err(LocationError::Unavailable(_))
        ));
    }

    #[test]
    fn test_reverse_geocode() {
        assert_eq!(
            OneAddress
                .coordinate_to_address(GeoPoint { lat: 12.97, lon: 77.6 })
                .unwrap(),
            "MG Road"
        );
        assert!(OneAddress
            .coordinate_to_address(GeoPoint { lat: 0.0, lon: 0.0 })
            .is_err());
    }

    #[test]
    fn test_item_extractor_contract() {
        let extractor = TextSlips;
        let items = extractor.extract_items(b"Dolo 650 - 30\nORS - 0").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].medicine_name, "Dolo 650");

        assert_eq!(extractor.extract_medicine_name(b"Amoxil - 80").unwrap(), "Amoxil");
        assert!(extractor.extract_medicine_name(b"").is_err());
    }

    #[test]
    fn test_name_validator_contract() {
        let validator = CannedValidator(r#"{"valid": true, "corrected_name": "Crocin"}"#);
        let validation = validator.validate("crocine").unwrap();
        assert_eq!(validation.effective_name("crocine"), "Crocin");
    }
}
