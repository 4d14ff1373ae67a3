//! Representative sample extraction
//!
//! Picks the single record that stands in for a whole dataset. Extraction is
//! total: any JSON value yields a sample, and empty containers are returned
//! as they are.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where the sample came from within the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleOrigin {
    /// First element of a top-level array
    FirstElement,
    /// First entry of a `features` array
    FirstFeature,
    /// First entry of `features` inside the first array element
    FirstElementFeature,
    /// Payload used as-is
    Verbatim,
}

/// Extracts the representative sample, reporting where it came from
pub fn extract_sample_with_origin(payload: &Value) -> (Value, SampleOrigin) {
    let (working, from_array) = match payload.as_array().and_then(|items| items.first()) {
        Some(first) => (first, true),
        None => (payload, false),
    };

    let feature = working
        .get("features")
        .and_then(Value::as_array)
        .and_then(|features| features.first());

    match (feature, from_array) {
        (Some(feature), true) => (feature.clone(), SampleOrigin::FirstElementFeature),
        (Some(feature), false) => (feature.clone(), SampleOrigin::FirstFeature),
        (None, true) => (working.clone(), SampleOrigin::FirstElement),
        (None, false) => (working.clone(), SampleOrigin::Verbatim),
    }
}

/// Extracts the representative sample from a raw payload
pub fn extract_sample(payload: &Value) -> Value {
    extract_sample_with_origin(payload).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_takes_first_element() {
        let payload = json!([{"id": 1, "nome": "A"}, {"id": 2, "nome": "B"}]);
        let (sample, origin) = extract_sample_with_origin(&payload);
        assert_eq!(sample, json!({"id": 1, "nome": "A"}));
        assert_eq!(origin, SampleOrigin::FirstElement);
    }

    #[test]
    fn test_feature_collection_takes_first_feature() {
        let payload = json!({"type": "FeatureCollection", "features": [{"id": 7}, {"id": 8}]});
        let (sample, origin) = extract_sample_with_origin(&payload);
        assert_eq!(sample, json!({"id": 7}));
        assert_eq!(origin, SampleOrigin::FirstFeature);
    }

    #[test]
    fn test_plain_object_is_verbatim() {
        let payload = json!({"id": 7});
        let (sample, origin) = extract_sample_with_origin(&payload);
        assert_eq!(sample, payload);
        assert_eq!(origin, SampleOrigin::Verbatim);
    }

    #[test]
    fn test_empty_array_is_unchanged() {
        assert_eq!(extract_sample(&json!([])), json!([]));
    }

    #[test]
    fn test_empty_features_is_unchanged() {
        let payload = json!({"type": "FeatureCollection", "features": []});
        assert_eq!(extract_sample(&payload), payload);
    }

    #[test]
    fn test_non_array_features_is_unchanged() {
        let payload = json!({"features": "none"});
        assert_eq!(extract_sample(&payload), payload);
    }

    #[test]
    fn test_array_of_feature_collections() {
        let payload = json!([{"features": [{"id": 3}]}]);
        let (sample, origin) = extract_sample_with_origin(&payload);
        assert_eq!(sample, json!({"id": 3}));
        assert_eq!(origin, SampleOrigin::FirstElementFeature);
    }

    #[test]
    fn test_scalars_are_verbatim() {
        assert_eq!(extract_sample(&json!(42)), json!(42));
        assert_eq!(extract_sample(&json!(null)), json!(null));
        assert_eq!(extract_sample(&json!("text")), json!("text"));
    }

    #[test]
    fn test_array_with_scalar_first_element() {
        assert_eq!(extract_sample(&json!([5, 6])), json!(5));
    }
}
