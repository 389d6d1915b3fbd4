//! Decoder capability: overlay a wire payload onto an existing record.

use crate::error::DecodeError;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Populates an existing record from a payload.
///
/// Implementations MUST merge by presence: any field absent from the payload keeps the
/// value it had in `target`. Update relies on this to apply partial payloads.
pub trait Decoder {
    fn decode<T>(self, target: &mut T) -> Result<(), DecodeError>
    where
        T: Serialize + DeserializeOwned;
}

/// JSON payload decoder.
///
/// The payload must be an object. It is deep-merged over the target's serialized form:
/// nested objects merge key by key, every other value (arrays and `null` included) replaces
/// what was there. Keys unknown to the record are ignored unless the record denies them.
#[derive(Clone, Copy, Debug)]
pub struct JsonDecoder<'a> {
    payload: &'a [u8],
}

impl<'a> JsonDecoder<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        JsonDecoder { payload }
    }
}

impl Decoder for JsonDecoder<'_> {
    fn decode<T>(self, target: &mut T) -> Result<(), DecodeError>
    where
        T: Serialize + DeserializeOwned,
    {
        let patch: Value = serde_json::from_slice(self.payload).map_err(DecodeError::Malformed)?;
        if !patch.is_object() {
            return Err(DecodeError::NotAnObject);
        }
        let mut merged = serde_json::to_value(&*target).map_err(DecodeError::Target)?;
        merge(&mut merged, patch);
        *target = serde_json::from_value(merged).map_err(DecodeError::Shape)?;
        Ok(())
    }
}

/// Deep-merge `patch` into `base`.
pub fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(rename = "ID")]
        id: u64,
        #[serde(rename = "A")]
        a: String,
        #[serde(rename = "B")]
        b: i64,
        #[serde(rename = "Meta")]
        meta: Value,
    }

    fn sample() -> Sample {
        Sample {
            id: 3,
            a: "kept".into(),
            b: 7,
            meta: json!({"x": 1, "y": 2}),
        }
    }

    #[test]
    fn absent_fields_are_preserved() {
        let mut s = sample();
        JsonDecoder::new(br#"{"B": 10}"#).decode(&mut s).unwrap();
        assert_eq!(s.a, "kept");
        assert_eq!(s.b, 10);
        assert_eq!(s.id, 3);
    }

    #[test]
    fn applying_same_patch_twice_is_stable() {
        let mut once = sample();
        JsonDecoder::new(br#"{"A": "x"}"#).decode(&mut once).unwrap();
        let mut twice = sample();
        JsonDecoder::new(br#"{"A": "x"}"#).decode(&mut twice).unwrap();
        JsonDecoder::new(br#"{"A": "x"}"#).decode(&mut twice).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn nested_objects_merge_by_key() {
        let mut s = sample();
        JsonDecoder::new(br#"{"Meta": {"y": 5, "z": 6}}"#).decode(&mut s).unwrap();
        assert_eq!(s.meta, json!({"x": 1, "y": 5, "z": 6}));
    }

    #[test]
    fn blank_record_takes_full_payload() {
        let mut s = Sample::default();
        JsonDecoder::new(br#"{"A": "new", "B": 1, "Meta": [1, 2]}"#)
            .decode(&mut s)
            .unwrap();
        assert_eq!(s.a, "new");
        assert_eq!(s.b, 1);
        assert_eq!(s.meta, json!([1, 2]));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let mut s = sample();
        let err = JsonDecoder::new(b"{\"A\": ").decode(&mut s).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
        assert_eq!(s, sample());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let mut s = sample();
        let err = JsonDecoder::new(b"[1, 2]").decode(&mut s).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject));
    }

    #[test]
    fn wrong_field_type_is_rejected_without_touching_target() {
        let mut s = sample();
        let err = JsonDecoder::new(br#"{"B": "ten"}"#).decode(&mut s).unwrap_err();
        assert!(matches!(err, DecodeError::Shape(_)));
        assert_eq!(s, sample());
    }

    #[test]
    fn empty_payload_is_rejected() {
        let mut s = sample();
        assert!(JsonDecoder::new(b"").decode(&mut s).is_err());
    }
}
