//! Step payload codec boundary.
//!
//! The engine is agnostic to the concrete wire format; all it requires is
//! round-trip fidelity for the value types used in steps. JSON via serde is
//! the concrete format behind this seam.

use durastep_types::error::CodecError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Encode a step return value for durable storage.
pub fn encode<T: Serialize>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode a stored step output back into the caller's expected type.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, CodecError> {
    serde_json::from_str(raw).map_err(|e| CodecError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_string() {
        let encoded = encode(&"Hello, World!".to_string()).unwrap();
        assert_eq!(encoded, "\"Hello, World!\"");

        let decoded: String = decode(&encoded).unwrap();
        assert_eq!(decoded, "Hello, World!");
    }

    #[test]
    fn roundtrip_bool_and_number() {
        let decoded: bool = decode(&encode(&true).unwrap()).unwrap();
        assert!(decoded);

        let decoded: u64 = decode(&encode(&42u64).unwrap()).unwrap();
        assert_eq!(decoded, 42);
    }

    #[test]
    fn decode_type_mismatch_fails() {
        let encoded = encode(&"not a number".to_string()).unwrap();
        let decoded: Result<u64, _> = decode(&encoded);
        assert!(matches!(decoded, Err(CodecError::Decode(_))));
    }

    #[test]
    fn decode_garbage_fails() {
        let decoded: Result<String, _> = decode("{not json");
        assert!(decoded.is_err());
    }
}
