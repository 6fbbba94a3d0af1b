use thiserror::Error;

/// Errors from the persistent step store.
///
/// Absence of a record is a normal lookup outcome, never an error; these
/// variants cover genuine I/O failure and corruption only. The engine does
/// not retry them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store query error: {0}")]
    Query(String),

    #[error("corrupt step record: {0}")]
    Corrupt(String),
}

/// Errors from the step payload codec boundary.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode step output: {0}")]
    Encode(String),

    #[error("failed to decode step output: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::Query("no such table: steps".to_string());
        assert_eq!(err.to_string(), "store query error: no such table: steps");

        let err = StoreError::Corrupt("unknown step status: RUNNING".to_string());
        assert!(err.to_string().contains("RUNNING"));
    }

    #[test]
    fn codec_error_display() {
        let err = CodecError::Decode("expected string, found number".to_string());
        assert!(err.to_string().contains("decode"));
        assert!(err.to_string().contains("expected string"));
    }
}
