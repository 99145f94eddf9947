use thiserror::Error;

/// Raised when a collaborator hands the engine something that is not text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("input is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    #[error("input contains binary content (NUL byte at offset {offset})")]
    BinaryContent { offset: usize },
}

/// Decode raw bytes into analysable text.
pub fn decode_text(bytes: &[u8]) -> Result<&str, InputError> {
    let text = std::str::from_utf8(bytes).map_err(|e| InputError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    check_text(text)?;
    Ok(text)
}

/// Reject text carrying NUL bytes, the usual sign of an unextracted binary file.
pub fn check_text(text: &str) -> Result<(), InputError> {
    match text.find('\0') {
        Some(offset) => Err(InputError::BinaryContent { offset }),
        None => Ok(()),
    }
}
