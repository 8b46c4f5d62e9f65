use crate::core::error::AdminError;
use tracing::warn;

/// Compare API keys in constant time so response timing does not leak how
/// much of a guessed key matched.
pub fn verify_api_key(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();

    provided.len() == expected.len()
        && provided
            .iter()
            .zip(expected)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Gate for operator endpoints. `action` names the attempt in the log.
pub fn require_operator(provided: &str, expected: &str, action: &str) -> Result<(), AdminError> {
    if verify_api_key(provided, expected) {
        Ok(())
    } else {
        warn!(action = action, "Unauthorized operator request");
        Err(AdminError::InvalidApiKey)
    }
}
