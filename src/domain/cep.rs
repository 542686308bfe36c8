//! Postal code (CEP) input and format validation.

use serde::Deserialize;

/// Number of digits in a well-formed CEP.
pub const CEP_LENGTH: usize = 8;

/// Inbound edge payload: `{"cep": "01001000"}`.
///
/// A missing `cep` field decodes to an empty string so it is rejected by
/// [`is_valid_cep`] rather than by the JSON decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostalCodeRequest {
    #[serde(default)]
    pub cep: String,
}

/// Returns true iff `cep` is exactly eight ASCII decimal digits.
pub fn is_valid_cep(cep: &str) -> bool {
    cep.len() == CEP_LENGTH && cep.bytes().all(|b| b.is_ascii_digit())
}
