//! Encoding of the stored service credential.
//!
//! The token is kept base64-encoded in the config file so it is not stored
//! as plain text. This is obfuscation, not encryption.

use crate::error::{ConfigError, ConfigResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Environment variable that overrides the stored token. Read as plain text.
pub const TOKEN_ENV_VAR: &str = "HANGE_AUTH_TOKEN";

/// Encode a token for storage.
pub fn encode_token(token: &str) -> String {
    STANDARD.encode(token.as_bytes())
}

/// Decode a stored token.
pub fn decode_token(encoded: &str) -> ConfigResult<String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ConfigError::MalformedToken(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| ConfigError::MalformedToken(e.to_string()))
}
