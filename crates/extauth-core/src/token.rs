//! Mock auth token codec.
//!
//! Tokens are standard base64 over `username:timestamp:authorized`, the
//! stand-in for a server-issued credential. They decode back to their claims
//! without any verification step; nothing here is a security boundary.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};

/// Fixed trailing marker segment of every issued token.
pub const TOKEN_MARKER: &str = "authorized";

const DELIMITER: char = ':';

/// Claims recovered from a decoded token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub username: String,
    /// Issue time in Unix milliseconds.
    pub issued_at_ms: i64,
    pub marker: String,
}

/// Encode a mock token for `username`, issued now.
pub fn issue(username: &str) -> String {
    issue_at(username, chrono::Utc::now().timestamp_millis())
}

/// Encode a mock token with an explicit issue time.
pub fn issue_at(username: &str, issued_at_ms: i64) -> String {
    STANDARD.encode(format!(
        "{}{}{}{}{}",
        username, DELIMITER, issued_at_ms, DELIMITER, TOKEN_MARKER
    ))
}

/// Decode a token back into its claims.
///
/// The username may itself contain the delimiter, so the timestamp and
/// marker segments are taken from the right.
pub fn decode(token: &str) -> Result<TokenClaims> {
    let raw = STANDARD
        .decode(token)
        .map_err(|e| Error::TokenDecode(format!("invalid base64: {}", e)))?;
    let text = String::from_utf8(raw)
        .map_err(|_| Error::TokenDecode("token is not valid UTF-8".to_string()))?;

    let mut segments = text.rsplitn(3, DELIMITER);
    let marker = segments.next().unwrap_or_default().to_string();
    let timestamp = segments
        .next()
        .ok_or_else(|| Error::TokenDecode("missing timestamp segment".to_string()))?;
    let username = segments
        .next()
        .ok_or_else(|| Error::TokenDecode("missing username segment".to_string()))?
        .to_string();

    let issued_at_ms = timestamp
        .parse::<i64>()
        .map_err(|_| Error::TokenDecode(format!("bad timestamp segment: {}", timestamp)))?;

    Ok(TokenClaims {
        username,
        issued_at_ms,
        marker,
    })
}
