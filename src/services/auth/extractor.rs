/*
 * Responsibility
 * - リクエストヘッダから資格情報を取り出す (Credential Extractor)
 * - Basic 認証: `Authorization: Basic <base64(username:password)>`
 * - I/O なしの純粋な変換。失敗は ExtractionError として返す (panic しない)
 */
use axum::http::{HeaderMap, header};
use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use thiserror::Error;

use super::credentials::UsernamePasswordCredentials;

const BASIC_PREFIX: &str = "Basic ";

// Standard alphabet; trailing '=' padding is optional on input.
const BASIC_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Why credential material could not be read from a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("authorization header is not visible ascii")]
    InvalidHeaderValue,
    #[error("authorization header does not use the basic scheme")]
    UnsupportedScheme,
    #[error("credentials are not valid base64")]
    InvalidBase64,
    #[error("decoded credentials are not valid utf-8")]
    InvalidUtf8,
    #[error("decoded credentials are missing the ':' separator")]
    MissingSeparator,
}

/// Turns request headers into credentials for one transport encoding.
pub trait CredentialsExtractor: Send + Sync {
    fn extract(&self, headers: &HeaderMap) -> Result<UsernamePasswordCredentials, ExtractionError>;
}

/// Reads HTTP Basic credentials from the `Authorization` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAuthExtractor;

impl CredentialsExtractor for BasicAuthExtractor {
    fn extract(&self, headers: &HeaderMap) -> Result<UsernamePasswordCredentials, ExtractionError> {
        let value = headers
            .get(header::AUTHORIZATION)
            .ok_or(ExtractionError::MissingHeader)?
            .to_str()
            .map_err(|_| ExtractionError::InvalidHeaderValue)?;

        parse_basic_header(value)
    }
}

/// Decodes a `Basic <base64>` header value.
///
/// Splits on the first `:` only, so passwords may contain colons.
pub fn parse_basic_header(value: &str) -> Result<UsernamePasswordCredentials, ExtractionError> {
    let encoded = value
        .strip_prefix(BASIC_PREFIX)
        .ok_or(ExtractionError::UnsupportedScheme)?;

    let decoded = BASIC_ENGINE
        .decode(encoded.trim())
        .map_err(|_| ExtractionError::InvalidBase64)?;

    let decoded = String::from_utf8(decoded).map_err(|_| ExtractionError::InvalidUtf8)?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or(ExtractionError::MissingSeparator)?;

    Ok(UsernamePasswordCredentials::new(username, password))
}
