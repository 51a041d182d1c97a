use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use thiserror::Error;
use tilestep_core::LevelData;
use tilestep_level::LevelCodecError;

const SHARE_DOMAIN: &str = "tmap";
const SHARE_VERSION: &str = "v2";

/// Identifier prefix emitted before the encoded level payload.
pub(crate) const SHARE_HEADER: &str = "tmap:v2";
/// Delimiter used to separate the prefix and payload.
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while decoding level share strings.
#[derive(Debug, Error)]
pub(crate) enum LevelTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("level string was empty")]
    EmptyPayload,
    /// The encoded level did not contain a version segment.
    #[error("level string is missing the version")]
    MissingVersion,
    /// The encoded level did not include the payload segment.
    #[error("level string is missing the payload")]
    MissingPayload,
    /// The encoded level used an unexpected prefix segment.
    #[error("level prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded level used an unsupported version identifier.
    #[error("level string version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode level payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded bytes are not a valid level file.
    #[error("could not parse level payload: {0}")]
    InvalidLevel(#[from] LevelCodecError),
}

/// Encodes a level into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(level: &LevelData) -> Result<String, LevelCodecError> {
    let bytes = tilestep_level::encode(level)?;
    Ok(format!("{SHARE_HEADER}:{}", STANDARD_NO_PAD.encode(bytes)))
}

/// Decodes a level from its share string.
pub(crate) fn decode(value: &str) -> Result<LevelData, LevelTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LevelTransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().unwrap_or_default();
    let version = parts.next().ok_or(LevelTransferError::MissingVersion)?;
    let payload = parts.next().ok_or(LevelTransferError::MissingPayload)?;

    if domain != SHARE_DOMAIN {
        return Err(LevelTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SHARE_VERSION {
        return Err(LevelTransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    Ok(tilestep_level::decode(&bytes)?)
}
