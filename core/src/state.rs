//! Container-format decoding of the game's account-state file.
//!
//! The game client writes its state as a BOM-prefixed JSON document
//! (UTF-8 in practice, UTF-16 tolerated since the encoding is the client's
//! contract, not ours). This module only decodes the container into a
//! generic value tree; domain validation lives in [`crate::normalize`].

use encoding_rs::{Encoding, UTF_8};
use serde_json::Value;

use crate::error::TrackerError;

/// Decode raw state-file bytes into a generic JSON tree.
///
/// Fails with [`TrackerError::MalformedState`] when the framing is
/// structurally invalid: undecodable bytes, truncated or invalid JSON, or a
/// root that is not an object.
pub fn parse_state(bytes: &[u8]) -> Result<Value, TrackerError> {
    if bytes.is_empty() {
        return Err(TrackerError::malformed("state file is empty"));
    }

    let text = decode_text(bytes)?;
    let tree: Value = serde_json::from_str(&text)
        .map_err(|e| TrackerError::malformed(format!("invalid JSON: {e}")))?;

    if !tree.is_object() {
        return Err(TrackerError::malformed("root value is not an object"));
    }
    Ok(tree)
}

/// Sniff the BOM and decode to a string, defaulting to strict UTF-8.
fn decode_text(bytes: &[u8]) -> Result<String, TrackerError> {
    let (text, had_errors) = match Encoding::for_bom(bytes) {
        Some((encoding, _bom_len)) => {
            let (cow, had_errors) = encoding.decode_with_bom_removal(bytes);
            (cow.into_owned(), had_errors)
        }
        None => {
            let (cow, had_errors) = UTF_8.decode_without_bom_handling(bytes);
            (cow.into_owned(), had_errors)
        }
    };

    if had_errors {
        return Err(TrackerError::malformed(
            "state file is not valid UTF-8/UTF-16 text",
        ));
    }
    Ok(text)
}
