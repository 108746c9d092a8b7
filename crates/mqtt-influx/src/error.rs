// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Parser errors.

use thiserror::Error;

/// Errors raised while building a parser or interpreting a payload.
///
/// Construction errors (`UnknownNumericMode`, `UnknownPayloadMode`, `Pattern`)
/// are fatal and surface before any message is processed. `Json` and `TooDeep`
/// are local to a single message: callers log it and move on to the next one.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Unknown parser '{0}'")]
    UnknownNumericMode(String),

    #[error("Unknown payload mode '{0}'")]
    UnknownPayloadMode(String),

    #[error("Invalid numeric pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload nesting exceeds {0} levels")]
    TooDeep(usize),
}

impl ParserError {
    /// True when the error only affects the message that produced it.
    pub fn is_message_local(&self) -> bool {
        matches!(self, ParserError::Json(_) | ParserError::TooDeep(_))
    }
}
