//! Classification of decoded navigation marker text.
//!
//! Junction markers carry a compact path table such as
//! `1-2:54,290,N008-N010;1-3:...`. Only the first entry's source node matters:
//! it names the junction (`N1` here). JSON payloads are not junction tables.
use serde::Serialize;
use thiserror::Error;

/// Why a decoded string is not a usable marker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// Decoder produced no text
    #[error("empty payload")]
    Empty,
    /// Text is not a junction table
    #[error("unknown payload format")]
    UnknownFormat,
    /// Looks like a junction table but has no source node
    #[error("malformed junction table: {0}")]
    Malformed(String),
}

/// A recognized marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Marker {
    /// Path junction, identified as `N<node>`
    Junction {
        /// Junction id, e.g. `N1`
        id: String,
    },
}

impl Marker {
    /// Identifier of the marker
    pub fn id(&self) -> &str {
        match self {
            Marker::Junction { id } => id,
        }
    }
}

/// Classify decoded text
pub fn classify(text: &str) -> Result<Marker, PayloadError> {
    if text.is_empty() {
        return Err(PayloadError::Empty);
    }
    if !(text.contains(':') && text.contains('-')) || text.trim_start().starts_with('{') {
        return Err(PayloadError::UnknownFormat);
    }

    let first_entry = text.split(';').next().unwrap_or_default();
    let path = first_entry.split(':').next().unwrap_or_default();
    let from = path.split('-').next().unwrap_or_default().trim();
    if from.is_empty() {
        return Err(PayloadError::Malformed(text.to_string()));
    }

    Ok(Marker::Junction {
        id: format!("N{}", from),
    })
}
