//! Connector identifier parsing.
//!
//! A connector id is the opaque path segment a client streams against, e.g.
//! `github-u1234`. It splits into a tool name and an optional user scope.

use std::fmt;
use std::str::FromStr;

use crate::error::ResolutionError;

/// Separator between the segments of a connector id.
pub const CONNECTOR_ID_DELIMITER: char = '-';

/// Parsed connector id.
///
/// The raw id is split on [`CONNECTOR_ID_DELIMITER`] at most twice. Segment 0
/// is the tool name, segment 1 the user id. Anything after the second
/// delimiter is kept as `remainder` but never used for lookup, so a user id
/// containing a dash is truncated at that dash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorId {
    raw: String,
    tool_name: String,
    user_id: Option<String>,
    remainder: Option<String>,
}

impl ConnectorId {
    /// Parse a raw connector id.
    ///
    /// An empty user segment (`"tool-"`) is treated as no user scope.
    pub fn parse(raw: &str) -> Result<Self, ResolutionError> {
        let mut segments = raw.splitn(3, CONNECTOR_ID_DELIMITER);

        let tool_name = segments.next().unwrap_or_default();
        if tool_name.is_empty() {
            return Err(ResolutionError::MalformedIdentifier(raw.to_string()));
        }

        let user_id = segments
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);
        let remainder = segments.next().map(str::to_string);

        Ok(Self {
            raw: raw.to_string(),
            tool_name: tool_name.to_string(),
            user_id,
            remainder,
        })
    }

    /// The id exactly as received.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Trailing text after the second delimiter, ignored for lookup.
    pub fn remainder(&self) -> Option<&str> {
        self.remainder.as_deref()
    }
}

impl FromStr for ConnectorId {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
