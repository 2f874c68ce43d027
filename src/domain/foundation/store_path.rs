//! Location of a value inside the shared document store.

use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Characters that may not appear in a path segment.
const FORBIDDEN_SEGMENT_CHARS: [char; 6] = ['.', '#', '$', '[', ']', '/'];

/// Slash-separated location in the document tree, e.g. `dynasty5/currentTrade`.
///
/// # Invariants
///
/// - at least one segment
/// - no segment is empty or contains `. # $ [ ] /`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// Parses a slash-separated path. Leading and trailing slashes are ignored.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("path"));
        }

        let segments = trimmed
            .split('/')
            .map(|segment| {
                Self::validate_segment(segment)?;
                Ok(segment.to_string())
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(Self { segments })
    }

    /// Checks that `segment` can be used as a single path component.
    pub fn validate_segment(segment: &str) -> Result<(), ValidationError> {
        if segment.is_empty() {
            return Err(ValidationError::invalid_format("path", "empty segment"));
        }
        if let Some(c) = segment.chars().find(|c| FORBIDDEN_SEGMENT_CHARS.contains(c)) {
            return Err(ValidationError::invalid_format(
                "path",
                format!("segment '{}' contains '{}'", segment, c),
            ));
        }
        if segment.chars().any(char::is_control) {
            return Err(ValidationError::invalid_format(
                "path",
                format!("segment '{}' contains a control character", segment.escape_debug()),
            ));
        }
        Ok(())
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: &str) -> Result<Self, ValidationError> {
        Self::validate_segment(segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// Returns a new path with every segment of `other` appended.
    pub fn join(&self, other: &StorePath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// The path's segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl FromStr for StorePath {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
