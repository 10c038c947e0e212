//! Maven coordinate parsing.
//!
//! A coordinate has the form `groupId:artifactId[:version][:packaging][:classifier]`.
//! Only the first two segments are required; the remaining ones are mapped
//! positionally and left unset when absent. Segment contents are not validated
//! beyond being non-empty.

use std::fmt;
use std::str::FromStr;

use crate::maven::error::CoordinateError;

/// A parsed Maven coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    /// The group identifier (e.g. `org.springframework`).
    pub group_id: String,
    /// The artifact identifier (e.g. `spring-core`).
    pub artifact_id: String,
    /// Optional version (third segment).
    pub version: Option<String>,
    /// Optional packaging (fourth segment).
    pub packaging: Option<String>,
    /// Optional classifier (fifth segment).
    pub classifier: Option<String>,
}

impl Coordinate {
    /// Parses a colon-delimited coordinate string.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::InvalidCoordinateFormat`] if the input has
    /// fewer than two segments or an empty groupId/artifactId.
    pub fn parse(raw: &str) -> Result<Self, CoordinateError> {
        let trimmed = raw.trim();
        let mut segments = trimmed.split(':');

        let invalid = || CoordinateError::InvalidCoordinateFormat {
            input: raw.to_string(),
        };

        let group_id = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let artifact_id = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;

        let mut optional = || {
            segments
                .next()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let version = optional();
        let packaging = optional();
        let classifier = optional();

        Ok(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version,
            packaging,
            classifier,
        })
    }

    /// Returns the `groupId:artifactId` pair.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;

        // Positional segments: a later segment forces the earlier ones to be written.
        let tail = [&self.version, &self.packaging, &self.classifier];
        let last = tail.iter().rposition(|s| s.is_some());
        if let Some(last) = last {
            for segment in &tail[..=last] {
                write!(f, ":{}", segment.as_deref().unwrap_or_default())?;
            }
        }
        Ok(())
    }
}
