//! # Filter Validation and Segment Matching
//!
//! Pure functions over filter and topic strings. Validation runs once at
//! registration; matching runs on every received message.

use shared_types::TOPIC_DELIMITER;
use thiserror::Error;

/// Multi-level wildcard segment.
pub const MULTI_LEVEL_WILDCARD: &str = "#";

/// Single-level wildcard segment.
pub const SINGLE_LEVEL_WILDCARD: &str = "+";

/// Errors from topic-filter validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopicFilterError {
    /// The filter string was empty.
    #[error("Topic filter cannot be empty")]
    Empty,

    /// A `#` appeared anywhere but the final segment.
    #[error("Multi-level wildcard must be the final segment in '{filter}'")]
    MultiLevelNotLast { filter: String },

    /// A wildcard character was combined with other characters in a segment.
    #[error("Wildcard must occupy a whole segment in '{filter}' (segment '{segment}')")]
    WildcardNotAlone { filter: String, segment: String },
}

/// Validate a topic filter.
///
/// Rejects empty filters, a `#` that is not the final segment, and
/// wildcards mixed with other characters inside a segment.
///
/// # Errors
///
/// Returns the specific [`TopicFilterError`] for the first violation found.
pub fn validate_filter(filter: &str) -> Result<(), TopicFilterError> {
    if filter.is_empty() {
        return Err(TopicFilterError::Empty);
    }

    let segments: Vec<&str> = filter.split(TOPIC_DELIMITER).collect();
    let last = segments.len() - 1;

    for (index, segment) in segments.iter().enumerate() {
        if segment.contains(MULTI_LEVEL_WILDCARD) {
            if *segment != MULTI_LEVEL_WILDCARD {
                return Err(TopicFilterError::WildcardNotAlone {
                    filter: filter.to_owned(),
                    segment: (*segment).to_owned(),
                });
            }
            if index != last {
                return Err(TopicFilterError::MultiLevelNotLast {
                    filter: filter.to_owned(),
                });
            }
        } else if segment.contains(SINGLE_LEVEL_WILDCARD) && *segment != SINGLE_LEVEL_WILDCARD {
            return Err(TopicFilterError::WildcardNotAlone {
                filter: filter.to_owned(),
                segment: (*segment).to_owned(),
            });
        }
    }

    Ok(())
}

/// Whether a validated filter matches a published topic.
///
/// Walks the filter segment-by-segment against the topic's segments: a
/// fixed segment must equal the topic segment verbatim, `+` consumes
/// exactly one segment, and a trailing `#` matches unconditionally from
/// that point (consuming zero or more remaining segments).
#[must_use]
pub fn filter_matches(filter: &str, topic: &str) -> bool {
    let filter_segments: Vec<&str> = filter.split(TOPIC_DELIMITER).collect();
    let topic_segments: Vec<&str> = topic.split(TOPIC_DELIMITER).collect();

    let mut position = 0;
    for segment in &filter_segments {
        if *segment == MULTI_LEVEL_WILDCARD {
            return true;
        }
        if position >= topic_segments.len() {
            // Filter is longer than the topic and the next segment is not '#'
            return false;
        }
        if *segment != SINGLE_LEVEL_WILDCARD && *segment != topic_segments[position] {
            return false;
        }
        position += 1;
    }

    position == topic_segments.len()
}
