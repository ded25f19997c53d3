//! # Topic Matching Crate
//!
//! Wildcard topic-filter matching: decides which of the locally registered
//! subscription filters a published topic satisfies, so the connection layer
//! can attribute an incoming message to zero or more delivery targets.
//!
//! ## Wildcard Semantics
//!
//! Topics are hierarchical, delimited by `/`. In a filter, `+` matches
//! exactly one segment and `#` (legal only as the final segment) matches the
//! remainder of the topic tree, including the parent level itself, so `a/#`
//! matches both `a` and `a/b/c`. Fixed segments compare verbatim and
//! case-sensitively.
//!
//! Malformed filters are rejected at registration time; the matching path
//! only ever sees validated filters.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod matcher;
pub mod pattern;

pub use matcher::TopicMatcher;
pub use pattern::{filter_matches, validate_filter, TopicFilterError};
