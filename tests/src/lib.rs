//! # TopicScope Test Suite
//!
//! Unified test crate for cross-crate choreography:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── pipeline.rs      # store -> queue -> dispatcher -> bus
//!     ├── routing.rs       # router fan-out into stores
//!     ├── reconnection.rs  # reconnection lifecycle with mock transport
//!     └── replay.rs        # replay feeding the live store pipeline
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p scope-tests
//! cargo test -p scope-tests integration::
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
