//! Cross-crate integration flows.

pub mod pipeline;
pub mod reconnection;
pub mod replay;
pub mod routing;
