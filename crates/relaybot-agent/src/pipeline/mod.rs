//! Inbound message pipeline, independent of any chat platform.
//!
//! The Discord adapter turns gateway events into [`InboundMessage`]s and hands
//! them to [`MessagePipeline::handle`] together with a [`ReplySurface`] bound
//! to the originating message.

pub mod process;
pub mod surface;

pub use process::{InboundMessage, MessagePipeline, PipelineOutcome};
pub use surface::{ReplySurface, SendError};
