pub mod completion;
pub mod cooldown;
pub mod history;
pub mod pipeline;
pub mod prompt;
pub mod truncate;
pub mod turn;

pub use completion::{CompletionError, CompletionService, ResponsesClient};
pub use cooldown::RateLimiter;
pub use history::ConversationStore;
pub use pipeline::{InboundMessage, MessagePipeline, PipelineOutcome, ReplySurface, SendError};
pub use turn::{Role, Turn};
