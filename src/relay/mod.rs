//! Message-handling core: authorization, dedup, context, debounce and
//! gateway rotation.

pub mod context;
pub mod debounce;
pub mod dedup;
pub mod pipeline;
pub mod selector;
pub mod truncate;

pub use context::ContextStore;
pub use debounce::ReplyDebouncer;
pub use dedup::DedupGuard;
pub use pipeline::{ConversationPipeline, HandlingOutcome};
pub use selector::GatewaySelector;
pub use truncate::truncate_reply;
