pub mod events;

pub use events::{InboundMessage, OutboundMessage};
