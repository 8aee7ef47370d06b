pub mod base;
pub mod telerivet;

pub use base::SmsSender;
pub use telerivet::TelerivetSender;
