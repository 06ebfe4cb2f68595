mod messages;
mod notifications;
mod poll;

pub use messages::*;
pub use notifications::*;
pub use poll::*;
