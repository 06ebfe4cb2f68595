mod conversations;
mod message;
mod notification;

pub use conversations::*;
pub use message::*;
pub use notification::*;

#[cfg(test)]
pub(crate) mod fixtures {
    pub use super::message::fixtures::*;
    pub use super::notification::fixtures::*;
}
