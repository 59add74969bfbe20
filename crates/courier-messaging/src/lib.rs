//! courier-messaging: addressed, correlatable control messages.
//!
//! A [`Message`] is a named event plus routing metadata held in a
//! [`courier_core::Header`], optional typed content, and an optional reply
//! target used to acknowledge it asynchronously.

pub mod events;
pub mod message;
pub mod reply;
pub mod status;

pub use message::{valid_content, Message, MessageError};
pub use reply::{reply, Handler, Receiver, ReplyTarget};
pub use status::{config_content, new_config_message, new_status_message, status_content, update_content};
