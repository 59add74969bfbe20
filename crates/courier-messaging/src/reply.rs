//! Reply targets and status replies.
//!
//! A message's reply target is often wired before the final recipient is
//! known, so a wrongly typed binding is not rejected up front. It is kept as
//! [`ReplyTarget::Invalid`] and reported when something tries to reply.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::message::{Message, MessageError};
use crate::status::new_status_message;

/// Callback form of a reply target.
pub type Handler = Arc<dyn Fn(Message) + Send + Sync>;

/// A recipient that can be handed messages directly.
pub trait Receiver: Send + Sync {
    fn receive(&self, msg: Message);
}

#[derive(Clone)]
pub enum ReplyTarget {
    Callback(Handler),
    Recipient(Arc<dyn Receiver>),
    /// A value that is neither of the above, by type name.
    Invalid(&'static str),
}

impl ReplyTarget {
    pub fn callback(f: impl Fn(Message) + Send + Sync + 'static) -> Self {
        ReplyTarget::Callback(Arc::new(f))
    }

    /// Classify an arbitrary value. A [`Handler`] or an `Arc<dyn Receiver>`
    /// becomes a working target; anything else becomes [`ReplyTarget::Invalid`].
    pub fn from_any<T: Any + Send + Sync>(value: T) -> Self {
        let any: &dyn Any = &value;
        if let Some(handler) = any.downcast_ref::<Handler>() {
            return ReplyTarget::Callback(Arc::clone(handler));
        }
        if let Some(recipient) = any.downcast_ref::<Arc<dyn Receiver>>() {
            return ReplyTarget::Recipient(Arc::clone(recipient));
        }
        ReplyTarget::Invalid(type_name::<T>())
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, ReplyTarget::Invalid(_))
    }

    /// Hand `msg` to the target.
    pub fn deliver(&self, msg: Message) -> Result<(), MessageError> {
        match self {
            ReplyTarget::Callback(f) => {
                f(msg);
                Ok(())
            }
            ReplyTarget::Recipient(r) => {
                r.receive(msg);
                Ok(())
            }
            ReplyTarget::Invalid(t) => {
                tracing::error!(
                    target_type = *t,
                    reply = %msg,
                    "reply target cannot receive messages"
                );
                Err(MessageError::InvalidReplyTarget(*t))
            }
        }
    }
}

impl fmt::Debug for ReplyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyTarget::Callback(_) => f.write_str("Callback"),
            ReplyTarget::Recipient(_) => f.write_str("Recipient"),
            ReplyTarget::Invalid(t) => f.debug_tuple("Invalid").field(t).finish(),
        }
    }
}

/// Acknowledge `msg` with a status.
///
/// Does nothing when `msg` has no reply target. Otherwise sends a control
/// status message carrying `status_code`, correlated to `msg`'s name and
/// attributed to `from`.
pub fn reply(msg: &Message, status_code: u16, from: &str) -> Result<(), MessageError> {
    let Some(target) = msg.reply_target() else {
        return Ok(());
    };
    let mut status = new_status_message(status_code, msg.name());
    status.set_sender(from);
    tracing::debug!(
        relates_to = msg.name(),
        status_code,
        from,
        "sending status reply"
    );
    target.deliver(status)
}
