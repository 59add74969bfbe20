//! Message envelope.
//!
//! Routing fields all live in the message header under the `x-*` keys in
//! [`headers`]; the accessors below are the only supported way to touch
//! them. A message is a plain value: mutate it from one place at a time.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use courier_core::content::{self, ContentError};
use courier_core::{Content, Header, Payload};
use serde::de::DeserializeOwned;

use crate::reply::{Receiver, ReplyTarget};

/// Header keys used for routing metadata.
pub mod headers {
    pub const X_TO: &str = "x-to";
    pub const X_CARE_OF: &str = "x-c/o";
    pub const X_FROM: &str = "x-from";
    pub const X_CHANNEL: &str = "x-channel";
    pub const X_RELATES_TO: &str = "x-relates-to";
    /// Used in request headers to reference a message by name.
    pub const X_MESSAGE_NAME: &str = "x-message-name";
}

/// Coarse routing classes.
pub mod channel {
    pub const MASTER: &str = "master";
    pub const EMISSARY: &str = "emissary";
    pub const CONTROL: &str = "ctrl";
    pub const DATA: &str = "data";
}

pub const CONTENT_TYPE_ANY: &str = "application/x-any";
pub const CONTENT_TYPE_STATUS: &str = "application/x-status";

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("reply target of type {0} cannot receive messages")]
    InvalidReplyTarget(&'static str),
    #[error("message {name:?} does not carry {content_type} content")]
    InvalidContent {
        name: String,
        content_type: &'static str,
    },
    #[error(transparent)]
    Content(#[from] ContentError),
}

// ── Message ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Message {
    name: String,
    header: Header,
    content: Option<Content>,
    expiry: Option<SystemTime>,
    reply: Option<ReplyTarget>,
}

impl Message {
    /// New message on `channel`. Only the channel header is set.
    pub fn new(channel: &str, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: Header::new().with(headers::X_CHANNEL, channel),
            content: None,
            expiry: None,
            reply: None,
        }
    }

    /// New message with one recipient and a sender.
    pub fn addressed(channel: &str, name: impl Into<String>, to: &str, from: &str) -> Self {
        let mut m = Self::new(channel, name);
        m.header.add(headers::X_TO, to);
        m.header.add(headers::X_FROM, from);
        m
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-only view of the routing header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    // ── Addressing ───────────────────────────────────────────────────────────

    pub fn channel(&self) -> &str {
        self.header.get(headers::X_CHANNEL)
    }

    pub fn set_channel(&mut self, channel: &str) -> &mut Self {
        self.header.set(headers::X_CHANNEL, channel);
        self
    }

    /// Recipients in the order they were added.
    pub fn recipients(&self) -> &[String] {
        self.header.values(headers::X_TO)
    }

    /// Exact, case-sensitive membership test. An empty name never matches.
    pub fn is_recipient(&self, name: &str) -> bool {
        !name.is_empty() && self.recipients().iter().any(|to| to == name)
    }

    pub fn add_recipients<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for n in names {
            self.header.add(headers::X_TO, n);
        }
        self
    }

    pub fn add_recipient(&mut self, name: &str) -> &mut Self {
        self.header.add(headers::X_TO, name);
        self
    }

    pub fn clear_recipients(&mut self) -> &mut Self {
        self.header.delete(headers::X_TO);
        self
    }

    pub fn sender(&self) -> &str {
        self.header.get(headers::X_FROM)
    }

    pub fn set_sender(&mut self, name: &str) -> &mut Self {
        self.header.set(headers::X_FROM, name);
        self
    }

    pub fn care_of(&self) -> &str {
        self.header.get(headers::X_CARE_OF)
    }

    pub fn set_care_of(&mut self, name: &str) -> &mut Self {
        self.header.set(headers::X_CARE_OF, name);
        self
    }

    pub fn clear_care_of(&mut self) -> &mut Self {
        self.header.delete(headers::X_CARE_OF);
        self
    }

    /// Correlation id of the message this one answers.
    pub fn correlation(&self) -> &str {
        self.header.get(headers::X_RELATES_TO)
    }

    pub fn set_correlation(&mut self, id: &str) -> &mut Self {
        self.header.set(headers::X_RELATES_TO, id);
        self
    }

    // ── Content ──────────────────────────────────────────────────────────────

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    /// Content type tag, or `""` without content.
    pub fn content_type(&self) -> &str {
        self.content.as_ref().map(Content::content_type).unwrap_or("")
    }

    /// Replace the content with a fresh envelope.
    pub fn set_content(&mut self, content_type: &str, value: impl Into<Payload>) -> &mut Self {
        self.content = Some(Content::new(content_type, value));
        self
    }

    /// [`Content::read`] on this message's content.
    pub fn read_content<T>(&self) -> Result<T, MessageError>
    where
        T: DeserializeOwned + Default + Clone + 'static,
    {
        Ok(content::read(self.content.as_ref())?)
    }

    // ── Expiry ───────────────────────────────────────────────────────────────

    pub fn expiry(&self) -> Option<SystemTime> {
        self.expiry
    }

    pub fn set_expiry(&mut self, at: SystemTime) -> &mut Self {
        self.expiry = Some(at);
        self
    }

    /// Messages without an expiry never expire.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.expiry.is_some_and(|at| now >= at)
    }

    // ── Reply ────────────────────────────────────────────────────────────────

    pub fn set_reply(&mut self, target: ReplyTarget) -> &mut Self {
        self.reply = Some(target);
        self
    }

    pub fn set_reply_fn(&mut self, f: impl Fn(Message) + Send + Sync + 'static) -> &mut Self {
        self.set_reply(ReplyTarget::callback(f))
    }

    pub fn set_reply_recipient(&mut self, recipient: Arc<dyn Receiver>) -> &mut Self {
        self.set_reply(ReplyTarget::Recipient(recipient))
    }

    /// Install a reply target from a value of unknown shape. See
    /// [`ReplyTarget::from_any`].
    pub fn set_reply_any<T: std::any::Any + Send + Sync>(&mut self, target: T) -> &mut Self {
        self.set_reply(ReplyTarget::from_any(target))
    }

    pub fn reply_target(&self) -> Option<&ReplyTarget> {
        self.reply.as_ref()
    }

    /// Deliver `msg` to this message's reply target. No target is a no-op.
    pub fn reply_to(&self, msg: Message) -> Result<(), MessageError> {
        match &self.reply {
            Some(target) => target.deliver(msg),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[chan:{}] [from:{}] [to:[{}]] [{}]",
            self.channel(),
            self.sender(),
            self.recipients().join(" "),
            self.name
        )
    }
}

/// True when `msg` is named `name` and carries valid `content_type` content.
pub fn valid_content(msg: &Message, name: &str, content_type: &str) -> bool {
    msg.name == name
        && msg
            .content
            .as_ref()
            .is_some_and(|c| c.is_valid_for(content_type))
}
