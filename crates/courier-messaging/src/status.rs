//! Status and configuration messages.

use courier_core::Payload;

use crate::events::{CONFIG_EVENT, STATUS_EVENT};
use crate::message::{channel, valid_content, Message, MessageError, CONTENT_TYPE_ANY, CONTENT_TYPE_STATUS};

/// Control-channel status message. `relates_to` is skipped when empty.
pub fn new_status_message(status_code: u16, relates_to: &str) -> Message {
    let mut m = Message::new(channel::CONTROL, STATUS_EVENT);
    m.set_content(CONTENT_TYPE_STATUS, Payload::value(status_code));
    if !relates_to.is_empty() {
        m.set_correlation(relates_to);
    }
    m
}

/// Status code and correlation id of a status message.
pub fn status_content(msg: &Message) -> Result<(u16, String), MessageError> {
    if !valid_content(msg, STATUS_EVENT, CONTENT_TYPE_STATUS) {
        return Err(MessageError::InvalidContent {
            name: msg.name().to_string(),
            content_type: CONTENT_TYPE_STATUS,
        });
    }
    let code = msg.read_content::<u16>()?;
    Ok((code, msg.correlation().to_string()))
}

/// Control-channel config message carrying an arbitrary value, which need
/// not be serializable (e.g. an exchange function).
pub fn new_config_message<T: Send + Sync + 'static>(value: T) -> Message {
    let mut m = Message::new(channel::CONTROL, CONFIG_EVENT);
    m.set_content(CONTENT_TYPE_ANY, Payload::opaque(value));
    m
}

/// The config value, if `msg` carries one of type `T`.
pub fn config_content<T: Clone + 'static>(msg: &Message) -> Option<T> {
    if msg.content_type() != CONTENT_TYPE_ANY {
        return None;
    }
    msg.content()?.native::<T>().cloned()
}

/// Overwrite `target` with the config value if `msg` carries one of type `T`.
pub fn update_content<T: Clone + 'static>(msg: &Message, target: &mut T) -> bool {
    match config_content::<T>(msg) {
        Some(v) => {
            *target = v;
            true
        }
        None => false,
    }
}
