//! Well-known event names and shared control messages.
//!
//! The shared messages are built once on first use and are read-only.
//! Callers that need to address or annotate one must clone it first.

use std::sync::LazyLock;

use crate::message::{channel, Message};

pub const COMMON_COLLECTIVE: &str = "common";
pub const CORE_DOMAIN: &str = "core";

pub const STARTUP_EVENT: &str = "common:core:event/startup";
pub const SHUTDOWN_EVENT: &str = "common:core:event/shutdown";
/// Stop receiving on the data channel.
pub const PAUSE_EVENT: &str = "common:core:event/pause";
/// Resume receiving on the data channel.
pub const RESUME_EVENT: &str = "common:core:event/resume";
pub const CONFIG_EVENT: &str = "common:core:event/config";
pub const STATUS_EVENT: &str = "common:core:event/status";

pub static STARTUP: LazyLock<Message> =
    LazyLock::new(|| Message::new(channel::CONTROL, STARTUP_EVENT));
pub static SHUTDOWN: LazyLock<Message> =
    LazyLock::new(|| Message::new(channel::CONTROL, SHUTDOWN_EVENT));
pub static PAUSE: LazyLock<Message> =
    LazyLock::new(|| Message::new(channel::CONTROL, PAUSE_EVENT));
pub static RESUME: LazyLock<Message> =
    LazyLock::new(|| Message::new(channel::CONTROL, RESUME_EVENT));

pub static EMISSARY_SHUTDOWN: LazyLock<Message> =
    LazyLock::new(|| Message::new(channel::EMISSARY, SHUTDOWN_EVENT));
pub static MASTER_SHUTDOWN: LazyLock<Message> =
    LazyLock::new(|| Message::new(channel::MASTER, SHUTDOWN_EVENT));

/// Build an event name of the form `<collective>:<domain>:event/<verb>`.
pub fn event_name(collective: &str, domain: &str, verb: &str) -> String {
    format!("{collective}:{domain}:event/{verb}")
}
