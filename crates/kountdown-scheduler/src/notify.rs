//! Notification text formatting.
//!
//! Both message forms are wire-compatible with the long-running deployment;
//! downstream relays pattern-match on them, so the exact layout matters.

use chrono::{DateTime, Utc};
use kountdown_core::types::Event;

/// `d'd 'h'h 'm'm 's's'` rendering of a remaining duration, fields unpadded:
/// 129600s becomes "1d 12h 0m 0s".
pub fn remaining_label(total_secs: i64) -> String {
    let secs = total_secs.max(0);
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{days}d {hours}h {minutes}m {seconds}s")
}

fn message_prefix(event: &Event, fire_time: DateTime<Utc>) -> String {
    let remaining = (event.target_time - fire_time).num_seconds();
    format!(
        "{} left to event #{}: {}",
        remaining_label(remaining),
        event.id,
        event.name
    )
}

fn target_stamp(event: &Event) -> String {
    event.target_time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Brief channel form; invites `!kountdown <id>` for detail.
pub fn channel_notice(event: &Event, fire_time: DateTime<Utc>) -> String {
    format!(
        "{} [at {}]. Say '!kountdown {}' for details",
        message_prefix(event, fire_time),
        target_stamp(event),
        event.id
    )
}

/// Verbose direct form including the description and epoch time.
pub fn direct_message(event: &Event, fire_time: DateTime<Utc>) -> String {
    format!(
        "<< ! >> {} ({}) at {} [unixtime {}]",
        message_prefix(event, fire_time),
        event.description,
        target_stamp(event),
        event.target_time.timestamp()
    )
}
