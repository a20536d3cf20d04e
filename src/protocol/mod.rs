//! Wire protocol of the Google Play Music Desktop Player JSON API.
//!
//! The player exposes a single websocket. Both directions carry JSON text
//! frames:
//!
//! * [`request`] - commands sent to the player
//! * [`notification`] - state changes pushed by the player
//! * [`contents`] - payload types shared by both directions
//!
//! # Pairing
//!
//! A client identifies itself with an application identifier. The first
//! time, the player answers `CODE_REQUIRED` on the `connect` channel and
//! displays a short numeric code. The client repeats the request with that
//! code and receives an auth token, which replaces the code on later
//! connections.

pub mod contents;
pub mod notification;
pub mod request;

pub use contents::{AuthToken, ConnectPayload, Rating, RepeatMode, ShuffleMode, Thumbs, Track};
pub use notification::Notification;
pub use request::{Arguments, Method, Namespace, Request};

use crate::error::Result;

/// Decodes and logs a text frame from the player.
///
/// # Logging
///
/// * Success: logs the notification at TRACE level
/// * Invalid payload: logs the raw JSON at TRACE level
/// * Invalid JSON: logs the raw text at TRACE level
///
/// # Errors
///
/// Returns error if the frame is not a valid notification; see
/// [`Notification::decode`].
pub fn decode(text: &str) -> Result<Notification> {
    match Notification::decode(text) {
        Ok(notification) => {
            trace!("{}: {notification:?}", notification.channel());
            Ok(notification)
        }
        Err(e) => {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(text) {
                trace!("malformed payload: {json:#?}");
            } else {
                trace!("malformed text: {text}");
            }
            Err(e)
        }
    }
}

/// Encodes a request as a text frame.
///
/// # Errors
///
/// Returns error if serialization fails, which would be a bug.
pub fn encode(request: &Request) -> Result<String> {
    let text = serde_json::to_string(request)?;
    Ok(text)
}
