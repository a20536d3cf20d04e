//! Inbound notifications.
//!
//! The player pushes state changes as `{"channel": ..., "payload": ...}`.
//! Decoding happens in two steps: the envelope first, then the payload
//! against the schema of its channel. Channels this client does not track,
//! like `time` or `lyrics`, decode as [`Notification::Unrecognized`].

use serde::Deserialize;
use serde_json::Value;

use super::contents::{ConnectPayload, Rating, RepeatMode, ShuffleMode, Track};
use crate::error::Result;

#[derive(Deserialize)]
struct Envelope {
    channel: String,
    #[serde(default)]
    payload: Value,
}

/// A decoded state change pushed by the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// Pairing progress.
    Connect(ConnectPayload),

    /// Whether the player is playing.
    PlayState(bool),

    /// The loaded track, or `None` when nothing is loaded.
    Track(Option<Track>),

    Rating(Rating),

    Shuffle(ShuffleMode),

    Repeat(RepeatMode),

    /// A channel that is not tracked.
    Unrecognized { channel: String },
}

impl Notification {
    const CONNECT: &'static str = "connect";
    const PLAY_STATE: &'static str = "playState";
    const TRACK: &'static str = "track";
    const RATING: &'static str = "rating";
    const SHUFFLE: &'static str = "shuffle";
    const REPEAT: &'static str = "repeat";

    /// Decodes a text frame.
    ///
    /// # Errors
    ///
    /// Will return `Err` with kind `DataLoss` if:
    /// - `text` is not a JSON object with a `channel` string
    /// - the payload does not match the schema of a known channel
    pub fn decode(text: &str) -> Result<Self> {
        let Envelope { channel, payload } = serde_json::from_str(text)?;

        let notification = match channel.as_str() {
            Self::CONNECT => Self::Connect(serde_json::from_value(payload)?),
            Self::PLAY_STATE => Self::PlayState(serde_json::from_value(payload)?),
            Self::TRACK => {
                let track: Option<Track> = serde_json::from_value(payload)?;
                Self::Track(track.filter(|track| !track.is_empty()))
            }
            Self::RATING => Self::Rating(serde_json::from_value(payload)?),
            Self::SHUFFLE => Self::Shuffle(serde_json::from_value(payload)?),
            Self::REPEAT => Self::Repeat(serde_json::from_value(payload)?),
            _ => Self::Unrecognized { channel },
        };

        Ok(notification)
    }

    /// The wire name of the channel this notification arrived on.
    #[must_use]
    pub fn channel(&self) -> &str {
        match self {
            Self::Connect(_) => Self::CONNECT,
            Self::PlayState(_) => Self::PLAY_STATE,
            Self::Track(_) => Self::TRACK,
            Self::Rating(_) => Self::RATING,
            Self::Shuffle(_) => Self::SHUFFLE,
            Self::Repeat(_) => Self::REPEAT,
            Self::Unrecognized { channel } => channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn decodes_known_channels() {
        assert_eq!(
            Notification::decode(r#"{"channel":"connect","payload":"CODE_REQUIRED"}"#).unwrap(),
            Notification::Connect(ConnectPayload::CodeRequired)
        );
        assert_eq!(
            Notification::decode(r#"{"channel":"playState","payload":true}"#).unwrap(),
            Notification::PlayState(true)
        );
        assert_eq!(
            Notification::decode(r#"{"channel":"rating","payload":{"liked":true,"disliked":false}}"#)
                .unwrap(),
            Notification::Rating(Rating {
                liked: true,
                disliked: false
            })
        );
        assert_eq!(
            Notification::decode(r#"{"channel":"shuffle","payload":"ALL_SHUFFLE"}"#).unwrap(),
            Notification::Shuffle(ShuffleMode::AllShuffle)
        );
        assert_eq!(
            Notification::decode(r#"{"channel":"repeat","payload":"LIST_REPEAT"}"#).unwrap(),
            Notification::Repeat(RepeatMode::ListRepeat)
        );
    }

    #[test]
    fn decodes_track() {
        let notification = Notification::decode(
            r#"{"channel":"track","payload":{"title":"Teardrop","artist":"Massive Attack","album":"Mezzanine","albumArt":"https://example.com/art.jpg"}}"#,
        )
        .unwrap();

        let track = match notification {
            Notification::Track(Some(track)) => track,
            other => panic!("expected a track, got {other:?}"),
        };
        assert_eq!(track.title, "Teardrop");
        assert_eq!(track.artist, "Massive Attack");
        assert_eq!(track.album, "Mezzanine");
        assert_eq!(track.album_art, "https://example.com/art.jpg");
    }

    #[test]
    fn empty_track_is_absent() {
        assert_eq!(
            Notification::decode(r#"{"channel":"track","payload":null}"#).unwrap(),
            Notification::Track(None)
        );
        assert_eq!(
            Notification::decode(
                r#"{"channel":"track","payload":{"title":null,"artist":null,"album":null,"albumArt":null}}"#
            )
            .unwrap(),
            Notification::Track(None)
        );
    }

    #[test]
    fn unknown_channel_is_unrecognized() {
        let notification =
            Notification::decode(r#"{"channel":"time","payload":{"current":1,"total":2}}"#).unwrap();
        assert_eq!(notification.channel(), "time");
        assert!(matches!(notification, Notification::Unrecognized { .. }));
    }

    #[test]
    fn malformed_messages_are_data_loss() {
        for text in [
            "not json",
            r#"{"payload":true}"#,
            r#"{"channel":"playState","payload":"yes"}"#,
            r#"{"channel":"rating","payload":5}"#,
            r#"{"channel":"connect","payload":""}"#,
        ] {
            let err = Notification::decode(text).unwrap_err();
            assert_eq!(err.kind, ErrorKind::DataLoss, "{text}");
        }
    }
}
