//! Outbound command envelopes.
//!
//! Every command is a JSON object with a two-part selector and a single
//! argument slot:
//!
//! ```json
//! {"namespace": "playback", "method": "playPause", "arguments": null}
//! ```
//!
//! The player sends no acknowledgement, so a request is complete once it is
//! written to the socket.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::contents::{RepeatMode, Thumbs};

/// A command for the player.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    pub namespace: Namespace,
    pub method: Method,
    pub arguments: Arguments,
}

/// First half of the command selector.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Namespace {
    Connect,
    Playback,
    Rating,
}

/// Second half of the command selector.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Method {
    Connect,
    PlayPause,
    Forward,
    Rewind,
    ToggleShuffle,
    SetRepeat,
    SetRating,
    ResetRating,
}

/// Argument slot of a [`Request`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Arguments {
    Null,
    Number(u8),
    Text(String),
    List(Vec<String>),
}

impl Request {
    /// Rating value for a thumbs up.
    pub const RATING_UP: u8 = 5;

    /// Rating value for a thumbs down.
    pub const RATING_DOWN: u8 = 1;

    fn new(namespace: Namespace, method: Method, arguments: Arguments) -> Self {
        Self {
            namespace,
            method,
            arguments,
        }
    }

    fn playback(method: Method) -> Self {
        Self::new(Namespace::Playback, method, Arguments::Null)
    }

    /// Asks the player for control.
    ///
    /// Without a `credential` this starts pairing. The credential is either
    /// a cached auth token or the pairing code the user read off the player.
    #[must_use]
    pub fn connect(app_id: &str, credential: Option<&str>) -> Self {
        let mut arguments = vec![app_id.to_owned()];
        if let Some(credential) = credential {
            arguments.push(credential.to_owned());
        }

        Self::new(Namespace::Connect, Method::Connect, Arguments::List(arguments))
    }

    #[must_use]
    pub fn play_pause() -> Self {
        Self::playback(Method::PlayPause)
    }

    #[must_use]
    pub fn forward() -> Self {
        Self::playback(Method::Forward)
    }

    #[must_use]
    pub fn rewind() -> Self {
        Self::playback(Method::Rewind)
    }

    #[must_use]
    pub fn toggle_shuffle() -> Self {
        Self::playback(Method::ToggleShuffle)
    }

    #[must_use]
    pub fn set_repeat(mode: &RepeatMode) -> Self {
        Self::new(
            Namespace::Playback,
            Method::SetRepeat,
            Arguments::Text(mode.to_string()),
        )
    }

    #[must_use]
    pub fn thumbs(thumbs: Thumbs) -> Self {
        match thumbs {
            Thumbs::Up => Self::new(
                Namespace::Rating,
                Method::SetRating,
                Arguments::Number(Self::RATING_UP),
            ),
            Thumbs::Down => Self::new(
                Namespace::Rating,
                Method::SetRating,
                Arguments::Number(Self::RATING_DOWN),
            ),
            Thumbs::Clear => Self::new(Namespace::Rating, Method::ResetRating, Arguments::Null),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Connect arguments may hold a token or pairing code.
        match (&self.namespace, &self.arguments) {
            (Namespace::Connect, _) | (_, Arguments::Null) => {
                write!(f, "{:?}.{:?}", self.namespace, self.method)
            }
            (_, Arguments::Number(n)) => write!(f, "{:?}.{:?}({n})", self.namespace, self.method),
            (_, Arguments::Text(s)) => write!(f, "{:?}.{:?}({s})", self.namespace, self.method),
            (_, Arguments::List(list)) => {
                write!(f, "{:?}.{:?}({})", self.namespace, self.method, list.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn wire(request: &Request) -> Value {
        serde_json::to_value(request).unwrap()
    }

    #[test]
    fn playback_commands() {
        assert_eq!(
            wire(&Request::play_pause()),
            json!({"namespace": "playback", "method": "playPause", "arguments": null})
        );
        assert_eq!(
            wire(&Request::forward()),
            json!({"namespace": "playback", "method": "forward", "arguments": null})
        );
        assert_eq!(
            wire(&Request::rewind()),
            json!({"namespace": "playback", "method": "rewind", "arguments": null})
        );
        assert_eq!(
            wire(&Request::toggle_shuffle()),
            json!({"namespace": "playback", "method": "toggleShuffle", "arguments": null})
        );
        assert_eq!(
            wire(&Request::set_repeat(&RepeatMode::SingleRepeat)),
            json!({"namespace": "playback", "method": "setRepeat", "arguments": "SINGLE_REPEAT"})
        );
    }

    #[test]
    fn rating_commands() {
        assert_eq!(
            wire(&Request::thumbs(Thumbs::Up)),
            json!({"namespace": "rating", "method": "setRating", "arguments": 5})
        );
        assert_eq!(
            wire(&Request::thumbs(Thumbs::Down)),
            json!({"namespace": "rating", "method": "setRating", "arguments": 1})
        );
        assert_eq!(
            wire(&Request::thumbs(Thumbs::Clear)),
            json!({"namespace": "rating", "method": "resetRating", "arguments": null})
        );
    }

    #[test]
    fn connect_without_credential_holds_only_app_id() {
        assert_eq!(
            wire(&Request::connect("vscode-gmusic", None)),
            json!({"namespace": "connect", "method": "connect", "arguments": ["vscode-gmusic"]})
        );
        assert_eq!(
            wire(&Request::connect("vscode-gmusic", Some("1234"))),
            json!({"namespace": "connect", "method": "connect", "arguments": ["vscode-gmusic", "1234"]})
        );
    }

    #[test]
    fn display_hides_connect_credentials() {
        let request = Request::connect("vscode-gmusic", Some("secret"));
        assert_eq!(request.to_string(), "Connect.Connect");
        assert_eq!(Request::thumbs(Thumbs::Up).to_string(), "Rating.SetRating(5)");
    }
}
