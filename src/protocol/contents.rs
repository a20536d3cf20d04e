//! Payload types carried by player notifications and commands.

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull, DeserializeFromStr, SerializeDisplay};
use veil::Redact;

use crate::error::Error;

/// The track that the player has loaded.
///
/// Every field is nullable on the wire; `null` decodes as an empty string.
/// The album fields are carried along but not presented anywhere.
#[serde_as]
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub title: String,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub artist: String,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub album: String,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub album_art: String,
}

impl Track {
    /// Whether this track holds no metadata at all, which is how the player
    /// reports that nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.artist.is_empty()
            && self.album.is_empty()
            && self.album_art.is_empty()
    }
}

/// The rating of the current track.
///
/// `liked` and `disliked` together describe a tri-state; see [`Thumbs`].
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rating {
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub disliked: bool,
}

impl Rating {
    #[must_use]
    pub fn thumbs(&self) -> Thumbs {
        Thumbs::from_flags(self.liked, self.disliked)
    }
}

/// A three-way rating choice.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Thumbs {
    Up,
    Down,
    Clear,
}

impl Thumbs {
    /// Every choice, in menu order.
    pub const ALL: [Self; 3] = [Self::Up, Self::Down, Self::Clear];

    /// Resolves a pair of flags. Up takes precedence over down.
    #[must_use]
    pub fn from_flags(up: bool, down: bool) -> Self {
        if up {
            Self::Up
        } else if down {
            Self::Down
        } else {
            Self::Clear
        }
    }

    /// Maps a menu label back to a choice.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|thumbs| thumbs.label() == label)
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Up => "Thumbs Up",
            Self::Down => "Thumbs Down",
            Self::Clear => "Remove Rating",
        }
    }
}

impl fmt::Display for Thumbs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Clear => write!(f, "none"),
        }
    }
}

/// Shuffle mode as reported by the player.
///
/// Unknown modes are kept verbatim.
#[derive(Clone, Debug, Default, SerializeDisplay, DeserializeFromStr, PartialEq, Eq, Hash)]
pub enum ShuffleMode {
    #[default]
    NoShuffle,
    AllShuffle,
    Other(String),
}

impl ShuffleMode {
    const NO_SHUFFLE: &'static str = "NO_SHUFFLE";
    const ALL_SHUFFLE: &'static str = "ALL_SHUFFLE";
}

impl fmt::Display for ShuffleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoShuffle => write!(f, "{}", Self::NO_SHUFFLE),
            Self::AllShuffle => write!(f, "{}", Self::ALL_SHUFFLE),
            Self::Other(mode) => write!(f, "{mode}"),
        }
    }
}

impl FromStr for ShuffleMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s {
            Self::NO_SHUFFLE => Self::NoShuffle,
            Self::ALL_SHUFFLE => Self::AllShuffle,
            other => Self::Other(other.to_owned()),
        };
        Ok(mode)
    }
}

/// Repeat mode as reported by, and sent to, the player.
///
/// Unknown modes are kept verbatim.
#[derive(Clone, Debug, Default, SerializeDisplay, DeserializeFromStr, PartialEq, Eq, Hash)]
pub enum RepeatMode {
    #[default]
    NoRepeat,
    ListRepeat,
    SingleRepeat,
    Other(String),
}

impl RepeatMode {
    const NO_REPEAT: &'static str = "NO_REPEAT";
    const LIST_REPEAT: &'static str = "LIST_REPEAT";
    const SINGLE_REPEAT: &'static str = "SINGLE_REPEAT";

    /// The mode that follows this one when cycling through repeat modes.
    /// Unknown modes cycle back to the start.
    #[must_use]
    pub fn next(&self) -> Self {
        match self {
            Self::NoRepeat => Self::ListRepeat,
            Self::ListRepeat => Self::SingleRepeat,
            Self::SingleRepeat | Self::Other(_) => Self::NoRepeat,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRepeat => write!(f, "{}", Self::NO_REPEAT),
            Self::ListRepeat => write!(f, "{}", Self::LIST_REPEAT),
            Self::SingleRepeat => write!(f, "{}", Self::SINGLE_REPEAT),
            Self::Other(mode) => write!(f, "{mode}"),
        }
    }
}

impl FromStr for RepeatMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s {
            Self::NO_REPEAT => Self::NoRepeat,
            Self::LIST_REPEAT => Self::ListRepeat,
            Self::SINGLE_REPEAT => Self::SingleRepeat,
            other => Self::Other(other.to_owned()),
        };
        Ok(mode)
    }
}

/// Opaque token issued by the player after pairing.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Redact)]
#[redact(all)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AuthToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::invalid_argument("auth token should not be empty"));
        }

        Ok(Self(s.to_owned()))
    }
}

/// Payload of the `connect` channel.
#[derive(Clone, Debug, DeserializeFromStr, SerializeDisplay, PartialEq, Eq)]
pub enum ConnectPayload {
    /// The player wants the pairing code it is displaying.
    CodeRequired,

    /// Pairing succeeded; the player issued a token for future sessions.
    Token(AuthToken),
}

impl ConnectPayload {
    const CODE_REQUIRED: &'static str = "CODE_REQUIRED";
}

impl fmt::Display for ConnectPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CodeRequired => write!(f, "{}", Self::CODE_REQUIRED),
            Self::Token(token) => write!(f, "{}", token.as_str()),
        }
    }
}

impl FromStr for ConnectPayload {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::CODE_REQUIRED {
            Ok(Self::CodeRequired)
        } else {
            s.parse().map(Self::Token)
        }
    }
}
