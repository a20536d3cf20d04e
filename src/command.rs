//! Commands a host can invoke on a running session.

use std::{fmt, str::FromStr};

use crate::{
    error::Error,
    protocol::{RepeatMode, Thumbs},
};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    PlayPause,
    Shuffle,
    Skip,
    Rewind,

    /// Sets a repeat mode, or cycles to the next one when `None`.
    Repeat(Option<RepeatMode>),

    /// Rates the current track, or asks the user how when `None`.
    Rate(Option<Thumbs>),

    /// Replaces the session with a fresh one.
    Restart,

    /// Reports the last known player state.
    Status,

    Quit,
}

impl Command {
    /// Words accepted by [`Command::from_str`], for help output.
    pub const USAGE: &'static [(&'static str, &'static str)] = &[
        ("play, pause", "toggle play/pause"),
        ("shuffle", "toggle shuffle"),
        ("skip, next", "skip to the next track"),
        ("rewind, prev", "rewind or go to the previous track"),
        ("repeat [no|list|single]", "set or cycle the repeat mode"),
        ("rate [up|down|clear]", "rate the current track"),
        ("restart", "reconnect to the player"),
        ("status", "show the player state"),
        ("quit", "exit"),
    ];
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| Error::invalid_argument("empty command"))?
            .to_ascii_lowercase();
        let argument = words.next().map(str::to_ascii_lowercase);

        if let Some(extra) = words.next() {
            return Err(Error::invalid_argument(format!(
                "unexpected argument `{extra}`"
            )));
        }

        let command = match (verb.as_str(), argument.as_deref()) {
            ("play" | "pause" | "playpause", None) => Self::PlayPause,
            ("shuffle", None) => Self::Shuffle,
            ("skip" | "next" | "forward", None) => Self::Skip,
            ("rewind" | "prev" | "previous", None) => Self::Rewind,
            ("repeat", None) => Self::Repeat(None),
            ("repeat", Some(mode)) => {
                let mode = match mode {
                    "no" | "off" => RepeatMode::NoRepeat,
                    "list" | "all" => RepeatMode::ListRepeat,
                    "single" | "one" => RepeatMode::SingleRepeat,
                    other => {
                        return Err(Error::invalid_argument(format!(
                            "unknown repeat mode `{other}`"
                        )))
                    }
                };
                Self::Repeat(Some(mode))
            }
            ("rate", None) => Self::Rate(None),
            ("rate", Some(thumbs)) => {
                let thumbs = match thumbs {
                    "up" | "like" => Thumbs::Up,
                    "down" | "dislike" => Thumbs::Down,
                    "clear" | "none" | "remove" => Thumbs::Clear,
                    other => {
                        return Err(Error::invalid_argument(format!(
                            "unknown rating `{other}`"
                        )))
                    }
                };
                Self::Rate(Some(thumbs))
            }
            ("restart", None) => Self::Restart,
            ("status", None) => Self::Status,
            ("quit" | "exit", None) => Self::Quit,
            (verb, Some(argument)) => {
                return Err(Error::invalid_argument(format!(
                    "`{verb}` takes no argument (got `{argument}`)"
                )))
            }
            (verb, None) => {
                return Err(Error::invalid_argument(format!("unknown command `{verb}`")))
            }
        };

        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayPause => write!(f, "play/pause"),
            Self::Shuffle => write!(f, "shuffle"),
            Self::Skip => write!(f, "skip"),
            Self::Rewind => write!(f, "rewind"),
            Self::Repeat(Some(mode)) => write!(f, "repeat {mode}"),
            Self::Repeat(None) => write!(f, "repeat"),
            Self::Rate(Some(thumbs)) => write!(f, "rate {thumbs}"),
            Self::Rate(None) => write!(f, "rate"),
            Self::Restart => write!(f, "restart"),
            Self::Status => write!(f, "status"),
            Self::Quit => write!(f, "quit"),
        }
    }
}
