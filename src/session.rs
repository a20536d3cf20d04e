//! A single pairing with the player and the state it reports.
//!
//! A [`Session`] owns everything that lives as long as one connection: the
//! last known player state, the status presenter and the outbound queue.
//! It does not own the socket itself; [`remote::Client`] drives the
//! session from the socket and drains its outbound queue.
//!
//! Commands are fire-and-forget: the player never acknowledges them, so
//! queueing a [`Request`] is all a command does.
//!
//! Prompts run as separate tasks so that notifications keep flowing while
//! the user makes up their mind. Those tasks are bound to the session's
//! cancellation token and die with it.
//!
//! [`remote::Client`]: crate::remote::Client

use std::{fmt, sync::Arc};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    cache::{Cache, AUTH_TOKEN_KEY},
    command::Command,
    host::{Prompt, StatusItem},
    presenter::{self, Presenter},
    protocol::{
        ConnectPayload, Notification, Rating, RepeatMode, Request, ShuffleMode, Thumbs, Track,
    },
};

/// Question shown when the player asks for its pairing code.
pub const PAIRING_PROMPT: &str = "Please input the number shown on GPMDP";

/// The last known state of the player.
///
/// Every field is `None` until the player has reported it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerState {
    pub playing: Option<bool>,
    pub track: Option<Track>,
    pub rating: Option<Rating>,
    pub shuffle: Option<ShuffleMode>,
    pub repeat: Option<RepeatMode>,
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_unknown<T: fmt::Display>(value: Option<T>) -> String {
            value.map_or_else(|| "unknown".to_owned(), |value| value.to_string())
        }

        let playing = self
            .playing
            .map(|playing| if playing { "playing" } else { "paused" });

        write!(
            f,
            "{}; {}; rating {}; shuffle {}; repeat {}",
            presenter::label(self.track.as_ref()),
            or_unknown(playing),
            or_unknown(self.rating.as_ref().map(Rating::thumbs)),
            or_unknown(self.shuffle.as_ref()),
            or_unknown(self.repeat.as_ref()),
        )
    }
}

pub struct Session {
    app_id: String,
    state: PlayerState,
    presenter: Presenter,

    outbox: mpsc::UnboundedSender<Request>,
    cache: Arc<dyn Cache>,
    prompt: Arc<dyn Prompt>,

    cancel: CancellationToken,
}

impl Session {
    /// Creates a session and the receiving end of its outbound queue.
    #[must_use]
    pub fn new(
        app_id: &str,
        status: Box<dyn StatusItem>,
        prompt: Arc<dyn Prompt>,
        cache: Arc<dyn Cache>,
    ) -> (Self, mpsc::UnboundedReceiver<Request>) {
        let (outbox, requests) = mpsc::unbounded_channel();

        let session = Self {
            app_id: app_id.to_owned(),
            state: PlayerState::default(),
            presenter: Presenter::new(status),
            outbox,
            cache,
            prompt,
            cancel: CancellationToken::new(),
        };

        (session, requests)
    }

    /// Asks the player for control, with the cached auth token if there is
    /// one.
    pub fn open(&self) {
        let token = match self.cache.get(AUTH_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!("could not read auth token, pairing anew: {e}");
                None
            }
        };

        if token.is_some() {
            debug!("connecting with cached auth token");
        } else {
            info!("no auth token cached, requesting pairing");
        }

        self.send(Request::connect(&self.app_id, token.as_deref()));
    }

    /// Applies a notification from the player.
    ///
    /// Notifications that arrive after [`Session::dispose`] are ignored.
    pub fn handle(&mut self, notification: Notification) {
        if self.cancel.is_cancelled() {
            trace!("ignoring {} on disposed session", notification.channel());
            return;
        }

        match notification {
            Notification::Connect(ConnectPayload::CodeRequired) => self.pair(),
            Notification::Connect(ConnectPayload::Token(token)) => {
                info!("paired with player");
                if let Err(e) = self.cache.put(AUTH_TOKEN_KEY, token.as_str()) {
                    error!("could not cache auth token: {e}");
                }
            }
            Notification::PlayState(playing) => self.state.playing = Some(playing),
            Notification::Track(track) => {
                self.state.track = track;
                self.presenter.refresh(self.state.track.as_ref());
            }
            Notification::Rating(rating) => self.state.rating = Some(rating),
            Notification::Shuffle(mode) => self.state.shuffle = Some(mode),
            Notification::Repeat(mode) => self.state.repeat = Some(mode),
            Notification::Unrecognized { channel } => trace!("ignoring channel {channel}"),
        }
    }

    /// Runs a host command.
    ///
    /// `Restart` and `Quit` end the session and are up to the caller;
    /// here they are no-ops.
    pub fn execute(&mut self, command: Command) {
        match command {
            Command::PlayPause => self.toggle_play(),
            Command::Shuffle => self.toggle_shuffle(),
            Command::Skip => self.forward(),
            Command::Rewind => self.rewind(),
            Command::Repeat(mode) => {
                let mode = mode.unwrap_or_else(|| {
                    self.state
                        .repeat
                        .as_ref()
                        .map_or(RepeatMode::ListRepeat, RepeatMode::next)
                });
                self.toggle_repeat(&mode);
            }
            Command::Rate(Some(thumbs)) => self.send(Request::thumbs(thumbs)),
            Command::Rate(None) => self.choose_rating(),
            Command::Status => info!("{}", self.state),
            Command::Restart | Command::Quit => {
                trace!("{command} is handled by the caller");
            }
        }
    }

    pub fn toggle_play(&self) {
        self.send(Request::play_pause());
    }

    pub fn forward(&self) {
        self.send(Request::forward());
    }

    pub fn rewind(&self) {
        self.send(Request::rewind());
    }

    pub fn toggle_shuffle(&self) {
        self.send(Request::toggle_shuffle());
    }

    pub fn toggle_repeat(&self, mode: &RepeatMode) {
        self.send(Request::set_repeat(mode));
    }

    /// Rates the current track. A thumbs up wins over a thumbs down.
    pub fn set_thumbs(&self, up: bool, down: bool) {
        self.send(Request::thumbs(Thumbs::from_flags(up, down)));
    }

    /// Asks the user for a rating and sends it, unless they cancel.
    pub fn choose_rating(&self) {
        let prompt = Arc::clone(&self.prompt);
        let outbox = self.outbox.clone();
        let cancel = self.cancel.child_token();

        tokio::spawn(async move {
            let labels = Thumbs::ALL.map(|thumbs| thumbs.label());
            tokio::select! {
                () = cancel.cancelled() => trace!("rating prompt abandoned"),
                choice = prompt.quick_pick(&labels) => {
                    match choice.as_deref().and_then(Thumbs::from_label) {
                        Some(thumbs) => {
                            let request = Request::thumbs(thumbs);
                            debug!("sending {request}");
                            let _ = outbox.send(request);
                        }
                        None => debug!("rating cancelled"),
                    }
                }
            }
        });
    }

    /// Asks the user for the code the player displays and sends it back.
    fn pair(&self) {
        let prompt = Arc::clone(&self.prompt);
        let outbox = self.outbox.clone();
        let app_id = self.app_id.clone();
        let cancel = self.cancel.child_token();

        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => trace!("pairing prompt abandoned"),
                code = prompt.input_box(PAIRING_PROMPT) => {
                    match code {
                        Some(code) => {
                            debug!("sending pairing code");
                            let _ = outbox.send(Request::connect(&app_id, Some(code.trim())));
                        }
                        None => info!("pairing cancelled"),
                    }
                }
            }
        });
    }

    /// Reacts to a socket error: the status element goes away, the session
    /// stays. There is no reconnection.
    pub fn socket_error(&mut self) {
        self.presenter.dispose();
    }

    /// Releases the status element and abandons pending prompts. Later
    /// notifications and commands are ignored.
    pub fn dispose(&mut self) {
        self.presenter.dispose();
        self.cancel.cancel();
    }

    #[must_use]
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn send(&self, request: Request) {
        if self.cancel.is_cancelled() {
            trace!("not sending {request} on disposed session");
            return;
        }

        debug!("sending {request}");
        if self.outbox.send(request).is_err() {
            debug!("outbound queue closed");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.dispose();
    }
}
