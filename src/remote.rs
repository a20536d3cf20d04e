//! Websocket client that drives one [`Session`] at a time.
//!
//! [`Client::start`] connects, runs the session until it ends, and reports
//! why it ended. Everything happens on one event loop: host commands,
//! outbound requests and inbound frames are handled one at a time, each to
//! completion. When `start` returns, the socket and session are gone, so a
//! restart never leaves an old receive loop running.

use std::{ops::ControlFlow, sync::Arc};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WebsocketMessage;

use crate::{
    cache::Cache,
    command::Command,
    config::Config,
    error::Result,
    host::{Host, Prompt},
    protocol,
    session::Session,
};

/// Text frames larger than this are dropped without parsing.
const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Why a session ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Exit {
    /// The host asked for a fresh session.
    Restart,

    /// The host asked to stop, or stopped sending commands.
    Quit,

    /// The player closed the connection.
    Closed,
}

pub struct Client<H> {
    config: Config,
    host: Arc<H>,
    cache: Arc<dyn Cache>,
}

impl<H> Client<H>
where
    H: Host + 'static,
{
    /// Creates a client for the player at `config.url`.
    ///
    /// # Errors
    ///
    /// Will return `Err` if `config` does not validate.
    pub fn new(config: &Config, host: Arc<H>, cache: Arc<dyn Cache>) -> Result<Self> {
        config.validate()?;
        debug!("remote url: {}", config.url);

        Ok(Self {
            config: config.clone(),
            host,
            cache,
        })
    }

    /// Connects to the player and runs a session until it ends.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the connection cannot be established. Errors
    /// during the session do not end it: malformed messages are dropped,
    /// and a socket error leaves the session running without a status
    /// element until it is restarted.
    pub async fn start(&mut self, commands: &mut mpsc::Receiver<Command>) -> Result<Exit> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(self.config.url.as_str()).await?;
        info!("connected to {}", self.config.url);
        let (mut ws_tx, mut ws_rx) = ws_stream.split();

        let prompt: Arc<dyn Prompt> = self.host.clone();
        let (mut session, mut requests) = Session::new(
            &self.config.app_id,
            self.host.status_item(),
            prompt,
            Arc::clone(&self.cache),
        );
        session.open();

        let mut receiving = true;
        let exit = loop {
            tokio::select! {
                // Flush queued requests before acting on the next command,
                // so that a command followed by `Quit` is still sent.
                biased;

                Some(request) = requests.recv() => {
                    match protocol::encode(&request) {
                        Ok(text) => {
                            trace!("sending message: {text}");
                            if let Err(e) = ws_tx.send(WebsocketMessage::text(text)).await {
                                debug!("could not send {request}: {e}");
                            }
                        }
                        Err(e) => error!("could not encode {request}: {e}"),
                    }
                }

                command = commands.recv() => {
                    match command {
                        Some(Command::Restart) => break Exit::Restart,
                        Some(Command::Quit) | None => break Exit::Quit,
                        Some(command) => session.execute(command),
                    }
                }

                message = ws_rx.next(), if receiving => {
                    match message {
                        Some(Ok(message)) => {
                            if let ControlFlow::Break(exit) = Self::handle_message(&mut session, message) {
                                break exit;
                            }
                        }
                        Some(Err(e)) => {
                            // No reconnection: the session degrades until
                            // the host restarts it.
                            warn!("websocket error, restart to reconnect: {e}");
                            session.socket_error();
                            receiving = false;
                        }
                        None => {
                            info!("connection closed");
                            break Exit::Closed;
                        }
                    }
                }
            }
        };

        debug!("session ended: {exit:?}");
        session.dispose();
        if let Err(e) = ws_tx.close().await {
            trace!("error closing websocket: {e}");
        }

        Ok(exit)
    }

    fn handle_message(session: &mut Session, message: WebsocketMessage) -> ControlFlow<Exit> {
        match message {
            WebsocketMessage::Text(text) => {
                // Do not parse exceedingly large messages to prevent out of
                // memory conditions.
                let message_size = text.len();
                if message_size > MAX_MESSAGE_SIZE {
                    error!("ignoring oversized message with {message_size} bytes");
                    return ControlFlow::Continue(());
                }

                match protocol::decode(text.as_str()) {
                    Ok(notification) => session.handle(notification),
                    Err(e) => error!("dropping malformed message: {e}"),
                }
            }
            WebsocketMessage::Close(frame) => {
                info!("connection closed by player: {frame:?}");
                return ControlFlow::Break(Exit::Closed);
            }
            // tungstenite answers pings by itself.
            WebsocketMessage::Ping(_) | WebsocketMessage::Pong(_) => trace!("ping/pong"),
            _ => trace!("message type unimplemented"),
        }

        ControlFlow::Continue(())
    }
}
