//! Remote control for Google Play Music Desktop Player.
//!
//! Connects to the player's JSON API over a websocket, pairs once with the
//! code the player displays, and from then on sends playback commands and
//! follows the player's state. The current track is kept in a one-line
//! status element provided by the host.
//!
//! * [`remote::Client`] owns the connection and runs one [`session::Session`]
//!   at a time
//! * [`protocol`] holds the wire format
//! * [`host`] is the user interface seam, with a terminal implementation
//! * [`cache`] keeps the auth token between runs
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[macro_use]
extern crate log;

pub mod cache;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod presenter;
pub mod protocol;
pub mod remote;
pub mod session;
pub mod signal;
