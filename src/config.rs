//! Connection settings for the remote client.
//!
//! The defaults reach a Google Play Music Desktop Player instance on the
//! local machine, identifying as the `vscode-gmusic` application so that
//! existing pairings remain valid.

use std::path::PathBuf;

use url::Url;

use crate::error::{Error, Result};

/// Default endpoint of the player's JSON API.
pub const DEFAULT_URL: &str = "ws://localhost:5672";

/// Default application identifier presented during pairing.
pub const DEFAULT_APP_ID: &str = "vscode-gmusic";

/// File name of the token cache inside the cache directory.
const CACHE_FILE_NAME: &str = "cache.toml";

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Config {
    /// Websocket endpoint of the player.
    pub url: Url,

    /// Application identifier sent with every `connect` request.
    pub app_id: String,

    /// Location of the key-value cache that holds the auth token.
    pub cache_file: PathBuf,
}

impl Config {
    /// Returns a configuration with the default endpoint, application
    /// identifier and cache location.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the default endpoint does not parse, which
    /// would be a bug.
    pub fn new() -> Result<Self> {
        let url = Url::parse(DEFAULT_URL)?;

        let cache_file = match dirs::cache_dir() {
            Some(dir) => dir.join(env!("CARGO_PKG_NAME")).join(CACHE_FILE_NAME),
            None => {
                warn!("could not determine cache directory, using working directory");
                PathBuf::from(CACHE_FILE_NAME)
            }
        };
        trace!("cache file: {}", cache_file.display());

        Ok(Self {
            url,
            app_id: DEFAULT_APP_ID.to_owned(),
            cache_file,
        })
    }

    /// Checks that the endpoint and application identifier are usable.
    ///
    /// # Errors
    ///
    /// Will return `Err` if:
    /// - the url scheme is not `ws` or `wss`
    /// - the url has no host
    /// - the application identifier is empty or holds control characters
    pub fn validate(&self) -> Result<()> {
        let scheme = self.url.scheme();
        if scheme != "ws" && scheme != "wss" {
            return Err(Error::invalid_argument(format!(
                "url scheme should be `ws` or `wss` but is `{scheme}`"
            )));
        }

        if self.url.host_str().is_none() {
            return Err(Error::invalid_argument(format!(
                "url `{}` has no host",
                self.url
            )));
        }

        if self.app_id.is_empty() || self.app_id.contains(char::is_control) {
            return Err(Error::invalid_argument(format!(
                "application identifier invalid (\"{}\")",
                self.app_id.escape_debug()
            )));
        }

        Ok(())
    }
}
