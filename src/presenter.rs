//! One-line status derived from the current track.

use crate::{host::StatusItem, protocol::Track};

/// Shown in front of the current track.
pub const PLAYING_GLYPH: &str = "▶";

/// Shown alone when no track is loaded.
pub const STOPPED_GLYPH: &str = "■";

/// Formats the status line for `track`.
#[must_use]
pub fn label(track: Option<&Track>) -> String {
    match track {
        Some(track) => format!("{PLAYING_GLYPH} {} - {}", track.title, track.artist),
        None => STOPPED_GLYPH.to_owned(),
    }
}

/// Owns the status element of one session and keeps it current.
///
/// The element is disposed when the presenter is disposed or dropped,
/// whichever comes first.
pub struct Presenter {
    item: Option<Box<dyn StatusItem>>,
}

impl Presenter {
    #[must_use]
    pub fn new(item: Box<dyn StatusItem>) -> Self {
        Self { item: Some(item) }
    }

    /// Publishes the label for `track` and makes the element visible.
    pub fn refresh(&mut self, track: Option<&Track>) {
        if let Some(item) = &mut self.item {
            item.set_text(&label(track));
            item.show();
        }
    }

    pub fn dispose(&mut self) {
        if let Some(mut item) = self.item.take() {
            trace!("disposing status item");
            item.dispose();
        }
    }
}

impl Drop for Presenter {
    fn drop(&mut self) {
        self.dispose();
    }
}
