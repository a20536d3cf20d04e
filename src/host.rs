//! User interface surface consumed by a session.
//!
//! A host provides a single-line status element per session and two kinds
//! of prompts. Both prompts resolve to `None` when the user cancels.
//!
//! [`Terminal`] is the host used by the binary: status changes are printed
//! on standard output and prompts are answered by the next line of input.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::oneshot;

/// A status-bar style text element.
pub trait StatusItem: Send {
    fn set_text(&mut self, text: &str);

    fn show(&mut self);

    /// Releases the element. Calls after this are ignored.
    fn dispose(&mut self);
}

/// User input prompts.
#[async_trait]
pub trait Prompt: Send + Sync {
    /// Asks for free text.
    async fn input_box(&self, prompt: &str) -> Option<String>;

    /// Asks to pick one of `items`. Returns the picked item verbatim.
    async fn quick_pick(&self, items: &[&str]) -> Option<String>;
}

/// Everything a session needs from its host.
pub trait Host: Prompt {
    /// Creates a fresh status element, owned by one session.
    fn status_item(&self) -> Box<dyn StatusItem>;
}

/// Terminal host.
///
/// Lines of input are handed to [`Terminal::feed`]. While a prompt is
/// waiting, the next line answers it; an empty line cancels.
#[derive(Clone, Debug, Default)]
pub struct Terminal {
    pending: Arc<Mutex<Option<oneshot::Sender<String>>>>,
}

impl Terminal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a line of input to a waiting prompt.
    ///
    /// Returns the line back when no prompt is waiting, so the caller can
    /// interpret it otherwise.
    pub fn feed(&self, line: &str) -> Option<String> {
        let sender = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        // A prompt whose session went away no longer takes input.
        match sender {
            Some(sender) if !sender.is_closed() => {
                if sender.send(line.trim().to_owned()).is_err() {
                    debug!("prompt went away before it was answered");
                }
                None
            }
            _ => Some(line.to_owned()),
        }
    }

    /// Whether a prompt is waiting for input.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|sender| !sender.is_closed())
    }

    async fn ask(&self, question: &str) -> Option<String> {
        let (tx, rx) = oneshot::channel();

        // A newer prompt supersedes an older one, which then resolves as
        // cancelled.
        if self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(tx)
            .is_some()
        {
            debug!("cancelling previous prompt");
        }

        println!("{question}");
        let answer = rx.await.ok()?;
        if answer.is_empty() {
            None
        } else {
            Some(answer)
        }
    }
}

#[async_trait]
impl Prompt for Terminal {
    async fn input_box(&self, prompt: &str) -> Option<String> {
        self.ask(&format!("{prompt}:")).await
    }

    async fn quick_pick(&self, items: &[&str]) -> Option<String> {
        let mut question = String::new();
        for (i, item) in items.iter().enumerate() {
            question.push_str(&format!("  {}) {item}\n", i + 1));
        }
        question.push_str("choose:");

        let answer = self.ask(&question).await?;
        pick(items, &answer).map(ToOwned::to_owned)
    }
}

impl Host for Terminal {
    fn status_item(&self) -> Box<dyn StatusItem> {
        Box::new(TerminalStatus::default())
    }
}

/// Resolves a quick-pick answer given as 1-based index or as label.
fn pick<'a>(items: &[&'a str], answer: &str) -> Option<&'a str> {
    if let Ok(index) = answer.parse::<usize>() {
        return index.checked_sub(1).and_then(|i| items.get(i)).copied();
    }

    items
        .iter()
        .find(|item| item.eq_ignore_ascii_case(answer))
        .copied()
}

/// Status element that prints its text whenever it changes while shown.
#[derive(Debug, Default)]
pub struct TerminalStatus {
    text: String,
    visible: bool,
    disposed: bool,
}

impl TerminalStatus {
    fn print(&self) {
        if self.visible && !self.disposed {
            println!("{}", self.text);
        }
    }
}

impl StatusItem for TerminalStatus {
    fn set_text(&mut self, text: &str) {
        if self.text != text {
            text.clone_into(&mut self.text);
            self.print();
        }
    }

    fn show(&mut self) {
        if !self.visible && !self.disposed {
            self.visible = true;
            self.print();
        }
    }

    fn dispose(&mut self) {
        self.visible = false;
        self.disposed = true;
    }
}
