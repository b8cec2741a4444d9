//! Single-slot modal dialog.
//!
//! While a message is up, the dialog is the only input consumer. Showing a
//! new message replaces the old one outright: its follow-up is dropped,
//! never run, and nothing is queued.

#[derive(Clone, Debug)]
struct Pending<F> {
    message: String,
    follow_up: Option<F>,
}

#[derive(Clone, Debug)]
pub struct DialogRouter<F> {
    current: Option<Pending<F>>,
}

impl<F> DialogRouter<F> {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub fn show(&mut self, message: impl Into<String>, follow_up: Option<F>) {
        self.current = Some(Pending {
            message: message.into(),
            follow_up,
        });
    }

    /// Dismiss the message and hand back its follow-up for the caller to
    /// run. Does nothing when no message is up.
    pub fn confirm(&mut self) -> Option<F> {
        self.current.take().and_then(|p| p.follow_up)
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.current.as_ref().map(|p| p.message.as_str())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

impl<F> Default for DialogRouter<F> {
    fn default() -> Self {
        Self::new()
    }
}
