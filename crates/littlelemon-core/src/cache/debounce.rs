use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Quiet period after the last keystroke before a search takes effect.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

/// Trailing-edge coalescing of raw search input.
///
/// Every pushed value restarts the quiet window; when the window elapses
/// the most recent value is emitted as the settled query. A settled value
/// equal to the previous one is not emitted again.
pub struct SearchDebouncer {
    delay: Duration,
}

/// Sending half of a debouncer. Cheap to clone; `push` never blocks, so it
/// can be called from a plain thread as well as from async code.
#[derive(Clone)]
pub struct SearchInput {
    tx: mpsc::UnboundedSender<String>,
}

impl SearchInput {
    /// Feed the current raw text. Returns false once the debouncer has stopped.
    pub fn push(&self, raw: impl Into<String>) -> bool {
        self.tx.send(raw.into()).is_ok()
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS))
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Start the coalescing task on the current Tokio runtime.
    ///
    /// Settled values arrive on the returned receiver. Dropping every
    /// `SearchInput` flushes any pending value and then closes the receiver.
    pub fn spawn(self) -> (SearchInput, mpsc::UnboundedReceiver<String>) {
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        tokio::spawn(Self::run(self.delay, raw_rx, settled_tx));
        (SearchInput { tx: raw_tx }, settled_rx)
    }

    async fn run(
        delay: Duration,
        mut raw_rx: mpsc::UnboundedReceiver<String>,
        settled_tx: mpsc::UnboundedSender<String>,
    ) {
        let mut last_settled: Option<String> = None;

        while let Some(mut pending) = raw_rx.recv().await {
            loop {
                tokio::select! {
                    next = raw_rx.recv() => match next {
                        Some(value) => {
                            trace!(value = %value, "Search input restarted quiet window");
                            pending = value;
                        }
                        None => break,
                    },
                    _ = tokio::time::sleep(delay) => break,
                }
            }

            if last_settled.as_deref() == Some(pending.as_str()) {
                continue;
            }
            debug!(query = %pending, "Search settled");
            if settled_tx.send(pending.clone()).is_err() {
                return;
            }
            last_settled = Some(pending);
        }
    }
}
