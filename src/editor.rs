//! Host editor collaborators.
//!
//! The pipeline never owns the document. It reads the selection through
//! [`Editor`], writes back through the same handle, and reports progress
//! through [`Notifier`]. Handles are shared (`&self`), so two invocations
//! can overlap on one editor; [`OperationGuard`] lets the later one win.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Mutex as AsyncMutex;

/// Selection access for one editable text region.
#[async_trait]
pub trait Editor: Send + Sync {
    /// Currently selected text; `None` when nothing is selected.
    async fn selection(&self) -> Option<String>;

    /// Replace the current selection with `text`.
    async fn replace_selection(&self, text: String);

    /// Operation tokens for this region.
    fn operations(&self) -> &OperationGuard;
}

/// Fire-and-forget status messages for the user.
pub trait Notifier: Send + Sync {
    fn notice(&self, message: &str);
}

/// Hands out tokens so a stale completion can tell it has been overtaken.
///
/// Each [`begin`](Self::begin) supersedes every earlier token on the same
/// guard.
#[derive(Debug, Clone, Default)]
pub struct OperationGuard {
    latest: Arc<AtomicU64>,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new operation, superseding any in flight.
    pub fn begin(&self) -> OperationToken {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        OperationToken {
            id,
            latest: Arc::clone(&self.latest),
        }
    }
}

/// Proof of which operation started most recently.
#[derive(Debug)]
pub struct OperationToken {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl OperationToken {
    /// False once a newer operation has begun on the same guard.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id
    }
}

/// In-memory editor whose whole content is the selection.
///
/// Used by the CLI host (stdin or a file stands in for the selection) and
/// by tests.
pub struct TextBuffer {
    state: AsyncMutex<BufferState>,
    operations: OperationGuard,
}

#[derive(Debug, Default)]
struct BufferState {
    selection: Option<String>,
    replacements: usize,
}

impl TextBuffer {
    /// Buffer with `text` selected. Empty text counts as no selection.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            state: AsyncMutex::new(BufferState {
                selection: (!text.is_empty()).then_some(text),
                replacements: 0,
            }),
            operations: OperationGuard::new(),
        }
    }

    /// Buffer with nothing selected.
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    /// Current text, including any replacement written back.
    pub async fn text(&self) -> String {
        self.state.lock().await.selection.clone().unwrap_or_default()
    }

    /// How many times the selection has been replaced.
    pub async fn replacements(&self) -> usize {
        self.state.lock().await.replacements
    }
}

#[async_trait]
impl Editor for TextBuffer {
    async fn selection(&self) -> Option<String> {
        self.state.lock().await.selection.clone()
    }

    async fn replace_selection(&self, text: String) {
        let mut state = self.state.lock().await;
        state.selection = Some(text);
        state.replacements += 1;
    }

    fn operations(&self) -> &OperationGuard {
        &self.operations
    }
}

/// Prints notices to stderr, keeping stdout for the converted text.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notice(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Collects notices in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far, oldest first.
    pub fn notices(&self) -> Vec<String> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notice(&self, message: &str) {
        // Best effort: a poisoned lock just drops the notice
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(message.to_string());
        }
    }
}
