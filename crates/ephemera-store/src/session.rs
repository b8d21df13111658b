use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Which reel, if any, is open full-screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub is_open: bool,
    pub focused_author_id: Option<String>,
}

/// Transient viewer state, separate from story content.
///
/// Opening a reel that no longer exists is allowed; the viewer renders an
/// empty state for it.
pub struct ViewerSession {
    tx: watch::Sender<SessionState>,
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerSession {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::default());
        Self { tx }
    }

    pub fn open(&self, author_id: impl Into<String>) {
        let author_id = author_id.into();
        debug!("Viewer opened on {}", author_id);
        self.tx.send_replace(SessionState {
            is_open: true,
            focused_author_id: Some(author_id),
        });
    }

    pub fn close(&self) {
        self.tx.send_replace(SessionState::default());
    }

    pub fn state(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub fn is_focused_on(&self, author_id: &str) -> bool {
        let state = self.tx.borrow();
        state.is_open && state.focused_author_id.as_deref() == Some(author_id)
    }

    /// Watch for open/close changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}
