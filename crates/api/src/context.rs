use std::sync::Arc;

use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use fedgate_auth::SessionState;
use fedgate_core::SessionId;

/// Session context for a request.
///
/// Installed by the session middleware for every request. Handlers and
/// guards borrow the [`SessionState`] through it; the middleware persists
/// whatever is left in it once the response has been produced.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionSlot>>,
}

#[derive(Debug)]
struct SessionSlot {
    id: SessionId,
    state: SessionState,
    /// Not yet known to the client (needs a `Set-Cookie`).
    is_new: bool,
    destroyed: bool,
    /// Id given up by `rotate`, to be dropped from the store.
    retired: Option<SessionId>,
}

/// What the middleware needs to persist a finished request's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub id: SessionId,
    pub state: SessionState,
    pub is_new: bool,
    pub destroyed: bool,
    pub retired: Option<SessionId>,
}

impl SessionHandle {
    pub fn existing(id: SessionId, state: SessionState) -> Self {
        Self::from_slot(SessionSlot {
            id,
            state,
            is_new: false,
            destroyed: false,
            retired: None,
        })
    }

    pub fn fresh() -> Self {
        Self::from_slot(SessionSlot {
            id: SessionId::new(),
            state: SessionState::default(),
            is_new: true,
            destroyed: false,
            retired: None,
        })
    }

    fn from_slot(slot: SessionSlot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(slot)),
        }
    }

    /// Borrow the session state mutably.
    pub async fn state(&self) -> MappedMutexGuard<'_, SessionState> {
        MutexGuard::map(self.inner.lock().await, |slot| &mut slot.state)
    }

    /// Move the session to a fresh id (used on login against session fixation).
    pub async fn rotate(&self) {
        let mut slot = self.inner.lock().await;
        if !slot.is_new {
            slot.retired = Some(slot.id);
        }
        slot.id = SessionId::new();
        slot.is_new = true;
    }

    /// Drop the session identity and all session state.
    pub async fn destroy(&self) {
        let mut slot = self.inner.lock().await;
        slot.state = SessionState::default();
        slot.destroyed = true;
    }

    pub async fn outcome(&self) -> SessionOutcome {
        let slot = self.inner.lock().await;
        SessionOutcome {
            id: slot.id,
            state: slot.state.clone(),
            is_new: slot.is_new,
            destroyed: slot.destroyed,
            retired: slot.retired,
        }
    }
}
