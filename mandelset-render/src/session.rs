use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use tracing::debug;

use crate::cancel::RenderCancel;
use crate::error::RenderError;
use crate::events::Purpose;

/// Lifecycle of the render owned by one [`RenderSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has been started yet.
    Idle,
    Running,
    Completed,
    /// Superseded by a newer trigger or stopped at shutdown.
    Cancelled,
    /// The render degraded or its output could not be written.
    Failed,
}

/// Owns the single in-flight render of one purpose.
///
/// Starting a new render cancels the current one, blocks until its thread
/// has exited, and only then spawns the replacement with a fresh token. Two
/// renders of the same purpose therefore never overlap.
pub struct RenderSession {
    purpose: Purpose,
    cancel: RenderCancel,
    state: Arc<Mutex<SessionState>>,
    handle: Option<JoinHandle<()>>,
}

impl RenderSession {
    pub fn new(purpose: Purpose) -> Self {
        Self {
            purpose,
            cancel: RenderCancel::new(),
            state: Arc::new(Mutex::new(SessionState::Idle)),
            handle: None,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Cancel the running render, if any, and wait for it to stop.
    pub fn cancel(&mut self) -> SessionState {
        if self.handle.is_some() {
            self.cancel.cancel();
            debug!(purpose = %self.purpose, "Cancelling in-flight render");
        }
        self.wait()
    }

    /// Block until the current render finishes on its own.
    pub fn wait(&mut self) -> SessionState {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                self.set_state(SessionState::Failed);
            }
        }
        self.state()
    }

    /// Supersede whatever is running and start `job` on a new thread.
    ///
    /// `job` receives the session's fresh cancellation token and returns
    /// the terminal state it reached.
    pub fn start<F>(&mut self, job: F) -> crate::Result<()>
    where
        F: FnOnce(&RenderCancel) -> SessionState + Send + 'static,
    {
        self.cancel();

        let cancel = RenderCancel::new();
        self.cancel = cancel.clone();
        self.set_state(SessionState::Running);

        let state = Arc::clone(&self.state);
        let spawned = std::thread::Builder::new()
            .name(format!("render-{}", self.purpose))
            .spawn(move || {
                let outcome = job(&cancel);
                *state.lock().unwrap_or_else(PoisonError::into_inner) = outcome;
            });

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.set_state(SessionState::Failed);
                Err(RenderError::Spawn(e))
            }
        }
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        self.cancel();
    }
}
