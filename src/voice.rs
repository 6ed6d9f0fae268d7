use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tutor_realtime_types::voice::{DialogueRole, VoiceEvent};
use tutor_realtime_types::TurnSide;

use crate::timeline::Timeline;

/// Mirror of the external SDK's ready state. The UI affordance reflects
/// Open vs. not-Open only; there is no distinct error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum VoiceReadyState {
    Closed,
    Connecting,
    Open,
}

/// Capability boundary around the external voice-dialogue SDK: an opaque
/// connect/disconnect pair. Dialogue events arrive separately on the
/// channel handed to the adapter.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VoiceBackend: Send + Sync {
    async fn connect(&self) -> Result<()>;
    async fn disconnect(&self) -> Result<()>;
}

/// Wraps the SDK's state machine and forwards its dialogue turns into the
/// conversation timeline in arrival order. Only `user_message` and
/// `assistant_message` events are forwarded, and only while Open.
pub struct VoiceAdapter {
    backend: Arc<dyn VoiceBackend>,
    state: Arc<Mutex<VoiceReadyState>>,
    forward_handle: Option<tokio::task::JoinHandle<()>>,
}

impl VoiceAdapter {
    pub fn new(
        backend: Arc<dyn VoiceBackend>,
        events: tokio::sync::mpsc::Receiver<VoiceEvent>,
        timeline: Timeline,
    ) -> Self {
        let state = Arc::new(Mutex::new(VoiceReadyState::Closed));
        let forward_handle = tokio::spawn(forward(events, timeline, state.clone()));
        Self {
            backend,
            state,
            forward_handle: Some(forward_handle),
        }
    }

    pub fn ready_state(&self) -> VoiceReadyState {
        self.state
            .lock()
            .map(|guard| *guard)
            .unwrap_or(VoiceReadyState::Closed)
    }

    pub fn is_open(&self) -> bool {
        self.ready_state() == VoiceReadyState::Open
    }

    fn set_state(&self, next: VoiceReadyState) {
        if let Ok(mut guard) = self.state.lock() {
            *guard = next;
        }
    }

    /// The single UI operation: disconnect when Open, connect otherwise.
    /// A rejected connect is logged and the state settles back to Closed.
    pub async fn toggle(&self) {
        if self.is_open() {
            if let Err(e) = self.backend.disconnect().await {
                tracing::error!("voice disconnect failed: {}", e);
            }
            self.set_state(VoiceReadyState::Closed);
        } else {
            self.set_state(VoiceReadyState::Connecting);
            match self.backend.connect().await {
                Ok(()) => self.set_state(VoiceReadyState::Open),
                Err(e) => {
                    tracing::error!("voice connect failed: {}", e);
                    self.set_state(VoiceReadyState::Closed);
                }
            }
        }
    }

    /// Stop forwarding dialogue events. Idempotent; does not touch the
    /// SDK connection itself.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.forward_handle.take() {
            handle.abort();
        }
    }
}

async fn forward(
    mut events: tokio::sync::mpsc::Receiver<VoiceEvent>,
    timeline: Timeline,
    state: Arc<Mutex<VoiceReadyState>>,
) {
    while let Some(event) = events.recv().await {
        let open = state
            .lock()
            .map(|guard| *guard == VoiceReadyState::Open)
            .unwrap_or(false);
        match event {
            VoiceEvent::UserMessage(e) if open => {
                let author = role_author(&e.message().role());
                timeline.append(author, e.message().content(), TurnSide::User);
            }
            VoiceEvent::AssistantMessage(e) if open => {
                let author = role_author(&e.message().role());
                timeline.append(author, e.message().content(), TurnSide::Assistant);
            }
            VoiceEvent::Error(e) => {
                tracing::warn!("voice session error: {}", e.message());
            }
            other => {
                tracing::debug!("ignoring voice event: {:?}", other);
            }
        }
    }
}

/// Author label for a dialogue role, as rendered in the timeline.
pub fn role_author(role: &DialogueRole) -> &'static str {
    match role {
        DialogueRole::User => "user",
        DialogueRole::Assistant => "assistant",
    }
}
