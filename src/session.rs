use std::sync::Arc;

use anyhow::Result;
use tutor_realtime_types::voice::VoiceEvent;
use tutor_realtime_types::{ConversationTurn, TurnSide};

use crate::capture::{self, CaptureHandle, VideoSource};
use crate::config::Config;
use crate::connection::{ConnectionState, SocketConnection};
use crate::generation::{GenerationController, GenerationJob};
use crate::perception::{summarize, EmotionSummary};
use crate::timeline::Timeline;
use crate::voice::{VoiceAdapter, VoiceBackend, VoiceReadyState};

/// The one view model presentation reads from: socket + capture loop +
/// emotion summary + generation job + voice session + conversation
/// timeline, wired together and torn down as a unit.
pub struct Session {
    config: Config,
    connection: Arc<tokio::sync::Mutex<SocketConnection>>,
    capture: Option<CaptureHandle>,
    emotions_rx: tokio::sync::watch::Receiver<EmotionSummary>,
    perception_handle: Option<tokio::task::JoinHandle<()>>,
    generation: GenerationController,
    voice: VoiceAdapter,
    timeline: Timeline,
}

impl Session {
    /// Start a session against the HTTP generation backend named in the
    /// config.
    pub async fn start(
        config: Config,
        source: Box<dyn VideoSource>,
        voice_backend: Arc<dyn VoiceBackend>,
        voice_events: tokio::sync::mpsc::Receiver<VoiceEvent>,
    ) -> Self {
        let generation =
            GenerationController::http(config.http_base_url(), config.use_stub_backend());
        Self::start_with_generation(config, source, voice_backend, voice_events, generation)
            .await
    }

    pub async fn start_with_generation(
        config: Config,
        source: Box<dyn VideoSource>,
        voice_backend: Arc<dyn VoiceBackend>,
        voice_events: tokio::sync::mpsc::Receiver<VoiceEvent>,
        generation: GenerationController,
    ) -> Self {
        let mut connection = SocketConnection::new(config.capacity());
        // A down backend at startup is not fatal: the capture loop finds
        // the socket closed and drops frames until a reopen succeeds.
        if let Err(e) = connection.open(config.socket_url()).await {
            tracing::error!("inference socket unavailable at startup: {}", e);
        }

        let mut inference_rx = connection.messages();
        let (emotions_tx, emotions_rx) =
            tokio::sync::watch::channel(EmotionSummary::default());
        let perception_handle = tokio::spawn(async move {
            loop {
                match inference_rx.recv().await {
                    Ok(message) => {
                        // Each message fully replaces the summary; there is
                        // no smoothing across messages.
                        emotions_tx.send_replace(summarize(&message));
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!("skipped {} stale inference messages", skipped);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let connection = Arc::new(tokio::sync::Mutex::new(connection));
        let capture = capture::spawn(
            source,
            connection.clone(),
            config.frame_width(),
            config.frame_height(),
            config.capture_interval(),
        );

        let timeline = Timeline::new();
        let voice = VoiceAdapter::new(voice_backend, voice_events, timeline.clone());

        Self {
            config,
            connection,
            capture: Some(capture),
            emotions_rx,
            perception_handle: Some(perception_handle),
            generation,
            voice,
            timeline,
        }
    }

    /// Append a user-typed chat turn. Whitespace-only input is a no-op.
    pub fn send_chat(&self, text: &str) -> Option<ConversationTurn> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(self.timeline.append("You", text, TurnSide::User))
    }

    pub async fn toggle_voice(&self) {
        self.voice.toggle().await;
    }

    pub fn voice_state(&self) -> VoiceReadyState {
        self.voice.ready_state()
    }

    /// Submit a generation job for `text`, using the current emotion
    /// summary as context.
    pub async fn submit_generation(&self, text: &str) {
        let emotions = self.emotions_rx.borrow().display();
        self.generation.submit(text, &emotions).await;
    }

    pub fn start_playback(&self) {
        self.generation.start_playback();
    }

    pub fn generation_job(&self) -> GenerationJob {
        self.generation.snapshot()
    }

    pub fn is_generating(&self) -> bool {
        self.generation.is_loading()
    }

    pub fn emotion_summary(&self) -> EmotionSummary {
        self.emotions_rx.borrow().clone()
    }

    /// Watch receiver for the live emotion summary.
    pub fn emotions(&self) -> tokio::sync::watch::Receiver<EmotionSummary> {
        self.emotions_rx.clone()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.connection.lock().await.state()
    }

    /// Manual reconnect after a transport failure. The running capture loop
    /// picks the new connection up on its next tick; it is never restarted.
    pub async fn reopen_socket(&self) -> Result<()> {
        let mut connection = self.connection.lock().await;
        connection.close();
        connection.open(self.config.socket_url()).await
    }

    /// Idempotent teardown: stops the capture loop (releasing the camera),
    /// disconnects voice if it is open, and closes the socket. Safe to call
    /// at any point, including before the camera ever produced a frame.
    pub async fn shutdown(&mut self) {
        if let Some(capture) = self.capture.take() {
            capture.cancel();
            capture.join().await;
        }
        if self.voice.is_open() {
            self.voice.toggle().await;
        }
        self.voice.shutdown();
        if let Some(handle) = self.perception_handle.take() {
            handle.abort();
        }
        self.connection.lock().await.close();
    }
}
