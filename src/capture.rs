use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio_util::sync::CancellationToken;
use tutor_realtime_types::{FrameDataUri, RawFrame};
use tutor_realtime_utils::frame::RasterTarget;

use crate::connection::SocketConnection;

/// A live video input. `grab` yields the most recent frame, or `None`
/// while the device is still acquiring (or permission was denied).
/// `release` stops the device's tracks and must be idempotent.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VideoSource: Send {
    async fn grab(&mut self) -> Option<RawFrame>;
    fn release(&mut self);
}

/// One encoded frame with its capture timestamp. Ephemeral: built, sent
/// once, discarded.
#[derive(Debug, Clone)]
pub struct Frame {
    data: FrameDataUri,
    captured_at: Instant,
}

impl Frame {
    pub fn new(data: FrameDataUri) -> Self {
        Self {
            data,
            captured_at: Instant::now(),
        }
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    pub fn into_data(self) -> FrameDataUri {
        self.data
    }
}

/// Handle to the running capture loop. Cancelling is idempotent and safe
/// before the device has produced a single frame.
pub struct CaptureHandle {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl CaptureHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the loop to exit and the device to be released.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            tracing::debug!("capture task ended abnormally: {}", e);
        }
    }
}

/// Start the capture loop: one step per tick, then a fixed delay. The delay
/// starts after the step completes, so a slow step pushes the next one back
/// rather than skipping or stacking ticks. Frames captured while the socket
/// is down are dropped, never buffered.
pub fn spawn(
    mut source: Box<dyn VideoSource>,
    connection: Arc<tokio::sync::Mutex<SocketConnection>>,
    width: u32,
    height: u32,
    interval: Duration,
) -> CaptureHandle {
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        let mut raster = RasterTarget::new(width, height);
        loop {
            if task_cancel.is_cancelled() {
                break;
            }
            step(source.as_mut(), &connection, &mut raster).await;
            tokio::select! {
                _ = task_cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
        source.release();
    });
    CaptureHandle { cancel, handle }
}

async fn step(
    source: &mut dyn VideoSource,
    connection: &Arc<tokio::sync::Mutex<SocketConnection>>,
    raster: &mut RasterTarget,
) {
    let open = connection.lock().await.is_open();
    if !open {
        tracing::trace!("socket not open, dropping this tick's frame");
        return;
    }
    let Some(raw) = source.grab().await else {
        tracing::trace!("video source not ready yet");
        return;
    };
    if let Err(e) = raster.draw(&raw) {
        tracing::warn!("failed to draw frame into raster target: {}", e);
        return;
    }
    let frame = match raster.encode() {
        Ok(data) => Frame::new(data),
        Err(e) => {
            tracing::warn!("failed to encode frame: {}", e);
            return;
        }
    };
    connection.lock().await.send(frame.into_data());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closed_socket_means_no_grabs_and_release_on_cancel() {
        let mut source = MockVideoSource::new();
        // No grab expectation: a single grab call would fail the test.
        source.expect_release().times(1).return_const(());

        let connection = Arc::new(tokio::sync::Mutex::new(SocketConnection::new(16)));
        let capture = spawn(
            Box::new(source),
            connection,
            300,
            200,
            Duration::from_millis(10),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        capture.cancel();
        capture.join().await;
    }

    #[tokio::test]
    async fn cancel_before_first_tick_still_releases_device() {
        let mut source = MockVideoSource::new();
        source.expect_release().times(1).return_const(());

        let connection = Arc::new(tokio::sync::Mutex::new(SocketConnection::new(16)));
        let capture = spawn(
            Box::new(source),
            connection,
            300,
            200,
            Duration::from_secs(3600),
        );
        capture.cancel();
        assert!(capture.is_cancelled());
        capture.cancel();
        capture.join().await;
    }
}
