//! The driving loop: fetch a frame, decode it, feed the navigator, publish
//! the annotated frame, then sleep for the current cadence.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};

use crate::camera::FrameSource;
use crate::events::NavEvent;
use crate::navigator::Navigator;
use crate::overlay::{self, AnnotatedFrame};
use crate::qr::QrDecoder;

/// Sequential control loop over one camera link.
///
/// Cycles are strictly single-flight: a fetch/decode/react pass completes (or
/// fails) before the next is scheduled, so at most one device request for a
/// frame is outstanding and command dispatch order follows detection order.
///
/// Target selections arrive on a channel and are applied between cycles; a
/// selection during an in-flight settle/arrival sequence lets that sequence
/// finish and takes effect for subsequent detections.
pub struct ControlLoop {
    frames: Arc<dyn FrameSource>,
    decoder: QrDecoder,
    navigator: Navigator,
    fast_cadence: Duration,
    slow_cadence: Duration,
    events: broadcast::Sender<NavEvent>,
    select_rx: mpsc::Receiver<String>,
    frames_tx: watch::Sender<Option<AnnotatedFrame>>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl ControlLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        frames: Arc<dyn FrameSource>,
        navigator: Navigator,
        fast_cadence: Duration,
        slow_cadence: Duration,
        events: broadcast::Sender<NavEvent>,
        select_rx: mpsc::Receiver<String>,
        frames_tx: watch::Sender<Option<AnnotatedFrame>>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            frames,
            decoder: QrDecoder::new(),
            navigator,
            fast_cadence,
            slow_cadence,
            events,
            select_rx,
            frames_tx,
            shutdown_rx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("control loop started");
        let mut cadence = self.fast_cadence;
        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    tracing::info!("control loop shutting down");
                    break;
                }
                Some(input) = self.select_rx.recv() => {
                    // errors are reported through events and logs
                    let _ = self.navigator.select(&input).await;
                    continue;
                }
                _ = tokio::time::sleep(cadence) => {}
            }

            cadence = if self.cycle().await {
                self.fast_cadence
            } else {
                self.slow_cadence
            };
        }
    }

    /// One fetch/decode/react pass. Returns false when the camera link
    /// failed and the loop should fall back to the reconnect cadence.
    async fn cycle(&mut self) -> bool {
        let bytes = match self.frames.fetch_frame().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("frame fetch failed: {}", e);
                // the next read after reconnect must be processed even if it
                // equals the last one before the drop
                self.navigator.reset_dedup().await;
                let _ = self.events.send(NavEvent::Reconnecting);
                return false;
            }
        };

        let frame = match self.decoder.read_frame(&bytes) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("discarding malformed frame: {}", e);
                return true;
            }
        };

        let detections = self.decoder.decode(&frame);
        for detection in &detections {
            self.navigator.observe(&detection.text).await;
        }

        let annotated = overlay::annotate(frame.into_rgb8(), &detections);
        let _ = self.frames_tx.send(Some(annotated));
        true
    }
}
