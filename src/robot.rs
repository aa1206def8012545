//! Top-level orchestrator wiring the transports, the navigator and the
//! control-loop worker together.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch, RwLock};
use tokio::task::JoinHandle;

use crate::camera::{FrameSource, HttpFrameSource};
use crate::commands::{CommandDispatcher, HttpDispatcher};
use crate::config::Config;
use crate::control_loop::ControlLoop;
use crate::events::NavEvent;
use crate::navigator::{NavStatus, Navigator};
use crate::overlay::AnnotatedFrame;

const EVENT_CHANNEL_CAPACITY: usize = 64;
const SELECT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Error)]
pub enum RobotError {
    #[error("failed to build device client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("control loop is not running")]
    WorkerStopped,
}

/// The robot host: owns the worker task and exposes channel-based access to
/// the navigation core.
pub struct Robot {
    status: Arc<RwLock<NavStatus>>,
    events_tx: broadcast::Sender<NavEvent>,
    frames_rx: watch::Receiver<Option<AnnotatedFrame>>,
    select_tx: mpsc::Sender<String>,
    shutdown_tx: broadcast::Sender<()>,
    control_loop: Option<ControlLoop>,
    worker: Option<JoinHandle<()>>,
}

impl Robot {
    /// Builds a robot talking to the real device endpoints from the config.
    pub fn new(config: &Config) -> Result<Self, RobotError> {
        let frames: Arc<dyn FrameSource> = Arc::new(HttpFrameSource::new(
            &config.device.base_url,
            config.frame_timeout(),
        )?);
        let dispatcher: Arc<dyn CommandDispatcher> =
            Arc::new(HttpDispatcher::new(&config.device.base_url));
        Ok(Self::with_transports(config, frames, dispatcher))
    }

    /// Builds a robot over caller-supplied transports. Tests inject mocks
    /// through this.
    pub fn with_transports(
        config: &Config,
        frames: Arc<dyn FrameSource>,
        dispatcher: Arc<dyn CommandDispatcher>,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (select_tx, select_rx) = mpsc::channel(SELECT_CHANNEL_CAPACITY);
        let (frames_tx, frames_rx) = watch::channel(None);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let navigator = Navigator::new(dispatcher, config.settle(), events_tx.clone());
        let status = navigator.status_handle();

        let control_loop = ControlLoop::new(
            frames,
            navigator,
            config.fast_cadence(),
            config.slow_cadence(),
            events_tx.clone(),
            select_rx,
            frames_tx,
            shutdown_rx,
        );

        Self {
            status,
            events_tx,
            frames_rx,
            select_tx,
            shutdown_tx,
            control_loop: Some(control_loop),
            worker: None,
        }
    }

    /// Spawns the control-loop worker. Idempotent after the first call.
    pub fn start(&mut self) {
        if let Some(control_loop) = self.control_loop.take() {
            self.worker = Some(tokio::spawn(control_loop.run()));
        }
    }

    /// Requests a stop and waits for the worker to wind down.
    pub async fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
    }

    /// Queues a target selection (`"<row>-<level>"`) for the worker.
    pub async fn select(&self, location: impl Into<String>) -> Result<(), RobotError> {
        self.select_tx
            .send(location.into())
            .await
            .map_err(|_| RobotError::WorkerStopped)
    }

    /// Current navigation snapshot.
    pub async fn status(&self) -> NavStatus {
        self.status.read().await.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<NavEvent> {
        self.events_tx.subscribe()
    }

    pub fn subscribe_frames(&self) -> watch::Receiver<Option<AnnotatedFrame>> {
        self.frames_rx.clone()
    }
}
