//! Event dispatcher: the single writer of a validation session
//!
//! Detection sources, viewport owners and grace timers all send through one
//! bounded queue. A dedicated task drains it and applies actions one at a time
//! in arrival order, so no two actions interleave. Readers take snapshots from
//! a watch channel and never lock the validator.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use crate::config::Config;
use crate::core::FaceValidator;
use crate::error::DispatchError;
use crate::types::{
    Action, Effect, FaceGeometry, FaceQuality, FaceSmile, Observation, Rect, TimerId,
    ValidationSnapshot,
};

/// Messages sent from handles and timers to the session task.
enum Command {
    Apply {
        action: Action,
        ack: Option<oneshot::Sender<ValidationSnapshot>>,
    },
    Snapshot(oneshot::Sender<ValidationSnapshot>),
    Shutdown,
}

/// Emitted once each time success turns on
#[derive(Debug, Clone, Serialize)]
pub struct ShutterReleased {
    pub at: DateTime<Utc>,
    /// Update count of the action that released the shutter
    pub sequence: u64,
}

/// Clone-safe sender into a validation session.
///
/// Holds no reference back to the validator; when the session is gone every
/// method returns `DispatchError::SessionClosed`.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    tx: mpsc::Sender<Command>,
}

impl DispatcherHandle {
    /// Queue an action without waiting for it to be applied
    pub async fn dispatch(&self, action: Action) -> Result<(), DispatchError> {
        self.tx
            .send(Command::Apply { action, ack: None })
            .await
            .map_err(|_| DispatchError::SessionClosed)
    }

    /// Queue from a plain OS thread (e.g. an inference worker).
    ///
    /// Panics if called from inside an async context, like
    /// `mpsc::Sender::blocking_send`.
    pub fn blocking_dispatch(&self, action: Action) -> Result<(), DispatchError> {
        self.tx
            .blocking_send(Command::Apply { action, ack: None })
            .map_err(|_| DispatchError::SessionClosed)
    }

    /// Queue an action and wait for the snapshot taken right after it
    pub async fn apply(&self, action: Action) -> Result<ValidationSnapshot, DispatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Apply {
                action,
                ack: Some(reply_tx),
            })
            .await
            .map_err(|_| DispatchError::SessionClosed)?;
        reply_rx.await.map_err(|_| DispatchError::SessionClosed)
    }

    /// Snapshot after every action queued before this call has been applied
    pub async fn snapshot(&self) -> Result<ValidationSnapshot, DispatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Snapshot(reply_tx))
            .await
            .map_err(|_| DispatchError::SessionClosed)?;
        reply_rx.await.map_err(|_| DispatchError::SessionClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub async fn on_no_face(&self) -> Result<(), DispatchError> {
        self.dispatch(Action::NoFaceDetected).await
    }

    pub async fn on_geometry(
        &self,
        bounding_box: Rect,
        roll: f64,
        pitch: f64,
        yaw: f64,
    ) -> Result<(), DispatchError> {
        self.dispatch(Action::GeometryObserved(Observation::Found(FaceGeometry {
            bounding_box,
            roll,
            pitch,
            yaw,
        })))
        .await
    }

    pub async fn on_geometry_error(&self, reason: impl Into<String>) -> Result<(), DispatchError> {
        self.dispatch(Action::GeometryObserved(Observation::Errored(reason.into())))
            .await
    }

    pub async fn on_quality(&self, score: f32) -> Result<(), DispatchError> {
        self.dispatch(Action::QualityObserved(Observation::Found(FaceQuality {
            quality: score,
        })))
        .await
    }

    pub async fn on_quality_error(&self, reason: impl Into<String>) -> Result<(), DispatchError> {
        self.dispatch(Action::QualityObserved(Observation::Errored(reason.into())))
            .await
    }

    pub async fn on_smile(&self, detected: bool) -> Result<(), DispatchError> {
        self.dispatch(Action::SmileObserved(Observation::Found(FaceSmile {
            smile_detected: detected,
        })))
        .await
    }

    pub async fn on_smile_error(&self, reason: impl Into<String>) -> Result<(), DispatchError> {
        self.dispatch(Action::SmileObserved(Observation::Errored(reason.into())))
            .await
    }

    pub async fn on_viewport_resized(&self, rect: Rect) -> Result<(), DispatchError> {
        self.dispatch(Action::ViewportResized(rect)).await
    }

    pub async fn on_debug_toggle_requested(&self) -> Result<(), DispatchError> {
        self.dispatch(Action::ToggleDebug).await
    }
}

/// One running validation session
///
/// Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct ValidationSession {
    handle: DispatcherHandle,
    snapshots: watch::Receiver<ValidationSnapshot>,
    shutter: broadcast::Sender<ShutterReleased>,
    task: JoinHandle<()>,
}

impl ValidationSession {
    /// Spawn the session task around an existing validator
    pub fn spawn(validator: FaceValidator, channel_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(channel_capacity.max(1));
        let (snapshot_tx, snapshots) = watch::channel(validator.snapshot());
        let (shutter, _) = broadcast::channel(16);

        let worker = SessionWorker {
            validator,
            rx,
            timer_tx: tx.downgrade(),
            snapshot_tx,
            shutter_tx: shutter.clone(),
            timer: None,
        };
        let task = tokio::spawn(worker.run());

        Self {
            handle: DispatcherHandle { tx },
            snapshots,
            shutter,
            task,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let validator = FaceValidator::from_config(config.thresholds, &config.session);
        Self::spawn(validator, config.session.channel_capacity)
    }

    pub fn handle(&self) -> DispatcherHandle {
        self.handle.clone()
    }

    /// Latest published snapshot; may trail actions still queued
    pub fn current(&self) -> ValidationSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified whenever the state changes
    pub fn subscribe(&self) -> watch::Receiver<ValidationSnapshot> {
        self.snapshots.clone()
    }

    pub fn subscribe_shutter(&self) -> broadcast::Receiver<ShutterReleased> {
        self.shutter.subscribe()
    }

    /// Stop after already-queued actions, cancelling any pending timer
    pub async fn shutdown(self) {
        // Err means the task is already gone
        let _ = self.handle.tx.send(Command::Shutdown).await;
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "validation session task failed");
        }
    }
}

struct SessionWorker {
    validator: FaceValidator,
    rx: mpsc::Receiver<Command>,
    /// Weak so pending timers do not keep a dropped session alive
    timer_tx: mpsc::WeakSender<Command>,
    snapshot_tx: watch::Sender<ValidationSnapshot>,
    shutter_tx: broadcast::Sender<ShutterReleased>,
    timer: Option<(TimerId, JoinHandle<()>)>,
}

impl SessionWorker {
    async fn run(mut self) {
        tracing::debug!("validation session started");
        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Apply { action, ack } => {
                    self.handle_action(action);
                    if let Some(ack) = ack {
                        let _ = ack.send(self.validator.snapshot());
                    }
                }
                Command::Snapshot(reply) => {
                    let _ = reply.send(self.validator.snapshot());
                }
                Command::Shutdown => break,
            }
        }
        self.cancel_timer();
        tracing::info!(
            updates = self.validator.update_count(),
            "validation session closed"
        );
    }

    fn handle_action(&mut self, action: Action) {
        tracing::trace!(kind = action.kind(), "applying action");
        if let Action::GracePeriodElapsed(id) = action {
            if self.timer.as_ref().is_some_and(|(t, _)| *t == id) {
                self.timer = None;
            }
        }

        let before = self.validator.state().clone();
        for effect in self.validator.apply(action) {
            self.run_effect(effect);
        }
        if *self.validator.state() != before {
            self.snapshot_tx.send_replace(self.validator.snapshot());
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::StartGraceTimer { id, after } => {
                self.cancel_timer();
                let tx = self.timer_tx.clone();
                let task = tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    if let Some(tx) = tx.upgrade() {
                        let _ = tx
                            .send(Command::Apply {
                                action: Action::GracePeriodElapsed(id),
                                ack: None,
                            })
                            .await;
                    }
                });
                tracing::debug!(timer = id.0, after_ms = after.as_millis() as u64, "grace timer started");
                self.timer = Some((id, task));
            }
            Effect::CancelGraceTimer { id } => {
                if self.timer.as_ref().is_some_and(|(t, _)| *t == id) {
                    self.cancel_timer();
                }
            }
            Effect::ShutterReleased => {
                tracing::info!("shutter released");
                // No subscribers is fine
                let _ = self.shutter_tx.send(ShutterReleased {
                    at: Utc::now(),
                    sequence: self.validator.update_count(),
                });
            }
        }
    }

    fn cancel_timer(&mut self) {
        if let Some((id, task)) = self.timer.take() {
            task.abort();
            tracing::debug!(timer = id.0, "grace timer cancelled");
        }
    }
}
