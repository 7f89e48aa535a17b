/*!
 * Capture session lifecycle.
 *
 * Producers push source events into a bounded FIFO channel. A single tokio
 * task drains it and drives the `Reconciler`, so events are reconciled
 * strictly in the order they were sent. Full channels apply backpressure
 * instead of dropping events.
 *
 * On shutdown the consumer stops taking new events and reconciles whatever
 * is still buffered. Only the last buffered snapshot gets the forced final
 * pass; earlier ones are reconciled normally. Then the open unit is
 * finalized.
 */

use chrono::{DateTime, Utc};
use log::{debug, info};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::models::{SessionReport, Snapshot, SourceEvent};
use super::reconciler::{FragmentSink, Reconciler};
use crate::app_config::Config;
use crate::errors::SessionError;
use crate::reconcile::resync::RegionCleared;
use crate::subtitle_processor::{SharedUnits, SubtitleCollection};

/// A running capture session
pub struct CaptureSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    tx: mpsc::Sender<SourceEvent>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Reconciler>,
    units: SharedUnits,
}

impl CaptureSession {
    /// Start a session; must be called from within a tokio runtime
    pub fn start(config: &Config) -> Self {
        let units = SubtitleCollection::shared();
        let reconciler = Reconciler::new(config, units.clone());
        Self::spawn(config, reconciler, units)
    }

    /// Start a session that forwards every confirmed fragment to `sink`
    pub fn start_with_sink(config: &Config, sink: impl FragmentSink + 'static) -> Self {
        let units = SubtitleCollection::shared();
        let reconciler = Reconciler::new(config, units.clone()).with_sink(sink);
        Self::spawn(config, reconciler, units)
    }

    fn spawn(config: &Config, reconciler: Reconciler, units: SharedUnits) -> Self {
        let (tx, rx) = mpsc::channel(config.session.channel_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(consume(reconciler, rx, shutdown_rx));

        let id = Uuid::new_v4();
        info!("Capture session {} started", &id.to_string()[..8]);

        Self {
            id,
            started_at: Utc::now(),
            tx,
            shutdown_tx: Some(shutdown_tx),
            handle,
            units,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Shared unit collection, for readers that snapshot it while the session runs
    pub fn units(&self) -> SharedUnits {
        self.units.clone()
    }

    /// Another producer handle onto the same ordered channel
    pub fn sender(&self) -> mpsc::Sender<SourceEvent> {
        self.tx.clone()
    }

    /// Queue an event, waiting while the channel is full
    pub async fn send(&self, event: SourceEvent) -> Result<(), SessionError> {
        self.tx.send(event).await.map_err(|_| SessionError::Closed)
    }

    pub async fn push_snapshot(&self, snapshot: Snapshot) -> Result<(), SessionError> {
        self.send(SourceEvent::Snapshot(snapshot)).await
    }

    /// Signal that the caption region was observed empty
    pub async fn region_cleared(&self, at: DateTime<Utc>) -> Result<(), SessionError> {
        self.send(SourceEvent::RegionCleared(RegionCleared::new(at))).await
    }

    /// Keepalive for the open unit's end time
    pub async fn tick(&self, at: DateTime<Utc>) -> Result<(), SessionError> {
        self.send(SourceEvent::Tick { at }).await
    }

    /// End the session: drain buffered events, close the open unit, and report
    pub async fn finalize_all(self) -> Result<SessionReport, SessionError> {
        let CaptureSession {
            id,
            started_at,
            tx,
            shutdown_tx,
            handle,
            units,
        } = self;

        if let Some(shutdown_tx) = shutdown_tx {
            // The consumer may already be gone; the join below reports that
            let _ = shutdown_tx.send(());
        }
        drop(tx);

        let reconciler = handle
            .await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))?;

        let report = SessionReport {
            session_id: id.to_string(),
            started_at,
            finished_at: Utc::now(),
            stats: reconciler.into_stats(),
            units: units.lock().entries.clone(),
        };
        info!("Capture session finished: {}", report);
        Ok(report)
    }
}

async fn consume(
    mut reconciler: Reconciler,
    mut rx: mpsc::Receiver<SourceEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> Reconciler {
    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown_rx => {
                rx.close();
                drain(&mut reconciler, &mut rx);
                break;
            }
            event = rx.recv() => match event {
                Some(event) => {
                    reconciler.handle(event);
                }
                None => break,
            },
        }
    }

    reconciler.finish();
    reconciler
}

/// Reconcile buffered events in order; only the last buffered snapshot is forced
fn drain(reconciler: &mut Reconciler, rx: &mut mpsc::Receiver<SourceEvent>) {
    let mut buffered = Vec::new();
    while let Ok(event) = rx.try_recv() {
        buffered.push(event);
    }

    let last_snapshot = buffered
        .iter()
        .rposition(|event| matches!(event, SourceEvent::Snapshot(_)));
    let drained = buffered.len();

    for (idx, event) in buffered.into_iter().enumerate() {
        if Some(idx) == last_snapshot {
            reconciler.handle_forced(event);
        } else {
            reconciler.handle(event);
        }
    }
    debug!("Shutdown drain reconciled {} buffered event(s)", drained);
}
