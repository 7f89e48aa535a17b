/*!
 * Single-consumer reconciliation.
 *
 * `Reconciler` is the one path through which source events reach the gate
 * and the unit collection. It must be driven serially, in producer order.
 */

use log::{debug, info};

use super::models::{SessionStats, Snapshot, SourceEvent};
use crate::app_config::Config;
use crate::reconcile::gate::{Gate, GateOutcome};
use crate::reconcile::resync::{RegionCleared, ResetKind};
use crate::subtitle_processor::{EntryAssembler, Placement, SharedUnits};

/// Receives every confirmed fragment as soon as it is produced
pub trait FragmentSink: Send {
    fn emit(&mut self, fragment: &str);
}

impl<F> FragmentSink for F
where
    F: FnMut(&str) + Send,
{
    fn emit(&mut self, fragment: &str) {
        self(fragment)
    }
}

/// Drives the gate and the entry assembler for one capture session
pub struct Reconciler {
    gate: Gate,
    assembler: EntryAssembler,
    units: SharedUnits,
    stats: SessionStats,
    sink: Option<Box<dyn FragmentSink>>,
}

impl Reconciler {
    pub fn new(config: &Config, units: SharedUnits) -> Self {
        Self {
            gate: Gate::new(&config.reconcile),
            assembler: EntryAssembler::new(&config.assembler),
            units,
            stats: SessionStats::new(),
            sink: None,
        }
    }

    /// Forward every emitted fragment to `sink`
    pub fn with_sink(mut self, sink: impl FragmentSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn into_stats(self) -> SessionStats {
        self.stats
    }

    pub fn units(&self) -> SharedUnits {
        self.units.clone()
    }

    /// Handle one event in normal operation
    pub fn handle(&mut self, event: SourceEvent) -> Option<Placement> {
        self.dispatch(event, false)
    }

    /// Handle an event drained at shutdown; desynced snapshots are never dropped
    pub fn handle_forced(&mut self, event: SourceEvent) -> Option<Placement> {
        self.dispatch(event, true)
    }

    /// Finalize the open unit at session end
    pub fn finish(&mut self) -> Option<usize> {
        let closed = self.units.lock().finalize_open();
        if let Some(seq_num) = closed {
            debug!("Finalized unit #{} at session end", seq_num);
        }
        closed
    }

    fn dispatch(&mut self, event: SourceEvent, forced: bool) -> Option<Placement> {
        match event {
            SourceEvent::Snapshot(snapshot) => self.on_snapshot(&snapshot, forced),
            SourceEvent::RegionCleared(cleared) => {
                self.on_region_cleared(cleared);
                None
            }
            SourceEvent::Tick { at } => {
                self.stats.ticks += 1;
                self.units.lock().refresh_end_time(at);
                None
            }
        }
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot, forced: bool) -> Option<Placement> {
        let outcome = if forced {
            self.gate.reconcile_forced(snapshot)
        } else {
            self.gate.reconcile(snapshot)
        };
        self.stats.record(&outcome);

        let placement = self.place(&outcome, snapshot);
        if let Some(trigger) = outcome.resync_due {
            let recent = self.units.lock().recent_texts(self.gate.soft_reset_window());
            info!("Soft resync triggered by {:?}", trigger);
            let kind = self.gate.soft_reset_kind();
            self.gate.resync(kind, &recent);
            self.stats.soft_resyncs += 1;
        }
        placement
    }

    fn place(&mut self, outcome: &GateOutcome, snapshot: &Snapshot) -> Option<Placement> {
        let fragment = outcome.emission.fragment()?;
        let placement = {
            let mut units = self.units.lock();
            self.assembler.push(&mut units, &fragment.text, snapshot.observed_at)
        };
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(&fragment.text);
        }
        Some(placement)
    }

    fn on_region_cleared(&mut self, cleared: RegionCleared) {
        // Never reset history while a unit is still open
        self.units.lock().finalize_open();
        self.gate.resync(ResetKind::Full(cleared), &[]);
        self.stats.full_resets += 1;
    }
}
