// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! Glue between the calibration state machine and the hardware.
//!
//! The runner owns every resource the loop touches: the scan-chain mirror
//! and its shift port, the tuning store, the reference counters, the LO
//! tuning registers and the edge source. All of it is driven from the
//! reference-edge interrupt handler; the main context only arms the runner
//! and then waits on [`calibration_finished`]. That flag is the single
//! cross-context synchronization point: the handler stores it, the main
//! context loads it, and nothing else is shared while the runner is armed.

use core::sync::atomic::{AtomicBool, Ordering};

use log::info;

use crate::calibration::{CalibrationResult, CalibrationSession, StepOutcome};
use crate::reference_edge::EdgeSource;
use crate::scan_chain::{AscChain, OutOfRange};
use crate::tuning::{self, TuningStore};
use scum_hal::counters::{CounterSnapshot, ReferenceCounters};
use scum_hal::lo::LoTuningPort;
use scum_hal::scan_port::ScanChainPort;

static CALIBRATION_DONE: AtomicBool = AtomicBool::new(false);

/// Whether the armed calibration run has finished.
///
/// Written only by the reference-edge handler, read by the blocking caller.
pub fn calibration_finished() -> bool {
    CALIBRATION_DONE.load(Ordering::Acquire)
}

/// Block until the reference-edge handler reports completion.
///
/// Sleeps between edges; any interrupt wakes the loop to re-check the flag.
pub fn wait_calibration_done() {
    while !calibration_finished() {
        cortex_m::asm::wfi();
    }
}

/// Owns the calibration loop's hardware and state for one run.
pub struct CalibrationRunner<E> {
    session: CalibrationSession,
    store: TuningStore,
    chain: AscChain,
    edge: E,
    counters: ReferenceCounters,
    scan: ScanChainPort,
    lo: LoTuningPort,
    result: Option<CalibrationResult>,
}

impl<E: EdgeSource> CalibrationRunner<E> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: CalibrationSession,
        store: TuningStore,
        chain: AscChain,
        edge: E,
        counters: ReferenceCounters,
        scan: ScanChainPort,
        lo: LoTuningPort,
    ) -> CalibrationRunner<E> {
        CalibrationRunner {
            session,
            store,
            chain,
            edge,
            counters,
            scan,
            lo,
            result: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.session.is_done()
    }

    /// Start a run: reset the gate window and enable the edge source.
    ///
    /// Must be called from the main context before unmasking interrupts
    /// hands the runner to the edge handler.
    pub fn arm(&mut self) {
        CALIBRATION_DONE.store(false, Ordering::Release);
        self.result = None;
        self.session.arm();
        self.counters.reset_and_enable_all();
        self.edge.arm();
    }

    /// Drive one reference edge. Called from the edge interrupt handler.
    ///
    /// Re-arms the edge source first so the next window's gate is already
    /// running while corrections are computed, then snapshots the counters,
    /// steps the state machine and commits any changed codes to hardware.
    pub fn handle_reference_edge(&mut self) -> Result<(), OutOfRange> {
        self.edge.rearm();

        let counts = self.counters.snapshot();
        let outcome = self.session.on_tick(&mut self.store, &mut self.chain, counts)?;

        if outcome != StepOutcome::WarmUp {
            self.commit();
        }

        self.log_iteration(&counts);

        if outcome == StepOutcome::Finished {
            self.finish();
        }
        Ok(())
    }

    /// Push the current codes into silicon: LC sub-codes into the LO
    /// registers, everything else through the scan chain.
    fn commit(&mut self) {
        let sub = self.session.config().lc_map.expand(self.store.lc_code);
        let (fcode, fcode2) = tuning::lc_fcode_words(sub);
        self.lo.set_frequency_words(fcode, fcode2);

        self.chain.commit(&mut self.scan);
    }

    fn log_iteration(&self, counts: &CounterSnapshot) {
        info!(
            "HF={}-{} 2M={}-{},{},{} LC={}-{} IF={}-{}",
            counts.count_hf,
            self.store.hf.fine,
            counts.count_2m,
            self.store.rc2m.coarse,
            self.store.rc2m.fine,
            self.store.rc2m.superfine,
            counts.count_lc,
            self.store.lc_code,
            counts.count_if,
            self.store.if_clk.fine,
        );
    }

    fn finish(&mut self) {
        self.edge.disarm();
        self.counters.halt();
        self.result = self.session.result(&self.store);
        CALIBRATION_DONE.store(true, Ordering::Release);
    }

    /// The finished run's result. `None` while the run is in flight.
    pub fn take_result(&mut self) -> Option<CalibrationResult> {
        self.result.take()
    }

    pub fn store(&self) -> &TuningStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_edge::{OpticalEdge, TimerEdge};

    fn assert_send<T: Send>() {}

    // The binaries park the runner in a `critical_section::Mutex` shared
    // with the interrupt handlers, which requires the whole type to be
    // `Send`.
    #[test]
    fn runner_moves_into_interrupt_context() {
        assert_send::<CalibrationRunner<OpticalEdge>>();
        assert_send::<CalibrationRunner<TimerEdge>>();
    }
}
