// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;
use test_strategy::proptest;

use scum_hal::counters::CounterSnapshot;
use scum_sys::calibration::*;
use scum_sys::scan_chain::AscChain;
use scum_sys::tuning::{HfClockCodes, TuningStore};

fn snapshot(hf: u32, lc: u32, rc2m: u32, if_clk: u32) -> CounterSnapshot {
    CounterSnapshot {
        count_32k: 3_276,
        count_hf: hf,
        count_2m: rc2m,
        count_lc: lc,
        count_if: if_clk,
    }
}

/// A snapshot with every domain already inside its band.
fn in_band(store: &TuningStore) -> CounterSnapshot {
    snapshot(2_000_000, store.lc_target, 200_000, store.if_clk_target)
}

#[test]
fn warmup_ticks_leave_codes_untouched() {
    let mut session = CalibrationSession::new(CalibrationConfig::default());
    let mut store = TuningStore::default();
    let mut chain = AscChain::new();
    let initial = store;

    session.arm();
    for _ in 0..WARMUP_TICKS {
        // Counts far out of band; a correction tick would move codes.
        let outcome = session
            .on_tick(&mut store, &mut chain, snapshot(0, 0, 0, 0))
            .unwrap();
        assert_eq!(outcome, StepOutcome::WarmUp);
    }
    assert_eq!(store, initial);
    assert_eq!(session.state(), CalState::Armed);
}

#[test]
fn fixed_budget_finishes_after_twelve_total_ticks() {
    let mut session = CalibrationSession::new(CalibrationConfig::default());
    let mut store = TuningStore::default();
    let mut chain = AscChain::new();

    session.arm();
    let counts = snapshot(0, 0, 0, 0);
    for tick in 1..(WARMUP_TICKS + CORRECTION_BUDGET) {
        let outcome = session.on_tick(&mut store, &mut chain, counts).unwrap();
        assert_ne!(outcome, StepOutcome::Finished, "finished early at {tick}");
    }
    let outcome = session.on_tick(&mut store, &mut chain, counts).unwrap();
    assert_eq!(outcome, StepOutcome::Finished);
    assert!(session.is_done());
    assert_eq!(session.ticks(), WARMUP_TICKS + CORRECTION_BUDGET);

    // Out of band the whole run; the result must say so.
    let result = session.result(&store).unwrap();
    assert!(!result.converged.hf);
    assert!(!result.converged.all());
    assert_eq!(result.final_counts, counts);
}

#[test]
fn fixed_budget_runs_to_completion_even_when_converged() {
    let mut session = CalibrationSession::new(CalibrationConfig::default());
    let mut store = TuningStore::default();
    let mut chain = AscChain::new();

    session.arm();
    let counts = in_band(&store);
    let mut finished = 0;
    for _ in 0..(WARMUP_TICKS + CORRECTION_BUDGET) {
        if session.on_tick(&mut store, &mut chain, counts).unwrap() == StepOutcome::Finished {
            finished += 1;
        }
    }
    assert_eq!(finished, 1);
    assert!(session.result(&store).unwrap().converged.all());
}

#[test]
fn convergence_gating_stops_at_first_in_band_tick() {
    let config = CalibrationConfig {
        termination: TerminationMode::ConvergenceGated { max_ticks: 50 },
        ..CalibrationConfig::default()
    };
    let mut session = CalibrationSession::new(config);
    let mut store = TuningStore::default();
    let mut chain = AscChain::new();

    session.arm();
    let counts = in_band(&store);
    for _ in 0..WARMUP_TICKS {
        session.on_tick(&mut store, &mut chain, counts).unwrap();
    }
    let outcome = session.on_tick(&mut store, &mut chain, counts).unwrap();
    assert_eq!(outcome, StepOutcome::Finished);
    assert!(session.result(&store).unwrap().converged.all());
}

#[test]
fn convergence_gating_gives_up_at_max_ticks() {
    let config = CalibrationConfig {
        termination: TerminationMode::ConvergenceGated { max_ticks: 7 },
        ..CalibrationConfig::default()
    };
    let mut session = CalibrationSession::new(config);
    let mut store = TuningStore::default();
    let mut chain = AscChain::new();

    session.arm();
    let counts = snapshot(0, 0, 0, 0);
    let mut ticks = 0;
    while !session.is_done() {
        session.on_tick(&mut store, &mut chain, counts).unwrap();
        ticks += 1;
        assert!(ticks < 100);
    }
    assert_eq!(ticks, WARMUP_TICKS + 7);
    assert!(!session.result(&store).unwrap().converged.all());
}

#[test]
fn rearming_resets_the_run() {
    let mut session = CalibrationSession::new(CalibrationConfig::default());
    let mut store = TuningStore::default();
    let mut chain = AscChain::new();

    session.arm();
    let counts = snapshot(0, 0, 0, 0);
    while !session.is_done() {
        session.on_tick(&mut store, &mut chain, counts).unwrap();
    }

    session.arm();
    assert_eq!(session.state(), CalState::Armed);
    assert_eq!(session.ticks(), 0);
    assert_eq!(session.result(&store), None);
}

/// Synthetic HF plant. The trim DAC is inverted in silicon: a larger code
/// slows the clock, so counts fall as the code rises. Each fine LSB is
/// worth 3000 counts here, putting two code values inside the band.
fn hf_plant(codes: &HfClockCodes) -> u32 {
    let steps = codes.coarse as i64 * 32 + codes.fine as i64;
    (2_200_000 - steps * 3_000).max(0) as u32
}

#[proptest]
fn hf_bang_bang_converges_without_oscillating(
    #[strategy(0u8..=31)] coarse: u8,
    #[strategy(0u8..=31)] fine: u8,
) {
    let step = |c: &HfClockCodes| c.coarse as i64 * 32 + c.fine as i64;
    let mut codes = HfClockCodes { coarse, fine };

    for _ in 0..1500 {
        let count = hf_plant(&codes);
        let before = codes;
        let in_band = correct_hf(&mut codes, count);

        if in_band {
            prop_assert_eq!(codes, before);
            return Ok(());
        }

        // Always a single LSB toward the band; a carry jumps further but
        // never more than its restart offset.
        let moved = step(&codes) - step(&before);
        prop_assert!(moved.abs() <= 24, "moved {} plant steps in one tick", moved);
        if count < HF_COUNT_LOW {
            prop_assert!(moved < 0, "slow clock must lower the code");
        } else {
            prop_assert!(moved > 0, "fast clock must raise the code");
        }
    }
    // The plant spans the band, so every start must land.
    prop_assert!(false, "never reached the target band");
}

#[proptest]
fn lc_bang_bang_tracks_monotone_plant(#[strategy(0u16..1600)] start: u16) {
    // Each LC LSB is worth 500 divided counts; code 800 hits the target
    // exactly.
    let target = 250_260u32;
    let plant = |code: u16| ((target as i64 + (code as i64 - 800) * 500).max(0)) as u32;

    let mut code = start;
    for _ in 0..2000 {
        let before = code;
        if correct_lc(&mut code, plant(before), target) {
            prop_assert_eq!(code, before);
            prop_assert_eq!(code, 800);
            return Ok(());
        }
        prop_assert_eq!((code as i32 - before as i32).abs(), 1);
        // Monotone approach: every step reduces the error.
        let err = |c: u16| (plant(c) as i64 - target as i64).abs();
        prop_assert!(err(code) < err(before));
    }
    prop_assert!(false, "never reached the LC target");
}
