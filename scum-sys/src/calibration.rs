// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! The bang-bang calibration control loop.
//!
//! Every 100 ms reference edge delivers one coherent counter snapshot. Each
//! oscillator domain compares its count against a target band and moves its
//! DAC code by a single LSB toward the band, with the domain's carry policy
//! applied at field boundaries. Single-LSB steps keep the loop from
//! oscillating around the setpoint given noisy, quantized counts and unknown
//! per-board loop gain.
//!
//! Termination is configurable. The historical behavior runs a fixed budget
//! of ten correction ticks and reports done whether or not any domain
//! actually reached its band; whether that is intentional (boards are
//! pre-characterized so ten steps always suffice) or a latent bug is
//! unknown, so [`TerminationMode`] exposes both it and a convergence-gated
//! variant, and [`CalibrationResult::converged`] records the per-domain
//! outcome either way.

use crate::scan_chain::{AscChain, OutOfRange};
use crate::tuning::{
    self, HfClockCodes, IfClockCodes, Rc2mCodes, TuningStore,
};
use scum_hal::counters::CounterSnapshot;
use ufmt::derive::uDebug;

/// HF clock counts per window below which the fine code steps down.
pub const HF_COUNT_LOW: u32 = 1_997_000;
/// HF clock counts per window above which the fine code steps up.
pub const HF_COUNT_HIGH: u32 = 2_003_000;

// 2 MHz RC threshold ladder around the nominal 200_000 counts per window.
// Coarse steps move ~1100 counts, fine ~150, superfine ~25; exactly one tier
// fires per tick, coarsest divergence first.
pub const RC2M_COARSE_HIGH: u32 = 200_600;
pub const RC2M_FINE_HIGH: u32 = 200_080;
pub const RC2M_SUPERFINE_HIGH: u32 = 200_015;
pub const RC2M_COARSE_LOW: u32 = 199_400;
pub const RC2M_FINE_LOW: u32 = 199_920;
pub const RC2M_SUPERFINE_LOW: u32 = 199_985;

/// Half-width of the IF RC target band; the fine DAC step is ~2800 counts.
pub const IF_COUNT_MARGIN: u32 = 1_400;

/// Reference edges discarded after arming, before the first clean gate
/// window.
pub const WARMUP_TICKS: u32 = 2;

/// Correction ticks in a fixed-budget run.
pub const CORRECTION_BUDGET: u32 = 10;

/// When the loop stops correcting.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationMode {
    /// Stop after exactly [`CORRECTION_BUDGET`] correction ticks, in or out
    /// of band. This is the historical behavior.
    FixedBudget,
    /// Stop as soon as every domain is inside its band, or after `max_ticks`
    /// correction ticks.
    ConvergenceGated { max_ticks: u32 },
}

/// Loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationConfig {
    pub termination: TerminationMode,
    /// Per-board LC code expansion used when committing the LC domain.
    pub lc_map: tuning::LcBoardMap,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        CalibrationConfig {
            termination: TerminationMode::FixedBudget,
            lc_map: tuning::LcBoardMap::default(),
        }
    }
}

/// Which domains were inside their band on the last correction tick.
#[derive(uDebug, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainConvergence {
    pub hf: bool,
    pub lc: bool,
    pub rc2m: bool,
    pub if_clk: bool,
}

impl DomainConvergence {
    pub fn all(&self) -> bool {
        self.hf && self.lc && self.rc2m && self.if_clk
    }
}

/// Loop state.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalState {
    Idle,
    /// Counting warm-up ticks, no corrections yet.
    Armed,
    /// Applying corrections.
    Converging,
    Done,
}

/// What a single reference edge did.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Warm-up tick, counters reset but no codes touched.
    WarmUp,
    /// Corrections applied, loop still running.
    Corrected,
    /// Corrections applied and the loop terminated.
    Finished,
}

/// Final outcome of a calibration run.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationResult {
    pub converged: DomainConvergence,
    pub final_codes: TuningStore,
    pub final_counts: CounterSnapshot,
}

/// Transient state for one calibration run.
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    config: CalibrationConfig,
    state: CalState,
    ticks: u32,
    corrections: u32,
    convergence: DomainConvergence,
    last_counts: CounterSnapshot,
}

impl CalibrationSession {
    pub fn new(config: CalibrationConfig) -> CalibrationSession {
        CalibrationSession {
            config,
            state: CalState::Idle,
            ticks: 0,
            corrections: 0,
            convergence: DomainConvergence::default(),
            last_counts: CounterSnapshot::default(),
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn state(&self) -> CalState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == CalState::Done
    }

    /// Reference edges seen since arming.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Begin a run. Resets all per-run state.
    pub fn arm(&mut self) {
        self.state = CalState::Armed;
        self.ticks = 0;
        self.corrections = 0;
        self.convergence = DomainConvergence::default();
        self.last_counts = CounterSnapshot::default();
    }

    /// Process one reference edge with the counter snapshot taken on it.
    ///
    /// Corrected codes are written back into `store` and re-encoded into
    /// `chain`; the caller commits the chain and the LC registers to
    /// hardware afterwards.
    pub fn on_tick(
        &mut self,
        store: &mut TuningStore,
        chain: &mut AscChain,
        counts: CounterSnapshot,
    ) -> Result<StepOutcome, OutOfRange> {
        self.ticks += 1;
        self.last_counts = counts;

        // The first windows overlap power-up transients; let the counters
        // run one clean gate window before trusting them.
        if self.ticks <= WARMUP_TICKS {
            self.state = CalState::Armed;
            return Ok(StepOutcome::WarmUp);
        }

        self.state = CalState::Converging;
        self.corrections += 1;

        self.convergence = DomainConvergence {
            hf: correct_hf(&mut store.hf, counts.count_hf),
            lc: correct_lc(&mut store.lc_code, counts.count_lc, store.lc_target),
            rc2m: correct_rc2m(&mut store.rc2m, counts.count_2m),
            if_clk: correct_if(&mut store.if_clk, counts.count_if, store.if_clk_target),
        };

        tuning::encode_all(chain, store)?;

        let finished = match self.config.termination {
            TerminationMode::FixedBudget => self.corrections == CORRECTION_BUDGET,
            TerminationMode::ConvergenceGated { max_ticks } => {
                self.convergence.all() || self.corrections >= max_ticks
            }
        };

        if finished {
            self.state = CalState::Done;
            Ok(StepOutcome::Finished)
        } else {
            Ok(StepOutcome::Corrected)
        }
    }

    /// The run's result, once [`CalState::Done`] is reached.
    pub fn result(&self, store: &TuningStore) -> Option<CalibrationResult> {
        if self.state != CalState::Done {
            return None;
        }
        Some(CalibrationResult {
            converged: self.convergence,
            final_codes: *store,
            final_counts: self.last_counts,
        })
    }
}

/// One bang-bang step on the HF clock fine code.
///
/// Fine underflow at 0 borrows from coarse and restarts fine at 10; overflow
/// at 31 carries into coarse and restarts fine at 23. The asymmetric restart
/// values match the measured overlap between adjacent coarse settings. When
/// coarse is already at its rail the step is dropped. Returns whether the
/// count was inside the band.
pub fn correct_hf(codes: &mut HfClockCodes, count: u32) -> bool {
    if count < HF_COUNT_LOW {
        if codes.fine == 0 {
            if codes.coarse > 0 {
                codes.coarse -= 1;
                codes.fine = 10;
            }
        } else {
            codes.fine -= 1;
        }
        false
    } else if count > HF_COUNT_HIGH {
        if codes.fine == 31 {
            if codes.coarse < 31 {
                codes.coarse += 1;
                codes.fine = 23;
            }
        } else {
            codes.fine += 1;
        }
        false
    } else {
        true
    }
}

/// One bang-bang step on the monotonic LC code. The band is a single count.
pub fn correct_lc(lc_code: &mut u16, count: u32, target: u32) -> bool {
    if count > target {
        *lc_code = lc_code.saturating_sub(1);
        false
    } else if count < target {
        *lc_code = lc_code.saturating_add(1);
        false
    } else {
        true
    }
}

/// One tiered bang-bang step on the 2 MHz RC codes.
///
/// Exactly one tier fires per direction per tick, coarsest divergence
/// checked first. Codes saturate at the 5-bit field limits.
pub fn correct_rc2m(codes: &mut Rc2mCodes, count: u32) -> bool {
    // Too fast
    if count > RC2M_COARSE_HIGH {
        codes.coarse = step_up_5bit(codes.coarse);
    } else if count > RC2M_FINE_HIGH {
        codes.fine = step_up_5bit(codes.fine);
    } else if count > RC2M_SUPERFINE_HIGH {
        codes.superfine = step_up_5bit(codes.superfine);
    }
    // Too slow
    else if count < RC2M_COARSE_LOW {
        codes.coarse = step_down_5bit(codes.coarse);
    } else if count < RC2M_FINE_LOW {
        codes.fine = step_down_5bit(codes.fine);
    } else if count < RC2M_SUPERFINE_LOW {
        codes.superfine = step_down_5bit(codes.superfine);
    } else {
        return true;
    }
    false
}

/// One bang-bang step on the IF RC fine code.
///
/// Fine overflow past 31 is normalized by subtracting 8 and carrying into
/// coarse. The 8-count rollback is not a power-of-two field boundary; it is
/// the measured fine-range overlap between adjacent coarse codes.
pub fn correct_if(codes: &mut IfClockCodes, count: u32, target: u32) -> bool {
    let mut in_band = true;
    if count > target + IF_COUNT_MARGIN {
        codes.fine += 1;
        in_band = false;
    } else if count < target - IF_COUNT_MARGIN {
        codes.fine = codes.fine.saturating_sub(1);
        in_band = false;
    }

    if codes.fine >= 32 {
        codes.fine -= 8;
        codes.coarse = step_up_5bit(codes.coarse);
    }
    in_band
}

fn step_up_5bit(code: u8) -> u8 {
    if code < 31 {
        code + 1
    } else {
        code
    }
}

fn step_down_5bit(code: u8) -> u8 {
    code.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hf_carry_on_underflow() {
        let mut codes = HfClockCodes { coarse: 3, fine: 0 };
        assert!(!correct_hf(&mut codes, HF_COUNT_LOW - 1));
        assert_eq!(codes, HfClockCodes { coarse: 2, fine: 10 });
    }

    #[test]
    fn hf_carry_on_overflow() {
        let mut codes = HfClockCodes {
            coarse: 3,
            fine: 31,
        };
        assert!(!correct_hf(&mut codes, HF_COUNT_HIGH + 1));
        assert_eq!(codes, HfClockCodes { coarse: 4, fine: 23 });
    }

    #[test]
    fn if_overflow_normalizes_with_irregular_carry() {
        let mut codes = IfClockCodes {
            coarse: 22,
            fine: 31,
        };
        assert!(!correct_if(&mut codes, 1_700_000, 1_600_000));
        assert_eq!(
            codes,
            IfClockCodes {
                coarse: 23,
                fine: 24
            }
        );
    }

    #[test]
    fn if_fine_saturates_at_zero() {
        let mut codes = IfClockCodes { coarse: 22, fine: 0 };
        assert!(!correct_if(&mut codes, 1_500_000, 1_600_000));
        assert_eq!(codes, IfClockCodes { coarse: 22, fine: 0 });
    }

    #[test]
    fn rc2m_codes_saturate_at_the_rails() {
        // No carry between the 2 MHz tiers; each 5-bit code pins at its rail.
        let mut high = Rc2mCodes {
            coarse: 31,
            fine: 31,
            superfine: 31,
        };
        assert!(!correct_rc2m(&mut high, RC2M_COARSE_HIGH + 1));
        assert!(!correct_rc2m(&mut high, RC2M_FINE_HIGH + 1));
        assert!(!correct_rc2m(&mut high, RC2M_SUPERFINE_HIGH + 1));
        assert_eq!(
            high,
            Rc2mCodes {
                coarse: 31,
                fine: 31,
                superfine: 31
            }
        );

        let mut low = Rc2mCodes {
            coarse: 0,
            fine: 0,
            superfine: 0,
        };
        assert!(!correct_rc2m(&mut low, RC2M_COARSE_LOW - 1));
        assert!(!correct_rc2m(&mut low, RC2M_FINE_LOW - 1));
        assert!(!correct_rc2m(&mut low, RC2M_SUPERFINE_LOW - 1));
        assert_eq!(
            low,
            Rc2mCodes {
                coarse: 0,
                fine: 0,
                superfine: 0
            }
        );
    }

    #[test]
    fn rc2m_single_tier_per_tick() {
        let mut codes = Rc2mCodes {
            coarse: 21,
            fine: 15,
            superfine: 15,
        };
        assert!(!correct_rc2m(&mut codes, RC2M_COARSE_HIGH + 1));
        assert_eq!(
            codes,
            Rc2mCodes {
                coarse: 22,
                fine: 15,
                superfine: 15
            }
        );
        assert!(!correct_rc2m(&mut codes, RC2M_SUPERFINE_LOW - 1));
        assert_eq!(
            codes,
            Rc2mCodes {
                coarse: 22,
                fine: 15,
                superfine: 14
            }
        );
    }
}
