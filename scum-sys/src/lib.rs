// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! Closed-loop analog clock calibration for the SCuM SoC.
//!
//! The chip's oscillators (HF system clock, 2 MHz RC, IF RC, LC tank) are
//! trimmed by integer DAC codes held in a 1216-bit analog scan chain. This
//! crate models the scan chain in RAM, encodes per-domain tuning codes into
//! it, and runs a bang-bang control loop that nudges each code by one LSB per
//! 100 ms reference edge until the free-running counters match their targets.

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod calibration;
pub mod reference_edge;
pub mod runner;
pub mod scan_chain;
pub mod tuning;
