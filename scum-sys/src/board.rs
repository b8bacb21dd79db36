// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! One-time board bring-up of the clock tree and the LC divider chain.
//!
//! Everything here runs once from the main context before the calibration
//! loop is armed, filling the scan-chain mirror with the static
//! configuration the loop never touches: LDO routing, GPIO banks, clock
//! source selection and the divide-by-960 chain that makes the LC tank
//! countable.

use crate::scan_chain::{AscChain, OutOfRange};
use crate::tuning::{self, TuningStore};
use scum_hal::analog_cfg::AnalogCfg;
use scum_hal::lo::LoTuningPort;

/// Static LC divider ratio; with the div-by-2 prescaler the tank is counted
/// at 1/960 of its frequency.
pub const LC_DIVIDER_RATIO: u32 = 480;

/// Radio LDO enable register index in the analog configuration bank.
const LDO_CONTROL_REG: usize = 10;

/// LO + IF + divider LDOs on, under memory-mapped control. The AUX enable
/// bit is inverted, so leaving it zero keeps AUX on.
const LDO_RX_ON: u32 = 0x0058;

/// All radio LDOs off, AUX on.
const LDO_ALL_OFF: u32 = 0x0000;

fn word_set(chain: &mut AscChain, index: usize, mask: u32) {
    chain.update_word(index, !mask, mask);
}

fn word_clear(chain: &mut AscChain, index: usize, mask: u32) {
    chain.update_word(index, !mask, 0);
}

/// Route the radio LDO power-on signals to the FSM and park the AUX LDO
/// under scan-chain control.
fn init_ldo_control(chain: &mut AscChain) -> Result<(), OutOfRange> {
    chain.clear(501)?; // scan_pon_if
    chain.clear(502)?; // scan_pon_lo
    chain.clear(503)?; // scan_pon_pa
    chain.clear(504)?; // gpio_pon_en_if
    chain.set(505)?; // fsm_pon_en_if
    chain.clear(506)?; // gpio_pon_en_lo
    chain.set(507)?; // fsm_pon_en_lo
    chain.clear(508)?; // gpio_pon_en_pa
    chain.set(509)?; // fsm_pon_en_pa
    chain.set(510)?; // master_ldo_en_if
    chain.set(511)?; // master_ldo_en_lo
    chain.set(512)?; // master_ldo_en_pa
    chain.clear(513)?; // scan_pon_div
    chain.clear(514)?; // gpio_pon_en_div
    chain.set(515)?; // fsm_pon_en_div
    chain.set(516)?; // master_ldo_en_div

    // analog_cfg<167> controls the AUX LDO rather than the scan chain.
    chain.set(914)?;
    Ok(())
}

/// Select the mux bank for each 4-bit GPIO output row.
fn gpo_bank_select(chain: &mut AscChain, rows: [u8; 4]) -> Result<(), OutOfRange> {
    for (row, base) in rows.iter().zip([245, 249, 253, 257]) {
        for j in 0..4 {
            chain.write(base + j, (row >> j) & 1 != 0)?;
        }
    }
    Ok(())
}

/// Select the mux bank for each 2-bit GPIO input row.
fn gpi_bank_select(chain: &mut AscChain, rows: [u8; 4]) -> Result<(), OutOfRange> {
    for (row, base) in rows.iter().zip([261, 263, 265, 267]) {
        for j in 0..2 {
            chain.write(base + j, (row >> j) & 1 != 0)?;
        }
    }
    Ok(())
}

// The GPIO enable bits are scattered through the chain; these tables map
// pad index to scan-chain position. Output enables are active low.

const GPO_ENABLE_POSITIONS: [usize; 16] = [
    1131, 1133, 1135, 1137, 1140, 1142, 1144, 1146, 1115, 1117, 1119, 1121, 1124, 1126, 1128, 1130,
];

const GPI_ENABLE_POSITIONS: [usize; 16] = [
    1132, 1134, 1136, 1138, 1139, 1141, 1143, 1145, 1116, 1118, 1120, 1122, 1123, 1125, 1127, 1129,
];

/// Enable GPIO outputs per `mask`, bit per pad, active high at this API.
fn gpo_enables(chain: &mut AscChain, mask: u16) -> Result<(), OutOfRange> {
    for (j, &position) in GPO_ENABLE_POSITIONS.iter().enumerate() {
        chain.write(position, (mask >> j) & 1 == 0)?;
    }
    Ok(())
}

/// Enable GPIO inputs per `mask`, bit per pad.
fn gpi_enables(chain: &mut AscChain, mask: u16) -> Result<(), OutOfRange> {
    for (j, &position) in GPI_ENABLE_POSITIONS.iter().enumerate() {
        chain.write(position, (mask >> j) & 1 != 0)?;
    }
    Ok(())
}

/// Set the divider LDO reference. 7-bit code, inverted on the wire.
fn set_div_supply(chain: &mut AscChain, code: u8) {
    chain.update_word(30, 0xFFF0_1FFF, ((!code as u32) & 0x7F) << 5);
}

/// LC prescaler operating modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrescalerMode {
    Off,
    BackupDiv5,
    BackupDiv2,
    DynamicDiv5Strong,
    DynamicDiv2Strong,
    DynamicDiv5Weak,
}

/// Program the LC prescaler. The backup enables live in word 31, the
/// dynamic prescaler selects in word 32; the dynamic selects are active
/// low.
fn set_prescaler(chain: &mut AscChain, mode: PrescalerMode) {
    // Backup div-by-5 is bit pair 0x2/0x4, backup div-by-2 is bit 0x1.
    match mode {
        PrescalerMode::Off => {
            word_set(chain, 31, 0x0000_0004);
            word_clear(chain, 31, 0x0000_0002);
            word_set(chain, 32, 0x8000_0000);
            word_clear(chain, 31, 0x0000_0001);
            word_set(chain, 32, 0x7000_0000);
        }
        PrescalerMode::BackupDiv5 => {
            word_set(chain, 31, 0x0000_0002);
            word_clear(chain, 31, 0x0000_0004);
            word_set(chain, 32, 0x8000_0000);
            word_clear(chain, 31, 0x0000_0001);
            word_set(chain, 32, 0x7000_0000);
        }
        PrescalerMode::BackupDiv2 => {
            word_set(chain, 31, 0x0000_0004);
            word_clear(chain, 31, 0x0000_0002);
            word_clear(chain, 32, 0x8000_0000);
            word_set(chain, 31, 0x0000_0001);
            word_set(chain, 32, 0x7000_0000);
        }
        PrescalerMode::DynamicDiv5Strong => {
            word_set(chain, 31, 0x0000_0004);
            word_clear(chain, 31, 0x0000_0002);
            word_set(chain, 32, 0x8000_0000);
            word_clear(chain, 31, 0x0000_0001);
            word_clear(chain, 32, 0x4000_0000);
        }
        PrescalerMode::DynamicDiv2Strong => {
            word_set(chain, 31, 0x0000_0004);
            word_clear(chain, 31, 0x0000_0002);
            word_set(chain, 32, 0x8000_0000);
            word_clear(chain, 31, 0x0000_0001);
            word_clear(chain, 32, 0x2000_0000);
        }
        PrescalerMode::DynamicDiv5Weak => {
            word_set(chain, 31, 0x0000_0004);
            word_clear(chain, 31, 0x0000_0002);
            word_set(chain, 32, 0x8000_0000);
            word_clear(chain, 31, 0x0000_0001);
            word_clear(chain, 32, 0x6000_0000);
        }
    }
}

/// Fill the scan-chain mirror with the static clock-tree configuration and
/// the initial DAC codes from `store`.
///
/// Must run before the first commit; nothing here touches hardware.
pub fn configure_clock_tree(chain: &mut AscChain, store: &TuningStore) -> Result<(), OutOfRange> {
    init_ldo_control(chain)?;

    // GPI bank 1 on row 3 routes GPI8 to EXT_INTERRUPT<1>; GPO bank 0 on
    // row 3 routes the calibration clock out on GPO8.
    gpi_bank_select(chain, [0, 0, 1, 0])?;
    gpo_bank_select(chain, [6, 6, 0, 6])?;
    gpi_enables(chain, 0x0100)?;
    gpo_enables(chain, 0xFFFF)?;

    // HCLK source = HF_CLOCK.
    chain.set(1147)?;

    tuning::encode_hf_clock(chain, store.hf)?;

    // RF timer source = HF_CLOCK, divided by 40 for 500 kHz once the HF
    // clock is trimmed to 20 MHz. The divider field is inverted.
    chain.set(1151)?;
    for position in [49, 48, 46, 44, 43, 42] {
        chain.set(position)?;
    }
    for position in [47, 45] {
        chain.clear(position)?;
    }

    // Disable LF_CLOCK.
    chain.set(553)?;

    // Chip clock source = 2 MHz RC, passthrough on its divider.
    chain.set(1156)?;
    chain.set(41)?;

    // Enable the 32k oscillator for calibration.
    chain.set(623)?;

    // Hand all reference counters to analog_cfg control.
    for position in 2..=8 {
        chain.set(position)?;
    }

    tuning::encode_if_clock(chain, store.if_clk, false)?;
    tuning::encode_rc2m(chain, store.rc2m);

    // Keep the 2 MHz RC running during calibration.
    chain.set(1114)?;

    Ok(())
}

/// Program the LC divider chain: max divider supply, div-by-2 dynamic
/// prescaler and the static div-by-480 stage.
///
/// Updates the scan-chain mirror and writes the divider registers. The
/// divider words take effect immediately; the scan-chain part on the next
/// commit.
pub fn configure_lc_divider(chain: &mut AscChain, lo: &mut LoTuningPort) -> Result<(), OutOfRange> {
    set_div_supply(chain, 63);
    set_prescaler(chain, PrescalerMode::DynamicDiv2Strong);

    // The static divider only follows its programming registers with this
    // bit low.
    chain.clear(1081)?;

    let (code1, code2) = tuning::divider_words(LC_DIVIDER_RATIO, true, true);
    lo.set_divider_words(code1, code2);

    // sel12: keep the x2 stage selected or the divider output falling
    // edges are unusable.
    chain.set(1012)?;
    Ok(())
}

/// Turn on the LO, IF and divider LDOs so the LC tank and IF clock run
/// during calibration.
pub fn enable_rx_ldos(cfg: &AnalogCfg) {
    cfg.write(LDO_CONTROL_REG, LDO_RX_ON);
}

/// Drop the radio LDOs once calibration is done.
pub fn disable_radio_ldos(cfg: &AnalogCfg) {
    cfg.write(LDO_CONTROL_REG, LDO_ALL_OFF);
}
