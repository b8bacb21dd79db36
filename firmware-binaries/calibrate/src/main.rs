// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! Closed-loop clock calibration against an external optical reference.
//!
//! An optical bench flashes the chip's photoreceiver every 100 ms; each
//! start-of-frame interrupt drives one calibration tick. The main context
//! arms the loop and sleeps until the handler reports completion.

#![no_std]
#![cfg_attr(not(test), no_main)]

use core::cell::RefCell;

use critical_section::Mutex;
use log::{error, info, LevelFilter};
use scum_hal::analog_cfg::{AnalogCfg, ANALOG_CFG_BASE, UART_BASE};
use scum_hal::counters::ReferenceCounters;
use scum_hal::lo::LoTuningPort;
use scum_hal::scan_port::ScanChainPort;
use scum_hal::uart::{log as uart_log, Uart};
use scum_sys::board;
use scum_sys::calibration::{CalibrationConfig, CalibrationSession};
use scum_sys::reference_edge::OpticalEdge;
use scum_sys::runner::{wait_calibration_done, CalibrationRunner};
use scum_sys::scan_chain::AscChain;
use scum_sys::tuning::{self, TuningStore};

#[cfg(not(test))]
use cortex_m_rt::entry;

static RUNNER: Mutex<RefCell<Option<CalibrationRunner<OpticalEdge>>>> =
    Mutex::new(RefCell::new(None));

#[cfg_attr(not(test), entry)]
fn main() -> ! {
    // SAFETY: these are the SCuM memory-mapped peripheral bases, touched
    // only through these handles.
    let uart = unsafe { Uart::new(UART_BASE as *const ()) };
    // SAFETY: single thread of execution, called once before any logging.
    unsafe { uart_log::init(uart, LevelFilter::Info) };

    // SAFETY: as above.
    let cfg = unsafe { AnalogCfg::new(ANALOG_CFG_BASE as *const ()) };
    let counters = unsafe { ReferenceCounters::new(ANALOG_CFG_BASE as *const ()) };
    let mut scan = unsafe { ScanChainPort::new(ANALOG_CFG_BASE as *const ()) };
    let mut lo = unsafe { LoTuningPort::new(ANALOG_CFG_BASE as *const ()) };

    info!("optical clock calibration starting");

    let config = CalibrationConfig::default();
    let store = TuningStore::default();
    let mut chain = AscChain::new();

    if let Err(e) = board::configure_clock_tree(&mut chain, &store)
        .and_then(|()| board::configure_lc_divider(&mut chain, &mut lo))
    {
        error!("board bring-up failed: {}", e);
        park();
    }

    // The LC tank and IF clock only oscillate with their LDOs up.
    board::enable_rx_ldos(&cfg);

    // Initial LO frequency, then the full chain, before the loop starts
    // moving codes.
    let (fcode, fcode2) = tuning::lc_fcode_words(config.lc_map.expand(store.lc_code));
    lo.set_frequency_words(fcode, fcode2);
    chain.commit(&mut scan);

    info!(
        "temperature ratio: {}",
        counters.estimate_temperature_2m_32k()
    );

    // SAFETY: the edge handlers below drive the runner.
    let edge = unsafe { OpticalEdge::new() };
    let session = CalibrationSession::new(config);
    let runner = CalibrationRunner::new(session, store, chain, edge, counters, scan, lo);

    critical_section::with(|cs| {
        let mut slot = RUNNER.borrow_ref_mut(cs);
        *slot = Some(runner);
        if let Some(runner) = slot.as_mut() {
            runner.arm();
        }
    });

    wait_calibration_done();

    let result = critical_section::with(|cs| {
        RUNNER
            .borrow_ref_mut(cs)
            .as_mut()
            .and_then(|runner| runner.take_result())
    });

    board::disable_radio_ldos(&cfg);

    match result {
        Some(result) => {
            info!(
                "calibration done, converged: HF={} LC={} 2M={} IF={}",
                result.converged.hf,
                result.converged.lc,
                result.converged.rc2m,
                result.converged.if_clk
            );
            info!(
                "final counts: 32k={} HF={} 2M={} LC={} IF={}",
                result.final_counts.count_32k,
                result.final_counts.count_hf,
                result.final_counts.count_2m,
                result.final_counts.count_lc,
                result.final_counts.count_if
            );
        }
        None => error!("calibration finished without a result"),
    }

    park()
}

fn park() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}

fn on_reference_edge() {
    critical_section::with(|cs| {
        if let Some(runner) = RUNNER.borrow_ref_mut(cs).as_mut() {
            if let Err(e) = runner.handle_reference_edge() {
                error!("calibration tick failed: {}", e);
            }
        }
    });
}

#[no_mangle]
extern "C" fn OPTICAL_SFD() {
    on_reference_edge();
}

#[no_mangle]
extern "C" fn EXT_GPIO8_ACTIVEHIGH() {
    // Fires on every optical pulse; the start-of-frame handler does the
    // work.
}

#[panic_handler]
fn panic_handler(info: &core::panic::PanicInfo) -> ! {
    error!("{}", info);
    park()
}
