// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! Device interrupt vector table for `cortex-m-rt`.
//!
//! Only compiled with the `rt` feature. Handlers default to `DefaultHandler`
//! through `device.x` and can be overridden with `#[no_mangle]` functions of
//! the matching name.

extern "C" {
    fn UART();
    fn EXT_GPIO3_ACTIVEHIGH_DEBOUNCED();
    fn EXT_OPTICAL_IRQ_IN();
    fn ADC();
    fn RF();
    fn RFTIMER();
    fn RAWCHIPS_STARTVAL();
    fn RAWCHIPS_32();
    fn OPTICAL_SFD();
    fn EXT_GPIO8_ACTIVEHIGH();
    fn EXT_GPIO9_ACTIVELOW();
    fn EXT_GPIO10_ACTIVELOW();
}

#[doc(hidden)]
pub union Vector {
    handler: unsafe extern "C" fn(),
    reserved: usize,
}

#[doc(hidden)]
#[link_section = ".vector_table.interrupts"]
#[no_mangle]
pub static __INTERRUPTS: [Vector; 15] = [
    Vector { handler: UART },
    Vector {
        handler: EXT_GPIO3_ACTIVEHIGH_DEBOUNCED,
    },
    Vector {
        handler: EXT_OPTICAL_IRQ_IN,
    },
    Vector { handler: ADC },
    Vector { reserved: 0 },
    Vector { reserved: 0 },
    Vector { handler: RF },
    Vector { handler: RFTIMER },
    Vector {
        handler: RAWCHIPS_STARTVAL,
    },
    Vector {
        handler: RAWCHIPS_32,
    },
    Vector { reserved: 0 },
    Vector {
        handler: OPTICAL_SFD,
    },
    Vector {
        handler: EXT_GPIO8_ACTIVEHIGH,
    },
    Vector {
        handler: EXT_GPIO9_ACTIVELOW,
    },
    Vector {
        handler: EXT_GPIO10_ACTIVELOW,
    },
];
