// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    // Put `device.x` (the interrupt vector aliases consumed by cortex-m-rt's
    // `device` feature) somewhere the linker can find it.
    if env::var_os("CARGO_FEATURE_RT").is_some() {
        let out = PathBuf::from(env::var_os("OUT_DIR").unwrap());
        fs::copy("device.x", out.join("device.x")).unwrap();
        println!("cargo:rustc-link-search={}", out.display());
    }

    println!("cargo:rerun-if-changed=device.x");
    println!("cargo:rerun-if-changed=build.rs");
}
