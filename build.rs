//! Build script - hands the esp-hal and defmt linker scripts to the firmware
//! binary. Host builds (tests) have nothing to link.

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Only the embedded binary needs the ESP linker scripts.
    if env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    println!("cargo:rustc-link-arg-bins=-Tlinkall.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
