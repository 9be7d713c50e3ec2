// Embeds the crate version at compile time. CI can override the patch
// segment via GATE_PATCH_VERSION without touching Cargo.toml.

use std::env;

fn main() {
    let version = env::var("CARGO_PKG_VERSION").expect("CARGO_PKG_VERSION not set");

    let parts: Vec<&str> = version.split('.').collect();
    let &[major, minor, patch] = parts.as_slice() else {
        panic!("Invalid version format in Cargo.toml: {}", version);
    };

    let patch = env::var("GATE_PATCH_VERSION").unwrap_or_else(|_| patch.to_string());

    println!("cargo:rustc-env=GATE_VERSION={}.{}.{}", major, minor, patch);
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=GATE_PATCH_VERSION");
}
