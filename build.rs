// Build script for verilated_shim
// Resolves which runtime API shape to expose from the targeted engine version.
//
// The callback API changed shape at 4.038 (single flush slot -> flush/exit
// lists) and the rollover threshold changed unit at 4.226 (megabytes ->
// bytes). Exactly one variant of each is compiled in.

use std::env;

const DEFAULT_ENGINE_VERSION: &str = "5.020";

fn fail(s: &str) -> ! {
    panic!("\n{}\n\nbuild script failed, must exit now", s)
}

fn parse_version(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    Some((major, minor))
}

fn main() {
    println!("cargo:rerun-if-env-changed=VERILATED_ENGINE_VERSION");
    println!("cargo:rustc-check-cfg=cfg(verilated_callbacks, values(\"list\", \"slot\"))");
    println!("cargo:rustc-check-cfg=cfg(verilated_rollover, values(\"bytes\", \"megabytes\"))");

    let version = env::var("VERILATED_ENGINE_VERSION")
        .unwrap_or_else(|_| DEFAULT_ENGINE_VERSION.to_string());
    let (major, minor) = match parse_version(&version) {
        Some(v) => v,
        None => fail(&format!(
            "`VERILATED_ENGINE_VERSION={}` is not of the form MAJOR.MINOR (e.g. 4.228)",
            version
        )),
    };
    let at_least = |maj: u32, min: u32| major > maj || (major == maj && minor >= min);

    if at_least(4, 38) {
        println!("cargo:rustc-cfg=verilated_callbacks=\"list\"");
    } else {
        println!("cargo:rustc-cfg=verilated_callbacks=\"slot\"");
    }

    if at_least(4, 226) {
        println!("cargo:rustc-cfg=verilated_rollover=\"bytes\"");
    } else {
        println!("cargo:rustc-cfg=verilated_rollover=\"megabytes\"");
    }

    println!("cargo:rustc-env=VERILATED_ENGINE_VERSION={}.{:03}", major, minor);
}
