//! Build script for stockpaper-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Checks that the CYW43 radio firmware blobs are present
//! - Validates device.toml and embeds it as postcard binary data

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use stockpaper_core::config::DeviceConfig;

/// Radio firmware files expected under cyw43-firmware/
const RADIO_BLOBS: [&str; 2] = ["43439A0.bin", "43439A0_clm.bin"];

fn main() {
    setup_linker();
    check_radio_firmware();
    embed_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Fail early when the radio firmware has not been fetched
fn check_radio_firmware() {
    println!("cargo:rerun-if-changed=cyw43-firmware");

    let missing: Vec<&str> = RADIO_BLOBS
        .iter()
        .copied()
        .filter(|blob| !Path::new("cyw43-firmware").join(blob).exists())
        .collect();

    if !missing.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: CYW43 radio firmware not found!                          ║\n\
            ║                                                                  ║\n\
            ║  Copy 43439A0.bin and 43439A0_clm.bin from the embassy           ║\n\
            ║  repository (cyw43-firmware/) into                               ║\n\
            ║  stockpaper-firmware/cyw43-firmware/.                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            missing
                .iter()
                .map(|m| format!("║  • missing {:<54} ║", m))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

/// Validate device.toml and write the encoded config to OUT_DIR
fn embed_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a device.toml configuration file          ║\n\
            ║  with at least one [[networks]] entry.                           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: DeviceConfig = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid device.toml                                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    if let Err(e) = config.validate() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid device configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&e.to_string())
        );
    }

    let encoded = match postcard::to_stdvec(&config) {
        Ok(bytes) => bytes,
        Err(e) => panic!("Failed to encode device config: {}", e),
    };

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("device_config.bin"), &encoded).unwrap();

    println!(
        "cargo:warning=device.toml validated ({} networks, {} bytes)",
        config.networks.len(),
        encoded.len()
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
