//! External tool checks.

use crate::metadata;

/// Print installation instructions for mediainfo
fn print_mediainfo_install_instructions() {
    eprintln!("Install MediaInfo (or set metadata_backend = \"tags\"):");
    eprintln!("  Windows: winget install MediaArea.MediaInfo");
    eprintln!("  macOS:   brew install media-info");
    eprintln!("  Linux:   apt install mediainfo");
}

/// Check if the metadata tools are installed
pub fn cmd_check_tools() -> anyhow::Result<()> {
    println!("Checking metadata tools...\n");

    if let Some(version) = metadata::get_mediainfo_version() {
        println!("✓ mediainfo: {}", version);
    } else {
        println!("✗ mediainfo: NOT FOUND");
        print_mediainfo_install_instructions();
    }

    Ok(())
}
