//! Reset command implementation.

use cadence_store::{FileBackend, LocalStore};
use std::path::Path;

/// Runs the reset command: the explicit user-initiated wipe.
pub fn run(path: &Path, confirmed: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirmed {
        return Err("reset wipes all local data; pass --yes to confirm".into());
    }

    let store = LocalStore::new(FileBackend::open(path)?);
    store.clear()?;
    println!("wiped snapshot and sync cursor at {}", path.display());
    Ok(())
}
