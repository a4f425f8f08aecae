//! Implementation of `rumble-schemas generate`.

use std::path::PathBuf;

use rumble::drift::{regenerate, FsArtifactStore};
use rumble::protocol::standard_catalog;
use rumble::RumbleError;

pub async fn run(root: PathBuf, prune: bool) -> Result<u8, RumbleError> {
    let catalog = standard_catalog()?;
    let store = FsArtifactStore::new(&root);
    let summary = regenerate(&catalog, &store, prune).await?;

    for path in &summary.written {
        println!("wrote: {path}");
    }
    for path in &summary.removed {
        println!("removed: {path}");
    }
    println!("{summary} ({})", root.display());
    Ok(0)
}
