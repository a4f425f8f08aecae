//! Implementation of `rumble-schemas list`.

use rumble::protocol::standard_catalog;
use rumble::schema::Catalog;
use rumble::RumbleError;

pub fn run() -> Result<u8, RumbleError> {
    let catalog = standard_catalog()?;
    for line in lines(&catalog) {
        println!("{line}");
    }
    Ok(0)
}

/// Shared documents first, then one line per entry in catalog order.
fn lines(catalog: &Catalog) -> Vec<String> {
    let claimed: Vec<&str> = catalog
        .entries()
        .iter()
        .flat_map(|e| [e.data.name, e.message.name])
        .collect();
    let shared = catalog
        .documents()
        .filter(|doc| !claimed.contains(&doc.name))
        .map(|doc| format!("{:<28} {:<18} {}", doc.name, doc.group.dir_name(), doc.artifact_path()));
    let entries = catalog.entries().iter().map(|entry| {
        format!(
            "{:<28} {:<18} {}",
            entry.discriminator,
            entry.direction.to_string(),
            entry.message.artifact_path()
        )
    });
    shared.chain(entries).collect()
}
