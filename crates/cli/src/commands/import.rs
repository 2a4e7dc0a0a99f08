use anyhow::Result;
use craftgen_core::code::normalize_class;
use std::path::Path;
use tracing::debug;

use crate::utils::PhpFile;

pub fn import_command(path: &Path, class: &str, json: bool, dry_run: bool) -> Result<()> {
    let class = normalize_class(class)?;
    let mut file = PhpFile::open(path)?;
    let local_name = file.workspace.import_class(&class)?;
    let imported = !file.workspace.new_imports().is_empty();
    debug!("{} resolves to {} (new import: {})", class, local_name, imported);

    if json {
        let output = serde_json::json!({
            "class": class,
            "local_name": local_name,
            "imported": imported,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{local_name}");
    }

    // The rewritten file would interleave with JSON output.
    if dry_run && json {
        return Ok(());
    }
    file.finish(dry_run)?;
    Ok(())
}
