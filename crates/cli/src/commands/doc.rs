use anyhow::Result;
use std::path::Path;

use crate::utils::PhpFile;

pub fn doc_command(
    path: &Path,
    text: &str,
    method: Option<&str>,
    append: bool,
    dry_run: bool,
) -> Result<()> {
    let mut file = PhpFile::open(path)?;
    let workspace = &mut file.workspace;

    let found = match (method, append) {
        (Some(method), true) => workspace.append_doc_comment_on_method(text, method)?,
        (Some(method), false) => workspace.set_doc_comment_on_method(text, method)?,
        (None, true) => workspace.append_doc_comment_on_class(text)?,
        (None, false) => workspace.set_doc_comment_on_class(text)?,
    };
    if !found {
        match method {
            Some(method) => eprintln!("⚠️  No {method}() method, or its comment already matches"),
            None => eprintln!("⚠️  No class, or its comment already matches"),
        }
    }

    file.finish(dry_run)?;
    Ok(())
}
