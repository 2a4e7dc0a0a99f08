use anyhow::Result;
use craftgen_core::{format_snippet, registration::append_to_method_or_fallback};
use std::path::Path;

use super::print_fallback;
use crate::utils::PhpFile;

pub fn append_command(path: &Path, code: &str, method: Option<&str>, dry_run: bool) -> Result<()> {
    let mut file = PhpFile::open(path)?;

    match method {
        Some(method) => {
            let outcome =
                append_to_method_or_fallback(&mut file.workspace, code, &[method.to_string()])?;
            if !print_fallback(&outcome, &format!("find {method}()")) {
                return Ok(());
            }
        }
        None => {
            if !file.workspace.append_code_to_class(code)? {
                eprintln!("⚠️  No class found in {}. Add this code manually:\n", path.display());
                println!("{}", format_snippet(code, file.workspace.options())?);
                return Ok(());
            }
        }
    }

    file.finish(dry_run)?;
    Ok(())
}
