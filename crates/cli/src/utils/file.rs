use anyhow::{Context, Result};
use craftgen_core::{Config, ConfigLoader, Workspace};
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// A PHP file loaded into a [`Workspace`], written back only when it changed.
pub struct PhpFile {
    path: PathBuf,
    original: String,
    config: Config,
    pub workspace: Workspace,
}

impl PhpFile {
    pub fn open(path: &Path) -> Result<Self> {
        let original = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = load_config(path)?;
        let workspace = Workspace::with_config(original.clone(), &config);
        debug!("Loaded {} ({} bytes)", path.display(), original.len());
        Ok(Self {
            path: path.to_path_buf(),
            original,
            config,
            workspace,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_modified(&self) -> bool {
        self.workspace.code() != self.original
    }

    /// Writes the rewritten code, or prints it when `dry_run` is set.
    /// Returns whether the file had changed.
    pub fn finish(self, dry_run: bool) -> Result<bool> {
        if !self.is_modified() {
            eprintln!("No changes to {}", self.path.display());
            return Ok(false);
        }
        if dry_run {
            print!("{}", self.workspace.code());
            return Ok(true);
        }
        fs::write(&self.path, self.workspace.code())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!("Updated {}", self.path.display());
        eprintln!("✅ Updated {}", self.path.display());
        Ok(true)
    }
}

/// Nearest config at or above the file's directory.
pub fn load_config(path: &Path) -> Result<Config> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(path)
    };
    ConfigLoader::load_from_path(&absolute)
        .with_context(|| format!("Failed to load config for {}", absolute.display()))
}

/// The given code, or everything on stdin when it is absent.
pub fn read_source(code: Option<String>) -> Result<String> {
    match code {
        Some(code) => Ok(code),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read code from stdin")?;
            Ok(buffer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SOURCE: &str = "<?php\nnamespace app;\n\nclass Foo\n{\n    public function init(): void\n    {\n    }\n}\n";

    #[test]
    fn test_unchanged_file_is_not_written() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Foo.php");
        fs::write(&path, SOURCE).unwrap();

        let mut file = PhpFile::open(&path).unwrap();
        assert!(!file.workspace.append_code_to_method("$a = 1;", "missing").unwrap());
        assert!(!file.finish(false).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), SOURCE);
    }

    #[test]
    fn test_changed_file_is_written() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Foo.php");
        fs::write(&path, SOURCE).unwrap();

        let mut file = PhpFile::open(&path).unwrap();
        assert!(file.workspace.append_code_to_method("$a = 1;", "init").unwrap());
        assert!(file.finish(false).unwrap());
        assert!(fs::read_to_string(&path).unwrap().contains("        $a = 1;\n"));
    }

    #[test]
    fn test_config_is_found_next_to_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".craftgen.json"), r#"{"indent_width": 2}"#).unwrap();
        let path = temp_dir.path().join("Foo.php");
        fs::write(&path, SOURCE).unwrap();

        let file = PhpFile::open(&path).unwrap();
        assert_eq!(file.config().indent_width, 2);
    }

    #[test]
    fn test_read_source_prefers_argument() {
        assert_eq!(read_source(Some("echo 1;".to_string())).unwrap(), "echo 1;");
    }
}
