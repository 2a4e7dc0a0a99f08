use anyhow::Result;
use craftgen_core::{format_snippet, ConfigLoader, PrintOptions};

use crate::utils::read_source;

pub fn format_command(code: Option<String>) -> Result<()> {
    let code = read_source(code)?;
    let config = ConfigLoader::load()?;
    let formatted = format_snippet(&code, &PrintOptions::from(&config))?;
    println!("{formatted}");
    Ok(())
}
