use anyhow::Result;
use clap::Args;
use craftgen_core::{
    code::normalize_class,
    registration::{register_component, register_event_handler, register_module},
    RegistrationHandler,
};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::print_fallback;
use crate::utils::PhpFile;

#[derive(Args, Debug)]
pub struct RegisterEventArgs {
    /// Plugin or module class file
    pub file: PathBuf,

    /// Class that triggers the registration event (e.g. craft\services\Fields)
    #[arg(long)]
    pub class: String,

    /// Event constant (e.g. EVENT_REGISTER_FIELD_TYPES)
    #[arg(long)]
    pub event: String,

    /// Class to register
    #[arg(long)]
    pub component: String,

    /// Only subscribe when the triggering class exists
    #[arg(long)]
    pub ensure_class_exists: bool,

    /// Event object class
    #[arg(long)]
    pub event_class: Option<String>,

    /// Event property the component is added to
    #[arg(long, default_value = "types")]
    pub property: String,

    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

pub fn register_event_command(args: RegisterEventArgs) -> Result<()> {
    let mut registration = RegistrationHandler::new(
        normalize_class(&args.class)?,
        args.event,
        normalize_class(&args.component)?,
    )
    .ensure_class_exists(args.ensure_class_exists)
    .event_property(args.property);
    if let Some(event_class) = args.event_class {
        registration = registration.event_class(normalize_class(&event_class)?);
    }

    let mut file = PhpFile::open(&args.file)?;
    let methods = file.config().registration_methods.clone();
    debug!("Registering {} via {:?}", registration.component_class, methods);
    let outcome = register_event_handler(&mut file.workspace, &registration, &methods)?;
    if !print_fallback(&outcome, &format!("find any of {}", method_list(&methods))) {
        return Ok(());
    }
    file.finish(args.dry_run)?;
    Ok(())
}

pub fn register_module_command(
    path: &Path,
    id: &str,
    class: &str,
    bootstrap: bool,
    dry_run: bool,
) -> Result<()> {
    let class = normalize_class(class)?;
    let mut file = PhpFile::open(path)?;
    let outcome = register_module(&mut file.workspace, id, &class, bootstrap)?;
    if !print_fallback(&outcome, "find the returned config array") {
        return Ok(());
    }
    file.finish(dry_run)?;
    Ok(())
}

pub fn register_component_command(path: &Path, id: &str, class: &str, dry_run: bool) -> Result<()> {
    let class = normalize_class(class)?;
    let mut file = PhpFile::open(path)?;
    let outcome = register_component(&mut file.workspace, id, &class)?;
    if !print_fallback(&outcome, "find config()") {
        return Ok(());
    }
    file.finish(dry_run)?;
    Ok(())
}

fn method_list(methods: &[String]) -> String {
    methods
        .iter()
        .map(|method| format!("{method}()"))
        .collect::<Vec<_>>()
        .join(", ")
}
