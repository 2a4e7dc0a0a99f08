use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{
    add_method_command, append_command, doc_command, format_command, import_command,
    register_component_command, register_event_command, register_module_command, AddMethodArgs,
    RegisterEventArgs,
};

#[derive(Parser, Debug)]
#[command(name = "craftgen")]
#[command(version, about = "Rewrite Craft CMS PHP files without disturbing their formatting", long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a class into a file and print the name to refer to it by
    #[command(visible_alias = "i")]
    Import {
        /// PHP file to edit
        file: PathBuf,

        /// Fully-qualified class name (e.g. craft\elements\Entry)
        class: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Print the rewritten file instead of writing it
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Append code to the first class, or to one of its methods
    #[command(visible_alias = "a")]
    Append {
        file: PathBuf,

        /// Statements (with --method) or class members to append
        #[arg(short, long)]
        code: String,

        /// Append to the end of this method's body
        #[arg(short, long)]
        method: Option<String>,

        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Add a method to the first class in a file
    AddMethod(AddMethodArgs),
    /// Set or extend the doc comment of the class or one of its methods
    Doc {
        file: PathBuf,

        /// Comment text, without `/** */` decoration
        #[arg(short, long)]
        text: String,

        /// Edit this method's doc comment instead of the class's
        #[arg(short, long)]
        method: Option<String>,

        /// Add the text as a new paragraph instead of replacing the comment
        #[arg(long)]
        append: bool,

        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Register a component through a registration event
    RegisterEvent(RegisterEventArgs),
    /// Add a module to an application config file
    RegisterModule {
        /// Config file returning an array (e.g. config/app.php)
        file: PathBuf,

        /// Module ID
        #[arg(long)]
        id: String,

        /// Module class
        #[arg(long)]
        class: String,

        /// Also bootstrap the module on every request
        #[arg(long)]
        bootstrap: bool,

        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Add a component to a plugin's config() method
    RegisterComponent {
        /// Plugin class file
        file: PathBuf,

        /// Component ID
        #[arg(long)]
        id: String,

        /// Component class
        #[arg(long)]
        class: String,

        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Pretty-print a code snippet
    #[command(visible_alias = "f")]
    Format {
        /// Code to format; read from stdin when omitted
        code: Option<String>,
    },
}

impl Commands {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        match self {
            Commands::Import {
                file,
                class,
                json,
                dry_run,
            } => import_command(&file, &class, json, dry_run),
            Commands::Append {
                file,
                code,
                method,
                dry_run,
            } => append_command(&file, &code, method.as_deref(), dry_run),
            Commands::AddMethod(args) => add_method_command(args),
            Commands::Doc {
                file,
                text,
                method,
                append,
                dry_run,
            } => doc_command(&file, &text, method.as_deref(), append, dry_run),
            Commands::RegisterEvent(args) => register_event_command(args),
            Commands::RegisterModule {
                file,
                id,
                class,
                bootstrap,
                dry_run,
            } => register_module_command(&file, &id, &class, bootstrap, dry_run),
            Commands::RegisterComponent {
                file,
                id,
                class,
                dry_run,
            } => register_component_command(&file, &id, &class, dry_run),
            Commands::Format { code } => format_command(code),
        }
    }
}
