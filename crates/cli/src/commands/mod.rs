pub mod add_method;
pub mod append;
pub mod doc;
pub mod format;
pub mod import;
pub mod register;

pub use add_method::{add_method_command, AddMethodArgs};
pub use append::append_command;
pub use doc::doc_command;
pub use format::format_command;
pub use import::import_command;
pub use register::{
    register_component_command, register_event_command, register_module_command,
    RegisterEventArgs,
};

use craftgen_core::Outcome;

/// Prints a fallback snippet for the user to apply by hand.
pub(crate) fn print_fallback(outcome: &Outcome, what: &str) -> bool {
    match outcome {
        Outcome::Applied => true,
        Outcome::Fallback(code) => {
            eprintln!("⚠️  Could not {what} automatically. Add this code manually:\n");
            println!("{code}");
            false
        }
    }
}
