//! Registering generated components in existing files
//!
//! Each helper tries to rewrite the target file and, when the expected
//! insertion point is missing, hands back code for the user to add by hand.

use crate::{
    error::Result,
    snippet::{format_snippet, Expr},
    tree::{quote_string, NodeId, SyntaxTree},
    visitor::NodeVisitor,
    workspace::{ArrayMerge, RegistrationHandler, Workspace},
};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The workspace was rewritten.
    Applied,
    /// Nothing was rewritten; the text shows what to add manually.
    Fallback(String),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Adds a registration event handler to the first of `methods` that exists.
pub fn register_event_handler(
    workspace: &mut Workspace,
    registration: &RegistrationHandler,
    methods: &[String],
) -> Result<Outcome> {
    let code = workspace.prepare_registration_event_handler_code(registration)?;
    append_to_method_or_fallback(workspace, &code, methods)
}

/// Appends `code` to the first of `methods` found in the file.
pub fn append_to_method_or_fallback(
    workspace: &mut Workspace,
    code: &str,
    methods: &[String],
) -> Result<Outcome> {
    for method in methods {
        if workspace.append_code_to_method(code, method)? {
            debug!("Added code to {}()", method);
            return Ok(Outcome::Applied);
        }
    }
    debug!("None of {:?} found, falling back", methods);
    let fallback = format!(
        "{}{}",
        workspace.print_new_imports(),
        format_snippet(code, workspace.options())?
    );
    Ok(Outcome::Fallback(fallback))
}

/// Adds a module to the array returned by an application config file:
/// `'modules' => [id => Module::class]`, plus `'bootstrap' => [id]` when asked.
pub fn register_module(
    workspace: &mut Workspace,
    id: &str,
    module_class: &str,
    bootstrap: bool,
) -> Result<Outcome> {
    let class_name = workspace.import_class(module_class)?;
    let modules = ArrayMerge::new().nest(
        "modules",
        ArrayMerge::new().set(id, Expr::class_constant(&class_name)?),
    );
    let bootstrap_merge = ArrayMerge::new().nest("bootstrap", ArrayMerge::new().push(Expr::string(id)?));

    let mut found = false;
    {
        let mut visitor = NodeVisitor::first_match(
            |tree, node| tree.kind(node) == "return_statement" && tree.parent(node) == Some(tree.root()),
            |tree, node| {
                let Some(array) = returned_array(tree, node) else {
                    return Ok(());
                };
                found = true;
                Workspace::merge_into_array(tree, array, &modules)?;
                if bootstrap && !lists_string(tree, array, "bootstrap", id) {
                    Workspace::merge_into_array(tree, array, &bootstrap_merge)?;
                }
                Ok(())
            },
        );
        workspace.modify_code(&mut visitor)?;
    }
    if found {
        return Ok(Outcome::Applied);
    }

    let class = module_class.trim_start_matches('\\');
    let id = quote_string(id);
    let mut fallback = format!("'modules' => [\n    {id} => \\{class}::class,\n],");
    if bootstrap {
        fallback.push_str(&format!("\n'bootstrap' => [\n    {id},\n],"));
    }
    Ok(Outcome::Fallback(fallback))
}

/// Adds a component to the array returned by the class's `config()` method
/// and documents it as a `@property-read` on the class.
pub fn register_component(
    workspace: &mut Workspace,
    id: &str,
    component_class: &str,
) -> Result<Outcome> {
    let class_name = workspace.import_class(component_class)?;
    let merge = ArrayMerge::new().nest(
        "components",
        ArrayMerge::new().set(id, Expr::class_constant(&class_name)?),
    );

    let mut found = false;
    {
        let mut visitor = NodeVisitor::first_match(
            |tree, node| Workspace::is_method(tree, node, "config"),
            |tree, node| {
                let array = tree
                    .body_of(node)
                    .and_then(|body| {
                        tree.named_children(body)
                            .find(|statement| tree.kind(*statement) == "return_statement")
                    })
                    .and_then(|statement| returned_array(tree, statement));
                if let Some(array) = array {
                    found = true;
                    Workspace::merge_into_array(tree, array, &merge)?;
                }
                Ok(())
            },
        );
        workspace.modify_code(&mut visitor)?;
    }

    if !found {
        let quoted = quote_string(id);
        let snippet = format!(
            "public static function config(): array\n{{\n    return [\n        'components' => [\n            {quoted} => {class_name}::class,\n        ],\n    ];\n}}"
        );
        return Ok(Outcome::Fallback(format!("{}{snippet}", workspace.print_new_imports())));
    }

    let property = format!("@property-read {class_name} ${id}");
    if !workspace.code().contains(&property) {
        workspace.append_doc_comment_on_class(&property)?;
    }
    Ok(Outcome::Applied)
}

fn returned_array(tree: &SyntaxTree, statement: NodeId) -> Option<NodeId> {
    tree.named_children(statement)
        .find(|child| tree.kind(*child) != "comment")
        .filter(|expression| tree.kind(*expression) == "array_creation_expression")
}

/// Whether `array[key]` is a list already containing the string `value`.
fn lists_string(tree: &SyntaxTree, array: NodeId, key: &str, value: &str) -> bool {
    let Some(list) = tree
        .array_elements(array)
        .into_iter()
        .find(|element| tree.element_string_key(*element).as_deref() == Some(key))
        .and_then(|element| tree.element_value(element))
        .filter(|list| tree.kind(*list) == "array_creation_expression")
    else {
        return false;
    };
    tree.array_elements(list).into_iter().any(|element| {
        tree.element_value(element)
            .and_then(|node| tree.text(node))
            .and_then(crate::tree::string_literal_value)
            .is_some_and(|existing| existing == value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP_CONFIG: &str = "<?php\n\nuse craft\\helpers\\App;\n\nreturn [\n    'id' => App::env('CRAFT_APP_ID') ?: 'CraftCMS',\n];\n";

    const PLUGIN: &str = "<?php\n\nnamespace acme\\shop;\n\nuse craft\\base\\Plugin;\n\n/**\n * Shop plugin\n */\nclass Shop extends Plugin\n{\n    public static function config(): array\n    {\n        return [\n            'components' => [\n                // Define component configs here...\n            ],\n        ];\n    }\n}\n";

    fn methods() -> Vec<String> {
        vec!["attachEventHandlers".to_string(), "init".to_string()]
    }

    #[test]
    fn test_register_module() {
        let mut workspace = Workspace::new(APP_CONFIG);
        let outcome = register_module(&mut workspace, "foo", "modules\\foo\\Module", true).unwrap();
        assert!(outcome.is_applied());
        assert!(workspace.code().contains("use modules\\foo\\Module;\n"));
        assert!(workspace.code().contains("    'modules' => ['foo' => Module::class],\n"));
        assert!(workspace.code().contains("    'bootstrap' => ['foo'],\n"));

        // Registering again leaves the file as it is.
        let before = workspace.code().to_string();
        let outcome = register_module(&mut workspace, "foo", "modules\\foo\\Module", true).unwrap();
        assert!(outcome.is_applied());
        assert_eq!(workspace.code(), before);
    }

    #[test]
    fn test_register_module_fallback() {
        let mut workspace = Workspace::new("<?php\nnamespace app;\n\necho 'hi';\n");
        let outcome = register_module(&mut workspace, "foo", "modules\\foo\\Module", true).unwrap();
        assert_eq!(
            outcome,
            Outcome::Fallback(
                "'modules' => [\n    'foo' => \\modules\\foo\\Module::class,\n],\n'bootstrap' => [\n    'foo',\n],"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_register_component() {
        let mut workspace = Workspace::new(PLUGIN);
        let outcome = register_component(&mut workspace, "orders", "acme\\shop\\services\\Orders").unwrap();
        assert!(outcome.is_applied());
        let code = workspace.code();
        assert!(code.contains("use acme\\shop\\services\\Orders;\n"));
        assert!(code.contains("'orders' => Orders::class"));
        assert!(code.contains(" * Shop plugin\n *\n * @property-read Orders $orders\n */"));

        let before = code.to_string();
        register_component(&mut workspace, "orders", "acme\\shop\\services\\Orders").unwrap();
        assert_eq!(workspace.code(), before);
    }

    #[test]
    fn test_register_component_without_config_method() {
        let source = "<?php\n\nnamespace acme\\shop;\n\nclass Shop\n{\n}\n";
        let mut workspace = Workspace::new(source);
        let outcome = register_component(&mut workspace, "orders", "acme\\shop\\services\\Orders").unwrap();
        let Outcome::Fallback(text) = outcome else {
            panic!("expected a fallback");
        };
        assert!(text.starts_with("use acme\\shop\\services\\Orders;\n\n"));
        assert!(text.contains("public static function config(): array\n{"));
        assert!(text.contains("            'orders' => Orders::class,\n"));
    }

    #[test]
    fn test_register_event_handler_falls_back_without_methods() {
        let source = "<?php\n\nnamespace acme\\shop;\n\nclass Shop\n{\n}\n";
        let mut workspace = Workspace::new(source);
        let registration = RegistrationHandler::new(
            "craft\\services\\Fields",
            "EVENT_REGISTER_FIELD_TYPES",
            "acme\\shop\\fields\\Price",
        );
        let outcome = register_event_handler(&mut workspace, &registration, &methods()).unwrap();
        let Outcome::Fallback(text) = outcome else {
            panic!("expected a fallback");
        };
        assert!(text.contains("use acme\\shop\\fields\\Price;\n"));
        assert!(text.contains("$event->types[] = Price::class;"));
    }

    #[test]
    fn test_register_event_handler_applies_to_init() {
        let source = "<?php\n\nnamespace acme\\shop;\n\nclass Shop\n{\n    public function init(): void\n    {\n        parent::init();\n    }\n}\n";
        let mut workspace = Workspace::new(source);
        let registration = RegistrationHandler::new(
            "craft\\services\\Fields",
            "EVENT_REGISTER_FIELD_TYPES",
            "acme\\shop\\fields\\Price",
        );
        let outcome = register_event_handler(&mut workspace, &registration, &methods()).unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert!(workspace.code().contains("        parent::init();\n        Event::on(Fields::class"));
    }
}
