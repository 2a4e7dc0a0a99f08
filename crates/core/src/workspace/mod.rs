//! One PHP file's source text and the rewrites that can be applied to it
//!
//! Every structural operation goes through [`Workspace::modify_code`]: parse
//! the current text, clone the tree, run a visitor over the clone and, when
//! its standard print differs from the original one, re-print the clone in
//! format-preserving mode. Operations report `Ok(false)` when their target
//! node does not exist.

mod events;
mod imports;
mod merge;

pub use events::{EventHandler, RegistrationHandler, DEFAULT_REGISTRATION_EVENT_CLASS};
pub use imports::Import;
pub use merge::{ArrayMerge, MergeKey, MergeValue};

use crate::{
    code::{format_doc_comment, unformat_doc_comment},
    config::Config,
    error::Result,
    method::MethodSpec,
    printer::{print_format_preserving, print_node, PrintOptions},
    snippet::Snippet,
    tree::{NodeId, SyntaxTree},
    visitor::{traverse, NodeVisitor, Visitor},
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Workspace {
    code: String,
    new_imports: Vec<Import>,
    options: PrintOptions,
    base_event_class: String,
}

impl Workspace {
    pub fn new(code: impl Into<String>) -> Self {
        Self::with_config(code, &Config::default())
    }

    pub fn with_config(code: impl Into<String>, config: &Config) -> Self {
        Self {
            code: code.into(),
            new_imports: Vec::new(),
            options: PrintOptions::from(config),
            base_event_class: config.event_class.clone(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn into_code(self) -> String {
        self.code
    }

    pub fn options(&self) -> &PrintOptions {
        &self.options
    }

    /// Imports added by [`Workspace::import_class`] since construction.
    pub fn new_imports(&self) -> &[Import] {
        &self.new_imports
    }

    /// Runs `visitor` over a clone of the parsed file. Returns whether the code changed.
    pub fn modify_code(&mut self, visitor: &mut dyn Visitor) -> Result<bool> {
        let old = SyntaxTree::parse(&self.code)?;
        let mut new = old.clone();
        let old_print = print_node(&new, new.root(), &self.options);

        traverse(&mut new, visitor)?;

        if print_node(&new, new.root(), &self.options) == old_print {
            debug!("Visitor left the code unchanged");
            return Ok(false);
        }

        self.code = print_format_preserving(&old, &new, &self.options);
        debug!("Rewrote code ({} bytes)", self.code.len());
        Ok(true)
    }

    /// Appends class members (methods, properties, constants, trait uses) to
    /// the first class in the file.
    pub fn append_code_to_class(&mut self, code: &str) -> Result<bool> {
        let snippet = Snippet::parse_members(code)?;
        self.append_snippet(&snippet, |tree, id| Self::is_class(tree, id))
    }

    pub fn append_method_to_class(&mut self, method: &MethodSpec) -> Result<bool> {
        self.append_code_to_class(&method.render())
    }

    /// Appends statements to the end of the named method's body.
    pub fn append_code_to_method(&mut self, code: &str, method: &str) -> Result<bool> {
        let snippet = Snippet::parse(code)?;
        self.append_snippet(&snippet, |tree, id| Self::is_method(tree, id, method))
    }

    fn append_snippet(
        &mut self,
        snippet: &Snippet,
        predicate: impl Fn(&SyntaxTree, NodeId) -> bool,
    ) -> Result<bool> {
        let mut visitor = NodeVisitor::first_match(
            |tree, id| predicate(tree, id) && tree.body_of(id).is_some(),
            |tree, id| {
                if let Some(body) = tree.body_of(id) {
                    let statements: Vec<NodeId> = snippet
                        .statements()
                        .iter()
                        .map(|statement| tree.graft(snippet.tree(), *statement))
                        .collect();
                    debug!("Appending {} node(s) to {}", statements.len(), tree.kind(id));
                    tree.append_to_body(body, &statements);
                }
                Ok(())
            },
        );
        self.modify_code(&mut visitor)
    }

    pub fn set_doc_comment_on_class(&mut self, comment: &str) -> Result<bool> {
        self.modify_doc_comment(|tree, id| Self::is_class(tree, id), |_| comment.to_string())
    }

    pub fn append_doc_comment_on_class(&mut self, comment: &str) -> Result<bool> {
        self.modify_doc_comment(
            |tree, id| Self::is_class(tree, id),
            |existing| join_doc_text(existing, comment),
        )
    }

    pub fn set_doc_comment_on_method(&mut self, comment: &str, method: &str) -> Result<bool> {
        self.modify_doc_comment(
            |tree, id| Self::is_method(tree, id, method),
            |_| comment.to_string(),
        )
    }

    pub fn append_doc_comment_on_method(&mut self, comment: &str, method: &str) -> Result<bool> {
        self.modify_doc_comment(
            |tree, id| Self::is_method(tree, id, method),
            |existing| join_doc_text(existing, comment),
        )
    }

    fn modify_doc_comment(
        &mut self,
        predicate: impl Fn(&SyntaxTree, NodeId) -> bool,
        modify: impl Fn(&str) -> String,
    ) -> Result<bool> {
        let mut visitor = NodeVisitor::first_match(predicate, |tree, id| {
            let existing = tree.doc_comment_of(id);
            let text = existing
                .and_then(|comment| tree.text(comment))
                .map(unformat_doc_comment)
                .unwrap_or_default();
            let comment = format_doc_comment(&modify(&text));

            match existing {
                Some(old) if comment.is_empty() => {
                    tree.remove_node(old);
                }
                Some(old) => {
                    let fresh = tree.push_leaf("comment", true, comment);
                    tree.replace_node(old, fresh);
                }
                None if comment.is_empty() => {}
                None => {
                    if let (Some(parent), Some(index)) = (tree.parent(id), tree.position_in_parent(id)) {
                        let fresh = tree.push_leaf("comment", true, comment);
                        tree.insert_child(parent, index, fresh);
                    }
                }
            }
            Ok(())
        });
        self.modify_code(&mut visitor)
    }

    pub fn is_class(tree: &SyntaxTree, id: NodeId) -> bool {
        tree.kind(id) == "class_declaration"
    }

    pub fn is_method(tree: &SyntaxTree, id: NodeId, method: &str) -> bool {
        tree.kind(id) == "method_declaration" && tree.name_of(id) == Some(method)
    }
}

/// Adds a paragraph to doc comment text. Consecutive `@` tags stay on
/// adjacent lines.
fn join_doc_text(existing: &str, addition: &str) -> String {
    let existing = existing.trim_end();
    if existing.is_empty() {
        return addition.to_string();
    }
    let last_is_tag = existing
        .lines()
        .last()
        .is_some_and(|line| line.trim_start().starts_with('@'));
    let separator = if last_is_tag && addition.trim_start().starts_with('@') {
        "\n"
    } else {
        "\n\n"
    };
    format!("{existing}{separator}{addition}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Visibility;

    const PLUGIN: &str = r#"<?php

namespace modules\foo;

use Craft;
use yii\base\Module as BaseModule;

/**
 * Foo module
 */
class Foo extends BaseModule
{
    public function init(): void
    {
        parent::init();

        // Defer most setup tasks
        Craft::$app->onInit(function() {
            $this->attachEventHandlers();
        });
    }

    private function attachEventHandlers(): void
    {
        // Register event handlers here ...
    }
}
"#;

    #[test]
    fn test_append_code_to_method() {
        let mut workspace = Workspace::new(PLUGIN);
        assert!(workspace.append_code_to_method("$this->foo();", "attachEventHandlers").unwrap());
        let expected = PLUGIN.replace(
            "        // Register event handlers here ...\n",
            "        // Register event handlers here ...\n        $this->foo();\n",
        );
        assert_eq!(workspace.code(), expected);
    }

    #[test]
    fn test_appended_multiline_string_keeps_its_value() {
        let mut workspace = Workspace::new(PLUGIN);
        assert!(workspace.append_code_to_method("$x = 'a\nb';", "init").unwrap());
        assert!(workspace.code().contains("'a\nb'"));
        assert!(workspace.code().contains("        });\n        $x = 'a\nb';\n    }\n"));
    }

    #[test]
    fn test_missing_method_is_not_an_error() {
        let mut workspace = Workspace::new(PLUGIN);
        assert!(!workspace.append_code_to_method("$this->foo();", "nope").unwrap());
        assert_eq!(workspace.code(), PLUGIN);
    }

    #[test]
    fn test_append_method_to_class() {
        let mut workspace = Workspace::new(PLUGIN);
        let method = MethodSpec::new("bar")
            .visibility(Visibility::Protected)
            .returns("string")
            .doc("Returns bar.")
            .body("return 'bar';");
        assert!(workspace.append_method_to_class(&method).unwrap());
        let expected = PLUGIN.replace(
            "        // Register event handlers here ...\n    }\n}\n",
            "        // Register event handlers here ...\n    }\n\n    /**\n     * Returns bar.\n     */\n    protected function bar(): string\n    {\n        return 'bar';\n    }\n}\n",
        );
        assert_eq!(workspace.code(), expected);
    }

    #[test]
    fn test_append_code_to_class_without_class() {
        let mut workspace = Workspace::new("<?php\nreturn [];\n");
        assert!(!workspace.append_code_to_class("public $foo;").unwrap());
    }

    #[test]
    fn test_append_doc_comment_on_class() {
        let mut workspace = Workspace::new(PLUGIN);
        assert!(workspace.append_doc_comment_on_class("@property-read Bar $bar").unwrap());
        assert!(workspace.append_doc_comment_on_class("@property-read Baz $baz").unwrap());
        let expected = PLUGIN.replace(
            "/**\n * Foo module\n */",
            "/**\n * Foo module\n *\n * @property-read Bar $bar\n * @property-read Baz $baz\n */",
        );
        assert_eq!(workspace.code(), expected);
    }

    #[test]
    fn test_set_doc_comment_on_method_without_comment() {
        let mut workspace = Workspace::new(PLUGIN);
        assert!(workspace.set_doc_comment_on_method("@inheritdoc", "init").unwrap());
        let expected = PLUGIN.replace(
            "{\n    public function init(): void",
            "{\n    /**\n     * @inheritdoc\n     */\n    public function init(): void",
        );
        assert_eq!(workspace.code(), expected);

        // Setting the same text again is a no-op.
        assert!(!workspace.set_doc_comment_on_method("@inheritdoc", "init").unwrap());
        assert!(!workspace.set_doc_comment_on_method("@inheritdoc", "missing").unwrap());
    }

    #[test]
    fn test_append_doc_comment_on_method() {
        let mut workspace = Workspace::new(PLUGIN);
        assert!(workspace.append_doc_comment_on_method("Initializes the module.", "init").unwrap());
        assert!(workspace.code().contains("    /**\n     * Initializes the module.\n     */\n    public function init()"));
    }

    #[test]
    fn test_syntax_error_propagates() {
        let mut workspace = Workspace::new("<?php\nclass {");
        let err = workspace.append_code_to_class("public $a;").unwrap_err();
        assert!(err.is_syntax_error());
    }

    #[test]
    fn test_join_doc_text() {
        assert_eq!(join_doc_text("", "@a"), "@a");
        assert_eq!(join_doc_text("Docs", "@a"), "Docs\n\n@a");
        assert_eq!(join_doc_text("Docs\n\n@a", "@b"), "Docs\n\n@a\n@b");
        assert_eq!(join_doc_text("@a", "More"), "@a\n\nMore");
    }
}
