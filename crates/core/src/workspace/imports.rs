use super::Workspace;
use crate::{
    code::class_name,
    error::Result,
    parser::utils::line_indent,
    tree::{NodeId, SyntaxTree},
};
use std::{collections::HashSet, ops::Range};
use tracing::debug;

/// A `use` statement importing one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub class: String,
    pub alias: Option<String>,
}

impl Import {
    pub fn new(class: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            class: class.into().trim_start_matches('\\').to_string(),
            alias,
        }
    }

    /// The name the class is referred to by: its alias or its short name.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| class_name(&self.class))
    }

    pub fn render(&self) -> String {
        match &self.alias {
            Some(alias) => format!("use {} as {alias};", self.class),
            None => format!("use {};", self.class),
        }
    }
}

/// One `use` declaration inside an import block.
struct UseStatement {
    /// Path of the first imported name, used for sorting.
    sort_key: String,
    text: String,
    /// Class imports made by this statement; empty for `use function`/`use const`.
    imports: Vec<Import>,
}

/// The first run of consecutive `use` declarations at the top level of the
/// file or of a namespace body. New imports are spliced into this run.
struct ImportBlock {
    span: Range<usize>,
    indent: String,
    statements: Vec<UseStatement>,
    /// Class imports of every `use` declaration in the same scope, including
    /// ones separated from the run by comments or code.
    imports: Vec<Import>,
}

impl ImportBlock {
    fn find(tree: &SyntaxTree) -> Option<Self> {
        let root = tree.root();
        let mut containers = vec![root];
        containers.extend(
            tree.named_children(root)
                .filter(|id| tree.kind(*id) == "namespace_definition")
                .filter_map(|namespace| tree.body_of(namespace)),
        );

        containers.into_iter().find_map(|container| {
            let run: Vec<NodeId> = tree
                .children(container)
                .iter()
                .copied()
                .skip_while(|id| tree.kind(*id) != "namespace_use_declaration")
                .take_while(|id| tree.kind(*id) == "namespace_use_declaration")
                .collect();
            let first = tree.span(*run.first()?)?;
            let last = tree.span(*run.last()?)?;
            let source = tree.source();
            let imports = tree
                .children(container)
                .iter()
                .filter(|id| tree.kind(**id) == "namespace_use_declaration")
                .filter_map(|id| use_statement(tree, *id))
                .flat_map(|statement| statement.imports)
                .collect();
            Some(Self {
                span: first.start..last.end,
                indent: line_indent(source, first.start).to_string(),
                statements: run
                    .iter()
                    .filter_map(|id| use_statement(tree, *id))
                    .collect(),
                imports,
            })
        })
    }

    fn imports(&self) -> impl Iterator<Item = &Import> {
        self.imports.iter()
    }
}

fn use_statement(tree: &SyntaxTree, id: NodeId) -> Option<UseStatement> {
    let span = tree.span(id)?;
    let text = tree.source()[span].to_string();
    let children = tree.children(id);
    let is_class_import = !children
        .iter()
        .any(|child| matches!(tree.text(*child), Some(keyword) if keyword.eq_ignore_ascii_case("function") || keyword.eq_ignore_ascii_case("const")));

    // `use Foo\{Bar, Baz as Qux};`
    let prefix = children
        .iter()
        .find(|child| tree.kind(**child) == "namespace_name")
        .and_then(|child| tree.text(*child))
        .map(|prefix| prefix.trim_matches('\\').to_string());

    let paths: Vec<Import> = tree
        .descendants(id)
        .into_iter()
        .filter(|node| matches!(tree.kind(*node), "namespace_use_clause" | "namespace_use_group_clause"))
        .filter_map(|clause| use_clause(tree, clause, prefix.as_deref()))
        .collect();

    Some(UseStatement {
        sort_key: paths.first().map(|import| import.class.clone()).unwrap_or_default(),
        text,
        imports: if is_class_import { paths } else { Vec::new() },
    })
}

fn use_clause(tree: &SyntaxTree, clause: NodeId, prefix: Option<&str>) -> Option<Import> {
    let leaves: Vec<NodeId> = tree
        .descendants(clause)
        .into_iter()
        .filter(|id| tree.node(*id).is_leaf())
        .collect();
    let path = leaves
        .iter()
        .find(|id| matches!(tree.kind(**id), "name" | "qualified_name" | "namespace_name"))
        .and_then(|id| tree.text(*id))?;
    let alias = leaves
        .iter()
        .skip_while(|id| !tree.text(**id).is_some_and(|text| text.eq_ignore_ascii_case("as")))
        .find(|id| tree.kind(**id) == "name")
        .and_then(|id| tree.text(*id))
        .map(str::to_string);
    let class = match prefix {
        Some(prefix) => format!("{prefix}\\{}", path.trim_start_matches('\\')),
        None => path.to_string(),
    };
    Some(Import::new(class, alias))
}

/// `Name`, `NameAlias`, `NameAlias2`, ... whichever is free first.
fn free_local_name(short_name: &str, taken: &HashSet<String>) -> String {
    (0..)
        .map(|count| match count {
            0 => short_name.to_string(),
            1 => format!("{short_name}Alias"),
            n => format!("{short_name}Alias{n}"),
        })
        .find(|candidate| !taken.contains(&candidate.to_ascii_lowercase()))
        .unwrap_or_else(|| short_name.to_string())
}

impl Workspace {
    /// Makes sure `class` is imported and returns the name code should use
    /// for it. Files with neither an import block nor a namespace get the
    /// fully qualified `\Name` back and are left untouched.
    pub fn import_class(&mut self, class: &str) -> Result<String> {
        let class = class.trim_start_matches('\\');
        let short_name = class_name(class);
        let tree = SyntaxTree::parse(&self.code)?;
        let block = ImportBlock::find(&tree);

        if let Some(existing) = block
            .as_ref()
            .and_then(|block| block.imports().find(|import| import.class.eq_ignore_ascii_case(class)))
        {
            debug!("{} is already imported as {}", class, existing.local_name());
            return Ok(existing.local_name().to_string());
        }

        let mut taken: HashSet<String> = block
            .iter()
            .flat_map(|block| block.imports())
            .map(|import| import.local_name().to_ascii_lowercase())
            .collect();
        if let Some(declared) = tree.declared_type_name() {
            taken.insert(declared.to_ascii_lowercase());
        }
        let local_name = free_local_name(short_name, &taken);
        let import = Import::new(class, (local_name != short_name).then(|| local_name.clone()));

        match block {
            Some(block) => {
                let mut statements: Vec<(String, String)> = block
                    .statements
                    .into_iter()
                    .map(|statement| (statement.sort_key, statement.text))
                    .collect();
                statements.push((import.class.clone(), import.render()));
                statements.sort_by(|a, b| a.0.cmp(&b.0));
                let separator = format!("\n{}", block.indent);
                let text = statements
                    .into_iter()
                    .map(|(_, text)| text)
                    .collect::<Vec<_>>()
                    .join(&separator);
                self.code.replace_range(block.span, &text);
            }
            None => {
                let Some((offset, text)) = self.namespace_insertion(&tree, &import) else {
                    debug!("No namespace declaration; referring to {} by its full name", class);
                    return Ok(format!("\\{class}"));
                };
                self.code.insert_str(offset, &text);
            }
        }

        debug!("Imported {} as {}", class, local_name);
        self.new_imports.push(import);
        Ok(local_name)
    }

    /// Where a first `use` statement goes: after `namespace x;`, or at the top
    /// of a braced namespace body.
    fn namespace_insertion(&self, tree: &SyntaxTree, import: &Import) -> Option<(usize, String)> {
        let namespace = tree
            .named_children(tree.root())
            .find(|id| tree.kind(*id) == "namespace_definition")?;
        match tree.body_of(namespace) {
            Some(body) => {
                let open = tree
                    .children(body)
                    .iter()
                    .find(|child| tree.text(**child) == Some("{"))
                    .and_then(|open| tree.span(*open))?;
                let indent = self.options.indent_unit();
                Some((open.end, format!("\n{indent}{}\n", import.render())))
            }
            None => {
                let span = tree.span(namespace)?;
                Some((span.end, format!("\n\n{}", import.render())))
            }
        }
    }

    /// The imports added by this workspace, sorted, followed by a blank line;
    /// empty when nothing was imported.
    pub fn print_new_imports(&self) -> String {
        if self.new_imports.is_empty() {
            return String::new();
        }
        let mut imports = self.new_imports.clone();
        imports.sort_by(|a, b| a.class.cmp(&b.class));
        let lines: Vec<String> = imports.iter().map(Import::render).collect();
        format!("{}\n\n", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "<?php\n\nnamespace modules\\foo;\n\nuse Craft;\nuse yii\\base\\Module as BaseModule;\n\nclass Foo extends BaseModule\n{\n}\n";

    #[test]
    fn test_import_inserts_sorted() {
        let mut workspace = Workspace::new(FILE);
        assert_eq!(workspace.import_class("craft\\base\\Event").unwrap(), "Event");
        assert_eq!(
            workspace.code(),
            "<?php\n\nnamespace modules\\foo;\n\nuse Craft;\nuse craft\\base\\Event;\nuse yii\\base\\Module as BaseModule;\n\nclass Foo extends BaseModule\n{\n}\n"
        );
        assert_eq!(workspace.new_imports(), &[Import::new("craft\\base\\Event", None)]);
    }

    #[test]
    fn test_existing_import_is_reused() {
        let mut workspace = Workspace::new(FILE);
        assert_eq!(workspace.import_class("\\yii\\base\\Module").unwrap(), "BaseModule");
        assert_eq!(workspace.import_class("Craft").unwrap(), "Craft");
        assert_eq!(workspace.code(), FILE);
        assert!(workspace.new_imports().is_empty());
        assert_eq!(workspace.print_new_imports(), "");
    }

    #[test]
    fn test_declared_class_collision() {
        let mut workspace = Workspace::new(FILE);
        assert_eq!(workspace.import_class("other\\Foo").unwrap(), "FooAlias");
        assert!(workspace.code().contains("use other\\Foo as FooAlias;\n"));
    }

    #[test]
    fn test_alias_counter() {
        let source = "<?php\nnamespace app;\n\nuse A\\Widget;\nuse B\\Widget as WidgetAlias;\n";
        let mut workspace = Workspace::new(source);
        assert_eq!(workspace.import_class("C\\Widget").unwrap(), "WidgetAlias2");
        assert_eq!(workspace.import_class("D\\widget").unwrap(), "widgetAlias3");
    }

    #[test]
    fn test_imports_after_a_comment_are_taken() {
        let source = "<?php\nnamespace app;\n\nuse A\\Widget;\n// helpers\nuse B\\Thing;\n\nclass Page\n{\n}\n";
        let mut workspace = Workspace::new(source);
        assert_eq!(workspace.import_class("B\\Thing").unwrap(), "Thing");
        assert_eq!(workspace.code(), source);

        assert_eq!(workspace.import_class("C\\Thing").unwrap(), "ThingAlias");
        assert_eq!(
            workspace.code(),
            "<?php\nnamespace app;\n\nuse A\\Widget;\nuse C\\Thing as ThingAlias;\n// helpers\nuse B\\Thing;\n\nclass Page\n{\n}\n"
        );
    }

    #[test]
    fn test_no_block_inserts_after_namespace() {
        let mut workspace = Workspace::new("<?php\nnamespace app;\n\nclass Foo\n{\n}\n");
        assert_eq!(workspace.import_class("craft\\base\\Model").unwrap(), "Model");
        assert_eq!(
            workspace.code(),
            "<?php\nnamespace app;\n\nuse craft\\base\\Model;\n\nclass Foo\n{\n}\n"
        );
    }

    #[test]
    fn test_braced_namespace() {
        let mut workspace = Workspace::new("<?php\nnamespace app {\n    class Foo {}\n}\n");
        assert_eq!(workspace.import_class("craft\\base\\Model").unwrap(), "Model");
        assert_eq!(
            workspace.code(),
            "<?php\nnamespace app {\n    use craft\\base\\Model;\n\n    class Foo {}\n}\n"
        );
        assert_eq!(workspace.import_class("craft\\base\\Component").unwrap(), "Component");
        assert!(workspace
            .code()
            .contains("    use craft\\base\\Component;\n    use craft\\base\\Model;\n"));
    }

    #[test]
    fn test_no_namespace_returns_fully_qualified_name() {
        let source = "<?php\nreturn [];\n";
        let mut workspace = Workspace::new(source);
        assert_eq!(workspace.import_class("modules\\Module").unwrap(), "\\modules\\Module");
        assert_eq!(workspace.code(), source);
        assert!(workspace.new_imports().is_empty());
    }

    #[test]
    fn test_trait_use_is_not_an_import() {
        let source = "<?php\nnamespace app;\n\nclass Foo\n{\n    use Bar;\n}\n";
        let mut workspace = Workspace::new(source);
        assert_eq!(workspace.import_class("x\\Bar").unwrap(), "Bar");
        assert!(workspace.code().starts_with("<?php\nnamespace app;\n\nuse x\\Bar;\n\nclass Foo"));
    }

    #[test]
    fn test_group_and_function_imports() {
        let source = "<?php\nnamespace app;\n\nuse function strlen;\nuse x\\{Bar, Baz as Qux};\n";
        let mut workspace = Workspace::new(source);
        assert_eq!(workspace.import_class("x\\Baz").unwrap(), "Qux");
        assert_eq!(workspace.import_class("y\\Qux").unwrap(), "QuxAlias");
        assert_eq!(workspace.import_class("y\\strlen").unwrap(), "strlen");
    }

    #[test]
    fn test_print_new_imports() {
        let mut workspace = Workspace::new(FILE);
        workspace.import_class("zed\\Zed").unwrap();
        workspace.import_class("alpha\\Foo").unwrap();
        assert_eq!(
            workspace.print_new_imports(),
            "use alpha\\Foo as FooAlias;\nuse zed\\Zed;\n\n"
        );
    }
}
