//! Structured description of a method to add to a class

use crate::{
    code::format_doc_comment,
    error::{Error, Result},
};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

impl FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "protected" => Ok(Visibility::Protected),
            "private" => Ok(Visibility::Private),
            other => Err(Error::InvalidInput(format!("Unknown visibility: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_hint: Option<String>,
    pub default: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim_start_matches('$').to_string(),
            type_hint: None,
            default: None,
        }
    }

    pub fn with_type(mut self, type_hint: impl Into<String>) -> Self {
        self.type_hint = Some(type_hint.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(type_hint) = &self.type_hint {
            write!(f, "{type_hint} ")?;
        }
        write!(f, "${}", self.name)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

/// Parses `[type ]$name[ = default]`.
impl FromStr for Parameter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (declaration, default) = match s.split_once('=') {
            Some((declaration, default)) => (declaration.trim(), Some(default.trim())),
            None => (s.trim(), None),
        };
        let (type_hint, name) = match declaration.rsplit_once(char::is_whitespace) {
            Some((type_hint, name)) => (Some(type_hint.trim()), name),
            None => (None, declaration),
        };
        if !name.starts_with('$') || name.len() < 2 {
            return Err(Error::InvalidInput(format!("Invalid parameter: `{s}`")));
        }
        let mut parameter = Parameter::new(name);
        parameter.type_hint = type_hint.filter(|t| !t.is_empty()).map(str::to_string);
        parameter.default = default.filter(|d| !d.is_empty()).map(str::to_string);
        Ok(parameter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodSpec {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub doc_comment: Option<String>,
    pub body: String,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn set_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn doc(mut self, doc_comment: impl Into<String>) -> Self {
        self.doc_comment = Some(doc_comment.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// PHP source of the method as a class member.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(doc) = &self.doc_comment {
            let doc = format_doc_comment(doc);
            if !doc.is_empty() {
                out.push_str(&doc);
                out.push('\n');
            }
        }

        out.push_str(&self.visibility.to_string());
        if self.is_static {
            out.push_str(" static");
        }
        let parameters = self
            .parameters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(" function {}({parameters})", self.name));
        if let Some(return_type) = &self.return_type {
            out.push_str(&format!(": {return_type}"));
        }

        out.push_str("\n{\n");
        for line in self.body.trim().lines() {
            if !line.trim().is_empty() {
                out.push_str("    ");
                out.push_str(line);
            }
            out.push('\n');
        }
        out.push('}');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_from_str() {
        let parameter: Parameter = "?string $id = null".parse().unwrap();
        assert_eq!(parameter.type_hint.as_deref(), Some("?string"));
        assert_eq!(parameter.name, "id");
        assert_eq!(parameter.default.as_deref(), Some("null"));
        assert_eq!(parameter.to_string(), "?string $id = null");

        let parameter: Parameter = "$event".parse().unwrap();
        assert_eq!(parameter.to_string(), "$event");

        assert!("id".parse::<Parameter>().is_err());
    }

    #[test]
    fn test_render() {
        let method = MethodSpec::new("config")
            .set_static(true)
            .returns("array")
            .doc("@inheritdoc")
            .body("return [\n    'components' => [],\n];");
        assert_eq!(
            method.render(),
            "/**\n * @inheritdoc\n */\npublic static function config(): array\n{\n    return [\n        'components' => [],\n    ];\n}"
        );
    }

    #[test]
    fn test_render_empty_body() {
        let method = MethodSpec::new("init")
            .visibility(Visibility::Protected)
            .parameter(Parameter::new("$a").with_type("int").with_default("1"));
        assert_eq!(method.render(), "protected function init(int $a = 1)\n{\n}");
    }
}
