use anyhow::Result;
use clap::Args;
use craftgen_core::{MethodSpec, Parameter, Visibility};
use std::path::PathBuf;

use crate::utils::PhpFile;

#[derive(Args, Debug)]
pub struct AddMethodArgs {
    /// PHP file to edit
    pub file: PathBuf,

    /// Method name
    pub name: String,

    /// public, protected or private
    #[arg(long, default_value = "public")]
    pub visibility: Visibility,

    #[arg(long = "static")]
    pub is_static: bool,

    /// Parameter as `[type ]$name[ = default]`; repeatable
    #[arg(short, long = "param")]
    pub params: Vec<Parameter>,

    /// Return type
    #[arg(short, long)]
    pub returns: Option<String>,

    /// Doc comment text
    #[arg(short, long)]
    pub doc: Option<String>,

    /// Method body
    #[arg(short, long, default_value = "")]
    pub body: String,

    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl AddMethodArgs {
    pub fn to_method(&self) -> MethodSpec {
        let mut method = MethodSpec::new(&self.name)
            .visibility(self.visibility)
            .set_static(self.is_static)
            .body(&self.body);
        for parameter in &self.params {
            method = method.parameter(parameter.clone());
        }
        if let Some(returns) = &self.returns {
            method = method.returns(returns);
        }
        if let Some(doc) = &self.doc {
            method = method.doc(doc);
        }
        method
    }
}

pub fn add_method_command(args: AddMethodArgs) -> Result<()> {
    let method = args.to_method();
    let mut file = PhpFile::open(&args.file)?;
    if !file.workspace.append_method_to_class(&method)? {
        eprintln!("⚠️  No class found in {}. Add this method manually:\n", args.file.display());
        println!("{}", method.render());
        return Ok(());
    }
    file.finish(args.dry_run)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: AddMethodArgs,
    }

    #[test]
    fn test_to_method() {
        let wrapper = Wrapper::try_parse_from([
            "add-method",
            "Foo.php",
            "bar",
            "--visibility",
            "protected",
            "--param",
            "int $count = 1",
            "--returns",
            "string",
            "--body",
            "return 'bar';",
        ])
        .unwrap();
        let method = wrapper.args.to_method();
        assert_eq!(
            method.render(),
            "protected function bar(int $count = 1): string\n{\n    return 'bar';\n}"
        );
    }
}
