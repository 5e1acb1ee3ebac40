pub mod namespace;
pub mod splits;
pub mod table;

pub use namespace::{run_alter_namespace, run_create_namespace, run_describe_namespace};
pub use splits::run_splits;
pub use table::{run_alter, run_create, run_describe, run_list};

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tabula::Arg;

/// How results are printed
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Collect arguments from an optional file followed by inline YAML values.
///
/// The file holds a YAML (or JSON) list; each inline value is one argument,
/// either a bare family name or a mapping.
pub fn load_args(inline: &[String], file: Option<&Path>) -> Result<Vec<Arg>> {
    let mut args = Vec::new();
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read arguments from {:?}", path))?;
        let from_file: Vec<Arg> = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse arguments in {:?}", path))?;
        args.extend(from_file);
    }
    for raw in inline {
        let arg: Arg = serde_yaml::from_str(raw)
            .with_context(|| format!("Invalid argument '{}'", raw))?;
        args.push(arg);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tabula::PropertyBag;

    #[test]
    fn test_inline_args() {
        let args = load_args(
            &["cf1".to_string(), "{NAME: cf2, VERSIONS: 3}".to_string()],
            None,
        )
        .unwrap();
        assert_eq!(args[0], Arg::name("cf1"));
        assert_eq!(
            args[1],
            Arg::Bag(PropertyBag::new().with("NAME", "cf2").with("VERSIONS", 3))
        );
    }

    #[test]
    fn test_file_args_come_first() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "- NAME: cf1\n  TTL: 100\n- SPLITS: [a, m, z]").unwrap();
        let args = load_args(&["cf2".to_string()], Some(file.path())).unwrap();
        assert_eq!(args.len(), 3);
        assert_eq!(args[2], Arg::name("cf2"));
    }

    #[test]
    fn test_invalid_inline_arg() {
        assert!(load_args(&["{NAME: [".to_string()], None).is_err());
    }
}
