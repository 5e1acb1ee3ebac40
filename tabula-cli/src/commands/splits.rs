use super::Output;
use anyhow::{bail, Result};
use serde_json::json;
use tabula::compiler::SplitSpec;
use tabula::schema::to_string_binary;
use tabula::CompileContext;

/// Print the split keys an algorithm produces for `regions` regions.
pub fn run_splits(
    ctx: &CompileContext,
    algorithm: Option<&str>,
    regions: Option<i64>,
    list: bool,
    output: Output,
) -> Result<()> {
    if list {
        let names = ctx.partitioners().names();
        if output.json {
            return output.print_json(&names);
        }
        for name in names {
            println!("{}", name);
        }
        return Ok(());
    }

    let (algorithm, count) = match (algorithm, regions) {
        (Some(a), Some(n)) => (a, n),
        _ => bail!("Both --algorithm and --regions are required (or pass --list)"),
    };
    let spec = SplitSpec::Algorithmic {
        count,
        algorithm: algorithm.to_string(),
    };
    let keys: Vec<String> = spec.resolve(ctx)?.iter().map(|k| to_string_binary(k)).collect();

    if output.json {
        return output.print_json(&json!({
            "algorithm": algorithm,
            "regions": count,
            "splits": keys,
        }));
    }
    for key in &keys {
        println!("{}", key);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_both_flags() {
        let ctx = CompileContext::new();
        let out = Output { json: false };
        assert!(run_splits(&ctx, Some("HexStringSplit"), None, false, out).is_err());
        assert!(run_splits(&ctx, None, Some(4), false, out).is_err());
        assert!(run_splits(&ctx, None, None, true, out).is_ok());
    }

    #[test]
    fn test_rejects_unknown_algorithm() {
        let ctx = CompileContext::new();
        let out = Output { json: true };
        assert!(run_splits(&ctx, Some("NoSuchSplit"), Some(4), false, out).is_err());
    }

    #[test]
    fn test_rejects_oversized_region_count() {
        let ctx = CompileContext::new();
        let out = Output { json: true };
        assert!(run_splits(&ctx, Some("UniformSplit"), Some(i64::MAX), false, out).is_err());
    }
}
