//! Compile `create` arguments into a table descriptor and split keys.

use super::split::{conflicting_modes, signalled_modes};
use super::{emit_all, CompileContext, FamilyChanges, SchemaWarning, SplitSpec, TableChanges};
use crate::descriptor::{TableDescriptor, TableName};
use crate::metrics;
use crate::schema::bag::coerce_string;
use crate::schema::{keys, Arg, PropertyBag};
use crate::{Error, Result};
use tracing::debug;

/// Everything needed to submit a create request.
#[derive(Debug, Clone)]
pub struct CreateTablePlan {
    pub descriptor: TableDescriptor,
    pub split_spec: Option<SplitSpec>,
    pub splits: Vec<Vec<u8>>,
    pub warnings: Vec<SchemaWarning>,
}

/// Compile a create call. Bags with `NAME` (and bare strings) define
/// families; the rest carry table attributes and split options. A table
/// bag may say `METHOD => 'table_att'`; any other method is rejected.
///
/// A family named twice keeps only its last definition, built from
/// defaults.
pub fn compile_create(table: &str, args: &[Arg], ctx: &CompileContext) -> Result<CreateTablePlan> {
    let result = compile(table, args, ctx);
    metrics::record_compile("create", &result);
    if let Ok(ref plan) = result {
        emit_all(&plan.warnings);
    }
    result
}

fn compile(table: &str, args: &[Arg], ctx: &CompileContext) -> Result<CreateTablePlan> {
    let name = TableName::parse(table)?;
    let mut descriptor = TableDescriptor::new(name);
    let mut warnings = Vec::new();
    let mut split_spec: Option<SplitSpec> = None;
    let mut table_changes = Vec::new();

    check_split_modes(args)?;

    for arg in args {
        let family = match arg {
            Arg::Name(name) => Some(FamilyChanges::from_name(name)?),
            Arg::Bag(bag) if bag.contains_key(keys::NAME) => {
                let (changes, family_warnings) = FamilyChanges::parse(bag, ctx)?;
                warnings.extend(family_warnings);
                Some(changes)
            }
            Arg::Bag(bag) => {
                if let Some(spec) = SplitSpec::from_bag(bag)? {
                    if split_spec.is_some() {
                        return Err(conflicting_modes());
                    }
                    split_spec = Some(spec);
                }
                check_table_method(bag)?;
                let (changes, table_warnings) = TableChanges::parse(bag, TABLE_BAG_KEYS)?;
                warnings.extend(table_warnings);
                table_changes.push(changes);
                None
            }
        };

        if let Some(changes) = family {
            debug!(family = %changes.name, settings = changes.settings.len(), "column family defined");
            if descriptor.upsert_family(changes.build()).is_some() {
                warnings.push(SchemaWarning::FamilyReplaced {
                    family: changes.name.clone(),
                });
            }
        }
    }

    if descriptor.families().is_empty() {
        return Err(Error::NoColumnFamilyDefined(descriptor.name.to_string()));
    }

    for changes in &table_changes {
        changes.apply_to(&mut descriptor)?;
    }

    let splits = match split_spec {
        Some(ref spec) => {
            if let SplitSpec::File(path) = spec {
                descriptor.set_value(keys::SPLITS_FILE, Some(path.display().to_string()));
            }
            spec.resolve(ctx)?
        }
        None => Vec::new(),
    };

    Ok(CreateTablePlan {
        descriptor,
        split_spec,
        splits,
        warnings,
    })
}

/// Split and method keys consumed from a table bag before attribute parsing.
const TABLE_BAG_KEYS: &[&str] = &[
    keys::SPLITS,
    keys::SPLITS_FILE,
    keys::NUMREGIONS,
    keys::SPLITALGO,
    keys::METHOD,
];

/// Reject split modes mixed across table bags before any bag is parsed, so
/// the error does not depend on argument order.
fn check_split_modes(args: &[Arg]) -> Result<()> {
    let mut seen: Vec<&'static str> = Vec::new();
    for arg in args {
        if let Arg::Bag(bag) = arg {
            if bag.contains_key(keys::NAME) {
                continue;
            }
            for mode in signalled_modes(bag) {
                if !seen.contains(&mode) {
                    seen.push(mode);
                }
            }
        }
    }
    if seen.len() > 1 {
        return Err(conflicting_modes());
    }
    Ok(())
}

fn check_table_method(bag: &PropertyBag) -> Result<()> {
    match bag.get(keys::METHOD) {
        Some(v) => match coerce_string(keys::METHOD, v)?.as_str() {
            keys::METHOD_TABLE_ATT => Ok(()),
            other => Err(Error::UnknownMethod(other.to_string())),
        },
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertyBag;
    use serde_json::json;

    fn bag(value: serde_json::Value) -> Arg {
        Arg::Bag(serde_json::from_value::<PropertyBag>(value).unwrap())
    }

    #[test]
    fn test_bare_names() {
        let plan = compile_create("t1", &["f1".into(), "f2".into()], &CompileContext::new()).unwrap();
        assert_eq!(plan.descriptor.family_names(), vec!["f1", "f2"]);
        assert!(plan.splits.is_empty());
    }

    #[test]
    fn test_no_families() {
        let err = compile_create("t1", &[bag(json!({"OWNER": "me"}))], &CompileContext::new())
            .unwrap_err();
        assert!(matches!(err, Error::NoColumnFamilyDefined(_)));
    }

    #[test]
    fn test_split_modes_across_bags_conflict() {
        let err = compile_create(
            "t1",
            &[
                "f1".into(),
                bag(json!({"SPLITS": ["a"]})),
                bag(json!({"NUMREGIONS": 3, "SPLITALGO": "HexStringSplit"})),
            ],
            &CompileContext::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_split_mode_conflict_ignores_bag_order() {
        let ctx = CompileContext::new();
        for args in [
            vec!["f1".into(), bag(json!({"NUMREGIONS": 4})), bag(json!({"SPLITS": ["a"]}))],
            vec!["f1".into(), bag(json!({"SPLITS": ["a"]})), bag(json!({"NUMREGIONS": 4}))],
            vec!["f1".into(), bag(json!({"SPLITS": ["a"]})), bag(json!({"SPLITALGO": "HexStringSplit"}))],
        ] {
            let err = compile_create("t1", &args, &ctx).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{:?}", err);
        }
    }

    #[test]
    fn test_algorithmic_keys_split_across_bags() {
        let err = compile_create(
            "t1",
            &[
                "f1".into(),
                bag(json!({"NUMREGIONS": 4})),
                bag(json!({"SPLITALGO": "HexStringSplit"})),
            ],
            &CompileContext::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredField(ref f) if f == "SPLITALGO"));
    }

    #[test]
    fn test_table_bag_method() {
        let ctx = CompileContext::new();
        let plan = compile_create(
            "t1",
            &["f1".into(), bag(json!({"METHOD": "table_att", "OWNER": "x"}))],
            &ctx,
        )
        .unwrap();
        assert_eq!(plan.descriptor.owner(), Some("x"));
        assert!(plan.warnings.is_empty());

        let err = compile_create(
            "t1",
            &["f1".into(), bag(json!({"METHOD": "delete", "OWNER": "x"}))],
            &ctx,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownMethod(ref m) if m == "delete"));
    }

    #[test]
    fn test_table_attributes_and_splits() {
        let plan = compile_create(
            "ns1:t1",
            &[
                bag(json!({"NAME": "f1", "VERSIONS": 2})),
                bag(json!({"MAX_FILESIZE": 1024, "SPLITS": ["10", "20"]})),
            ],
            &CompileContext::new(),
        )
        .unwrap();
        assert_eq!(plan.descriptor.name.namespace(), "ns1");
        assert_eq!(plan.descriptor.max_file_size(), Some(1024));
        assert_eq!(plan.splits, vec![b"10".to_vec(), b"20".to_vec()]);
        assert!(plan.warnings.is_empty());
    }
}
