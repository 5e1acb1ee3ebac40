//! Compile `alter` arguments into mutation intents.
//!
//! Each argument is classified into exactly one [`MutationIntent`] before
//! anything is applied. Intents are then applied in order to a copy of the
//! live descriptor; the copy is only worth submitting when the plan is
//! dirty.

use super::{emit_all, CompileContext, FamilyChanges, SchemaWarning, TableChanges};
use crate::descriptor::{CoprocessorSpec, TableDescriptor};
use crate::metrics;
use crate::schema::bag::{coerce_string, coerce_string_list};
use crate::schema::{keys, Arg, PropertyBag};
use crate::{Error, Result};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum MutationIntent {
    /// Merge into an existing family or add a new one
    UpsertFamily(FamilyChanges),
    DeleteFamily(String),
    /// Remove table attributes; every key must be present
    UnsetAttribute(Vec<String>),
    /// Remove table configuration; every key must be present
    UnsetConfiguration(Vec<String>),
    RegisterCoprocessor(Vec<CoprocessorSpec>),
    UpdateTableAttributes(TableChanges),
}

impl MutationIntent {
    pub fn kind(&self) -> &'static str {
        match self {
            MutationIntent::UpsertFamily(_) => "upsert_family",
            MutationIntent::DeleteFamily(_) => "delete_family",
            MutationIntent::UnsetAttribute(_) => "unset_attribute",
            MutationIntent::UnsetConfiguration(_) => "unset_configuration",
            MutationIntent::RegisterCoprocessor(_) => "register_coprocessor",
            MutationIntent::UpdateTableAttributes(_) => "update_table_attributes",
        }
    }
}

/// Result of compiling an alter call.
#[derive(Debug, Clone)]
pub struct AlterPlan {
    /// The live descriptor with every intent applied
    pub descriptor: TableDescriptor,
    pub intents: Vec<MutationIntent>,
    /// Whether a modify request is needed at all
    pub dirty: bool,
    pub warnings: Vec<SchemaWarning>,
}

/// Route one alter argument to its intent.
pub fn classify(arg: &Arg, ctx: &CompileContext) -> Result<(MutationIntent, Vec<SchemaWarning>)> {
    let bag = match arg {
        Arg::Name(name) => {
            return Ok((MutationIntent::UpsertFamily(FamilyChanges::from_name(name)?), Vec::new()))
        }
        Arg::Bag(bag) => bag,
    };

    if let Some(v) = bag.get(keys::DELETE) {
        let family = coerce_string(keys::DELETE, v)?;
        let warnings = leftover(bag, keys::METHOD_DELETE, &[keys::DELETE]);
        return Ok((MutationIntent::DeleteFamily(family), warnings));
    }

    let method = match bag.get(keys::METHOD) {
        Some(v) => Some(coerce_string(keys::METHOD, v)?),
        None => None,
    };

    match method.as_deref() {
        None if bag.contains_key(keys::NAME) => {
            let (changes, warnings) = FamilyChanges::parse(bag, ctx)?;
            Ok((MutationIntent::UpsertFamily(changes), warnings))
        }
        None | Some(keys::METHOD_TABLE_ATT) => {
            let mut warnings = Vec::new();
            if method.is_some() && bag.contains_key(keys::NAME) {
                warnings.push(SchemaWarning::IgnoredMethodKey {
                    method: keys::METHOD_TABLE_ATT.to_string(),
                    key: keys::NAME.to_string(),
                });
            }
            let (changes, table_warnings) = TableChanges::parse(bag, &[keys::METHOD, keys::NAME])?;
            warnings.extend(table_warnings);
            let intent = if changes.only_coprocessors() {
                MutationIntent::RegisterCoprocessor(changes.coprocessors)
            } else {
                MutationIntent::UpdateTableAttributes(changes)
            };
            Ok((intent, warnings))
        }
        Some(keys::METHOD_DELETE) => {
            let family = required_name(bag)?;
            let family = coerce_string(keys::NAME, family)?;
            let warnings = leftover(bag, keys::METHOD_DELETE, &[keys::METHOD, keys::NAME]);
            Ok((MutationIntent::DeleteFamily(family), warnings))
        }
        Some(keys::METHOD_TABLE_ATT_UNSET) => {
            let names = coerce_string_list(keys::NAME, required_name(bag)?)?;
            let warnings = leftover(bag, keys::METHOD_TABLE_ATT_UNSET, &[keys::METHOD, keys::NAME]);
            Ok((MutationIntent::UnsetAttribute(names), warnings))
        }
        Some(keys::METHOD_TABLE_CONF_UNSET) => {
            let names = coerce_string_list(keys::NAME, required_name(bag)?)?;
            let warnings = leftover(bag, keys::METHOD_TABLE_CONF_UNSET, &[keys::METHOD, keys::NAME]);
            Ok((MutationIntent::UnsetConfiguration(names), warnings))
        }
        Some(other) => Err(Error::UnknownMethod(other.to_string())),
    }
}

fn required_name(bag: &PropertyBag) -> Result<&serde_json::Value> {
    bag.get(keys::NAME)
        .ok_or_else(|| Error::MissingRequiredField(keys::NAME.to_string()))
}

fn leftover(bag: &PropertyBag, method: &str, consumed: &[&str]) -> Vec<SchemaWarning> {
    bag.unrecognized(|k| consumed.contains(&k))
        .into_iter()
        .map(|key| SchemaWarning::IgnoredMethodKey {
            method: method.to_string(),
            key,
        })
        .collect()
}

/// Classify every argument, then apply the intents to a copy of `current`.
pub fn compile_alter(current: &TableDescriptor, args: &[Arg], ctx: &CompileContext) -> Result<AlterPlan> {
    let result = compile(current, args, ctx);
    metrics::record_compile("alter", &result);
    if let Ok(ref plan) = result {
        emit_all(&plan.warnings);
    }
    result
}

fn compile(current: &TableDescriptor, args: &[Arg], ctx: &CompileContext) -> Result<AlterPlan> {
    if args.is_empty() {
        return Err(Error::InvalidArgument(
            "alter requires at least one argument".to_string(),
        ));
    }

    let mut intents = Vec::with_capacity(args.len());
    let mut warnings = Vec::new();
    for arg in args {
        let (intent, intent_warnings) = classify(arg, ctx)?;
        debug!(table = %current.name, intent = intent.kind(), "classified alter argument");
        intents.push(intent);
        warnings.extend(intent_warnings);
    }

    let mut descriptor = current.clone();
    let mut dirty = false;
    for intent in &intents {
        dirty |= apply(intent, &mut descriptor, &mut warnings)?;
    }

    if descriptor.families().is_empty() {
        return Err(Error::NoColumnFamilyDefined(descriptor.name.to_string()));
    }

    Ok(AlterPlan {
        descriptor,
        intents,
        dirty,
        warnings,
    })
}

/// Apply one intent; returns whether it changed anything worth submitting.
fn apply(
    intent: &MutationIntent,
    desc: &mut TableDescriptor,
    warnings: &mut Vec<SchemaWarning>,
) -> Result<bool> {
    match intent {
        MutationIntent::UpsertFamily(changes) => {
            let family = match desc.family(&changes.name) {
                Some(existing) => {
                    let mut merged = existing.clone();
                    changes.apply_to(&mut merged);
                    merged
                }
                None => changes.build(),
            };
            desc.upsert_family(family);
            Ok(true)
        }
        MutationIntent::DeleteFamily(name) => {
            // Still submitted when missing; the server has the final say.
            if desc.remove_family(name).is_none() {
                warnings.push(SchemaWarning::MissingFamilyDelete {
                    family: name.clone(),
                });
            }
            Ok(true)
        }
        MutationIntent::UnsetAttribute(names) => {
            for name in names {
                desc.remove_value(name)
                    .ok_or_else(|| Error::AttributeNotFound(name.clone()))?;
            }
            Ok(true)
        }
        MutationIntent::UnsetConfiguration(names) => {
            for name in names {
                desc.remove_configuration(name)
                    .ok_or_else(|| Error::AttributeNotFound(name.clone()))?;
            }
            Ok(true)
        }
        MutationIntent::RegisterCoprocessor(specs) => {
            for spec in specs {
                desc.add_coprocessor(spec.clone())?;
            }
            Ok(true)
        }
        MutationIntent::UpdateTableAttributes(changes) => {
            changes.apply_to(desc)?;
            Ok(!changes.is_empty())
        }
    }
}
