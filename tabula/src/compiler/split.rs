//! Region pre-split resolution.

use super::partition::check_region_count;
use super::CompileContext;
use crate::schema::bag::{coerce_i64, coerce_string, coerce_string_list};
use crate::schema::{keys, to_bytes_binary, PropertyBag};
use crate::{Error, Result};
use std::path::PathBuf;

/// Keys that signal a pre-split.
pub const SPLIT_KEYS: &[&str] = &[keys::SPLITS, keys::SPLITS_FILE, keys::NUMREGIONS, keys::SPLITALGO];

/// One way of choosing region boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitSpec {
    /// Binary-escaped keys, kept in the given order
    Explicit(Vec<String>),
    /// Newline-delimited file of binary-escaped keys
    File(PathBuf),
    Algorithmic { count: i64, algorithm: String },
}

impl SplitSpec {
    /// Detect the split mode a bag asks for, if any. Signals for more than
    /// one mode are rejected.
    pub fn from_bag(bag: &PropertyBag) -> Result<Option<Self>> {
        let modes = signalled_modes(bag);
        if modes.len() > 1 {
            return Err(conflicting_modes());
        }

        if let Some(v) = bag.get(keys::SPLITS) {
            return Ok(Some(SplitSpec::Explicit(coerce_string_list(keys::SPLITS, v)?)));
        }
        if let Some(v) = bag.get(keys::SPLITS_FILE) {
            return Ok(Some(SplitSpec::File(PathBuf::from(coerce_string(keys::SPLITS_FILE, v)?))));
        }
        if modes.contains(&MODE_ALGORITHMIC) {
            let count = bag
                .get(keys::NUMREGIONS)
                .ok_or_else(|| Error::MissingRequiredField(keys::NUMREGIONS.to_string()))?;
            let algorithm = bag
                .get(keys::SPLITALGO)
                .ok_or_else(|| Error::MissingRequiredField(keys::SPLITALGO.to_string()))?;
            return Ok(Some(SplitSpec::Algorithmic {
                count: coerce_i64(keys::NUMREGIONS, count)?,
                algorithm: coerce_string(keys::SPLITALGO, algorithm)?,
            }));
        }
        Ok(None)
    }

    /// Compute the boundary keys.
    pub fn resolve(&self, ctx: &CompileContext) -> Result<Vec<Vec<u8>>> {
        match self {
            SplitSpec::Explicit(raw) => decode_keys(raw.iter().map(String::as_str)),
            SplitSpec::File(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::InvalidArgument(format!(
                        "Cannot read splits file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                decode_keys(content.lines())
            }
            SplitSpec::Algorithmic { count, algorithm } => {
                let count = check_region_count(*count)?;
                let partitioner = ctx.partitioners().get(algorithm).ok_or_else(|| {
                    Error::invalid_enum(keys::SPLITALGO, algorithm.clone(), &ctx.partitioners().names())
                })?;
                partitioner.split(count)
            }
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            SplitSpec::Explicit(_) => MODE_EXPLICIT,
            SplitSpec::File(_) => MODE_FILE,
            SplitSpec::Algorithmic { .. } => MODE_ALGORITHMIC,
        }
    }
}

const MODE_EXPLICIT: &str = "explicit";
const MODE_FILE: &str = "file";
const MODE_ALGORITHMIC: &str = "algorithmic";

/// Split modes a bag signals, judged by key presence alone. A lone
/// `NUMREGIONS` or `SPLITALGO` already counts as the algorithmic mode.
pub(crate) fn signalled_modes(bag: &PropertyBag) -> Vec<&'static str> {
    let mut modes = Vec::new();
    if bag.contains_key(keys::SPLITS) {
        modes.push(MODE_EXPLICIT);
    }
    if bag.contains_key(keys::SPLITS_FILE) {
        modes.push(MODE_FILE);
    }
    if bag.contains_key(keys::NUMREGIONS) || bag.contains_key(keys::SPLITALGO) {
        modes.push(MODE_ALGORITHMIC);
    }
    modes
}

pub(crate) fn conflicting_modes() -> Error {
    Error::InvalidArgument(format!(
        "Only one of {}, {} or {}/{} may be given",
        keys::SPLITS,
        keys::SPLITS_FILE,
        keys::NUMREGIONS,
        keys::SPLITALGO
    ))
}

fn decode_keys<'a>(raw: impl Iterator<Item = &'a str>) -> Result<Vec<Vec<u8>>> {
    raw.map(|line| {
        let key = to_bytes_binary(line.trim_end_matches('\r'));
        if key.is_empty() {
            Err(Error::InvalidArgument("Split key must not be empty".to_string()))
        } else {
            Ok(key)
        }
    })
    .collect()
}
