//! Key-space partitioners for `NUMREGIONS` / `SPLITALGO`.

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Divides a row-key space into `count` regions.
pub trait SplitAlgorithm: Send + Sync {
    /// Short name matched against `SPLITALGO`
    fn name(&self) -> &str;

    /// Return exactly `count - 1` ascending boundary keys.
    fn split(&self, count: usize) -> Result<Vec<Vec<u8>>>;
}

/// Upper bound on the regions a single split request may produce.
pub const MAX_REGIONS: usize = 100_000;

/// Accept `2..=MAX_REGIONS`.
pub fn check_region_count(count: i64) -> Result<usize> {
    if count <= 1 {
        return Err(Error::InvalidArgument(format!(
            "Number of regions must be greater than 1, got {}",
            count
        )));
    }
    match usize::try_from(count) {
        Ok(n) if n <= MAX_REGIONS => Ok(n),
        _ => Err(Error::InvalidArgument(format!(
            "Number of regions must be at most {}, got {}",
            MAX_REGIONS, count
        ))),
    }
}

fn checked(count: usize) -> Result<usize> {
    check_region_count(i64::try_from(count).unwrap_or(i64::MAX))
}

/// Fixed-width number strings spread evenly over `[0, last]`.
fn number_string_split(count: usize, last: u64, radix: u32, width: usize) -> Result<Vec<Vec<u8>>> {
    let count = checked(count)?;
    let step = last / count as u64;
    if step == 0 {
        return Err(Error::InvalidArgument(format!(
            "Cannot split the key space into {} regions",
            count
        )));
    }
    Ok((1..count as u64)
        .map(|i| {
            let boundary = step * i;
            let rendered = match radix {
                16 => format!("{:0width$x}", boundary, width = width),
                _ => format!("{:0width$}", boundary, width = width),
            };
            rendered.into_bytes()
        })
        .collect())
}

/// Eight lower-case hex characters over `00000000..ffffffff`.
#[derive(Debug, Default)]
pub struct HexStringSplit;

impl SplitAlgorithm for HexStringSplit {
    fn name(&self) -> &str {
        "HexStringSplit"
    }

    fn split(&self, count: usize) -> Result<Vec<Vec<u8>>> {
        number_string_split(count, 0xFFFF_FFFF, 16, 8)
    }
}

/// Eight decimal digits over `00000000..99999999`.
#[derive(Debug, Default)]
pub struct DecimalStringSplit;

impl SplitAlgorithm for DecimalStringSplit {
    fn name(&self) -> &str {
        "DecimalStringSplit"
    }

    fn split(&self, count: usize) -> Result<Vec<Vec<u8>>> {
        number_string_split(count, 99_999_999, 10, 8)
    }
}

/// Eight raw bytes spread uniformly over the full 64-bit range.
#[derive(Debug, Default)]
pub struct UniformSplit;

impl SplitAlgorithm for UniformSplit {
    fn name(&self) -> &str {
        "UniformSplit"
    }

    fn split(&self, count: usize) -> Result<Vec<Vec<u8>>> {
        let count = checked(count)?;
        let step = u64::MAX / count as u64;
        Ok((1..count as u64)
            .map(|i| (step * i).to_be_bytes().to_vec())
            .collect())
    }
}

/// Partitioners known by name. Starts with the built-ins.
#[derive(Clone)]
pub struct PartitionerRegistry {
    algorithms: BTreeMap<String, Arc<dyn SplitAlgorithm>>,
}

impl Default for PartitionerRegistry {
    fn default() -> Self {
        let mut registry = Self {
            algorithms: BTreeMap::new(),
        };
        registry.register(Arc::new(HexStringSplit));
        registry.register(Arc::new(DecimalStringSplit));
        registry.register(Arc::new(UniformSplit));
        registry
    }
}

impl std::fmt::Debug for PartitionerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.algorithms.keys()).finish()
    }
}

impl PartitionerRegistry {
    pub fn register(&mut self, algorithm: Arc<dyn SplitAlgorithm>) {
        self.algorithms
            .insert(algorithm.name().to_string(), algorithm);
    }

    /// Look up by name. Fully qualified names match on their last `.` or
    /// `$` segment.
    pub fn get(&self, name: &str) -> Option<Arc<dyn SplitAlgorithm>> {
        let short = name
            .trim()
            .rsplit(|c: char| c == '.' || c == '$')
            .next()
            .unwrap_or_default();
        self.algorithms.get(short).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.algorithms.keys().map(String::as_str).collect()
    }
}
