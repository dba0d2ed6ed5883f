use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::{Error, TimeBucket};

pub fn deserialize_csv_file<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file)
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(Error::from)
}

/// Empty names are treated as missing
pub(super) fn deserialize_optional_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(name.filter(|name| !name.trim().is_empty()))
}

/// `null` and a missing field both mean "no time profile"
pub(super) fn deserialize_buckets<'de, D>(deserializer: D) -> Result<Vec<TimeBucket>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<TimeBucket>>::deserialize(deserializer)?.unwrap_or_default())
}
