use crate::Result;
use crate::model::RepoRecord;
use camino::Utf8Path;
use ohno::{IntoAppError, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

const LOG_TARGET: &str = "collection";

/// Input schema versions this tool understands. Versions differ in field
/// naming only (`stargazers_count` vs `stars`, nested vs flat license);
/// everything is normalized to the canonical shape on load.
pub const SUPPORTED_SCHEMA_VERSIONS: core::ops::RangeInclusive<u32> = 1..=3;

/// A full repository collection, the unit the pipeline operates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoCollection {
    pub schema_version: u32,
    pub repos: Vec<RepoRecord>,
}

#[derive(Debug, Deserialize)]
struct RawCollection {
    schema_version: Option<u32>,
    #[serde(default)]
    repos: Vec<serde_json::Value>,
}

impl RepoCollection {
    /// Load a collection file, normalizing all accepted schema versions into
    /// the canonical record shape and rejecting duplicate identity keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if the
    /// `schema_version` is missing or unsupported, if a record is malformed,
    /// or if two records share the same identity key. All of these indicate
    /// corrupted input and abort before the pipeline touches any output.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let file = File::open(path).into_app_err_with(|| format!("unable to open collection file '{path}'"))?;
        let reader = BufReader::new(file);
        let raw: RawCollection =
            serde_json::from_reader(reader).into_app_err_with(|| format!("unable to parse collection file '{path}'"))?;

        let Some(schema_version) = raw.schema_version else {
            bail!("collection file '{path}' is missing schema_version");
        };

        if !SUPPORTED_SCHEMA_VERSIONS.contains(&schema_version) {
            bail!(
                "unsupported schema_version {schema_version} in '{path}' (supported: {}-{})",
                SUPPORTED_SCHEMA_VERSIONS.start(),
                SUPPORTED_SCHEMA_VERSIONS.end()
            );
        }

        let mut repos = Vec::with_capacity(raw.repos.len());
        for (index, mut value) in raw.repos.into_iter().enumerate() {
            normalize_record_value(&mut value);
            let record: RepoRecord = serde_json::from_value(value)
                .into_app_err_with(|| format!("malformed repository record at index {index} in '{path}'"))?;
            repos.push(record);
        }

        detect_duplicates(&repos, path)?;

        log::debug!(target: LOG_TARGET, "Loaded {} records from '{path}' (schema_version {schema_version})", repos.len());
        Ok(Self { schema_version, repos })
    }

    /// Write the collection back as a whole-file replacement.
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).into_app_err_with(|| format!("unable to create directory '{parent}'"))?;
        }

        let file = File::create(path).into_app_err_with(|| format!("unable to create collection file '{path}'"))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).into_app_err_with(|| format!("unable to write collection file '{path}'"))?;
        writer
            .flush()
            .into_app_err_with(|| format!("unable to flush collection file '{path}'"))?;
        Ok(())
    }
}

/// Map any accepted input schema onto the canonical record fields.
///
/// - `stars` defaults from `stargazers_count` when absent (schema v1/v2).
/// - A nested license object `{"spdx_id": ...}` flattens to its SPDX string
///   (schema v2).
fn normalize_record_value(value: &mut serde_json::Value) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };

    if !obj.contains_key("stars")
        && let Some(count) = obj.get("stargazers_count").cloned()
    {
        let _ = obj.insert("stars".to_string(), count);
    }
    let _ = obj.remove("stargazers_count");

    if let Some(license) = obj.get_mut("license")
        && license.is_object()
    {
        *license = license.get("spdx_id").cloned().unwrap_or(serde_json::Value::Null);
    }
}

fn detect_duplicates(repos: &[RepoRecord], path: &Utf8Path) -> Result<()> {
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(repos.len());
    for (index, record) in repos.iter().enumerate() {
        let key = record.identity_key();
        if let Some(first) = seen.insert(key, index) {
            bail!("duplicate repository identity '{key}' at entries {first} and {index} in '{path}'");
        }
    }
    Ok(())
}
