use crate::Result;
use crate::metrics::WeightProfile;
use ohno::{IntoAppError, app_err};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Conventional configuration file name looked up next to the input.
const DEFAULT_CONFIG_NAME: &str = "repo-rank.toml";

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub ranking: RankingConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RankingConfig {
    /// Number of rows injected into the ranking table of the target document.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// How many dated snapshots to keep for delta computation.
    #[serde(default = "default_delta_days")]
    pub delta_days: usize,

    /// Repositories below this star count are excluded from ranking.
    #[serde(default)]
    pub min_stars: u64,

    /// Which scoring weight profile the built-in metrics use.
    #[serde(default)]
    pub weight_profile: WeightProfile,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Maximum number of rows written to the flat Markdown summary file.
    #[serde(default = "default_markdown_table_limit")]
    pub markdown_table_limit: usize,
}

const fn default_top_n() -> usize {
    100
}

const fn default_delta_days() -> usize {
    7
}

const fn default_markdown_table_limit() -> usize {
    50
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            delta_days: default_delta_days(),
            min_stars: 0,
            weight_profile: WeightProfile::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            markdown_table_limit: default_markdown_table_limit(),
        }
    }
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// An explicit path must exist; the conventional `repo-rank.toml` in the
    /// working directory is optional and silently falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a value
    /// is out of range.
    pub fn load(working_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading repo-rank configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = working_dir.join(DEFAULT_CONFIG_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    // No config file found, use defaults
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading repo-rank configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.ranking.top_n == 0 {
            return Err(app_err!("ranking.top_n must be at least 1"));
        }

        if self.ranking.delta_days == 0 {
            return Err(app_err!("ranking.delta_days must be at least 1"));
        }

        if self.output.markdown_table_limit == 0 {
            return Err(app_err!("output.markdown_table_limit must be at least 1"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.ranking.top_n, 100);
        assert_eq!(config.ranking.delta_days, 7);
        assert_eq!(config.ranking.min_stars, 0);
        assert_eq!(config.ranking.weight_profile, WeightProfile::Reference);
        assert_eq!(config.output.markdown_table_limit, 50);
    }

    #[test]
    fn test_validate_zero_top_n() {
        let config = Config {
            ranking: RankingConfig { top_n: 0, ..RankingConfig::default() },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_delta_days() {
        let config = Config {
            ranking: RankingConfig { delta_days: 0, ..RankingConfig::default() },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_table_limit() {
        let config = Config {
            output: OutputConfig { markdown_table_limit: 0 },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[ranking]\ntop_n = 25\n").unwrap();
        assert_eq!(config.ranking.top_n, 25);
        assert_eq!(config.ranking.delta_days, 7);
        assert_eq!(config.output.markdown_table_limit, 50);
    }

    #[test]
    fn test_parse_weight_profile() {
        let config: Config = toml::from_str("[ranking]\nweight_profile = \"legacy\"\n").unwrap();
        assert_eq!(config.ranking.weight_profile, WeightProfile::Legacy);
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        assert!(toml::from_str::<Config>("[ranking]\nbogus = 1\n").is_err());
    }

    #[test]
    fn test_save_default_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let working_dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let output_path = working_dir.join("repo-rank.toml");

        Config::save_default(&output_path).unwrap();

        // The conventional name is picked up without --config.
        let loaded = Config::load(&working_dir, None).unwrap();
        assert_eq!(loaded.ranking.top_n, Config::default().ranking.top_n);

        let explicit = Config::load(&working_dir, Some(&output_path)).unwrap();
        assert_eq!(explicit.output.markdown_table_limit, 50);
    }

    #[test]
    fn test_load_missing_config_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let working_dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let config = Config::load(&working_dir, None).unwrap();
        config.validate().unwrap();
    }
}
