//! INI-backed configuration file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{Ini, Properties};
use thiserror::Error;
use tracing::{debug, warn};

use crate::compound::{Compound, CompoundCatalog};
use crate::race::{
    RaceConfig, DEFAULT_FUEL_RANGE_LAPS, DEFAULT_MAX_STOPS, DEFAULT_PIT_LOSS_SECS,
    DEFAULT_TOTAL_LAPS,
};
use crate::store::DEFAULT_TOP_K;

use super::config_file_path;

/// Prefix of per-compound section names, e.g. `[compound.Soft]`.
pub const COMPOUND_SECTION_PREFIX: &str = "compound.";

const RACE_SECTION: &str = "race";
const OUTPUT_SECTION: &str = "output";

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// The file is not valid INI.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A value could not be parsed.
    #[error("invalid value '{value}' for {section}.{key}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },

    /// A required value is absent.
    #[error("missing value for {section}.{key}")]
    MissingValue { section: String, key: String },

    /// A compound section without a name after the prefix.
    #[error("compound section '[{0}]' has no compound name")]
    EmptyCompoundName(String),
}

/// `[race]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceSettings {
    pub total_laps: u32,
    pub pit_loss_secs: f64,
    pub fuel_range_laps: u32,
    pub max_stops: u32,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            total_laps: DEFAULT_TOTAL_LAPS,
            pit_loss_secs: DEFAULT_PIT_LOSS_SECS,
            fuel_range_laps: DEFAULT_FUEL_RANGE_LAPS,
            max_stops: DEFAULT_MAX_STOPS,
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    /// Number of strategies shown.
    pub top: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { top: DEFAULT_TOP_K }
    }
}

/// One `[compound.<name>]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSettings {
    pub name: String,
    pub wear_limit_laps: u32,
    pub base_lap_time_secs: f64,
}

impl From<&Compound> for CompoundSettings {
    fn from(compound: &Compound) -> Self {
        Self {
            name: compound.name().to_string(),
            wear_limit_laps: compound.wear_limit_laps(),
            base_lap_time_secs: compound.base_lap_time_secs(),
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub race: RaceSettings,
    pub output: OutputSettings,
    /// Compounds in file order.
    pub compounds: Vec<CompoundSettings>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            race: RaceSettings::default(),
            output: OutputSettings::default(),
            compounds: CompoundCatalog::standard()
                .iter()
                .map(|c| CompoundSettings::from(c.as_ref()))
                .collect(),
        }
    }
}

impl ConfigFile {
    /// Load from the default path, or defaults if the file does not exist.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded configuration file");
        Self::from_ini_str(&contents)
    }

    /// Parse INI text. Missing race and output keys fall back to defaults.
    pub fn from_ini_str(contents: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(contents).map_err(|e| ConfigFileError::Parse(e.to_string()))?;
        let defaults = Self::default();

        let race = match ini.section(Some(RACE_SECTION)) {
            Some(props) => RaceSettings {
                total_laps: parse_or(props, RACE_SECTION, "total_laps", defaults.race.total_laps)?,
                pit_loss_secs: parse_or(
                    props,
                    RACE_SECTION,
                    "pit_loss_secs",
                    defaults.race.pit_loss_secs,
                )?,
                fuel_range_laps: parse_or(
                    props,
                    RACE_SECTION,
                    "fuel_range_laps",
                    defaults.race.fuel_range_laps,
                )?,
                max_stops: parse_or(props, RACE_SECTION, "max_stops", defaults.race.max_stops)?,
            },
            None => defaults.race,
        };

        let output = match ini.section(Some(OUTPUT_SECTION)) {
            Some(props) => OutputSettings {
                top: parse_or(props, OUTPUT_SECTION, "top", defaults.output.top)?,
            },
            None => defaults.output,
        };

        let mut compounds = Vec::new();
        for (section, props) in ini.iter() {
            let Some(section) = section else {
                continue;
            };
            if let Some(name) = section.strip_prefix(COMPOUND_SECTION_PREFIX) {
                let name = name.trim();
                if name.is_empty() {
                    return Err(ConfigFileError::EmptyCompoundName(section.to_string()));
                }
                compounds.push(CompoundSettings {
                    name: name.to_string(),
                    wear_limit_laps: parse_required(props, section, "wear_limit_laps")?,
                    base_lap_time_secs: parse_required(props, section, "base_lap_time_secs")?,
                });
            } else if section != RACE_SECTION && section != OUTPUT_SECTION {
                warn!(section, "Ignoring unknown configuration section");
            }
        }

        if compounds.is_empty() {
            compounds = defaults.compounds;
        }

        Ok(Self {
            race,
            output,
            compounds,
        })
    }

    /// Render as INI text.
    pub fn to_ini_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.to_ini().write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Save to the default path, creating its directory.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        let write_err = |source: io::Error| ConfigFileError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        self.to_ini().write_to_file(path).map_err(write_err)?;

        debug!(path = %path.display(), "Saved configuration file");
        Ok(())
    }

    /// Race configuration described by this file.
    pub fn race_config(&self) -> RaceConfig {
        RaceConfig::new(
            self.race.total_laps,
            self.race.pit_loss_secs,
            self.race.fuel_range_laps,
            self.race.max_stops,
        )
    }

    /// Compound catalog described by this file, in file order.
    pub fn catalog(&self) -> CompoundCatalog {
        CompoundCatalog::from_compounds(self.compounds.iter().map(|c| {
            Compound::new(c.name.clone(), c.wear_limit_laps, c.base_lap_time_secs)
        }))
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some(RACE_SECTION))
            .set("total_laps", self.race.total_laps.to_string())
            .set("pit_loss_secs", self.race.pit_loss_secs.to_string())
            .set("fuel_range_laps", self.race.fuel_range_laps.to_string())
            .set("max_stops", self.race.max_stops.to_string());
        ini.with_section(Some(OUTPUT_SECTION))
            .set("top", self.output.top.to_string());
        for compound in &self.compounds {
            ini.with_section(Some(format!("{}{}", COMPOUND_SECTION_PREFIX, compound.name)))
                .set("wear_limit_laps", compound.wear_limit_laps.to_string())
                .set("base_lap_time_secs", compound.base_lap_time_secs.to_string());
        }
        ini
    }
}

fn parse_value<T: FromStr>(section: &str, key: &str, raw: &str) -> Result<T, ConfigFileError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: raw.to_string(),
        })
}

fn parse_or<T: FromStr>(
    props: &Properties,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, ConfigFileError> {
    match props.get(key) {
        Some(raw) => parse_value(section, key, raw),
        None => Ok(default),
    }
}

fn parse_required<T: FromStr>(
    props: &Properties,
    section: &str,
    key: &str,
) -> Result<T, ConfigFileError> {
    let raw = props.get(key).ok_or_else(|| ConfigFileError::MissingValue {
        section: section.to_string(),
        key: key.to_string(),
    })?;
    parse_value(section, key, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
[race]
total_laps = 60
pit_loss_secs = 21.5
fuel_range_laps = 30
max_stops = 2

[output]
top = 5

[compound.Hard]
wear_limit_laps = 45
base_lap_time_secs = 94.5

[compound.Soft]
wear_limit_laps = 18
base_lap_time_secs = 89.2
";

    #[test]
    fn test_parse_sample() {
        let config = ConfigFile::from_ini_str(SAMPLE).unwrap();
        assert_eq!(config.race_config(), RaceConfig::new(60, 21.5, 30, 2));
        assert_eq!(config.output.top, 5);

        let catalog = config.catalog();
        assert_eq!(catalog.names(), vec!["Hard", "Soft"]);
        assert_eq!(catalog.get("Soft").map(|c| c.wear_limit_laps()), Some(18));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ConfigFile::from_ini_str("").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.catalog().names(), vec!["Soft", "Medium", "Hard"]);
    }

    #[test]
    fn test_partial_race_section() {
        let config = ConfigFile::from_ini_str("[race]\ntotal_laps = 70\n").unwrap();
        assert_eq!(config.race.total_laps, 70);
        assert_eq!(config.race.fuel_range_laps, DEFAULT_FUEL_RANGE_LAPS);
    }

    #[test]
    fn test_invalid_value() {
        let err = ConfigFile::from_ini_str("[race]\ntotal_laps = many\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref key, .. } if key == "total_laps"
        ));
        assert!(err.to_string().contains("race.total_laps"));
    }

    #[test]
    fn test_compound_missing_value() {
        let err =
            ConfigFile::from_ini_str("[compound.Wet]\nwear_limit_laps = 30\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::MissingValue { ref key, .. } if key == "base_lap_time_secs"
        ));
    }

    #[test]
    fn test_compound_without_name() {
        let err = ConfigFile::from_ini_str("[compound.]\nwear_limit_laps = 1\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::EmptyCompoundName(_)));
    }

    #[test]
    fn test_save_and_load_preserves_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let config = ConfigFile::from_ini_str(SAMPLE).unwrap();
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap_err();
        assert!(matches!(err, ConfigFileError::Read { .. }));
    }

    #[test]
    fn test_to_ini_string_contains_sections() {
        let text = ConfigFile::default().to_ini_string();
        assert!(text.contains("[race]"));
        assert!(text.contains("[compound.Medium]"));
        assert!(text.contains("wear_limit_laps=25") || text.contains("wear_limit_laps = 25"));
    }
}
