//! Tire compounds and the catalog they are looked up in.
//!
//! A [`CompoundCatalog`] keeps compounds in insertion order. That order is
//! the order compound sequences are enumerated in, so it determines the
//! insertion order of strategies and therefore tie-breaking in top-K output.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default wear limit for the soft compound, in laps.
pub const DEFAULT_SOFT_WEAR_LIMIT_LAPS: u32 = 15;

/// Default base lap time for the soft compound, in seconds.
pub const DEFAULT_SOFT_LAP_TIME_SECS: f64 = 90.0;

/// Default wear limit for the medium compound, in laps.
pub const DEFAULT_MEDIUM_WEAR_LIMIT_LAPS: u32 = 25;

/// Default base lap time for the medium compound, in seconds.
pub const DEFAULT_MEDIUM_LAP_TIME_SECS: f64 = 92.0;

/// Default wear limit for the hard compound, in laps.
pub const DEFAULT_HARD_WEAR_LIMIT_LAPS: u32 = 40;

/// Default base lap time for the hard compound, in seconds.
pub const DEFAULT_HARD_LAP_TIME_SECS: f64 = 95.0;

/// A tire compound with its wear limit and base lap time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compound {
    name: String,
    wear_limit_laps: u32,
    base_lap_time_secs: f64,
}

impl Compound {
    /// Create a new compound.
    pub fn new(name: impl Into<String>, wear_limit_laps: u32, base_lap_time_secs: f64) -> Self {
        Self {
            name: name.into(),
            wear_limit_laps,
            base_lap_time_secs,
        }
    }

    /// Compound name, unique within a catalog.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum laps this compound may run in one stint.
    pub fn wear_limit_laps(&self) -> u32 {
        self.wear_limit_laps
    }

    /// Lap time on this compound, in seconds.
    pub fn base_lap_time_secs(&self) -> f64 {
        self.base_lap_time_secs
    }

    /// Longest stint this compound allows under the given fuel range.
    pub fn max_stint_laps(&self, fuel_range_laps: u32) -> u32 {
        self.wear_limit_laps.min(fuel_range_laps)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.wear_limit_laps < 1 {
            return Err(ConfigError::InvalidWearLimit {
                name: self.name.clone(),
            });
        }
        if !self.base_lap_time_secs.is_finite() || self.base_lap_time_secs < 0.0 {
            return Err(ConfigError::InvalidLapTime {
                name: self.name.clone(),
                value: self.base_lap_time_secs,
            });
        }
        Ok(())
    }
}

impl AsRef<Compound> for Compound {
    fn as_ref(&self) -> &Compound {
        self
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (max {} laps, {:.1}s/lap)",
            self.name, self.wear_limit_laps, self.base_lap_time_secs
        )
    }
}

/// Ordered lookup of the compounds available for a race.
///
/// Compounds are shared via `Arc` so strategies can reference them without
/// copying names and parameters into every stint.
#[derive(Debug, Clone, Default)]
pub struct CompoundCatalog {
    compounds: Vec<Arc<Compound>>,
}

impl CompoundCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from compounds in the given order.
    ///
    /// No validation happens here; see [`CompoundCatalog::validate`].
    pub fn from_compounds(compounds: impl IntoIterator<Item = Compound>) -> Self {
        Self {
            compounds: compounds.into_iter().map(Arc::new).collect(),
        }
    }

    /// The classic Soft / Medium / Hard catalog.
    pub fn standard() -> Self {
        Self::from_compounds([
            Compound::new(
                "Soft",
                DEFAULT_SOFT_WEAR_LIMIT_LAPS,
                DEFAULT_SOFT_LAP_TIME_SECS,
            ),
            Compound::new(
                "Medium",
                DEFAULT_MEDIUM_WEAR_LIMIT_LAPS,
                DEFAULT_MEDIUM_LAP_TIME_SECS,
            ),
            Compound::new(
                "Hard",
                DEFAULT_HARD_WEAR_LIMIT_LAPS,
                DEFAULT_HARD_LAP_TIME_SECS,
            ),
        ])
    }

    /// Append a compound.
    pub fn with_compound(mut self, compound: Compound) -> Self {
        self.compounds.push(Arc::new(compound));
        self
    }

    /// Look up a compound by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Compound>> {
        self.compounds.iter().find(|c| c.name() == name)
    }

    /// Compound at a catalog position.
    pub fn at(&self, index: usize) -> Option<&Arc<Compound>> {
        self.compounds.get(index)
    }

    /// Iterate compounds in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Compound>> {
        self.compounds.iter()
    }

    /// Compound names in catalog order.
    pub fn names(&self) -> Vec<&str> {
        self.compounds.iter().map(|c| c.name()).collect()
    }

    /// Number of compounds.
    pub fn len(&self) -> usize {
        self.compounds.len()
    }

    /// Whether the catalog has no compounds.
    pub fn is_empty(&self) -> bool {
        self.compounds.is_empty()
    }

    /// Check that the catalog can drive a search.
    ///
    /// Rejects an empty catalog, duplicate names, zero wear limits and
    /// negative or non-finite lap times.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compounds.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for compound in &self.compounds {
            if !seen.insert(compound.name()) {
                return Err(ConfigError::DuplicateCompound(compound.name().to_string()));
            }
            compound.validate()?;
        }

        Ok(())
    }
}
