//! Configuration file support.
//!
//! Race parameters and the compound catalog can be stored in an INI file,
//! by default `~/.stintplan/config.ini`:
//!
//! ```ini
//! [race]
//! total_laps = 50
//! pit_loss_secs = 25
//! fuel_range_laps = 20
//! max_stops = 3
//!
//! [output]
//! top = 10
//!
//! [compound.Soft]
//! wear_limit_laps = 15
//! base_lap_time_secs = 90
//! ```
//!
//! Compound sections keep their file order, which is also the catalog order.
//! When the file has no compound sections the standard Soft / Medium / Hard
//! catalog is used.

mod file;

use std::path::PathBuf;

pub use file::{
    CompoundSettings, ConfigFile, ConfigFileError, OutputSettings, RaceSettings,
    COMPOUND_SECTION_PREFIX,
};

/// Directory name under the home directory.
pub const CONFIG_DIR_NAME: &str = ".stintplan";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Directory holding the configuration file.
///
/// Falls back to the current directory when no home directory is known.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Default configuration file path.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_path_layout() {
        let path = config_file_path();
        assert!(path.ends_with(format!("{}/{}", CONFIG_DIR_NAME, CONFIG_FILE_NAME)));
    }
}
