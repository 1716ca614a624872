use crate::error::{QaqcError, Result};
use crate::models::{Station, StationConfig};
use crate::utils::coordinates::decimal_to_dms;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;
use tracing::info;

/// Prefix of environment variables that override configuration keys, e.g.
/// `QAQC_STATION__ELEVATION=1500`.
pub const ENV_PREFIX: &str = "QAQC";

/// Loads the station configuration file.
pub struct StationReader {
    use_environment: bool,
}

impl StationReader {
    pub fn new() -> Self {
        Self {
            use_environment: true,
        }
    }

    pub fn with_environment(use_environment: bool) -> Self {
        Self { use_environment }
    }

    /// Read and deserialise the configuration; the format follows the file
    /// extension (`.ini` or `.cfg` for INI, anything else TOML).
    pub fn read_config(&self, path: &Path) -> Result<StationConfig> {
        if !path.exists() {
            return Err(QaqcError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let format = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ini") || ext.eq_ignore_ascii_case("cfg") => FileFormat::Ini,
            _ => FileFormat::Toml,
        };

        let mut builder = Config::builder().add_source(File::from(path).format(format));
        if self.use_environment {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config: StationConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Read the configuration and validate the station it describes.
    pub fn read_station(&self, path: &Path) -> Result<(Station, StationConfig)> {
        let config = self.read_config(path)?;
        let station = config.station()?;

        info!(
            station = %station.name,
            latitude = station.latitude,
            latitude_dms = %decimal_to_dms(station.latitude),
            elevation = station.elevation,
            anemometer_height = station.anemometer_height,
            pressure_kpa = station.pressure(),
            "Loaded station configuration"
        );

        Ok((station, config))
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RhBlend;
    use std::io::Write;
    use tempfile::Builder;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_read_toml_config() -> Result<()> {
        let file = write_config(
            ".toml",
            r#"
[station]
name = "Bozeman"
latitude = "45:40:12"
elevation = 1498.0
anemometer_height = 2.0

[data]
missing_value = -9999.0
humidity_blend = "averaged"
"#,
        );

        let (station, config) = StationReader::with_environment(false).read_station(file.path())?;

        assert_eq!(station.name, "Bozeman");
        assert!((station.latitude - 45.67).abs() < 1e-9);
        assert_eq!(config.data.missing_value, -9999.0);
        assert_eq!(config.data.humidity_blend, RhBlend::Averaged);
        Ok(())
    }

    #[test]
    fn test_read_ini_config_with_defaults() -> Result<()> {
        let file = write_config(
            ".ini",
            "[station]\nname = Greeley\nlatitude = 40.41\nelevation = 1462.4\nanemometer_height = 3\n",
        );

        let (station, config) = StationReader::with_environment(false).read_station(file.path())?;

        assert!((station.latitude - 40.41).abs() < 1e-9);
        assert_eq!(station.anemometer_height, 3.0);
        assert_eq!(config.data.missing_value, -999.0);
        assert_eq!(config.data.humidity_blend, RhBlend::Legacy);
        Ok(())
    }

    #[test]
    fn test_invalid_station_is_configuration_error() {
        let file = write_config(
            ".toml",
            "[station]\nname = \"High\"\nlatitude = \"12.0\"\nelevation = 12000.0\nanemometer_height = 2.0\n",
        );

        let result = StationReader::with_environment(false).read_station(file.path());
        assert!(matches!(result, Err(QaqcError::Configuration(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = StationReader::new().read_config(Path::new("does/not/exist.toml"));
        assert!(matches!(result, Err(QaqcError::Configuration(_))));
    }
}
