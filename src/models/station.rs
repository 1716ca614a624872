use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{QaqcError, Result};
use crate::utils::constants::DEFAULT_MISSING_VALUE;
use crate::utils::coordinates::parse_coordinate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Station {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    // metres above sea level
    #[validate(range(min = -500.0, max = 9000.0))]
    pub elevation: f64,

    // metres above ground
    #[validate(range(min = 0.1, max = 100.0))]
    pub anemometer_height: f64,
}

impl Station {
    /// Build a validated station; invalid parameters are a configuration error.
    pub fn new(name: String, latitude: f64, elevation: f64, anemometer_height: f64) -> Result<Self> {
        // range validation lets NaN through
        for (field, value) in [
            ("latitude", latitude),
            ("elevation", elevation),
            ("anemometer_height", anemometer_height),
        ] {
            if !value.is_finite() {
                return Err(QaqcError::Configuration(format!(
                    "Invalid station parameters: {} must be a finite number, got {}",
                    field, value
                )));
            }
        }

        let station = Self {
            name,
            latitude,
            elevation,
            anemometer_height,
        };
        station
            .validate()
            .map_err(|e| QaqcError::Configuration(format!("Invalid station parameters: {}", e)))?;
        Ok(station)
    }

    /// Mean atmospheric pressure at the station elevation in kPa (ASCE Eq. 3).
    pub fn pressure(&self) -> f64 {
        101.3 * ((293.0 - 0.0065 * self.elevation) / 293.0).powf(5.26)
    }
}

/// Which form of the RH max/min vapor pressure blend to apply.
///
/// `Legacy` reproduces the historical computation in which only the RHmin term is
/// halved; `Averaged` halves the whole sum as in ASCE Eq. 11.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RhBlend {
    #[default]
    Legacy,
    Averaged,
}

/// Station configuration file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    pub station: StationSection,

    #[serde(default)]
    pub data: DataSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationSection {
    pub name: String,
    // decimal degrees or D:M:S
    pub latitude: String,
    pub elevation: f64,
    pub anemometer_height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSection {
    #[serde(default = "default_missing_value")]
    pub missing_value: f64,

    #[serde(default)]
    pub humidity_blend: RhBlend,
}

fn default_missing_value() -> f64 {
    DEFAULT_MISSING_VALUE
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            missing_value: DEFAULT_MISSING_VALUE,
            humidity_blend: RhBlend::default(),
        }
    }
}

impl StationConfig {
    pub fn station(&self) -> Result<Station> {
        let latitude = parse_coordinate(&self.station.latitude)
            .map_err(|e| QaqcError::Configuration(format!("Invalid station latitude: {}", e)))?;

        Station::new(
            self.station.name.clone(),
            latitude,
            self.station.elevation,
            self.station.anemometer_height,
        )
    }
}
