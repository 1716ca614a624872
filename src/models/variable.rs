use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    Primary, // Observed at the station, may be corrected
    Derived, // Computed by the recompute cascade
}

/// The sixteen per-day fields carried by every output table, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Variable {
    TAvg,
    TMax,
    TMin,
    TDew,
    VaporPressure,
    RhAvg,
    RhMax,
    RhMin,
    Rs,
    RsTr,
    Rso,
    WindSpeed,
    Precip,
    Etr,
    Eto,
    Wind2m,
}

impl Variable {
    pub const COUNT: usize = 16;

    pub const ALL: [Variable; Variable::COUNT] = [
        Variable::TAvg,
        Variable::TMax,
        Variable::TMin,
        Variable::TDew,
        Variable::VaporPressure,
        Variable::RhAvg,
        Variable::RhMax,
        Variable::RhMin,
        Variable::Rs,
        Variable::RsTr,
        Variable::Rso,
        Variable::WindSpeed,
        Variable::Precip,
        Variable::Etr,
        Variable::Eto,
        Variable::Wind2m,
    ];

    pub const PRIMARY: [Variable; 11] = [
        Variable::TAvg,
        Variable::TMax,
        Variable::TMin,
        Variable::TDew,
        Variable::VaporPressure,
        Variable::RhAvg,
        Variable::RhMax,
        Variable::RhMin,
        Variable::Rs,
        Variable::WindSpeed,
        Variable::Precip,
    ];

    pub const DERIVED: [Variable; 5] = [
        Variable::RsTr,
        Variable::Rso,
        Variable::Etr,
        Variable::Eto,
        Variable::Wind2m,
    ];

    /// Column position in the output tables (after year, month, day).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn kind(self) -> VariableKind {
        match self {
            Variable::RsTr | Variable::Rso | Variable::Etr | Variable::Eto | Variable::Wind2m => {
                VariableKind::Derived
            }
            _ => VariableKind::Primary,
        }
    }

    pub fn is_primary(self) -> bool {
        self.kind() == VariableKind::Primary
    }

    pub fn label(self) -> &'static str {
        match self {
            Variable::TAvg => "TAvg (C)",
            Variable::TMax => "TMax (C)",
            Variable::TMin => "TMin (C)",
            Variable::TDew => "TDew (C)",
            Variable::VaporPressure => "Vapor Pres (kPa)",
            Variable::RhAvg => "RHAvg (%)",
            Variable::RhMax => "RHMax (%)",
            Variable::RhMin => "RHMin (%)",
            Variable::Rs => "Rs (w/m2)",
            Variable::RsTr => "Rs_TR (w/m2)",
            Variable::Rso => "Rso (w/m2)",
            Variable::WindSpeed => "Windspeed (m/s)",
            Variable::Precip => "Precip (mm)",
            Variable::Etr => "ETr (mm)",
            Variable::Eto => "ETo (mm)",
            Variable::Wind2m => "ws_2m (m/s)",
        }
    }

    /// Short machine name used in input headers and correction files.
    pub fn key(self) -> &'static str {
        match self {
            Variable::TAvg => "tavg",
            Variable::TMax => "tmax",
            Variable::TMin => "tmin",
            Variable::TDew => "tdew",
            Variable::VaporPressure => "ea",
            Variable::RhAvg => "rhavg",
            Variable::RhMax => "rhmax",
            Variable::RhMin => "rhmin",
            Variable::Rs => "rs",
            Variable::RsTr => "rs_tr",
            Variable::Rso => "rso",
            Variable::WindSpeed => "ws",
            Variable::Precip => "precip",
            Variable::Etr => "etr",
            Variable::Eto => "eto",
            Variable::Wind2m => "ws_2m",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        match key.as_str() {
            "vappres" | "vapor_pressure" => Some(Variable::VaporPressure),
            "wind" | "windspeed" => Some(Variable::WindSpeed),
            "precipitation" => Some(Variable::Precip),
            _ => Variable::ALL.into_iter().find(|v| v.key() == key),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_order_matches_index() {
        for (i, variable) in Variable::ALL.iter().enumerate() {
            assert_eq!(variable.index(), i);
        }
    }

    #[test]
    fn test_primary_and_derived_partition() {
        assert_eq!(Variable::PRIMARY.len() + Variable::DERIVED.len(), Variable::COUNT);
        assert!(Variable::PRIMARY.iter().all(|v| v.is_primary()));
        assert!(Variable::DERIVED.iter().all(|v| !v.is_primary()));
    }

    #[test]
    fn test_from_key() {
        assert_eq!(Variable::from_key("TMax"), Some(Variable::TMax));
        assert_eq!(Variable::from_key(" ea "), Some(Variable::VaporPressure));
        assert_eq!(Variable::from_key("vappres"), Some(Variable::VaporPressure));
        assert_eq!(Variable::from_key("wind"), Some(Variable::WindSpeed));
        assert_eq!(Variable::from_key("snow"), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Variable::Eto.label(), "ETo (mm)");
        assert_eq!(Variable::Wind2m.to_string(), "ws_2m (m/s)");
    }
}
