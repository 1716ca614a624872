use crate::error::{QaqcError, Result};

/// Convert a `D:M:S` latitude to decimal degrees.
///
/// A leading minus sign or a trailing `S`/`W` hemisphere letter makes the result
/// negative.
///
/// # Examples
/// ```
/// use weather_qaqc::utils::dms_to_decimal;
///
/// let decimal = dms_to_decimal("45:40:48").unwrap();
/// assert!((decimal - 45.68).abs() < 1e-9);
/// let south = dms_to_decimal("33:52:00S").unwrap();
/// assert!(south < 0.0);
/// ```
pub fn dms_to_decimal(dms: &str) -> Result<f64> {
    let trimmed = dms.trim();
    let (body, southern_or_western) = match trimmed.chars().last() {
        Some(c @ ('N' | 'S' | 'E' | 'W' | 'n' | 's' | 'e' | 'w')) => (
            trimmed[..trimmed.len() - 1].trim_end(),
            matches!(c, 'S' | 'W' | 's' | 'w'),
        ),
        _ => (trimmed, false),
    };

    let parts: Vec<f64> = body
        .trim_start_matches('-')
        .split(':')
        .map(|p| {
            p.trim().parse::<f64>().map_err(|_| {
                QaqcError::InvalidCoordinate(format!("Invalid DMS component '{}' in '{}'", p, dms))
            })
        })
        .collect::<Result<_>>()?;

    let [degrees, minutes, seconds] = parts[..] else {
        return Err(QaqcError::InvalidCoordinate(format!(
            "Invalid DMS format: '{}'. Expected format: 'DD:MM:SS'",
            dms
        )));
    };

    if !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return Err(QaqcError::InvalidCoordinate(format!(
            "Minutes and seconds must be in [0, 60): '{}'",
            dms
        )));
    }

    let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;
    if body.starts_with('-') || southern_or_western {
        Ok(-magnitude)
    } else {
        Ok(magnitude)
    }
}

/// Format decimal degrees as `D:MM:SS.ss`.
pub fn decimal_to_dms(decimal: f64) -> String {
    let sign = if decimal < 0.0 { "-" } else { "" };
    let total_seconds = decimal.abs() * 3600.0;
    let degrees = (total_seconds / 3600.0).floor();
    let minutes = ((total_seconds - degrees * 3600.0) / 60.0).floor();
    let seconds = total_seconds - degrees * 3600.0 - minutes * 60.0;

    format!("{}{}:{:02}:{:05.2}", sign, degrees as i32, minutes as i32, seconds)
}

/// Parse a coordinate given either in decimal degrees or as `D:M:S`.
pub fn parse_coordinate(coord_str: &str) -> Result<f64> {
    let trimmed = coord_str.trim();
    if trimmed.contains(':') {
        return dms_to_decimal(trimmed);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(QaqcError::InvalidCoordinate(format!(
            "Invalid coordinate value: '{}'",
            coord_str
        ))),
    }
}
