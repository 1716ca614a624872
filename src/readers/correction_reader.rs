use crate::error::{QaqcError, Result};
use crate::models::Variable;
use crate::processors::CorrectionEdit;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct EditRow {
    date: String,
    variable: String,
    value: String,
}

/// Reads scripted corrections: a CSV with `date,variable,value` columns.
pub struct CorrectionReader;

impl CorrectionReader {
    pub fn read_edits(path: &Path) -> Result<Vec<CorrectionEdit>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_path(path)?;

        let mut edits = Vec::new();
        for (line, row) in reader.deserialize::<EditRow>().enumerate() {
            let row = row?;
            let line = line + 2;

            let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")?;
            let variable = Variable::from_key(&row.variable).ok_or_else(|| {
                QaqcError::InvalidFormat(format!("Unknown variable '{}' on line {}", row.variable, line))
            })?;
            let value = row.value.parse::<f64>().map_err(|_| {
                QaqcError::InvalidFormat(format!("Invalid value '{}' on line {}", row.value, line))
            })?;

            edits.push(CorrectionEdit { date, variable, value });
        }

        info!(path = %path.display(), edits = edits.len(), "Loaded corrections");
        Ok(edits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_edits() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(
            file,
            "date,variable,value\n# sensor swap\n2020-07-04,tmax,31.5\n2020-07-05, wind ,2.25\n"
        )?;

        let edits = CorrectionReader::read_edits(file.path())?;

        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].variable, Variable::TMax);
        assert_eq!(edits[0].value, 31.5);
        assert_eq!(edits[1].variable, Variable::WindSpeed);
        assert_eq!(edits[1].date, NaiveDate::from_ymd_opt(2020, 7, 5).unwrap());
        Ok(())
    }

    #[test]
    fn test_unknown_variable() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "date,variable,value\n2020-07-04,snow,3\n")?;

        assert!(matches!(
            CorrectionReader::read_edits(file.path()),
            Err(QaqcError::InvalidFormat(_))
        ));
        Ok(())
    }
}
