use std::path::{Path, PathBuf};

/// Output file locations for one station run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub corrected: PathBuf,
    pub delta: PathBuf,
    pub fill: PathBuf,
    pub climatology: PathBuf,
}

impl OutputPaths {
    /// `<dir>/<station>_{corrected,delta,fill,climatology}.<extension>`
    pub fn for_station(dir: &Path, station_name: &str, extension: &str) -> Self {
        let stem = sanitize_station_name(station_name);
        let path = |suffix: &str| dir.join(format!("{}_{}.{}", stem, suffix, extension));

        Self {
            corrected: path("corrected"),
            delta: path("delta"),
            fill: path("fill"),
            climatology: path("climatology"),
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [&self.corrected, &self.delta, &self.fill, &self.climatology]
    }
}

/// Lowercase, with runs of non-alphanumeric characters collapsed to `_`.
pub fn sanitize_station_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "station".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths() {
        let paths = OutputPaths::for_station(Path::new("output"), "Bozeman MT", "parquet");

        assert_eq!(paths.corrected, PathBuf::from("output/bozeman_mt_corrected.parquet"));
        assert_eq!(paths.delta, PathBuf::from("output/bozeman_mt_delta.parquet"));
        assert_eq!(paths.fill, PathBuf::from("output/bozeman_mt_fill.parquet"));
        assert_eq!(
            paths.climatology,
            PathBuf::from("output/bozeman_mt_climatology.parquet")
        );
        assert_eq!(paths.all().len(), 4);
    }

    #[test]
    fn test_sanitize_station_name() {
        assert_eq!(sanitize_station_name("  Fort Collins (AWS) "), "fort_collins_aws");
        assert_eq!(sanitize_station_name("***"), "station");
    }
}
