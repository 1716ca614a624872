/// Missing-value sentinel used when the station configuration does not set one
pub const DEFAULT_MISSING_VALUE: f64 = -999.0;

/// Magnus-type saturation vapor pressure coefficients (ASCE Eq. 7)
pub const SAT_VP_COEFF: f64 = 0.6108;
pub const SAT_VP_EXP: f64 = 17.27;
pub const SAT_VP_OFFSET: f64 = 237.3;

/// Dewpoint from vapor pressure (Goyal & Harmsen, ch. 13 Eq. 9)
pub const DEWPOINT_A: f64 = 116.91;
pub const DEWPOINT_B: f64 = 237.3;
pub const DEWPOINT_C: f64 = 16.78;

/// Unit conversions
pub const MJ_PER_DAY_TO_W: f64 = 11.574; // MJ m-2 d-1 -> W m-2
pub const W_TO_MJ_PER_DAY: f64 = 0.0864; // W m-2 -> MJ m-2 d-1

/// Thornton-Running coefficients
pub const TR_B0: f64 = 0.031;
pub const TR_B1: f64 = 0.201;
pub const TR_B2: f64 = -0.185;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
