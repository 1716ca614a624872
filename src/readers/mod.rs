pub mod correction_reader;
pub mod daily_reader;
pub mod station_reader;

pub use correction_reader::CorrectionReader;
pub use daily_reader::DailyReader;
pub use station_reader::StationReader;
