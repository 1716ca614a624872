use crate::error::{QaqcError, Result};
use crate::models::{ClimatologySeries, ClimatologyTable, DailyTable, TableRow, Variable};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Writes daily tables and climatologies as Parquet. Missing values are
/// written as nulls.
pub struct ParquetWriter {
    compression: Compression,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(QaqcError::Configuration(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    fn properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(DEFAULT_ROW_GROUP_SIZE)
            .build()
    }

    fn write_batch(&self, batch: &RecordBatch, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(self.properties()))?;
        writer.write(batch)?;
        writer.close()?;
        debug!(path = %path.display(), rows = batch.num_rows(), "Wrote Parquet file");
        Ok(())
    }

    /// Schema shared by the corrected, delta and fill tables.
    pub fn daily_schema() -> Arc<Schema> {
        let mut fields = vec![
            Field::new("year", DataType::Int32, false),
            Field::new("month", DataType::UInt32, false),
            Field::new("day", DataType::UInt32, false),
        ];
        fields.extend(
            Variable::ALL
                .iter()
                .map(|v| Field::new(v.key(), DataType::Float64, true)),
        );
        Arc::new(Schema::new(fields))
    }

    pub fn write_daily_table(&self, table: &DailyTable, path: &Path) -> Result<()> {
        let schema = Self::daily_schema();

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(table.rows.iter().map(|r| r.year).collect::<Vec<_>>())),
            Arc::new(UInt32Array::from(table.rows.iter().map(|r| r.month).collect::<Vec<_>>())),
            Arc::new(UInt32Array::from(table.rows.iter().map(|r| r.day).collect::<Vec<_>>())),
        ];
        for variable in Variable::ALL {
            columns.push(Arc::new(nullable(table.rows.iter().map(|r| r.get(variable)))));
        }

        let batch = RecordBatch::try_new(schema, columns)?;
        self.write_batch(&batch, path)
    }

    /// One row per calendar month, one column per climatology series.
    pub fn write_climatology(&self, table: &ClimatologyTable, path: &Path) -> Result<()> {
        let mut fields = vec![Field::new("month", DataType::UInt32, false)];
        fields.extend(
            ClimatologySeries::ALL
                .iter()
                .map(|s| Field::new(s.key(), DataType::Float64, true)),
        );
        let schema = Arc::new(Schema::new(fields));

        let mut columns: Vec<ArrayRef> = vec![Arc::new(UInt32Array::from((1..=12).collect::<Vec<u32>>()))];
        for series in ClimatologySeries::ALL {
            let climatology = table.get(series);
            columns.push(Arc::new(nullable((1..=12).map(|m| climatology.get(m)))));
        }

        let batch = RecordBatch::try_new(schema, columns)?;
        self.write_batch(&batch, path)
    }

    /// Read a daily table back; nulls become NaN.
    pub fn read_daily_table(&self, path: &Path) -> Result<DailyTable> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut rows = Vec::new();
        for batch in reader {
            let batch = batch?;
            let years = column::<Int32Array>(&batch, "year")?;
            let months = column::<UInt32Array>(&batch, "month")?;
            let days = column::<UInt32Array>(&batch, "day")?;
            let values = Variable::ALL
                .iter()
                .map(|v| column::<Float64Array>(&batch, v.key()))
                .collect::<Result<Vec<_>>>()?;

            for i in 0..batch.num_rows() {
                let mut row = TableRow {
                    year: years.value(i),
                    month: months.value(i),
                    day: days.value(i),
                    values: [f64::NAN; Variable::COUNT],
                };
                for (slot, array) in row.values.iter_mut().zip(&values) {
                    if array.is_valid(i) {
                        *slot = array.value(i);
                    }
                }
                rows.push(row);
            }
        }

        Ok(DailyTable::new(rows))
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows: metadata.file_metadata().num_rows(),
            columns: metadata.file_metadata().schema_descr().num_columns(),
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size: std::fs::metadata(path)?.len(),
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn nullable(values: impl Iterator<Item = f64>) -> Float64Array {
    values
        .map(|v| if v.is_nan() { None } else { Some(v) })
        .collect()
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| QaqcError::InvalidFormat(format!("Missing or mistyped column '{}'", name)))
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub columns: usize,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Columns: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.columns,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
            self.total_rows as f64 / self.row_groups.max(1) as f64
        )
    }
}
