use polars::prelude::*;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::domain::SightingsError;

#[derive(Debug, PartialEq)]
enum FileType {
    CSV,
    JSON,
    PARQUET,
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// One observation. Values are kept in the dataset's column order and the
/// header is shared by all records of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    header: Arc<[String]>,
    values: Vec<String>,
}

impl Record {
    pub fn new(header: Arc<[String]>, values: Vec<String>) -> Self {
        debug_assert_eq!(header.len(), values.len());
        Self { header, values }
    }

    #[cfg(test)]
    pub fn from_pairs<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        let (header, values): (Vec<String>, Vec<String>) =
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).unzip();
        Self::new(header.into(), values)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.header
            .iter()
            .position(|name| name == key)
            .map(|idx| self.values[idx].as_str())
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

struct Column {
    name: String,
    data: Vec<String>,
}

/// The externally supplied records, loaded once before any handler runs.
#[derive(Debug, Default)]
pub struct Dataset {
    pub name: String,
    pub header: Vec<String>,
    pub widths: Vec<usize>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, header: Vec<String>, records: Vec<Record>) -> Self {
        let widths = header
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                records
                    .iter()
                    .filter_map(|r| r.values().get(idx))
                    .map(|v| v.chars().count())
                    .fold(name.chars().count(), std::cmp::max)
            })
            .collect();
        Dataset {
            name: name.into(),
            header,
            widths,
            records,
        }
    }

    pub fn load(path: PathBuf) -> Result<Self, SightingsError> {
        let file_info = Self::get_file_info(path)?;
        debug!(
            "Loading {:?} ({} bytes) as {:?}",
            file_info.path, file_info.file_size, file_info.file_type
        );
        let frame = match file_info.file_type {
            FileType::CSV => Self::load_csv(&file_info.path)?,
            FileType::JSON => Self::load_json(&file_info.path)?,
            FileType::PARQUET => Self::load_parquet(&file_info.path)?,
        };

        let start_time = Instant::now();

        // Every column is converted to text in its own rayon task.
        let df = frame.collect()?;
        let c_: Result<Vec<Column>, _> = df
            .get_column_names()
            .par_iter()
            .map(|name| Self::load_column(&df, name))
            .collect();
        let columns = c_?;

        let header: Arc<[String]> = columns.iter().map(|c| c.name.clone()).collect();
        let nrows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        let records = (0..nrows)
            .map(|ridx| {
                let values = columns.iter().map(|c| c.data[ridx].clone()).collect();
                Record::new(header.clone(), values)
            })
            .collect::<Vec<Record>>();

        info!(
            "Loaded {} records with {} fields in {}ms",
            records.len(),
            header.len(),
            start_time.elapsed().as_millis()
        );

        let name = file_info
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???");

        Ok(Dataset::new(name, header.to_vec(), records))
    }

    fn load_column(df: &DataFrame, col_name: &str) -> Result<Column, PolarsError> {
        let col = df.column(col_name)?.cast(&DataType::String)?;
        let series = col.str()?;
        let mut data = Vec::with_capacity(series.len());

        for value in series.into_iter() {
            let ss = match value {
                Some(s) => s.replace("\r\n", " ↵ ").replace('\n', " ↵ "),
                None => String::new(),
            };
            data.push(ss);
        }
        trace!("Column \"{col_name}\": {} rows", data.len());

        Ok(Column {
            name: col_name.to_string(),
            data,
        })
    }

    fn detect_file_type(path: &Path) -> Result<FileType, SightingsError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") => Ok(FileType::CSV),
            Some("JSON") => Ok(FileType::JSON),
            Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
            _ => Err(SightingsError::UnknownFileType),
        }
    }

    fn get_file_info(path: PathBuf) -> Result<FileInfo, SightingsError> {
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SightingsError::FileNotFound,
            ErrorKind::PermissionDenied => SightingsError::PermissionDenied,
            _ => SightingsError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(SightingsError::LoadingFailed("Not a file!".into()));
        }

        let file_type = Self::detect_file_type(&path)?;

        Ok(FileInfo {
            path,
            file_size: metadata.len(),
            file_type,
        })
    }

    fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyCsvReader::new(PlPath::Local(path.into()))
            .with_has_header(true)
            .finish()
    }

    fn load_json(path: &Path) -> Result<LazyFrame, SightingsError> {
        let file = File::open(path)?;
        let df = JsonReader::new(file).finish()?;
        Ok(df.lazy())
    }

    fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
    }
}
