use std::fmt;
use std::io::Error;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

use crate::catalog::Category;

#[derive(Debug)]
pub enum SightingsError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    UnknownCategory(String),
    Logging(String),
}

impl fmt::Display for SightingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SightingsError::IoError(e) => write!(f, "io error: {e}"),
            SightingsError::PolarsError(e) => write!(f, "could not read dataset: {e}"),
            SightingsError::LoadingFailed(reason) => write!(f, "loading failed: {reason}"),
            SightingsError::FileNotFound => write!(f, "dataset file not found"),
            SightingsError::PermissionDenied => write!(f, "permission denied"),
            SightingsError::UnknownFileType => {
                write!(f, "unknown file type, expected csv, json or parquet")
            }
            SightingsError::UnknownCategory(name) => write!(
                f,
                "unknown category \"{name}\", expected one of Date, City, State, Country, Shape"
            ),
            SightingsError::Logging(reason) => write!(f, "could not set up logging: {reason}"),
        }
    }
}

impl std::error::Error for SightingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SightingsError::IoError(e) => Some(e),
            SightingsError::PolarsError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Error> for SightingsError {
    fn from(err: Error) -> Self {
        SightingsError::IoError(err)
    }
}

impl From<PolarsError> for SightingsError {
    fn from(err: PolarsError) -> Self {
        SightingsError::PolarsError(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct Config {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    pub initial_category: Category,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            event_poll_time: 100,
            max_column_width: 40,
            initial_category: Category::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    SelectCategory(Category),
    NextCategory,
    PreviousCategory,
    FocusFilter,
    CopyRow,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
1-5          Select category (Date, City, State, Country, Shape)
Tab/S-Tab    Next / previous category
/ f i        Edit the filter value
Enter        Apply the filter
Esc          Leave the filter input / close popup
Up/Down j/k  Move the selection
PgUp/PgDn    Move one page
g / G        First / last row
y            Copy the selected row
?            Show this help
q            Quit";
