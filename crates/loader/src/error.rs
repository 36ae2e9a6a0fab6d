use core_types::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in table '{table}': {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Schema(#[from] CoreError),
}
