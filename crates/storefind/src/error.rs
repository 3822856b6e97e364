use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorefindError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] storefind_catalog::CatalogError),
    #[error("Location error: {0}")]
    Locate(#[from] crate::locate::LocateError),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StorefindError>;
