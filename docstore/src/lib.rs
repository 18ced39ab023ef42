//! In-memory document store: upsert, exact-id lookup and multi-criteria
//! filtered search.
//!
//! ```
//! use docstore::{Author, Document, SearchRequest};
//!
//! let mut store = docstore::in_memory();
//! let saved = store
//!     .save(
//!         Document::builder()
//!             .title("Alpha")
//!             .content("first draft")
//!             .author(Author::new("a-1", "Ada"))
//!             .build(),
//!     )
//!     .unwrap();
//!
//! assert!(store.find_by_id(saved.id_str()).unwrap().is_some());
//! let hits = store
//!     .search(&SearchRequest::default().title_prefixes(["Al"]))
//!     .unwrap();
//! assert_eq!(hits.len(), 1);
//! ```

use thiserror::Error;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use application::{ApplicationError, DocumentManager, DocumentRepository, SaveMode, StoreConfig};
pub use domain::{Author, Document, DocumentBuilder, DocumentId, DomainError, SearchRequest};
pub use infrastructure::InMemoryDocumentRepository;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to install global tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Store backed by a fresh in-memory repository with the default (append) config.
pub fn in_memory() -> DocumentManager {
    in_memory_with_config(StoreConfig::default())
}

pub fn in_memory_with_config(config: StoreConfig) -> DocumentManager {
    DocumentManager::new(Box::new(InMemoryDocumentRepository::new()), config)
}

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`, defaulting to INFO.
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> Result<(), LoggingError> {
    let filter: EnvFilter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()?;
    info!("Logger initialized successfully.");
    Ok(())
}
