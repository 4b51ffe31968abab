//! Prelude module that re-exports commonly used types and traits.
//!
//! ```rust
//! use seglog_rs::prelude::*;
//! ```

pub use crate::repository::config::{FlushMode, RepositoryConfig};
pub use crate::repository::error::LogError;
pub use crate::repository::index::{IndexRecord, RECORD_SIZE};
pub use crate::repository::log_repository::{FIRST_SEGMENT, LogRepository};
pub use crate::repository::reader::{CollectingReader, LogReader, ReadControl};
