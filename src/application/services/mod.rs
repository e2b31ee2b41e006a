//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem)
//! but are themselves concrete structs, not traits.

mod sort;

pub use sort::{
    project_id, sort_document, DocumentReport, PassReport, SortService, WriteMode, POM_FILE_NAME,
};
