//! BOM Graph Core Library
//!
//! This library ingests tabular Bill-of-Materials exports, builds a directed
//! dependency graph between BOM ids, and answers bounded-distance
//! neighborhood queries over it.
//!
//! The pipeline runs left to right:
//! [`ingest`] → [`builder`] → [`traverse`] → [`report`], with [`pipeline`]
//! wiring the stages together for the two end-to-end operations.

pub mod builder;
pub mod error;
pub mod graph;
pub mod ident;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod traverse;

// Re-export commonly used types
pub use builder::{BuildOptions, IsolatedNodes};
pub use error::{Error, ErrorKind, ParseWarning, Result};
pub use graph::{BomGraph, BomNode, MISSING_DESCRIPTION};
pub use ident::{BomId, IdPolicy};
pub use ingest::{ShapeRegistry, SourceFormat, SourceInput, SourceShape};
pub use report::{DistanceReport, EdgeList};
pub use traverse::{Direction, Neighborhood};
