//! `tabrecon-recon`: keyed reconciliation of two tabular datasets.
//!
//! Pure engine crate. It receives loaded datasets and returns classified
//! results and rendered tables; it never touches the filesystem or logs.

pub mod dataset;
pub mod engine;
pub mod error;
pub mod keys;
pub mod model;
pub mod report;
pub mod value;

pub use dataset::Dataset;
pub use engine::reconcile;
pub use error::{ReconError, SchemaError, Side};
pub use keys::key_columns;
pub use model::{CombinedRow, JoinKey, ReconCounts, ReconResult};
pub use report::{assemble, Report, SummaryInfo, Table};
pub use value::Scalar;
