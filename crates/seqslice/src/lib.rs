//! seqslice: remote sequence objects as partitionable, lazily-fetched data
//! sources.
//!
//! A client resolves a [`FastaObject`] in remote storage, runs a parallel
//! preprocessing pass that builds a lightweight record index, then asks for
//! a partitioning of the object into byte-range [`PartitionSlice`]s. Each
//! slice is a small, serializable value that defers fetching until a worker
//! calls [`PartitionSlice::get`], so the slices can be handed to an
//! external distributed-execution system and pulled where the work runs.

pub mod attributes;
pub mod config;
pub mod executor;
pub mod fasta;
pub mod index;
pub mod index_cache;
pub mod partition;
pub mod preprocess;
pub mod scan;
pub mod slice;

pub use attributes::Attributes;
pub use config::PreprocessConfig;
pub use executor::{ExecutionBackend, LocalExecutor};
pub use fasta::FastaObject;
pub use index::{IndexEntry, ObjectIndex, FORMAT_VERSION};
pub use index_cache::IndexCache;
pub use partition::{partition, verify_plan, PartitionStrategy};
pub use preprocess::{PreprocessStats, Preprocessor};
pub use scan::{scan_range, HeaderObservation, RangeScan, RECORD_SENTINEL};
pub use slice::{PartitionSlice, SliceSpec};

pub use seqslice_common::{ByteRange, Error, Result};
