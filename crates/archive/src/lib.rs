//! # decadal-archive
//!
//! Reindexes decadal hindcast runs from calendar time onto forecast lead
//! time. Each run starts at its initialization month; month `t` of the run
//! belongs to lead year `t / 12 + 1`. The merge engine stacks runs into one
//! archive over `(initialization_year, lead_year, month, lat, lon)`.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["Dataset (per input)"] -->|"load_run()"| B["RawRun"]
//!     B -->|"plan_merge()"| C["MergePlan"]
//!     C -->|"DenseStore::new()"| D["CellStore"]
//!     B -->|"merge_runs() / merge_into()"| D
//!     D --> E["MergedArchive"]
//!     E -->|"LeadYearMeans::from_archive()"| F["LeadYearMeans"]
//!     F -->|"anomalies(climatology)"| G["LeadYearMeans (anomaly)"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use decadal_archive::{LoadConfig, MemoryDataset, merge_datasets};
//!
//! let config = LoadConfig::new("tas");
//! let archive = merge_datasets(&datasets, &config)?;
//!
//! for &year in archive.initialization_years() {
//!     if let Some(grid) = archive.grid(year, 1, 1) {
//!         println!("{year}: first month of lead year 1 = {:?}", grid);
//!     }
//! }
//! println!("{} of {} cells missing", archive.n_missing_cells(), archive.n_cells());
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `dataset` | `Dataset` / `GridSeries` input traits |
//! | `memory` | In-memory `Dataset` |
//! | `config` | Loader configuration |
//! | `run` | Single-run loader and `RawRun` |
//! | `store` | Cell addressing and `DenseStore` |
//! | `merge` | Merge engine |
//! | `archive` | `MergedArchive` |
//! | `anomaly` | Lead-year means and anomalies |
//! | `error` | Error types |

mod anomaly;
mod archive;
mod config;
mod dataset;
mod error;
mod memory;
mod merge;
mod run;
mod store;

pub use anomaly::{Climatology, LeadYearMeans, anomalies};
pub use archive::MergedArchive;
pub use config::LoadConfig;
pub use dataset::{Dataset, GridSeries};
pub use error::ArchiveError;
pub use memory::{MemoryDataset, MemoryDatasetError, MemoryField};
pub use merge::{MergePlan, merge_datasets, merge_into, merge_runs, plan_merge};
pub use run::{RawRun, load_run};
pub use store::{ArchiveShape, CellStore, DenseStore, MONTHS_PER_LEAD_YEAR};
