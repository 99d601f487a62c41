//! # electoral_explorer
//!
//! Exploratory aggregation over a CSV of electoral candidate records. It
//! supports:
//!
//! - Memory-mapped CSV loading with whole-column type inference (int, float, string)
//! - Declarative and closure filtering with an explicit null policy
//! - Group-by counts and aggregates on one or more key columns
//! - Normalization of an aggregate by per-key totals
//! - Descriptive summaries (`describe`, `value_counts`, `info`)
//! - Chart tables (histogram, box plot, grouped bars) handed to a renderer
//!
//! # Example
//!
//! ```rust,no_run
//! use electoral_explorer::processor::{
//!     FilterPredicate, NullPolicy, Value, dataset::Dataset, group::group_count,
//!     normalize::normalize_within,
//! };
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dataset = Dataset::load_csv(Path::new("candidatos.csv"))?;
//!
//!     // Only councillor candidates
//!     let vereadores = dataset.filter(
//!         "cargo",
//!         &FilterPredicate::Equals(Value::from("vereador")),
//!         &NullPolicy::Drop,
//!     )?;
//!
//!     // Gender share within each state
//!     let by_state = group_count(&vereadores, &["sigla_uf", "genero"])?;
//!     let shares = normalize_within(&by_state, &["sigla_uf"])?;
//!     for (key, share) in shares.iter() {
//!         println!("{key:?} => {share:.3}");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod exploration;
mod helpers;
pub mod processor;
pub mod render;
