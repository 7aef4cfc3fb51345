//! Scientific name matching against an index of known names.
//!
//! Names are grouped under a normalized key that tolerates common Latin
//! spelling variation. Candidates of a group are scored by authorship,
//! rank and code, and unmatched names can be minted into the index.

pub mod authorship;
pub mod basionym;
pub mod comparator;
pub mod config;
pub mod equality;
pub mod error;
pub mod index;
pub mod matcher;
pub mod models;
pub mod normalizer;
pub mod repository;
pub mod store;
pub mod year;

#[cfg(feature = "python")]
mod python;

pub use error::{NameIndexError, Result};
pub use matcher::NameIndex;
pub use models::{MatchType, Name, NameMatch};

/// Python module definition
#[cfg(feature = "python")]
#[pyo3::pymodule]
fn _core(m: &pyo3::Bound<'_, pyo3::types::PyModule>) -> pyo3::PyResult<()> {
    use pyo3::types::PyModuleMethods;
    m.add_class::<python::PyNameIndex>()?;
    Ok(())
}
