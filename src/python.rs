use std::sync::Arc;

use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::authorship::AuthorshipNormalizer;
use crate::config::IndexConfig;
use crate::matcher::NameIndex;
use crate::models::*;
use crate::repository::SqliteRepository;

fn runtime_err(e: impl ToString) -> PyErr {
    PyErr::new::<PyRuntimeError, _>(e.to_string())
}

/// Python-facing wrapper for NameIndex
#[pyclass(name = "NameIndex")]
pub(crate) struct PyNameIndex {
    inner: NameIndex,
}

#[pymethods]
impl PyNameIndex {
    /// Without paths everything is kept in memory. `repository` is the
    /// SQLite file new names are written to, `path` the index file.
    #[new]
    #[pyo3(signature = (path=None, repository=None, config=None))]
    fn new(path: Option<&str>, repository: Option<&str>, config: Option<&str>) -> PyResult<Self> {
        let config = match config {
            Some(c) => IndexConfig::from_path(c).map_err(runtime_err)?,
            None => IndexConfig::default(),
        };
        let repo = match repository {
            Some(r) => SqliteRepository::persistent(r),
            None => SqliteRepository::in_memory(),
        }
        .map_err(runtime_err)?;
        let normalizer = Arc::new(AuthorshipNormalizer::with_default_authormap().map_err(runtime_err)?);

        let inner = match path {
            Some(p) => NameIndex::persistent(p, Arc::new(repo), normalizer, config).map_err(runtime_err)?,
            None => NameIndex::memory(Arc::new(repo), normalizer, config),
        };
        Ok(PyNameIndex { inner })
    }

    /// Match a name dict. Returns a dict with `type`, `name` and `alternatives`.
    #[pyo3(signature = (name_dict, allow_inserts=false, verbose=false))]
    fn match_name(
        &self,
        py: Python,
        name_dict: &Bound<'_, PyDict>,
        allow_inserts: bool,
        verbose: bool,
    ) -> PyResult<Py<PyAny>> {
        let query = dict_to_name(name_dict)?;
        let m = self
            .inner
            .match_name(&query, allow_inserts, verbose)
            .map_err(runtime_err)?;
        Ok(match_to_dict(py, &m)?.into())
    }

    /// Add a name under a new id. Returns the id.
    fn add(&self, name_dict: &Bound<'_, PyDict>) -> PyResult<String> {
        let name = dict_to_name(name_dict)?;
        let added = self.inner.add(name).map_err(runtime_err)?;
        Ok(added.id.unwrap_or_default())
    }

    fn size(&self) -> usize {
        self.inner.size()
    }
}

// ── Conversion helpers ──────────────────────────────────────────────

fn parse_enum<T: std::str::FromStr<Err = String>>(value: Bound<'_, PyAny>) -> PyResult<T> {
    let s: String = value.extract()?;
    s.parse().map_err(PyErr::new::<PyValueError, _>)
}

fn dict_to_authorship(dict: &Bound<'_, PyDict>) -> PyResult<Authorship> {
    let mut a = Authorship::new();
    if let Some(authors) = dict.get_item("authors")? {
        a.authors = authors.extract()?;
    }
    if let Some(ex) = dict.get_item("ex_authors")? {
        a.ex_authors = ex.extract()?;
    }
    if let Some(year) = dict.get_item("year")? {
        a.year = year.extract()?;
    }
    Ok(a)
}

fn dict_to_name(dict: &Bound<'_, PyDict>) -> PyResult<Name> {
    let scientific_name: String = dict
        .get_item("scientific_name")?
        .ok_or_else(|| PyErr::new::<PyKeyError, _>("scientific_name"))?
        .extract()?;

    let mut name = Name::new(&scientific_name);

    if let Some(id) = dict.get_item("id")? {
        name.id = id.extract()?;
    }
    if let Some(authorship) = dict.get_item("authorship")? {
        name.authorship = authorship.extract()?;
    }
    if let Some(rank) = dict.get_item("rank")? {
        name.rank = Some(parse_enum(rank)?);
    }
    if let Some(code) = dict.get_item("code")? {
        name.code = Some(parse_enum(code)?);
    }
    if let Some(name_type) = dict.get_item("type")? {
        name.name_type = parse_enum(name_type)?;
    }
    if let Some(genus) = dict.get_item("genus")? {
        name.genus = genus.extract()?;
    }
    if let Some(ep) = dict.get_item("specific_epithet")? {
        name.specific_epithet = ep.extract()?;
    }
    if let Some(ep) = dict.get_item("infraspecific_epithet")? {
        name.infraspecific_epithet = ep.extract()?;
    }
    if let Some(comb) = dict.get_item("combination_authorship")? {
        let d: &Bound<'_, PyDict> = comb.cast()?;
        name.combination_authorship = dict_to_authorship(d)?;
    }
    if let Some(bas) = dict.get_item("basionym_authorship")? {
        let d: &Bound<'_, PyDict> = bas.cast()?;
        name.basionym_authorship = dict_to_authorship(d)?;
    }

    Ok(name)
}

fn name_to_dict<'py>(py: Python<'py>, name: &Name) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("id", &name.id)?;
    dict.set_item("dataset_key", name.dataset_key)?;
    dict.set_item("scientific_name", &name.scientific_name)?;
    dict.set_item("authorship", name.authorship_complete())?;
    dict.set_item("rank", name.rank.map(|r| r.as_str()))?;
    dict.set_item("code", name.code.map(|c| format!("{:?}", c).to_uppercase()))?;
    dict.set_item("origin", name.origin.map(|o| format!("{:?}", o)))?;
    dict.set_item("created", name.created.map(|c| c.to_rfc3339()))?;
    Ok(dict)
}

fn match_to_dict<'py>(py: Python<'py>, m: &NameMatch) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("type", format!("{:?}", m.match_type).to_uppercase())?;
    match &m.name {
        Some(n) => dict.set_item("name", name_to_dict(py, n)?)?,
        None => dict.set_item("name", py.None())?,
    }

    let alternatives = PyList::empty(py);
    for alt in &m.alternatives {
        let d = name_to_dict(py, &alt.name)?;
        d.set_item("score", alt.score)?;
        alternatives.append(d)?;
    }
    dict.set_item("alternatives", alternatives)?;
    Ok(dict)
}
