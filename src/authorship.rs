//! Author string normalization and the author abbreviation dictionary.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{NameIndexError, Result};
use crate::models::{Authorship, Name};
use crate::normalizer::fold_to_ascii;

static FILIUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][a-z]*)[. ]\s*f(?:il)?\.?\b").expect("valid regex"));

static TRANSLITERATIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([auo])e").expect("valid regex"));

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[[:punct:]&&[^,]]+").expect("valid regex"));

static AUTHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:[a-z]\s)*).*?([a-z]+)( (?:filius|fil|fl|f|bis|ter)\.?)?$")
        .expect("valid regex")
});

const DEFAULT_AUTHORMAP: &str = include_str!("../data/authormap.tsv");

/// Normalizes author strings and expands known abbreviations.
///
/// The abbreviation map is built once and read-only afterwards. Share it
/// between components with an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct AuthorshipNormalizer {
    author_map: HashMap<String, String>,
}

impl AuthorshipNormalizer {
    pub fn without_authormap() -> Self {
        Self::default()
    }

    /// Load the abbreviation map shipped with the crate.
    pub fn with_default_authormap() -> Result<Self> {
        Self::from_tsv(DEFAULT_AUTHORMAP)
    }

    /// Parse a tab separated author map.
    ///
    /// Columns are standard abbreviation, alternative abbreviation (may be
    /// empty) and full name. Blank lines and `#` comments are skipped.
    pub fn from_tsv(tsv: &str) -> Result<Self> {
        let mut raw = Vec::new();
        for (idx, line) in tsv.lines().enumerate() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() < 3 {
                return Err(NameIndexError::AuthorMap {
                    line: idx + 1,
                    reason: format!("expected 3 tab separated columns, found {}", cols.len()),
                });
            }
            raw.push((cols[0], cols[2]));
            raw.push((cols[1], cols[2]));
        }
        Ok(Self::from_pairs(raw))
    }

    /// Build from abbreviation/full name pairs. Both sides are normalized,
    /// pairs where either side is blank are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut author_map = HashMap::new();
        for (abbrev, full) in pairs {
            if let (Some(k), Some(v)) = (normalize(abbrev), normalize(full)) {
                author_map.insert(k, v);
            }
        }
        info!(entries = author_map.len(), "Created author normalizer");
        Self { author_map }
    }

    pub fn len(&self) -> usize {
        self.author_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.author_map.is_empty()
    }

    /// Expand a single normalized author, or return it unchanged.
    pub fn lookup(&self, normalized_author: &str) -> String {
        self.author_map
            .get(normalized_author)
            .cloned()
            .unwrap_or_else(|| normalized_author.to_string())
    }

    pub fn lookup_team(&self, team: &[String]) -> Vec<String> {
        team.iter().map(|a| self.lookup(a)).collect()
    }

    /// Expand only authors shorter than `max_len` characters.
    pub fn lookup_short(&self, team: &[String], max_len: usize) -> Vec<String> {
        team.iter()
            .map(|a| {
                if max_len > 0 && a.len() < max_len {
                    self.lookup(a)
                } else {
                    a.clone()
                }
            })
            .collect()
    }

    /// Sorted unique surnames of a name, for fuzzy grouping.
    ///
    /// Uses the basionym authorship when present. Names without parsed
    /// authorship yield their normalized verbatim authorship as one entry.
    pub fn normalize_name(&self, name: &Name) -> Vec<String> {
        if name.has_parsed_authorship() {
            let authorship = if name.basionym_authorship.has_authors() {
                &name.basionym_authorship
            } else {
                &name.combination_authorship
            };
            let surnames: BTreeSet<String> = self
                .lookup_team(&normalize_authorship(authorship))
                .iter()
                .map(|a| Author::new(a).surname)
                .collect();
            return surnames.into_iter().collect();
        }
        name.authorship
            .as_deref()
            .and_then(normalize)
            .into_iter()
            .collect()
    }
}

/// Normalize one author string.
///
/// Returns lowercase ASCII without punctuation except commas, with
/// `f.`/`fil.` after a name spelled out as `filius`. `None` for blank input.
pub fn normalize(author: &str) -> Option<String> {
    if author.trim().is_empty() {
        return None;
    }
    let x = FILIUS.replace_all(author, "$1 filius");
    let x = fold_to_ascii(&x);
    let x = TRANSLITERATIONS.replace_all(&x, "$1");
    let x = PUNCTUATION.replace_all(&x, " ");
    let x = x.split_whitespace().collect::<Vec<_>>().join(" ");
    if x.is_empty() {
        None
    } else {
        Some(x.to_lowercase())
    }
}

/// Normalize an author team, dropping blank entries and `et al.`.
pub fn normalize_team<'a, I>(authors: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    authors
        .into_iter()
        .filter_map(|a| normalize(a))
        .filter(|a| a != "al" && a != "et al")
        .collect()
}

/// Normalized authors followed by ex authors.
pub fn normalize_authorship(authorship: &Authorship) -> Vec<String> {
    normalize_team(authorship.authors.iter().chain(authorship.ex_authors.iter()))
}

/// A single normalized author split into initials, surname and suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub fullname: String,
    pub initials: Option<String>,
    pub surname: String,
    pub suffix: Option<String>,
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

impl Author {
    pub fn new(normalized: &str) -> Self {
        match AUTHOR.captures(normalized) {
            Some(caps) => {
                let suffix = non_blank(caps.get(3).map(|m| m.as_str())).map(|s| {
                    if s.starts_with('f') {
                        "filius".to_string()
                    } else {
                        s.trim_end_matches('.').to_string()
                    }
                });
                Self {
                    fullname: normalized.to_string(),
                    initials: non_blank(caps.get(1).map(|m| m.as_str())),
                    surname: non_blank(caps.get(2).map(|m| m.as_str()))
                        .unwrap_or_else(|| normalized.trim().to_string()),
                    suffix,
                }
            }
            None => {
                debug!(author = normalized, "Cannot parse single author");
                Self {
                    fullname: normalized.to_string(),
                    initials: None,
                    surname: normalized.trim().to_string(),
                    suffix: None,
                }
            }
        }
    }

    pub fn with_parts(
        fullname: &str,
        initials: Option<&str>,
        surname: &str,
        suffix: Option<&str>,
    ) -> Self {
        Self {
            fullname: fullname.to_string(),
            initials: non_blank(initials),
            surname: surname.to_string(),
            suffix: non_blank(suffix),
        }
    }

    pub fn initials_or_suffix_differ(&self, other: &Author) -> bool {
        self.initials_differ(other) || self.suffix != other.suffix
    }

    /// Initials conflict only if both sides have some and neither set is
    /// contained in the other. A missing initial never conflicts.
    pub fn initials_differ(&self, other: &Author) -> bool {
        let (Some(a), Some(b)) = (&self.initials, &other.initials) else {
            return false;
        };
        if a == b {
            return false;
        }
        let mut smaller: Vec<char> = a.chars().filter(|c| !c.is_whitespace()).collect();
        let mut larger: Vec<char> = b.chars().filter(|c| !c.is_whitespace()).collect();
        if smaller.len() > larger.len() {
            std::mem::swap(&mut smaller, &mut larger);
        }
        !is_sub_multiset(&smaller, &larger)
    }
}

fn is_sub_multiset(smaller: &[char], larger: &[char]) -> bool {
    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in larger {
        *counts.entry(*c).or_default() += 1;
    }
    for c in smaller {
        match counts.get_mut(c) {
            Some(n) if *n > 0 => *n -= 1,
            _ => return false,
        }
    }
    true
}
