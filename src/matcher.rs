use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::authorship::AuthorshipNormalizer;
use crate::comparator::AuthorComparator;
use crate::config::IndexConfig;
use crate::equality::Equality;
use crate::error::{NameIndexError, Result};
use crate::index::{CandidateGroup, CandidateIndex};
use crate::models::{Alternative, MatchType, Name, NameMatch, NomCode, NomStatus, Origin, Rank};
use crate::normalizer;
use crate::repository::NameRepository;

/// Highest possible score, given for an identical name and authorship.
const EXACT_SCORE: u8 = 5;

/// Matches names against an index of known names, optionally inserting
/// unmatched names.
///
/// Lookups run concurrently. Inserts are serialized and re-check the index
/// under the insert lock, so identical concurrent queries create only one
/// new name.
pub struct NameIndex {
    index: CandidateIndex,
    comparator: AuthorComparator,
    repository: Arc<dyn NameRepository>,
    config: IndexConfig,
    insert_lock: Mutex<()>,
}

/// Comparison forms of a query, computed once per match.
struct Query<'a> {
    name: &'a Name,
    canonical: String,
    full: String,
    authorship: String,
}

impl<'a> Query<'a> {
    fn new(name: &'a Name) -> Self {
        Self {
            name,
            canonical: comparable(name.canonical_name_without_authorship()),
            full: comparable(&name.canonical_name()),
            authorship: comparable(&name.authorship_complete()),
        }
    }
}

fn comparable(s: &str) -> String {
    normalizer::normalized_ascii(s).to_lowercase()
}

/// Per candidate scores and the candidates tied at the best score.
struct Scoring {
    scores: Vec<Option<u8>>,
    best: Vec<usize>,
}

impl NameIndex {
    /// An empty index kept in memory.
    pub fn memory(
        repository: Arc<dyn NameRepository>,
        normalizer: Arc<AuthorshipNormalizer>,
        config: IndexConfig,
    ) -> Self {
        Self::with_index(CandidateIndex::in_memory(), repository, normalizer, config)
    }

    /// Open or create an index file. A new or empty index is populated from
    /// the repository.
    pub fn persistent(
        path: impl AsRef<Path>,
        repository: Arc<dyn NameRepository>,
        normalizer: Arc<AuthorshipNormalizer>,
        config: IndexConfig,
    ) -> Result<Self> {
        let index = CandidateIndex::persistent(path)?;
        let ni = Self::with_index(index, repository, normalizer, config);
        if ni.index.is_empty() {
            ni.load_from_repository()?;
        }
        info!(size = ni.size(), "Started name index");
        Ok(ni)
    }

    pub fn with_index(
        index: CandidateIndex,
        repository: Arc<dyn NameRepository>,
        normalizer: Arc<AuthorshipNormalizer>,
        config: IndexConfig,
    ) -> Self {
        let comparator = AuthorComparator::new(normalizer)
            .with_settings(config.comparator.clone())
            .with_ordering(config.author_ordering);
        Self {
            index,
            comparator,
            repository,
            config,
            insert_lock: Mutex::new(()),
        }
    }

    /// Load all names minted by this index from the repository.
    pub fn load_from_repository(&self) -> Result<usize> {
        info!(dataset_key = self.config.dataset_key, "Loading names from repository");
        let mut loader = self.index.bulk_loader(&self.config.id_prefix)?;
        let mut failed: Option<NameIndexError> = None;
        self.repository
            .process_dataset(self.config.dataset_key, &mut |n| {
                if failed.is_none() {
                    if let Err(e) = loader.push(n) {
                        failed = Some(e);
                    }
                }
            })?;
        match failed {
            Some(e) => Err(e),
            None => loader.finish(),
        }
    }

    pub fn size(&self) -> usize {
        self.index.size()
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    fn next_id(&self) -> String {
        format!("{}{}", self.config.id_prefix, Uuid::new_v4().simple())
    }

    /// Add a name under a freshly minted id, without persisting it.
    pub fn add(&self, name: Name) -> Result<Name> {
        let mut name = name;
        name.id = Some(self.next_id());
        let key = normalizer::key(&name.scientific_name);
        self.index.append(&key, name.clone())?;
        Ok(name)
    }

    /// Match a name against the index.
    ///
    /// With `allow_inserts` an unmatched name of an indexable type is
    /// persisted and added. Ambiguous matches are never inserted. With
    /// `verbose` the losing candidates are attached as alternatives.
    pub fn match_name(&self, query: &Name, allow_inserts: bool, verbose: bool) -> Result<NameMatch> {
        if query.scientific_name.trim().is_empty() {
            return Err(NameIndexError::InvalidQuery(
                "scientific name is required".to_string(),
            ));
        }
        let key = normalizer::key(&query.scientific_name);
        let mut m = self.match_key(&key, query, verbose)?;

        if !m.has_match() && allow_inserts {
            if m.match_type == MatchType::Ambiguous {
                debug!(name = %query, "Do not insert ambiguous name match");
            } else if query.name_type.is_indexable() {
                m = self.insert(&key, query, verbose)?;
            } else {
                debug!(name = %query, name_type = ?query.name_type, "Do not insert name type");
            }
        }
        debug!(name = %query, match_type = ?m.match_type, "Matched");
        Ok(m)
    }

    fn match_key(&self, key: &str, query: &Name, verbose: bool) -> Result<NameMatch> {
        match self.index.get(key)? {
            Some(candidates) => Ok(self.match_candidates(query, &candidates, verbose)),
            None => Ok(NameMatch::no_match()),
        }
    }

    fn insert(&self, key: &str, query: &Name, verbose: bool) -> Result<NameMatch> {
        let _guard = self
            .insert_lock
            .lock()
            .map_err(|_| NameIndexError::LockPoisoned("name index insert"))?;

        // another thread may have inserted the same name meanwhile
        let m = self.match_key(key, query, verbose)?;
        if m.has_match() || m.match_type == MatchType::Ambiguous {
            return Ok(m);
        }

        let mut name = query.clone();
        name.id = Some(self.next_id());
        name.dataset_key = Some(self.config.dataset_key);
        name.origin = Some(Origin::NameMatching);
        name.nom_status = Some(NomStatus::Doubtful);
        name.verbatim_key = None;
        name.homotypic_name_id = None;
        name.published_in_id = None;
        name.created = Some(Utc::now());

        // persist first, a failed write must leave the index untouched
        self.repository.insert(&name)?;
        self.index.append(key, name.clone())?;
        debug!(id = ?name.id, name = %name, "Inserted");

        let mut inserted = NameMatch::found(name, MatchType::Inserted);
        inserted.alternatives = m.alternatives;
        Ok(inserted)
    }

    fn match_candidates(&self, query: &Name, candidates: &CandidateGroup, verbose: bool) -> NameMatch {
        let q = Query::new(query);
        let scoring = self.score_candidates(&q, candidates);
        let names = candidates.names();

        let mut m = match scoring.best.as_slice() {
            [] => NameMatch::no_match(),
            [winner] => build_match(query, &names[*winner]),
            tied => {
                debug!(hits = tied.len(), name = %query, "Ambiguous match");
                NameMatch::ambiguous()
            }
        };

        if verbose {
            m.alternatives = if m.match_type == MatchType::Ambiguous {
                scoring
                    .best
                    .iter()
                    .map(|&i| Alternative {
                        name: names[i].clone(),
                        score: scoring.scores[i],
                    })
                    .collect()
            } else {
                let winner = if m.has_match() { scoring.best.first() } else { None };
                names
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| Some(i) != winner)
                    .map(|(i, n)| Alternative {
                        name: n.clone(),
                        score: scoring.scores[i],
                    })
                    .collect()
            };
        }
        m
    }

    fn score_candidates(&self, q: &Query<'_>, candidates: &CandidateGroup) -> Scoring {
        let mut scores = Vec::with_capacity(candidates.len());
        let mut best = Vec::new();
        let mut best_score = 0;

        for (i, candidate) in candidates.iter().enumerate() {
            let score = self.score(q, candidate);
            scores.push(score);
            let Some(score) = score else { continue };
            if score < best_score {
                continue;
            }
            if score > best_score {
                best.clear();
                best_score = score;
            }
            best.push(i);
        }
        Scoring { scores, best }
    }

    /// Score a candidate from 0 to 5, `None` if it is rejected.
    fn score(&self, q: &Query<'_>, candidate: &Name) -> Option<u8> {
        let query = q.name;
        if !ranks_compatible(query.rank, candidate.rank) {
            return None;
        }
        if !codes_compatible(query.code, candidate.code) {
            return None;
        }
        if q.full == comparable(&candidate.canonical_name()) {
            return Some(EXACT_SCORE);
        }

        let equality = if query.has_authorship() {
            self.comparator.compare_names(query, candidate)
        } else {
            Equality::Unknown
        };
        if equality == Equality::Different {
            return None;
        }

        let mut score = 0;
        if q.authorship == comparable(&candidate.authorship_complete()) {
            score += 2;
        } else if equality == Equality::Equal {
            score += 1;
        }
        if q.canonical == comparable(candidate.canonical_name_without_authorship()) {
            score += 1;
        }
        Some(score)
    }
}

fn build_match(query: &Name, candidate: &Name) -> NameMatch {
    let match_type = if comparable(&query.canonical_name()) == comparable(&candidate.canonical_name()) {
        MatchType::Exact
    } else {
        MatchType::Variant
    };
    NameMatch::found(candidate.clone(), match_type)
}

/// Codes only conflict when both are known and differ.
pub fn codes_compatible(c1: Option<NomCode>, c2: Option<NomCode>) -> bool {
    match (c1, c2) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Whether two ranks can belong to the same name.
///
/// Unknown or unranked sides never conflict, suprageneric ranks are
/// interchangeable and the unspecific infrageneric and infraspecific ranks
/// accept any rank of their kind.
pub fn ranks_compatible(r1: Option<Rank>, r2: Option<Rank>) -> bool {
    let (Some(r1), Some(r2)) = (r1, r2) else {
        return true;
    };
    if r1 == Rank::Unranked || r2 == Rank::Unranked {
        return true;
    }
    if r1.is_suprageneric() && r2.is_suprageneric() {
        return true;
    }
    unspecific_rank_match(r1, r2)
        .or_else(|| unspecific_rank_match(r2, r1))
        .unwrap_or(r1 == r2)
}

fn unspecific_rank_match(r1: Rank, r2: Rank) -> Option<bool> {
    match r1 {
        Rank::SpeciesAggregate => Some(matches!(r2, Rank::Species | Rank::SpeciesAggregate)),
        Rank::InfraspecificName => Some(r2.is_infraspecific()),
        Rank::InfrasubspecificName => Some(r2.is_infraspecific() && r2 != Rank::Subspecies),
        Rank::InfragenericName => Some(r2.is_infrageneric_strictly()),
        _ => None,
    }
}
