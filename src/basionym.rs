use tracing::info;

use crate::comparator::AuthorComparator;
use crate::models::{Authorship, Name, NomCode};

/// Recombinations sharing one basionym authorship, with the original name
/// if one could be found.
#[derive(Debug, Clone, PartialEq)]
pub struct BasionymGroup<T> {
    pub epithet: Option<String>,
    pub authorship: Authorship,
    pub code: Option<NomCode>,
    pub basionym: Option<T>,
    pub recombinations: Vec<T>,
    /// Further originals that are true duplicates of the basionym.
    pub basionym_duplicates: Vec<T>,
}

impl<T> BasionymGroup<T> {
    pub fn new(epithet: Option<String>, authorship: Authorship, code: Option<NomCode>) -> Self {
        Self {
            epithet,
            authorship,
            code,
            basionym: None,
            recombinations: Vec::new(),
            basionym_duplicates: Vec::new(),
        }
    }

    pub fn has_basionym(&self) -> bool {
        self.basionym.is_some()
    }

    /// Number of names in the group.
    pub fn size(&self) -> usize {
        self.recombinations.len() + self.basionym_duplicates.len() + usize::from(self.has_basionym())
    }
}

/// Sorts names into groups sharing the same basionym, judging only by
/// authorship. Names without any authorship are ignored.
pub struct BasionymSorter {
    comparator: AuthorComparator,
}

impl BasionymSorter {
    pub fn new(comparator: AuthorComparator) -> Self {
        Self { comparator }
    }

    pub fn group_names(&self, names: &[Name]) -> Vec<BasionymGroup<Name>> {
        self.group_basionyms(names.iter().cloned(), |n| n, |_, _| {})
    }

    /// Group any items exposing a name through `func`.
    ///
    /// Groups for which several distinct originals qualify as basionym are
    /// dropped and handed to `on_multiple` together with those originals.
    pub fn group_basionyms<T, I, F, M>(&self, items: I, func: F, mut on_multiple: M) -> Vec<BasionymGroup<T>>
    where
        T: Clone,
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> &Name,
        M: FnMut(BasionymGroup<T>, Vec<T>),
    {
        let mut recombinations = Vec::new();
        let mut originals = Vec::new();
        for item in items {
            let name = func(&item);
            if !name.basionym_authorship.is_empty() {
                recombinations.push(item);
            } else if !name.combination_authorship.is_empty() {
                originals.push(item);
            }
        }

        let mut groups: Vec<BasionymGroup<T>> = Vec::new();
        for recomb in recombinations {
            let name = func(&recomb);
            let existing = groups.iter_mut().find(|g| {
                self.comparator
                    .compare_strict(&name.basionym_authorship, &g.authorship, name.code)
            });
            match existing {
                Some(group) => group.recombinations.push(recomb),
                None => {
                    let mut group = BasionymGroup::new(
                        name.terminal_epithet(),
                        name.basionym_authorship.clone(),
                        name.code,
                    );
                    group.recombinations.push(recomb);
                    groups.push(group);
                }
            }
        }

        let mut result = Vec::with_capacity(groups.len());
        for mut group in groups {
            match self.determine_basionym(&mut group, &originals, &func) {
                Ok(()) => result.push(group),
                Err(candidates) => {
                    info!(
                        epithet = ?group.epithet,
                        authorship = %group.authorship,
                        originals = originals.len(),
                        "Ignore group with multiple basionyms"
                    );
                    on_multiple(group, candidates);
                }
            }
        }
        result
    }

    /// Pick the basionym among the originals. Several matching originals
    /// are only accepted if they are duplicates of the same name, otherwise
    /// they are returned as the error.
    fn determine_basionym<T, F>(&self, group: &mut BasionymGroup<T>, originals: &[T], func: &F) -> Result<(), Vec<T>>
    where
        T: Clone,
        F: Fn(&T) -> &Name,
    {
        let mut candidates: Vec<&T> = originals
            .iter()
            .filter(|o| {
                self.comparator
                    .compare_strict(&group.authorship, &func(o).combination_authorship, group.code)
            })
            .collect();

        if candidates.is_empty() {
            // retry without years, still only accepting a single original
            let no_year = without_year(&group.authorship);
            candidates = originals
                .iter()
                .filter(|o| {
                    self.comparator.compare_strict(
                        &no_year,
                        &without_year(&func(o).combination_authorship),
                        group.code,
                    )
                })
                .collect();
        }

        match candidates.len() {
            0 => Ok(()),
            1 => {
                group.basionym = Some(candidates[0].clone());
                Ok(())
            }
            _ => {
                let first = func(candidates[0]);
                let duplicates = candidates[1..].iter().all(|c| {
                    let n = func(c);
                    n.rank == first.rank
                        && n.genus == first.genus
                        && (!first.is_trinomial() || n.specific_epithet == first.specific_epithet)
                });
                if !duplicates {
                    return Err(candidates.into_iter().cloned().collect());
                }

                let expected = group.authorship.to_string().to_lowercase();
                let pick = candidates
                    .iter()
                    .position(|c| func(c).authorship_complete().to_lowercase() == expected)
                    .unwrap_or(0);
                let basionym = candidates.remove(pick);
                group.basionym = Some(basionym.clone());
                group.basionym_duplicates = candidates.into_iter().cloned().collect();
                Ok(())
            }
        }
    }
}

fn without_year(a: &Authorship) -> Authorship {
    Authorship {
        year: None,
        ..a.clone()
    }
}
