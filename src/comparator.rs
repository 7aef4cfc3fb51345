use std::collections::HashSet;
use std::sync::Arc;

use crate::authorship::{normalize_authorship, normalize_team, Author, AuthorshipNormalizer};
use crate::config::{AuthorOrdering, ComparatorSettings};
use crate::equality::Equality;
use crate::models::{Authorship, Name, NomCode};
use crate::year::YearComparator;

/// Thresholds for one author team comparison.
#[derive(Debug, Clone, Copy)]
struct TeamThresholds {
    min_common_start: usize,
    max_len_without_lookup: usize,
    min_jaro: f64,
}

/// Compares authorships of names: author teams and publication years.
///
/// Author strings are normalized to ASCII before comparison. Authors are
/// abbreviated in many ways, so a shared surname prefix or a high
/// Jaro-Winkler similarity is accepted as equal unless the initials
/// or suffixes conflict.
pub struct AuthorComparator {
    normalizer: Arc<AuthorshipNormalizer>,
    settings: ComparatorSettings,
    ordering: AuthorOrdering,
}

impl AuthorComparator {
    pub fn new(normalizer: Arc<AuthorshipNormalizer>) -> Self {
        Self {
            normalizer,
            settings: ComparatorSettings::default(),
            ordering: AuthorOrdering::default(),
        }
    }

    pub fn with_settings(mut self, settings: ComparatorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_ordering(mut self, ordering: AuthorOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    fn normal(&self) -> TeamThresholds {
        TeamThresholds {
            min_common_start: self.settings.min_common_substring,
            max_len_without_lookup: self.settings.min_author_length_without_lookup,
            min_jaro: self.settings.min_jaro_similarity,
        }
    }

    fn strict(&self) -> TeamThresholds {
        TeamThresholds {
            min_common_start: self.settings.min_common_substring * self.settings.strict_factor,
            max_len_without_lookup: self.settings.min_author_length_without_lookup,
            min_jaro: self.settings.strict_jaro_similarity,
        }
    }

    /// Compare two authorships using the configured ordering.
    pub fn compare(&self, a1: &Authorship, a2: &Authorship) -> Equality {
        match self.ordering {
            AuthorOrdering::YearFirst => self.compare_year_first(a1, a2),
            AuthorOrdering::AuthorsFirst => self.compare_authors_first(a1, a2),
        }
    }

    /// Years decide first. Matching years need compatible authors, years only
    /// close to each other need authors passing the strict thresholds and
    /// years further apart are always different.
    pub fn compare_year_first(&self, a1: &Authorship, a2: &Authorship) -> Equality {
        let y1 = a1.year.as_deref();
        let y2 = a2.year.as_deref();
        let year = YearComparator::new(y1, y2)
            .with_tolerance(self.settings.year_match_tolerance)
            .compare();

        match year {
            Equality::Equal => year.and(self.compare_team(a1, a2, self.normal())),
            Equality::Unknown => self.compare_team(a1, a2, self.normal()),
            Equality::Different => {
                let close = YearComparator::new(y1, y2)
                    .with_tolerance(self.settings.year_tolerance)
                    .compare();
                if close == Equality::Equal
                    && self.compare_team(a1, a2, self.strict()) == Equality::Equal
                {
                    Equality::Equal
                } else {
                    Equality::Different
                }
            }
        }
    }

    /// Authors decide first. If they are not equal, a close year may
    /// override the result when both author strings share a capital letter.
    pub fn compare_authors_first(&self, a1: &Authorship, a2: &Authorship) -> Equality {
        let mut result = self.compare_team(a1, a2, self.normal());
        if result == Equality::Equal {
            return result;
        }
        let year = YearComparator::new(a1.year.as_deref(), a2.year.as_deref())
            .with_tolerance(self.settings.authors_first_year_tolerance)
            .compare();
        match year {
            Equality::Unknown => {}
            Equality::Different => result = year,
            Equality::Equal => {
                if a1.authors.is_empty() || a2.authors.is_empty() {
                    result = year;
                } else {
                    let upper1 = uppercase_chars(&a1.authors);
                    let upper2 = uppercase_chars(&a2.authors);
                    if !upper1.is_disjoint(&upper2) {
                        result = year;
                    }
                }
            }
        }
        result
    }

    /// Compare combination and basionym authorship of two names.
    ///
    /// A definite combination result wins. Otherwise basionym authorships are
    /// compared; if those are unknown too, an authorship written on the
    /// wrong side of the brackets may still produce an equal.
    pub fn compare_names(&self, n1: &Name, n2: &Name) -> Equality {
        let recomb = self.compare(&n1.combination_authorship, &n2.combination_authorship);
        if recomb != Equality::Unknown {
            return recomb;
        }
        let original = self.compare(&n1.basionym_authorship, &n2.basionym_authorship);
        if original == Equality::Unknown {
            let across = if n1.combination_authorship.is_empty() {
                self.compare(&n1.basionym_authorship, &n2.combination_authorship)
            } else if n1.basionym_authorship.is_empty() {
                self.compare(&n1.combination_authorship, &n2.basionym_authorship)
            } else {
                Equality::Unknown
            };
            return if across == Equality::Equal {
                Equality::Equal
            } else {
                Equality::Unknown
            };
        }
        recomb.and(original)
    }

    /// Strict comparison requiring both authors and year to match.
    ///
    /// Zoological names are compared on the first written authors, all
    /// other codes on the publishing authors, ignoring ex authors. Years
    /// must be identical when present on either side.
    pub fn compare_strict(&self, a1: &Authorship, a2: &Authorship, code: Option<NomCode>) -> bool {
        let (t1, t2) = match code {
            Some(NomCode::Zoological) => (first_position(a1), first_position(a2)),
            _ => (&a1.authors, &a2.authors),
        };
        let thresholds = TeamThresholds {
            max_len_without_lookup: usize::MAX,
            ..self.normal()
        };
        let team = self.compare_normalized_teams(normalize_team(t1), normalize_team(t2), thresholds);
        if team != Equality::Equal {
            return false;
        }
        if is_blank(&a1.year) && is_blank(&a2.year) {
            return true;
        }
        YearComparator::new(a1.year.as_deref(), a2.year.as_deref()).compare() == Equality::Equal
    }

    fn compare_team(&self, a1: &Authorship, a2: &Authorship, t: TeamThresholds) -> Equality {
        self.compare_normalized_teams(normalize_authorship(a1), normalize_authorship(a2), t)
    }

    /// Compare normalized teams, expanding short abbreviations first and
    /// retrying with every author expanded if that changes anything.
    fn compare_normalized_teams(
        &self,
        team1: Vec<String>,
        team2: Vec<String>,
        t: TeamThresholds,
    ) -> Equality {
        let team1 = self.normalizer.lookup_short(&team1, t.max_len_without_lookup);
        let team2 = self.normalizer.lookup_short(&team2, t.max_len_without_lookup);
        if team1.is_empty() || team2.is_empty() {
            return Equality::Unknown;
        }
        let mut equality = compare_expanded_teams(&team1, &team2, t);
        if equality != Equality::Equal {
            let team1l = self.normalizer.lookup_team(&team1);
            let team2l = self.normalizer.lookup_team(&team2);
            if team1 != team1l || team2 != team2l {
                equality = compare_expanded_teams(&team1l, &team2l, t);
            }
        }
        equality
    }

    /// Compare two single authors with the default thresholds.
    pub fn compare_authors(&self, a1: &Author, a2: &Author) -> Equality {
        compare_author(
            a1,
            a2,
            self.settings.min_common_substring,
            self.settings.min_jaro_similarity,
        )
    }
}

fn is_blank(year: &Option<String>) -> bool {
    year.as_deref().map_or(true, |y| y.trim().is_empty())
}

fn first_position(a: &Authorship) -> &Vec<String> {
    if a.ex_authors.is_empty() {
        &a.authors
    } else {
        &a.ex_authors
    }
}

fn uppercase_chars(authors: &[String]) -> HashSet<char> {
    authors
        .iter()
        .flat_map(|a| a.chars())
        .filter(|c| c.is_uppercase())
        .collect()
}

/// A single pair of equal authors is enough for two teams to be equal.
fn compare_expanded_teams(team1: &[String], team2: &[String], t: TeamThresholds) -> Equality {
    if team1 == team2 {
        return Equality::Equal;
    }
    for author1 in team1 {
        let a1 = Author::new(author1);
        for author2 in team2 {
            let a2 = Author::new(author2);
            if compare_author(&a1, &a2, t.min_common_start, t.min_jaro) == Equality::Equal {
                return Equality::Equal;
            }
        }
    }
    Equality::Different
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .char_indices()
        .zip(b.chars())
        .take_while(|((_, x), y)| x == y)
        .last()
        .map_or(0, |((i, x), _)| i + x.len_utf8());
    &a[..len]
}

/// Jaro-Winkler similarity in percent, penalized for very short strings.
pub fn jaro(a: &str, b: &str) -> f64 {
    let sim = strsim::jaro_winkler(a, b) * 100.0;
    let len = a.chars().count() + b.chars().count();
    if len < 10 {
        sim - ((10 - len) * 5) as f64
    } else {
        sim
    }
}

/// Compare two single, already normalized authors.
pub fn compare_author(a1: &Author, a2: &Author, min_common_start: usize, min_jaro: f64) -> Equality {
    if a1.fullname == a2.fullname {
        return Equality::Equal;
    }

    let common = common_prefix(&a1.surname, &a2.surname);
    if a1.surname == a2.surname
        || jaro(&a1.surname, &a2.surname) > min_jaro
        || common.len() >= min_common_start
    {
        // relatives often share a surname and differ only by initials or suffix
        return if a1.initials_or_suffix_differ(a2) {
            Equality::Different
        } else {
            Equality::Equal
        };
    }

    // short surname fully contained as the start of the other one
    if !a1.initials_or_suffix_differ(a2)
        && ((a1.surname == common && a2.surname.starts_with(common))
            || (a2.surname == common && a1.surname.starts_with(common)))
    {
        return Equality::Equal;
    }

    // a full author string that is an abbreviation of the other surname
    if (a1.fullname == common && a2.surname.starts_with(common))
        || (a2.fullname == common && a1.surname.starts_with(common))
    {
        return Equality::Equal;
    }

    Equality::Different
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_comparator() -> AuthorComparator {
        let normalizer = AuthorshipNormalizer::with_default_authormap().unwrap();
        AuthorComparator::new(Arc::new(normalizer))
    }

    fn auth(authors: Vec<&str>, year: Option<&str>) -> Authorship {
        let a = Authorship::authors(authors);
        match year {
            Some(y) => a.with_year(y),
            None => a,
        }
    }

    fn assert_auth(
        comp: &AuthorComparator,
        a1: Vec<&str>,
        y1: Option<&str>,
        expected: Equality,
        a2: Vec<&str>,
        y2: Option<&str>,
    ) {
        let x = auth(a1.clone(), y1);
        let y = auth(a2.clone(), y2);
        assert_eq!(
            comp.compare(&x, &y),
            expected,
            "{:?} {:?} vs {:?} {:?}",
            a1,
            y1,
            a2,
            y2
        );
        assert_eq!(comp.compare(&y, &x), expected, "reversed {:?} vs {:?}", a2, a1);
    }

    fn author(fullname: &str, initials: Option<&str>, suffix: Option<&str>) -> Author {
        Author::with_parts(fullname, initials, fullname, suffix)
    }

    #[test]
    fn test_compare_single_author_fuzzy() {
        let novicki = author("novicki", None, None);
        let nowicki = author("nowicki", None, None);
        assert_eq!(compare_author(&novicki, &novicki, 4, 90.0), Equality::Equal);
        assert_eq!(compare_author(&novicki, &nowicki, 4, 90.0), Equality::Equal);
        assert_eq!(
            compare_author(
                &author("novicki", Some("a"), None),
                &author("nowicki", Some("a"), None),
                4,
                90.0
            ),
            Equality::Equal
        );
        assert_eq!(
            compare_author(
                &author("novicki", Some("k"), None),
                &author("nowicki", Some("a"), None),
                4,
                90.0
            ),
            Equality::Different
        );
        assert_eq!(
            compare_author(&novicki, &author("nowa", None, None), 4, 90.0),
            Equality::Different
        );
    }

    #[test]
    fn test_compare_single_author_suffix() {
        assert_eq!(
            compare_author(
                &author("novicki", None, None),
                &author("nowicki", None, Some("filius")),
                4,
                90.0
            ),
            Equality::Different
        );

        let bis = Author::new("f r jones bis");
        let ter = Author::new("f r jones ter");
        let plain = Author::new("f r jones");
        assert_eq!(bis.surname, "jones");
        assert_eq!(bis.suffix.as_deref(), Some("bis"));
        assert_eq!(plain.suffix, None);
        assert_eq!(compare_author(&bis, &ter, 4, 90.0), Equality::Different);
        assert_eq!(compare_author(&bis, &plain, 4, 90.0), Equality::Different);
        assert_eq!(compare_author(&bis, &Author::new("f r jones bis"), 4, 90.0), Equality::Equal);
    }

    #[test]
    fn test_compare_single_author_initials() {
        let comp = make_comparator();
        assert_eq!(
            comp.compare_authors(&Author::new("a j white"), &Author::new("a b white")),
            Equality::Different
        );
        assert_eq!(
            comp.compare_authors(&Author::new("a j white"), &Author::new("white")),
            Equality::Equal
        );
        assert_eq!(
            comp.compare_authors(&Author::new("f k schimp"), &Author::new("k f schimp")),
            Equality::Equal
        );
    }

    #[test]
    fn test_compare_single_author_abbreviation() {
        let comp = make_comparator();
        // prefix shorter than the threshold but a full abbreviation of the other surname
        assert_eq!(
            comp.compare_authors(&Author::new("l"), &Author::new("linnaus")),
            Equality::Equal
        );
        assert_eq!(
            comp.compare_authors(&Author::new("reich"), &Author::new("reichenbach")),
            Equality::Equal
        );
        assert_eq!(
            comp.compare_authors(&Author::new("brug"), &Author::new("pascal bruggeman")),
            Equality::Equal
        );
        assert_eq!(
            comp.compare_authors(&Author::new("reich"), &Author::new("muller")),
            Equality::Different
        );
    }

    #[test]
    fn test_jaro_penalty_for_short_names() {
        assert!(jaro("ab", "ab") < 100.0);
        assert_eq!(jaro("baldenstein", "baldenstein"), 100.0);
        assert!(jaro("novicki", "nowicki") > 90.0);
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix("reich", "reichenbach"), "reich");
        assert_eq!(common_prefix("abc", "xyz"), "");
        assert_eq!(common_prefix("", "abc"), "");
    }

    #[test]
    fn test_compare_team_abbreviation_via_lookup() {
        let comp = make_comparator();
        assert_auth(&comp, vec!["Rchb."], None, Equality::Equal, vec!["Reichenbach"], None);
        assert_auth(&comp, vec!["L."], Some("1758"), Equality::Equal, vec!["Linnaeus"], Some("1758"));
        assert_auth(&comp, vec!["L.f"], None, Equality::Equal, vec!["Linnaeus filius"], None);
        assert_auth(&comp, vec!["Mill."], None, Equality::Different, vec!["L."], None);
        assert_auth(&comp, vec!["H. Christ"], None, Equality::Different, vec!["C. Chr."], None);
    }

    #[test]
    fn test_compare_teams() {
        let comp = make_comparator();
        assert_auth(&comp, vec!["Torr.", "Gray"], None, Equality::Equal, vec!["Torr.", "A.Gray"], None);
        assert_auth(&comp, vec!["Young", "Dye", "Wilkie"], Some("1978"), Equality::Equal, vec!["Young"], Some("1978"));
        assert_auth(&comp, vec!["Young", "Dye", "Wilkie"], None, Equality::Equal, vec!["Young", "et al."], None);
        assert_auth(&comp, vec!["Debreczy", "I. Rácz"], None, Equality::Equal, vec!["Rácz"], None);
        assert_auth(&comp, vec!["A.J. White", "Herbert", "P.J. Harvey"], None, Equality::Equal, vec!["Harvey"], None);
        assert_auth(&comp, vec!["R.H.Roberts"], None, Equality::Different, vec!["R.J.Roberts"], None);
        assert_auth(&comp, vec!["Chapm."], None, Equality::Equal, vec!["F.R.Chapm."], None);
        assert_auth(&comp, vec!["G. Don f."], None, Equality::Equal, vec!["G. Don fil."], None);
        assert_auth(&comp, vec!["Hirats."], None, Equality::Different, vec!["Hirats. f."], None);
        assert_auth(&comp, vec!["A.M.C. Duméril"], None, Equality::Equal, vec!["A.Duméril"], None);
        assert_auth(&comp, vec!["A.M.C. Duméril"], None, Equality::Different, vec!["A.H.A. Duméril"], None);
        assert_auth(&comp, vec!["Novicki"], Some("1936"), Equality::Equal, vec!["Noviçki"], Some("1936"));
        assert_auth(&comp, vec!["Quél."], None, Equality::Equal, vec!["Quel."], None);
    }

    #[test]
    fn test_compare_unknown() {
        let comp = make_comparator();
        assert_auth(&comp, vec![], None, Equality::Unknown, vec![], None);
        assert_auth(&comp, vec![""], Some("  "), Equality::Unknown, vec![" "], Some("   "));
        assert_auth(&comp, vec!["L."], None, Equality::Unknown, vec![], None);
    }

    #[test]
    fn test_compare_optional_year() {
        let comp = make_comparator();
        assert_auth(&comp, vec!["Pallas"], Some("1771"), Equality::Different, vec!["Pimbus"], Some("1771"));
        assert_auth(&comp, vec!["Pallas"], Some("1771"), Equality::Equal, vec![], Some("1771"));
        assert_auth(&comp, vec!["Pallas"], Some("1771"), Equality::Equal, vec!["Pallas"], None);
        assert_auth(&comp, vec!["Pallas"], Some("1771"), Equality::Different, vec![], Some("1778"));
        assert_auth(&comp, vec!["Pallas"], None, Equality::Unknown, vec![], Some("1771"));
        assert_auth(&comp, vec![], Some("1978"), Equality::Different, vec![], Some("1934"));
        assert_auth(&comp, vec![], Some("1978"), Equality::Equal, vec![], Some("1978"));
    }

    #[test]
    fn test_compare_year_window() {
        let comp = make_comparator();
        assert_auth(&comp, vec!["Bruand"], Some("1850"), Equality::Equal, vec!["Bruand"], Some("1850"));
        assert_auth(&comp, vec!["Bruand"], Some("1850"), Equality::Equal, vec!["Bruand"], Some("1851"));
        assert_auth(&comp, vec!["Bruand"], Some("1850"), Equality::Different, vec![], Some("1998"));
        assert_auth(&comp, vec!["Mortensen"], Some("1933"), Equality::Different, vec!["Meixner"], Some("1924"));
    }

    #[test]
    fn test_missing_years_compare_with_normal_thresholds() {
        let comp = make_comparator();
        let c = vec!["Conrad von Baldenstein"];
        // fails the strict thresholds for close years, passes without years
        assert_auth(&comp, c.clone(), Some("1827"), Equality::Different, vec!["Baldenstone"], Some("1838"));
        assert_auth(&comp, c.clone(), None, Equality::Equal, vec!["Baldenstone"], None);
        assert_auth(&comp, c.clone(), Some("1827"), Equality::Equal, vec!["Baldenstone"], None);
        assert_auth(&comp, c, None, Equality::Different, vec!["Buddenbrocks"], None);
        assert_auth(&comp, vec!["Pallas"], None, Equality::Different, vec!["Pimbus"], None);
    }

    #[test]
    fn test_von_baldenstein() {
        let comp = make_comparator();
        let c = vec!["Conrad von Baldenstein"];
        let y = Some("1827");
        assert_auth(&comp, c.clone(), y, Equality::Equal, vec!["Conrad von Baldenstein"], Some("1827"));
        assert_auth(&comp, c.clone(), y, Equality::Equal, vec!["Conrad von Baldenstein"], Some("1828"));
        assert_auth(&comp, c.clone(), y, Equality::Equal, vec!["Conrad von Baldenstein"], Some("1837"));
        assert_auth(&comp, c.clone(), y, Equality::Equal, vec!["C. v. Baldenstein"], Some("1824"));
        assert_auth(&comp, c.clone(), y, Equality::Equal, vec!["C. Baldenstein"], Some("1828"));
        assert_auth(&comp, c.clone(), y, Equality::Equal, vec!["C. Baldenstein"], Some("1838"));
        assert_auth(&comp, c.clone(), y, Equality::Equal, vec!["Baldenstein"], Some("1827"));
        assert_auth(&comp, c.clone(), y, Equality::Equal, vec!["Baldenstone"], Some("1827"));

        assert_auth(&comp, c.clone(), y, Equality::Different, vec!["Baldenstone"], Some("1838"));
        assert_auth(&comp, c.clone(), y, Equality::Different, vec!["Conrad von Buddenbrocks"], Some("1827"));
        assert_auth(&comp, c, y, Equality::Different, vec!["Buddenbrocks"], Some("1827"));
    }

    #[test]
    fn test_compare_ex_authors() {
        let comp = make_comparator();
        let ex = Authorship::authors(vec!["Miller"]).with_ex_authors(vec!["Döring"]);
        assert_eq!(comp.compare(&ex, &Authorship::authors(vec!["Miller"])), Equality::Equal);
        assert_eq!(comp.compare(&ex, &Authorship::authors(vec!["Döring"])), Equality::Equal);

        let rchb = Authorship::year_authors("1837", vec!["Andrz."]).with_ex_authors(vec!["Rchb."]);
        let reichenbach = Authorship::year_authors("1837", vec!["Reichenbach"]);
        assert_eq!(comp.compare(&reichenbach, &rchb), Equality::Equal);
    }

    #[test]
    fn test_compare_authors_first() {
        let comp = make_comparator().with_ordering(AuthorOrdering::AuthorsFirst);
        let pallas = auth(vec!["Pallas"], Some("1771"));

        // close year overrides differing authors sharing a capital letter
        assert_eq!(comp.compare(&pallas, &auth(vec!["Pimbus"], Some("1772"))), Equality::Equal);
        assert_eq!(comp.compare(&pallas, &auth(vec!["Mimbus"], Some("1771"))), Equality::Different);
        // equal authors ignore the year
        assert_eq!(comp.compare(&pallas, &auth(vec!["Pallas"], Some("1790"))), Equality::Equal);
        assert_eq!(comp.compare(&pallas, &auth(vec![], Some("1771"))), Equality::Equal);
        assert_eq!(comp.compare(&pallas, &auth(vec![], Some("1780"))), Equality::Different);
        assert_eq!(comp.compare(&pallas, &auth(vec!["Mimbus"], None)), Equality::Different);
    }

    #[test]
    fn test_compare_names() {
        let comp = make_comparator();
        let mut p1 = Name::new("Abies alba");
        let mut p2 = Name::new("Abies alba");
        assert_eq!(comp.compare_names(&p1, &p2), Equality::Unknown);

        p1.combination_authorship = Authorship::authors(vec!["L."]);
        assert_eq!(comp.compare_names(&p1, &p2), Equality::Unknown);

        p2.combination_authorship = Authorship::authors(vec!["Linne"]);
        assert_eq!(comp.compare_names(&p1, &p2), Equality::Equal);

        p1.combination_authorship = Authorship::authors(vec!["Linné"]);
        assert_eq!(comp.compare_names(&p1, &p2), Equality::Equal);

        p1.combination_authorship.year = Some("1847".to_string());
        p2.combination_authorship.year = Some("1877".to_string());
        assert_eq!(comp.compare_names(&p1, &p2), Equality::Different);

        p2.combination_authorship = Authorship::year_authors("184?", vec!["Carl von Linne"]);
        assert_eq!(comp.compare_names(&p1, &p2), Equality::Equal);
    }

    #[test]
    fn test_compare_names_across_brackets() {
        let comp = make_comparator();
        let p1 = Name::new("Abies alba").with_basionym(Authorship::authors(vec!["L."]));
        let p2 = Name::new("Abies alba").with_combination(Authorship::authors(vec!["Linnaeus"]));
        assert_eq!(comp.compare_names(&p1, &p2), Equality::Equal);

        let p3 = Name::new("Abies alba").with_combination(Authorship::authors(vec!["Mill."]));
        assert_eq!(comp.compare_names(&p1, &p3), Equality::Unknown);
    }

    #[test]
    fn test_compare_strict() {
        let comp = make_comparator();
        let empty = Authorship::new();
        assert!(!comp.compare_strict(&empty, &empty, None));
        assert!(comp.compare_strict(&auth(vec!["Lindl."], None), &auth(vec!["Lindl."], None), None));
        assert!(!comp.compare_strict(&auth(vec![], Some("1978")), &auth(vec![], Some("1978")), None));
        assert!(!comp.compare_strict(&auth(vec!["H. Christ"], None), &auth(vec!["C. Chr."], None), None));

        let abasicarpon = Authorship::authors(vec!["Rchb."]).with_ex_authors(vec!["Andrz."]);
        assert!(comp.compare_strict(&auth(vec!["Reichenbach"], None), &abasicarpon, None));
        assert!(!comp.compare_strict(&auth(vec!["Reichenbach"], Some("1837")), &abasicarpon, None));
        let dated = abasicarpon.clone().with_year("1837");
        assert!(comp.compare_strict(&auth(vec!["Reichenbach"], Some("1837")), &dated, None));
        assert!(!comp.compare_strict(&auth(vec!["Reichenbach"], Some("1838")), &dated, None));
    }

    #[test]
    fn test_compare_strict_code_positions() {
        let comp = make_comparator();
        let ex = Authorship::authors(vec!["Andrz."]).with_ex_authors(vec!["Rchb."]);
        let reichenbach = auth(vec!["Reichenbach"], None);
        assert!(comp.compare_strict(&ex, &reichenbach, Some(NomCode::Zoological)));
        assert!(!comp.compare_strict(&ex, &reichenbach, Some(NomCode::Botanical)));
        assert!(!comp.compare_strict(&ex, &reichenbach, None));
    }
}
