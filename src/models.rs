use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author team and year of one authorship position of a name.
///
/// Ex authors are kept in the botanical order they are written in,
/// i.e. `Rchb. ex Andrz.` has ex author `Rchb.` and author `Andrz.`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorship {
    pub authors: Vec<String>,
    pub ex_authors: Vec<String>,
    pub year: Option<String>,
}

impl Authorship {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authors(authors: Vec<&str>) -> Self {
        Self {
            authors: authors.into_iter().map(String::from).collect(),
            ..Self::default()
        }
    }

    pub fn year_authors(year: &str, authors: Vec<&str>) -> Self {
        Self::authors(authors).with_year(year)
    }

    pub fn with_year(mut self, year: &str) -> Self {
        self.year = Some(year.to_string());
        self
    }

    pub fn with_ex_authors(mut self, ex_authors: Vec<&str>) -> Self {
        self.ex_authors = ex_authors.into_iter().map(String::from).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
            && self.ex_authors.is_empty()
            && self.year.as_deref().map_or(true, |y| y.trim().is_empty())
    }

    pub fn has_authors(&self) -> bool {
        !self.authors.is_empty()
    }
}

fn join_team(team: &[String]) -> String {
    match team.len() {
        0 => String::new(),
        1 => team[0].clone(),
        n => format!("{} & {}", team[..n - 1].join(", "), team[n - 1]),
    }
}

impl fmt::Display for Authorship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        if !self.ex_authors.is_empty() {
            out.push_str(&join_team(&self.ex_authors));
            out.push_str(" ex ");
        }
        out.push_str(&join_team(&self.authors));
        if let Some(year) = self.year.as_deref().filter(|y| !y.trim().is_empty()) {
            if out.is_empty() {
                out.push_str(year);
            } else {
                out.push_str(", ");
                out.push_str(year);
            }
        }
        f.write_str(out.trim())
    }
}

/// Taxonomic rank, declared from highest to lowest.
///
/// The derived ordering follows declaration order; `Other` and `Unranked`
/// sit at the end and are not comparable to real ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rank {
    Domain,
    Kingdom,
    Subkingdom,
    Phylum,
    Subphylum,
    Class,
    Subclass,
    Order,
    Suborder,
    Superfamily,
    Family,
    Subfamily,
    Tribe,
    Subtribe,
    SupragenericName,
    Genus,
    Subgenus,
    Section,
    Series,
    InfragenericName,
    SpeciesAggregate,
    Species,
    InfraspecificName,
    Subspecies,
    InfrasubspecificName,
    Variety,
    Subvariety,
    Form,
    Subform,
    Cultivar,
    Strain,
    Other,
    Unranked,
}

impl Rank {
    pub const ALL: [Rank; 33] = [
        Rank::Domain,
        Rank::Kingdom,
        Rank::Subkingdom,
        Rank::Phylum,
        Rank::Subphylum,
        Rank::Class,
        Rank::Subclass,
        Rank::Order,
        Rank::Suborder,
        Rank::Superfamily,
        Rank::Family,
        Rank::Subfamily,
        Rank::Tribe,
        Rank::Subtribe,
        Rank::SupragenericName,
        Rank::Genus,
        Rank::Subgenus,
        Rank::Section,
        Rank::Series,
        Rank::InfragenericName,
        Rank::SpeciesAggregate,
        Rank::Species,
        Rank::InfraspecificName,
        Rank::Subspecies,
        Rank::InfrasubspecificName,
        Rank::Variety,
        Rank::Subvariety,
        Rank::Form,
        Rank::Subform,
        Rank::Cultivar,
        Rank::Strain,
        Rank::Other,
        Rank::Unranked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Domain => "DOMAIN",
            Rank::Kingdom => "KINGDOM",
            Rank::Subkingdom => "SUBKINGDOM",
            Rank::Phylum => "PHYLUM",
            Rank::Subphylum => "SUBPHYLUM",
            Rank::Class => "CLASS",
            Rank::Subclass => "SUBCLASS",
            Rank::Order => "ORDER",
            Rank::Suborder => "SUBORDER",
            Rank::Superfamily => "SUPERFAMILY",
            Rank::Family => "FAMILY",
            Rank::Subfamily => "SUBFAMILY",
            Rank::Tribe => "TRIBE",
            Rank::Subtribe => "SUBTRIBE",
            Rank::SupragenericName => "SUPRAGENERIC_NAME",
            Rank::Genus => "GENUS",
            Rank::Subgenus => "SUBGENUS",
            Rank::Section => "SECTION",
            Rank::Series => "SERIES",
            Rank::InfragenericName => "INFRAGENERIC_NAME",
            Rank::SpeciesAggregate => "SPECIES_AGGREGATE",
            Rank::Species => "SPECIES",
            Rank::InfraspecificName => "INFRASPECIFIC_NAME",
            Rank::Subspecies => "SUBSPECIES",
            Rank::InfrasubspecificName => "INFRASUBSPECIFIC_NAME",
            Rank::Variety => "VARIETY",
            Rank::Subvariety => "SUBVARIETY",
            Rank::Form => "FORM",
            Rank::Subform => "SUBFORM",
            Rank::Cultivar => "CULTIVAR",
            Rank::Strain => "STRAIN",
            Rank::Other => "OTHER",
            Rank::Unranked => "UNRANKED",
        }
    }

    /// `Other` and `Unranked` carry no position in the hierarchy.
    pub fn is_uncomparable(&self) -> bool {
        matches!(self, Rank::Other | Rank::Unranked)
    }

    pub fn is_suprageneric(&self) -> bool {
        !self.is_uncomparable() && *self < Rank::Genus
    }

    /// Below genus and above species aggregate.
    pub fn is_infrageneric_strictly(&self) -> bool {
        *self > Rank::Genus && *self < Rank::SpeciesAggregate
    }

    pub fn is_infraspecific(&self) -> bool {
        !self.is_uncomparable() && *self > Rank::Species
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace([' ', '-'], "_").to_uppercase();
        Rank::ALL
            .iter()
            .find(|r| r.as_str() == wanted)
            .copied()
            .ok_or_else(|| format!("Unknown rank: '{}'", s))
    }
}

/// Nomenclatural code governing a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NomCode {
    Bacterial,
    Botanical,
    Cultivars,
    Phytosociological,
    Virus,
    Zoological,
}

impl FromStr for NomCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bacterial" | "icnp" => Ok(NomCode::Bacterial),
            "botanical" | "icn" | "icbn" => Ok(NomCode::Botanical),
            "cultivars" | "icncp" => Ok(NomCode::Cultivars),
            "phytosociological" | "icpn" => Ok(NomCode::Phytosociological),
            "virus" | "ictv" => Ok(NomCode::Virus),
            "zoological" | "iczn" => Ok(NomCode::Zoological),
            other => Err(format!("Unknown nomenclatural code: '{}'", other)),
        }
    }
}

/// Kind of name string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NameType {
    #[default]
    Scientific,
    Virus,
    HybridFormula,
    Informal,
    Otu,
    Placeholder,
    NoName,
}

impl NameType {
    /// Only these kinds of names may be added to the index by the matcher.
    pub fn is_indexable(&self) -> bool {
        matches!(
            self,
            NameType::Scientific | NameType::HybridFormula | NameType::Virus | NameType::Otu
        )
    }
}

impl FromStr for NameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "scientific" => Ok(NameType::Scientific),
            "virus" => Ok(NameType::Virus),
            "hybrid_formula" => Ok(NameType::HybridFormula),
            "informal" => Ok(NameType::Informal),
            "otu" => Ok(NameType::Otu),
            "placeholder" => Ok(NameType::Placeholder),
            "no_name" => Ok(NameType::NoName),
            other => Err(format!("Unknown name type: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    Source,
    Implicit,
    /// Created by the name matcher for a query without any match.
    NameMatching,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NomStatus {
    Established,
    Acceptable,
    Conserved,
    Rejected,
    /// Provisional status given to names created by the matcher.
    Doubtful,
    Manuscript,
}

/// A scientific name record as stored in and returned by the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Name {
    pub id: Option<String>,
    pub dataset_key: Option<i32>,

    /// Canonical name without authorship, original case retained
    pub scientific_name: String,

    /// Verbatim authorship, used only when no parsed authorship exists
    pub authorship: Option<String>,

    pub rank: Option<Rank>,
    pub code: Option<NomCode>,
    pub name_type: NameType,

    pub genus: Option<String>,
    pub specific_epithet: Option<String>,
    pub infraspecific_epithet: Option<String>,

    pub combination_authorship: Authorship,
    pub basionym_authorship: Authorship,

    pub origin: Option<Origin>,
    pub nom_status: Option<NomStatus>,

    pub verbatim_key: Option<i64>,
    pub homotypic_name_id: Option<String>,
    pub published_in_id: Option<String>,

    pub created: Option<DateTime<Utc>>,
}

impl Name {
    pub fn new(scientific_name: &str) -> Self {
        Self {
            id: None,
            dataset_key: None,
            scientific_name: scientific_name.to_string(),
            authorship: None,
            rank: None,
            code: None,
            name_type: NameType::Scientific,
            genus: None,
            specific_epithet: None,
            infraspecific_epithet: None,
            combination_authorship: Authorship::default(),
            basionym_authorship: Authorship::default(),
            origin: None,
            nom_status: None,
            verbatim_key: None,
            homotypic_name_id: None,
            published_in_id: None,
            created: None,
        }
    }

    /// Build a name from its parts, deriving the scientific name.
    pub fn binomial(genus: &str, epithet: &str) -> Self {
        let mut n = Self::new(&format!("{} {}", genus, epithet)).with_rank(Rank::Species);
        n.genus = Some(genus.to_string());
        n.specific_epithet = Some(epithet.to_string());
        n
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_code(mut self, code: NomCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_type(mut self, name_type: NameType) -> Self {
        self.name_type = name_type;
        self
    }

    pub fn with_authorship(mut self, authorship: &str) -> Self {
        self.authorship = Some(authorship.to_string());
        self
    }

    pub fn with_combination(mut self, authorship: Authorship) -> Self {
        self.combination_authorship = authorship;
        self
    }

    pub fn with_basionym(mut self, authorship: Authorship) -> Self {
        self.basionym_authorship = authorship;
        self
    }

    pub fn has_parsed_authorship(&self) -> bool {
        !self.combination_authorship.is_empty() || !self.basionym_authorship.is_empty()
    }

    pub fn has_authorship(&self) -> bool {
        self.has_parsed_authorship()
            || self.authorship.as_deref().map_or(false, |a| !a.trim().is_empty())
    }

    /// Full authorship string, basionym authorship in brackets.
    pub fn authorship_complete(&self) -> String {
        if !self.has_parsed_authorship() {
            return self.authorship.clone().unwrap_or_default().trim().to_string();
        }
        let mut out = String::new();
        if !self.basionym_authorship.is_empty() {
            out.push('(');
            out.push_str(&self.basionym_authorship.to_string());
            out.push(')');
        }
        if !self.combination_authorship.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&self.combination_authorship.to_string());
        }
        out
    }

    pub fn canonical_name_without_authorship(&self) -> &str {
        self.scientific_name.trim()
    }

    /// Scientific name followed by its complete authorship.
    pub fn canonical_name(&self) -> String {
        let authorship = self.authorship_complete();
        if authorship.is_empty() {
            self.canonical_name_without_authorship().to_string()
        } else {
            format!("{} {}", self.canonical_name_without_authorship(), authorship)
        }
    }

    /// Last epithet of the name, falling back to the last word of the scientific name.
    pub fn terminal_epithet(&self) -> Option<String> {
        self.infraspecific_epithet
            .clone()
            .or_else(|| self.specific_epithet.clone())
            .or_else(|| {
                self.scientific_name
                    .split_whitespace()
                    .skip(1)
                    .last()
                    .map(String::from)
            })
    }

    pub fn is_trinomial(&self) -> bool {
        self.infraspecific_epithet.is_some()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Exact,
    Variant,
    Ambiguous,
    Inserted,
    None,
}

/// A candidate that did not win, with its score if it was not rejected outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub name: Name,
    pub score: Option<u8>,
}

/// Result of matching a query name against the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameMatch {
    pub name: Option<Name>,
    pub match_type: MatchType,
    pub alternatives: Vec<Alternative>,
}

impl NameMatch {
    pub fn no_match() -> Self {
        Self {
            name: None,
            match_type: MatchType::None,
            alternatives: Vec::new(),
        }
    }

    pub fn ambiguous() -> Self {
        Self {
            name: None,
            match_type: MatchType::Ambiguous,
            alternatives: Vec::new(),
        }
    }

    pub fn found(name: Name, match_type: MatchType) -> Self {
        Self {
            name: Some(name),
            match_type,
            alternatives: Vec::new(),
        }
    }

    pub fn has_match(&self) -> bool {
        self.name.is_some()
    }
}
