//! Scientific name normalization for index keys and comparisons.
//!
//! Deterministic and pure. The canonical name stored in the index keeps its
//! original case; only the derived key is lowercased.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const HYBRID_MARKER: char = '×';

/// Endings stripped from epithets, checked in order.
const ENDINGS: &[&str] = &["us", "um", "on", "os", "is", "a", "e", "i"];

/// Endings whose epithet is kept as is.
const RETAINED_ENDINGS: &[&str] = &["er", "ans", "ens"];

const MIN_STEM_LEN: usize = 3;

/// Remove hybrid markers from a name.
///
/// Drops standalone `×` tokens and a standalone `x` between two words,
/// strips a `×` attached to the start of a word, and strips a leading `x`
/// glued to a capitalized genus (`xAbies`). A name consisting only of a
/// marker is returned unchanged.
pub fn remove_hybrid_marker(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    let n = tokens.len();
    let mut out: Vec<&str> = Vec::with_capacity(n);

    for (i, token) in tokens.iter().enumerate() {
        if token.chars().all(|c| c == HYBRID_MARKER) {
            continue;
        }
        if matches!(*token, "x" | "X") {
            let next_is_genus = tokens
                .get(i + 1)
                .and_then(|t| t.chars().next())
                .is_some_and(|c| c.is_uppercase());
            if (i > 0 && i + 1 < n) || (i == 0 && next_is_genus) {
                continue;
            }
        }
        let mut t = token.trim_start_matches(HYBRID_MARKER);
        if i == 0 {
            let mut chars = t.chars();
            if matches!(chars.next(), Some('x' | 'X'))
                && chars.next().is_some_and(|c| c.is_uppercase())
            {
                t = &t[1..];
            }
        }
        out.push(t);
    }

    if out.is_empty() {
        return tokens.join(" ");
    }
    out.join(" ")
}

/// Map letters that do not decompose under NFD.
fn replace_special_chars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'ø' => out.push('o'),
            'Ø' => out.push('O'),
            'ð' => out.push('d'),
            'Ð' => out.push('D'),
            'đ' => out.push('d'),
            'Đ' => out.push('D'),
            'ł' => out.push('l'),
            'Ł' => out.push('L'),
            'ı' => out.push('i'),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("AE"),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("OE"),
            'ß' => out.push_str("ss"),
            'þ' => out.push_str("th"),
            'Þ' => out.push_str("TH"),
            _ => out.push(c),
        }
    }
    out
}

/// Fold diacritics to their ASCII base letters, keeping case.
pub fn fold_to_ascii(s: &str) -> String {
    replace_special_chars(s)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// ASCII-folded string with whitespace collapsed. Case is kept.
pub fn normalized_ascii(s: &str) -> String {
    fold_to_ascii(s)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_epithet(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c == '-')
}

/// Lowercase abbreviations such as `subsp.`, `var.` or `f.`.
fn is_rank_marker(token: &str) -> bool {
    token.len() > 1
        && token.ends_with('.')
        && token[..token.len() - 1]
            .chars()
            .all(|c| c.is_ascii_lowercase())
}

/// Parenthesized subgenus following the genus, e.g. `(Abies)`.
fn is_subgenus(token: &str) -> bool {
    token
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .is_some_and(|inner| {
            let mut chars = inner.chars();
            chars.next().is_some_and(|c| c.is_ascii_uppercase())
                && chars.all(|c| c.is_ascii_lowercase())
        })
}

/// Spelling substitutions for transliteration variants, then double letters collapsed.
fn substitute(word: &str) -> String {
    let replaced = word
        .replace("rh", "r")
        .replace("ae", "e")
        .replace("oe", "e")
        .replace('j', "i")
        .replace('y', "i");

    let mut out = String::with_capacity(replaced.len());
    let mut prev: Option<char> = None;
    for c in replaced.chars() {
        if prev != Some(c) {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

fn strip_ending(word: &str) -> String {
    for ending in ["ensis", "ense"] {
        if let Some(stem) = word.strip_suffix(ending) {
            if stem.len() >= MIN_STEM_LEN {
                return stem.to_string();
            }
        }
    }
    if RETAINED_ENDINGS.iter().any(|e| word.ends_with(e)) {
        return word.to_string();
    }
    for ending in ENDINGS {
        if let Some(stem) = word.strip_suffix(ending) {
            if stem.len() >= MIN_STEM_LEN {
                return stem.to_string();
            }
            break;
        }
    }
    word.to_string()
}

/// Reduce a Latin epithet to its stem.
///
/// Idempotent: the rules are applied until the word stops changing.
pub fn stem_epithet(epithet: &str) -> String {
    let mut current = epithet.to_string();
    loop {
        let next = strip_ending(&substitute(&current));
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Substitutions only, first letter case kept. Used for genus names.
fn substitute_genus(genus: &str) -> String {
    let lower = genus.to_lowercase();
    let replaced = substitute(&lower);
    if genus.chars().next().is_some_and(|c| c.is_uppercase()) {
        let mut chars = replaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => replaced,
        }
    } else {
        replaced
    }
}

fn prepare(name: &str) -> Vec<String> {
    normalized_ascii(&remove_hybrid_marker(name))
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Normalize a scientific name, stemming its epithets.
///
/// The genus is kept as is. Stemming stops at the first token that is
/// neither an epithet, a rank marker nor a subgenus, so any trailing
/// authorship passes through unchanged.
pub fn normalize(name: &str) -> String {
    stem_tokens(prepare(name))
}

fn stem_tokens(tokens: Vec<String>) -> String {
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut stemming = true;

    for (i, token) in tokens.into_iter().enumerate() {
        if i == 0 || !stemming {
            out.push(token);
        } else if is_epithet(&token) {
            out.push(stem_epithet(&token));
        } else if is_rank_marker(&token) || (i == 1 && is_subgenus(&token)) {
            out.push(token);
        } else {
            stemming = false;
            out.push(token);
        }
    }
    out.join(" ")
}

/// Normalize every token of a name.
///
/// All epithet-like tokens are stemmed wherever they occur. The genus
/// receives the spelling substitutions unless it is directly followed by
/// a capitalized token such as an author.
pub fn normalize_all(name: &str) -> String {
    let tokens = prepare(name);
    let genus_followed_by_author = tokens
        .get(1)
        .is_some_and(|t| t.chars().next().is_some_and(|c| c.is_uppercase()));

    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            if i == 0 {
                if genus_followed_by_author {
                    token.clone()
                } else {
                    substitute_genus(token)
                }
            } else if is_epithet(token) {
                stem_epithet(token)
            } else {
                token.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Grouping key of the candidate index.
///
/// Epithets are lowercased before stemming so case never splits a group.
/// A subgenus keeps its capital until the final lowercasing.
pub fn key(scientific_name: &str) -> String {
    let tokens = prepare(scientific_name)
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            if i == 0 || (i == 1 && is_subgenus(&t)) {
                t
            } else {
                t.to_lowercase()
            }
        })
        .collect();
    stem_tokens(tokens).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_hybrid_marker() {
        assert_eq!(remove_hybrid_marker("×Abies"), "Abies");
        assert_eq!(remove_hybrid_marker("Carex ×cayouettei"), "Carex cayouettei");
        assert_eq!(remove_hybrid_marker("Platanus x hispanica"), "Platanus hispanica");
        assert_eq!(remove_hybrid_marker("xCarex cayouettei"), "Carex cayouettei");
        assert_eq!(remove_hybrid_marker("XCarex cayouettei"), "Carex cayouettei");
        assert_eq!(remove_hybrid_marker("× Abies alba"), "Abies alba");
    }

    #[test]
    fn test_hybrid_marker_preserved() {
        assert_eq!(remove_hybrid_marker("×"), "×");
        assert_eq!(remove_hybrid_marker("x"), "x");
        assert_eq!(remove_hybrid_marker("xcayouettei"), "xcayouettei");
        assert_eq!(remove_hybrid_marker("Carex xcayouettei"), "Carex xcayouettei");
        assert_eq!(remove_hybrid_marker(""), "");
    }

    #[test]
    fn test_fold_to_ascii() {
        assert_eq!(fold_to_ascii("Çem Ándrexï"), "Cem Andrexi");
        assert_eq!(fold_to_ascii("Øresund ðor"), "Oresund dor");
        assert_eq!(fold_to_ascii("scorzoneræfolium"), "scorzoneraefolium");
        assert_eq!(fold_to_ascii("Müller"), "Muller");
        assert_eq!(normalized_ascii("  Abies \t alba "), "Abies alba");
    }

    #[test]
    fn test_stem_epithet_examples() {
        assert_eq!(stem_epithet(""), "");
        assert_eq!(stem_epithet("alba"), "alb");
        assert_eq!(stem_epithet("albus"), "alb");
        assert_eq!(stem_epithet("album"), "alb");
        assert_eq!(stem_epithet("albon"), "alb");
        assert_eq!(stem_epithet("dentatum"), "dentat");
        assert_eq!(stem_epithet("dentatus"), "dentat");
        assert_eq!(stem_epithet("ferox"), "ferox");
    }

    #[test]
    fn test_stem_epithet_endings() {
        assert_eq!(stem_epithet("muliebris"), "muliebr");
        assert_eq!(stem_epithet("muliebre"), "muliebr");
        assert_eq!(stem_epithet("canadensis"), "canad");
        assert_eq!(stem_epithet("canadense"), "canad");
        assert_eq!(stem_epithet("ruber"), "ruber");
        assert_eq!(stem_epithet("repens"), "repens");
        assert_eq!(stem_epithet("elegans"), "elegans");
        // too short to strip
        assert_eq!(stem_epithet("ova"), "ova");
    }

    #[test]
    fn test_stem_epithet_substitutions() {
        assert_eq!(stem_epithet("platyrhachis"), stem_epithet("platyrachis"));
        assert_eq!(stem_epithet("albijeta"), stem_epithet("albieta"));
        assert_eq!(stem_epithet("albyeta"), stem_epithet("albieta"));
        assert_eq!(stem_epithet("circinnalis"), stem_epithet("circinalis"));
        assert_eq!(stem_epithet("perrierii"), stem_epithet("perrieri"));
        assert_eq!(stem_epithet("brownii"), stem_epithet("brownei"));
    }

    #[test]
    fn test_stem_epithet_idempotent() {
        for word in [
            "alba", "dentatum", "ferox", "canadensis", "cinerea", "perrierii",
            "cayouettei", "scorzonerifolium", "novae-angliae", "viatoris", "ruber",
        ] {
            let once = stem_epithet(word);
            assert_eq!(stem_epithet(&once), once, "not idempotent for {}", word);
        }
    }

    #[test]
    fn test_normalize_examples() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("Abies "), "Abies");
        assert_eq!(normalize("Abies albieta"), "Abies albiet");
        assert_eq!(normalize("Hieracium sabaudum"), "Hieracium sabaud");
        assert_eq!(normalize("Abyes  albus"), "Abyes alb");
        assert_eq!(normalize(" \txAbies × ållbbus\t"), "Abies alb");
        assert_eq!(normalize("Platanus x hispanica"), "Platanus hispanic");
        assert_eq!(
            normalize("Hieracium scorzoneræfolium"),
            normalize("Hieracium scorzonerefolium")
        );
    }

    #[test]
    fn test_normalize_keeps_authorship() {
        assert_eq!(normalize("Abies alba Mill."), "Abies alb Mill.");
        assert_eq!(
            normalize("Abies alba subsp. nana Mill."),
            "Abies alb subsp. nan Mill."
        );
        assert_eq!(normalize("Abies (Abies) alba"), "Abies (Abies) alb");
        assert_eq!(normalize("Larus fuscus Linnaeus, 1758"), "Larus fusc Linnaeus, 1758");
    }

    #[test]
    fn test_normalize_idempotent() {
        for name in ["Abies albieta", "Hieracium sabaudum", "Carex ×cayouettei", "Abies alba Mill."] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_normalize_all() {
        assert_eq!(normalize_all(""), "");
        assert_eq!(normalize_all("Abyes  albus"), "Abies alb");
        assert_eq!(normalize_all("Abiies "), "Abies");
        assert_eq!(normalize_all("Rhachis taktos"), "Rachis takt");
        assert_eq!(normalize_all("Cycas circinnalis"), "Cicas circinal");
        // genus followed by an author stays untouched
        assert_eq!(normalize_all("Cycas Mill."), "Cycas Mill.");
    }

    #[test]
    fn test_key_is_lowercase_and_collapses_variants() {
        assert_eq!(key("Larus fuscus"), "larus fusc");
        assert_eq!(key("Abies alba"), key("Abies albus"));
        assert_eq!(key("Abies alba"), key("ABIES alba"));
        assert_eq!(key("Abies ALBA"), "abies alb");
        assert_eq!(key("LARUS FUSCUS"), key("Larus fuscus"));
        assert_eq!(key("Larus Fuscus"), "larus fusc");
        assert_eq!(key("Abies (Abies) ALBA"), key("Abies (Abies) alba"));
        assert_eq!(key("Eragrostis brownii"), key("Eragrostis brownei"));
    }
}
