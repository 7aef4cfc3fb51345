use std::sync::LazyLock;

use regex::Regex;

use crate::equality::Equality;

static YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}|\d{3}\?|\d{2}\?\d|\d\?\d{2}|\?\d{3}").expect("valid regex")
});

/// Extract the first four digit year from free text, allowing one `?` digit.
pub fn extract_year(text: &str) -> Option<String> {
    YEAR.find(text).map(|m| m.as_str().to_string())
}

/// Compares two publication years with an optional tolerance in years.
#[derive(Debug, Clone)]
pub struct YearComparator {
    y1: Option<String>,
    y2: Option<String>,
    tolerance: u32,
}

impl YearComparator {
    pub fn new(y1: Option<&str>, y2: Option<&str>) -> Self {
        Self {
            y1: y1.and_then(extract_year),
            y2: y2.and_then(extract_year),
            tolerance: 0,
        }
    }

    pub fn with_tolerance(mut self, tolerance: u32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn compare(&self) -> Equality {
        let (Some(a), Some(b)) = (&self.y1, &self.y2) else {
            return Equality::Unknown;
        };
        if a == b {
            return Equality::Equal;
        }
        if let (Ok(x), Ok(y)) = (a.parse::<i32>(), b.parse::<i32>()) {
            return if x.abs_diff(y) <= self.tolerance {
                Equality::Equal
            } else {
                Equality::Different
            };
        }
        // mask the placeholder digit on both sides
        let masked = a
            .chars()
            .zip(b.chars())
            .all(|(x, y)| x == y || x == '?' || y == '?');
        if masked {
            Equality::Equal
        } else {
            Equality::Different
        }
    }
}
