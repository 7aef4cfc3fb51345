use serde::{Deserialize, Serialize};

/// Tri-state outcome of comparing two pieces of nomenclatural data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Equality {
    Equal,
    Different,
    Unknown,
}

impl Equality {
    /// Merge two partial judgments into one.
    ///
    /// `Different` always wins. `Unknown` yields the other operand.
    pub fn and(self, other: Equality) -> Equality {
        match (self, other) {
            (Equality::Different, _) | (_, Equality::Different) => Equality::Different,
            (Equality::Unknown, x) => x,
            (x, Equality::Unknown) => x,
            (Equality::Equal, Equality::Equal) => Equality::Equal,
        }
    }
}
