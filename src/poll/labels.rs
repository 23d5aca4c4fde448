//! State label sets used by poll specifications.

use std::collections::BTreeSet;
use std::fmt;

/// Ordered set of state labels reported by a refresh function.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StateLabels(BTreeSet<String>);

impl StateLabels {
    /// Returns `true` when `state` is a member of the set.
    #[must_use]
    pub fn contains(&self, state: &str) -> bool {
        self.0.contains(state)
    }

    /// Returns `true` when the set holds no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the labels in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns the first label shared with `other`, if any.
    pub(crate) fn first_shared<'a>(&'a self, other: &Self) -> Option<&'a str> {
        self.iter().find(|label| other.contains(label))
    }
}

impl<S: Into<String>> FromIterator<S> for StateLabels {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for StateLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for label in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{label:?}")?;
        }
        Ok(())
    }
}
