//! Index and unique-group descriptors.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A named, ordered list of columns backing an index or a unique group.
///
/// Two descriptors are equal when they cover the same set of columns; the
/// name and the column order are ignored.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Group name, empty for anonymous groups read back from a catalog.
    #[serde(default)]
    pub name: String,
    /// Column names in declaration order.
    pub columns: Vec<String>,
}

impl IndexDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    fn column_set(&self) -> BTreeSet<&str> {
        self.columns.iter().map(String::as_str).collect()
    }
}

impl PartialEq for IndexDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.column_set() == other.column_set()
    }
}

/// Compares two groups of descriptors as multisets, ignoring names and
/// ordering at both levels.
#[must_use]
pub fn same_index_set(left: &[IndexDescriptor], right: &[IndexDescriptor]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut unmatched: Vec<&IndexDescriptor> = right.iter().collect();
    for index in left {
        match unmatched.iter().position(|candidate| *candidate == index) {
            Some(position) => {
                unmatched.swap_remove(position);
            }
            None => return false,
        }
    }
    true
}
