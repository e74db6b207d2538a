use dashmap::DashSet;

/// Names of the workers a node currently knows about.
///
/// Only exposed through add/remove/snapshot/replace so callers never hold a
/// reference into the set across an await point.
#[derive(Debug, Default)]
pub struct WorkerSet {
    names: DashSet<String>,
}

impl WorkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the worker was not known yet.
    pub fn add(&self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    pub fn remove(&self, name: &str) -> bool {
        self.names.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Sorted copy of the current members.
    pub fn snapshot(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().map(|name| name.key().clone()).collect();
        names.sort();
        names
    }

    /// Makes the set equal to `names`.
    ///
    /// Members present in both the old and new set stay visible throughout.
    pub fn replace<I>(&self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        let incoming: std::collections::HashSet<String> = names.into_iter().collect();
        self.names.retain(|name| incoming.contains(name));
        for name in incoming {
            self.names.insert(name);
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
