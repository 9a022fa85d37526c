use std::collections::HashSet;

/// Which rows of a list are expanded.
///
/// Each list view owns its own instances (one for row details, one for the
/// row menu); nothing is shared between views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    open: HashSet<String>,
    exclusive: bool,
}

impl ExpansionState {
    /// Any number of rows may be open at once.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opening a row closes the others, as a row menu does.
    pub fn exclusive() -> Self {
        Self {
            open: HashSet::new(),
            exclusive: true,
        }
    }

    /// Flips `id` and returns whether it is now expanded.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.open.remove(id) {
            return false;
        }
        if self.exclusive {
            self.open.clear();
        }
        self.open.insert(id.to_string());
        true
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.open.contains(id)
    }

    pub fn close(&mut self) {
        self.open.clear();
    }

    /// Drops ids that no longer exist, e.g. after a reload.
    pub fn retain_known<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let known: HashSet<&str> = ids.into_iter().collect();
        self.open.retain(|id| known.contains(id.as_str()));
    }
}
