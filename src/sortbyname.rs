/// Types that expose a comparable name (zones, surfaces, nodes, HVAC components).
pub trait HasName {
    fn get_name(&self) -> &str;
}

// Delegate HasName to references and boxes
impl<T: HasName + ?Sized> HasName for &T {
    fn get_name(&self) -> &str {
        (*self).get_name()
    }
}
impl<T: HasName + ?Sized> HasName for Box<T> {
    fn get_name(&self) -> &str {
        (**self).get_name()
    }
}

/// Sorting helpers for slices of `T: HasName`.
pub trait SortByName {
    /// Stable, ascending sort by `get_name()`.
    fn sort_by_name(&mut self);
}

impl<T: HasName> SortByName for [T] {
    fn sort_by_name(&mut self) {
        // Compares &str by Unicode scalar values, so output order is locale independent
        self.sort_by(|a, b| a.get_name().cmp(b.get_name()));
    }
}

/// Returns the first name that occurs more than once, if any.
pub fn first_duplicate_name<T: HasName>(items: &[T]) -> Option<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .find(|&item| !seen.insert(item.get_name()))
        .map(|item| item.get_name().to_string())
}
