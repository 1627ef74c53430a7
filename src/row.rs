use crate::value::Value;

/// Internal identifier of a row slot in a table. Assigned monotonically and
/// never reused; never part of a query result.
pub type RowId = usize;

/// Ordered column-name → value mapping.
///
/// Single-table rows use bare column names in schema order. Rows produced by
/// a join use `table.column` keys, left table first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Sets `name` to `value`, replacing an existing entry in place.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Looks a column up by its qualified key (`table.column`) first, then by
    /// its bare name.
    pub fn resolve(&self, column: &str, table: Option<&str>) -> Option<&Value> {
        if let Some(table) = table {
            let qualified = self
                .entries
                .iter()
                .find(|(k, _)| is_qualified_key(k, table, column));
            if let Some((_, value)) = qualified {
                return Some(value);
            }
        }
        self.get(column)
    }

    /// First entry whose key ends in `.<column>`.
    pub fn find_suffix(&self, column: &str) -> Option<(&str, &Value)> {
        self.entries
            .iter()
            .find(|(k, _)| {
                k.len() > column.len()
                    && k.ends_with(column)
                    && k.as_bytes()[k.len() - column.len() - 1] == b'.'
            })
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Merges two rows under table-qualified keys.
    pub fn combine(left: &Row, left_table: &str, right: &Row, right_table: &str) -> Row {
        let mut combined = Row::with_capacity(left.len() + right.len());
        for (table, row) in [(left_table, left), (right_table, right)] {
            for (name, value) in row.iter() {
                combined.insert(format!("{table}.{name}"), value.clone());
            }
        }
        combined
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_qualified_key(key: &str, table: &str, column: &str) -> bool {
    key.len() == table.len() + 1 + column.len()
        && key.starts_with(table)
        && key.ends_with(column)
        && key.as_bytes()[table.len()] == b'.'
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

impl<K: Into<String>, const N: usize> From<[(K, Value); N]> for Row {
    fn from(entries: [(K, Value); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Row {
        Row::from([("id", Value::Int(1)), ("name", Value::from("Alice"))])
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut row = user();
        row.insert("id", Value::Int(2));

        assert_eq!(row.len(), 2);
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(row.get("id"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_resolve_prefers_qualified_key() {
        let row = Row::from([("users.id", Value::Int(1)), ("id", Value::Int(99))]);

        assert_eq!(row.resolve("id", Some("users")), Some(&Value::Int(1)));
        assert_eq!(row.resolve("id", Some("posts")), Some(&Value::Int(99)));
        assert_eq!(row.resolve("id", None), Some(&Value::Int(99)));
        assert_eq!(row.resolve("missing", Some("users")), None);
    }

    #[test]
    fn test_resolve_does_not_match_partial_prefixes() {
        let row = Row::from([("xusers.id", Value::Int(1))]);
        assert_eq!(row.resolve("id", Some("users")), None);
    }

    #[test]
    fn test_combine_and_suffix() {
        let post = Row::from([("id", Value::Int(10)), ("title", Value::from("P1"))]);
        let combined = Row::combine(&user(), "users", &post, "posts");

        assert_eq!(
            combined.keys().collect::<Vec<_>>(),
            vec!["users.id", "users.name", "posts.id", "posts.title"]
        );
        assert_eq!(
            combined.find_suffix("title"),
            Some(("posts.title", &Value::from("P1")))
        );
        assert_eq!(
            combined.find_suffix("id"),
            Some(("users.id", &Value::Int(1)))
        );
        assert_eq!(combined.find_suffix("itle"), None);
    }
}
