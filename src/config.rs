/// Settings for a [crate::Database].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database name, reported by stats.
    pub name: String,

    /// Probe the right table's index on the join column, when it has one,
    /// instead of scanning every right row for each left row. Results and
    /// their order are the same either way.
    pub join_index_probe: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            join_index_probe: true,
        }
    }
}

impl DatabaseConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_join_index_probe(mut self, enabled: bool) -> Self {
        self.join_index_probe = enabled;
        self
    }
}
