use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::row::RowId;
use crate::value::{Value, exact_int};

/// Point-lookup structure mapping a column value to the live rows holding it.
///
/// `Null` and NaN are never keys: inserting them does nothing and searching
/// for them finds nothing, since neither equals itself. Implementations other than [HashIndex] (an ordered index
/// for ranges, for instance) can be attached to a table without touching
/// the table or planner.
pub trait Index: fmt::Debug {
    /// Name of the indexed column.
    fn column_name(&self) -> &str;

    /// Records that `row_id` holds `key`.
    fn insert(&mut self, key: &Value, row_id: RowId);

    /// Row identifiers holding `key`, in ascending order.
    /// The result is an independent copy of the index entry.
    fn search(&self, key: &Value) -> Vec<RowId>;

    /// Removes the `key → row_id` mapping. Removing a mapping that does not
    /// exist is a no-op.
    fn delete(&mut self, key: &Value, row_id: RowId);

    /// Every distinct key currently present.
    fn all_keys(&self) -> Vec<Value>;

    /// Removes every entry.
    fn clear(&mut self);

    /// Number of distinct keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hashable form of a non-null value.
///
/// Floats holding an exact integer share the integer's key so that index
/// lookups agree with [Value::equals].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IndexKey {
    Int(i64),
    Float(u64),
    Text(Arc<str>),
    Bool(bool),
}

impl IndexKey {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Int(i) => Some(Self::Int(*i)),
            Value::Float(f) if f.is_nan() => None,
            Value::Float(f) => Some(match exact_int(*f) {
                Some(i) => Self::Int(i),
                None => Self::Float(f.to_bits()),
            }),
            Value::Text(s) => Some(Self::Text(Arc::clone(s))),
            Value::Bool(b) => Some(Self::Bool(*b)),
        }
    }
}

#[derive(Debug, Clone)]
struct Bucket {
    /// The value as first inserted, reported by `all_keys`.
    key: Value,
    /// Sorted, without duplicates.
    row_ids: Vec<RowId>,
}

/// Hash-based equality index. O(1) average per operation, no ordering.
#[derive(Debug, Clone)]
pub struct HashIndex {
    column_name: String,
    entries: FxHashMap<IndexKey, Bucket>,
}

impl HashIndex {
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            entries: FxHashMap::default(),
        }
    }

    /// Builds a populated index from `(row_id, value)` pairs.
    pub fn build<'a>(
        column_name: impl Into<String>,
        rows: impl IntoIterator<Item = (RowId, &'a Value)>,
    ) -> Self {
        let mut index = Self::new(column_name);
        for (row_id, value) in rows {
            index.insert(value, row_id);
        }
        index
    }
}

impl Index for HashIndex {
    fn column_name(&self) -> &str {
        &self.column_name
    }

    fn insert(&mut self, key: &Value, row_id: RowId) {
        let Some(hashed) = IndexKey::from_value(key) else {
            return;
        };
        let bucket = self.entries.entry(hashed).or_insert_with(|| Bucket {
            key: key.clone(),
            row_ids: Vec::new(),
        });
        if let Err(pos) = bucket.row_ids.binary_search(&row_id) {
            bucket.row_ids.insert(pos, row_id);
        }
    }

    fn search(&self, key: &Value) -> Vec<RowId> {
        IndexKey::from_value(key)
            .and_then(|hashed| self.entries.get(&hashed))
            .map(|bucket| bucket.row_ids.clone())
            .unwrap_or_default()
    }

    fn delete(&mut self, key: &Value, row_id: RowId) {
        let Some(hashed) = IndexKey::from_value(key) else {
            return;
        };
        let Some(bucket) = self.entries.get_mut(&hashed) else {
            return;
        };
        if let Ok(pos) = bucket.row_ids.binary_search(&row_id) {
            bucket.row_ids.remove(pos);
        }
        if bucket.row_ids.is_empty() {
            self.entries.remove(&hashed);
        }
    }

    fn all_keys(&self) -> Vec<Value> {
        self.entries.values().map(|b| b.key.clone()).collect()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for HashIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashIndex({}, {} keys)", self.column_name, self.len())
    }
}
