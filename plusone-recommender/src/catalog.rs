// ---------------------------------------------------------------------------
// EntryCatalog: ordered entry collection, index is the matrix join key
// ---------------------------------------------------------------------------

use std::collections::{HashMap, HashSet};

use crate::error::RankError;
use crate::types::Entry;

pub struct EntryCatalog {
	entries: Vec<Entry>,
	/// id -> catalog index
	by_id: HashMap<String, usize>,
}

impl EntryCatalog {
	/// Build a catalog, rejecting duplicate ids.
	pub fn new(entries: Vec<Entry>) -> Result<Self, RankError> {
		let mut by_id = HashMap::with_capacity(entries.len());
		for (i, entry) in entries.iter().enumerate() {
			if by_id.insert(entry.id.clone(), i).is_some() {
				return Err(RankError::DuplicateId(entry.id.clone()));
			}
		}
		Ok(Self { entries, by_id })
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, i: usize) -> Result<&Entry, RankError> {
		self.entries.get(i).ok_or(RankError::IndexOutOfBounds {
			index: i,
			len: self.entries.len(),
		})
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.by_id.get(id).copied()
	}

	/// Resolve caller-supplied ids to catalog indices, in catalog order.
	/// Unknown ids are skipped.
	pub fn resolve_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<usize> {
		let wanted: HashSet<&str> = ids.iter().map(|s| s.as_ref()).collect();
		for id in &wanted {
			if !self.by_id.contains_key(*id) {
				tracing::warn!(id = %id, "Ignoring unknown entry id");
			}
		}
		self.entries
			.iter()
			.enumerate()
			.filter(|(_, e)| wanted.contains(e.id.as_str()))
			.map(|(i, _)| i)
			.collect()
	}

	/// Indices of every other entry sharing at least one tag with entry `i`.
	pub fn related_to(&self, i: usize) -> Result<Vec<usize>, RankError> {
		let target = self.get(i)?;
		Ok(self
			.entries
			.iter()
			.enumerate()
			.filter(|(j, e)| *j != i && target.is_related_to(e))
			.map(|(j, _)| j)
			.collect())
	}

	pub fn word_counts(&self) -> Vec<u64> {
		self.entries.iter().map(|e| e.word_count).collect()
	}
}
