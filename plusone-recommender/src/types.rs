use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize};

/// One catalog item. Equality and hashing go through `number` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
	#[serde(deserialize_with = "string_or_number")]
	pub id: String,
	#[serde(default, deserialize_with = "optional_string_or_number")]
	pub uid: Option<String>,
	pub url: String,
	pub title: String,
	#[serde(default)]
	pub status: String,
	#[serde(rename = "number")]
	pub sequence_number: i64,
	#[serde(default)]
	pub subtitle: String,
	#[serde(rename = "related", default)]
	pub related_tags: BTreeSet<String>,
	#[serde(default)]
	pub content: String,
	#[serde(rename = "wordCount", default)]
	pub word_count: u64,
}

impl Entry {
	/// Two entries are related when their tag sets intersect.
	pub fn is_related_to(&self, other: &Entry) -> bool {
		self.related_tags
			.intersection(&other.related_tags)
			.next()
			.is_some()
	}

	pub fn summary(&self) -> EntrySummary<'_> {
		EntrySummary {
			id: &self.id,
			uid: self.uid.as_deref(),
			number: self.sequence_number,
			status: &self.status,
			url: &self.url,
			title: &self.title,
			subtitle: &self.subtitle,
			related: &self.related_tags,
		}
	}
}

impl PartialEq for Entry {
	fn eq(&self, other: &Self) -> bool {
		self.sequence_number == other.sequence_number
	}
}

impl Eq for Entry {}

impl Hash for Entry {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.sequence_number.hash(state);
	}
}

/// Presentation view of an [`Entry`] with the content body stripped.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary<'a> {
	pub id: &'a str,
	pub uid: Option<&'a str>,
	pub number: i64,
	pub status: &'a str,
	pub url: &'a str,
	pub title: &'a str,
	pub subtitle: &'a str,
	pub related: &'a BTreeSet<String>,
}

// ---------------------------------------------------------------------------
// Id deserialization
// ---------------------------------------------------------------------------

// Catalog payloads carry numeric ids while callers send them as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
	Text(String),
	Int(i64),
	Uint(u64),
}

impl From<RawId> for String {
	fn from(raw: RawId) -> Self {
		match raw {
			RawId::Text(s) => s,
			RawId::Int(n) => n.to_string(),
			RawId::Uint(n) => n.to_string(),
		}
	}
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	RawId::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
pub(crate) fn entry(id: &str, number: i64, word_count: u64, tags: &[&str]) -> Entry {
	Entry {
		id: id.to_string(),
		uid: None,
		url: format!("https://example.com/{}", id),
		title: format!("Entry {}", id),
		status: "published".to_string(),
		sequence_number: number,
		subtitle: String::new(),
		related_tags: tags.iter().map(|t| t.to_string()).collect(),
		content: format!("body of {}", id),
		word_count,
	}
}
