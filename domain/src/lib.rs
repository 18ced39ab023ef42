use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// --- Domain Errors ---
#[derive(Error, Debug, PartialEq)]
pub enum DomainError {
    /// A stored document lacks a field that an active search clause needs.
    #[error("Malformed document '{id}': missing required field '{field}'")]
    MalformedDocument { id: String, field: &'static str },
}

// --- Document ID ---
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier (UUID v4, hyphenated).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<DocumentId> for String {
    fn from(doc_id: DocumentId) -> Self {
        doc_id.0
    }
}

// --- Author ---

/// Identity embedded in a document. Uniqueness of `id` is the caller's concern.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Author {
    pub id: String,
    pub name: String,
}

impl Author {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

// --- Document ---

/// The stored unit. Every field starts out absent; the store assigns `id` on
/// first save and never touches `created`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Document {
    #[serde(default)]
    pub id: Option<DocumentId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl Document {
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::default()
    }

    /// The id as a string slice, empty when not yet assigned.
    pub fn id_str(&self) -> &str {
        self.id.as_ref().map_or("", DocumentId::as_str)
    }

    /// True when the document carries a non-empty id.
    pub fn has_id(&self) -> bool {
        self.id.as_ref().is_some_and(|id| !id.is_empty())
    }

    fn require<'a, T>(&self, value: Option<&'a T>, field: &'static str) -> Result<&'a T, DomainError>
    where
        T: ?Sized,
    {
        value.ok_or_else(|| DomainError::MalformedDocument {
            id: self.id_str().to_string(),
            field,
        })
    }

    pub fn require_title(&self) -> Result<&str, DomainError> {
        self.require(self.title.as_deref(), "title")
    }

    pub fn require_content(&self) -> Result<&str, DomainError> {
        self.require(self.content.as_deref(), "content")
    }

    pub fn require_author(&self) -> Result<&Author, DomainError> {
        self.require(self.author.as_ref(), "author")
    }

    pub fn require_created(&self) -> Result<DateTime<Utc>, DomainError> {
        self.require(self.created.as_ref(), "created").copied()
    }
}

/// Builder for [`Document`]; unset fields stay absent.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    pub fn id(mut self, id: impl Into<DocumentId>) -> Self {
        self.document.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.document.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.document.content = Some(content.into());
        self
    }

    pub fn author(mut self, author: Author) -> Self {
        self.document.author = Some(author);
        self
    }

    pub fn created(mut self, created: DateTime<Utc>) -> Self {
        self.document.created = Some(created);
        self
    }

    pub fn build(self) -> Document {
        self.document
    }
}

// --- Search Request ---

/// Conjunctive filter over stored documents. `None` disables a clause; a
/// provided list is satisfied when any of its values matches, so an empty
/// list matches nothing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SearchRequest {
    #[serde(default)]
    pub title_prefixes: Option<Vec<String>>,
    #[serde(default)]
    pub contains_contents: Option<Vec<String>>,
    #[serde(default)]
    pub author_ids: Option<Vec<String>>,
    /// Inclusive lower bound on `created`.
    #[serde(default)]
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created`.
    #[serde(default)]
    pub created_to: Option<DateTime<Utc>>,
}

fn to_strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl SearchRequest {
    pub fn title_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.title_prefixes = Some(to_strings(prefixes));
        self
    }

    pub fn contains_contents<I, S>(mut self, contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contains_contents = Some(to_strings(contents));
        self
    }

    pub fn author_ids<I, S>(mut self, author_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.author_ids = Some(to_strings(author_ids));
        self
    }

    pub fn created_from(mut self, from: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self
    }

    pub fn created_to(mut self, to: DateTime<Utc>) -> Self {
        self.created_to = Some(to);
        self
    }

    /// True when no clause is active.
    pub fn is_unfiltered(&self) -> bool {
        self.title_prefixes.is_none()
            && self.contains_contents.is_none()
            && self.author_ids.is_none()
            && self.created_from.is_none()
            && self.created_to.is_none()
    }

    /// Evaluates every clause against `document`, AND across clauses and OR
    /// within one. A field is only read when its clause is active.
    pub fn matches(&self, document: &Document) -> Result<bool, DomainError> {
        if let Some(prefixes) = &self.title_prefixes {
            let title = document.require_title()?;
            if !prefixes.iter().any(|prefix| title.starts_with(prefix.as_str())) {
                return Ok(false);
            }
        }

        if let Some(contents) = &self.contains_contents {
            let content = document.require_content()?;
            if !contents.iter().any(|needle| content.contains(needle.as_str())) {
                return Ok(false);
            }
        }

        if let Some(author_ids) = &self.author_ids {
            let author = document.require_author()?;
            if !author_ids.contains(&author.id) {
                return Ok(false);
            }
        }

        if self.created_from.is_some() || self.created_to.is_some() {
            let created = document.require_created()?;
            if self.created_from.is_some_and(|from| created < from) {
                return Ok(false);
            }
            if self.created_to.is_some_and(|to| created > to) {
                return Ok(false);
            }
        }

        Ok(true)
    }
}
