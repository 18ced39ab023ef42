use domain::{Document, DocumentId, DomainError, SearchRequest};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

// --- Application Errors ---
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError), // Propagate domain errors cleanly
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// --- Configuration ---

/// How `save` treats a document whose id is already stored.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SaveMode {
    /// Always append; re-saving an id leaves a duplicate record behind.
    #[default]
    Append,
    /// Replace the earliest record with the same id in place, append otherwise.
    Upsert,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub save_mode: SaveMode,
}

impl StoreConfig {
    pub fn with_save_mode(save_mode: SaveMode) -> Self {
        Self { save_mode }
    }

    /// Parses a JSON configuration object; missing keys take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ApplicationError> {
        serde_json::from_str(raw).map_err(|e| ApplicationError::InvalidConfig(e.to_string()))
    }
}

// --- Infrastructure Interfaces (Traits) ---

/// Ordered document storage. Implementations keep insertion order and do not
/// deduplicate.
pub trait DocumentRepository {
    /// Appends a document at the end of the collection.
    fn append(&mut self, document: Document) -> Result<(), ApplicationError>;

    /// Overwrites the earliest document sharing `document`'s id.
    /// Returns false when no such document exists.
    fn replace(&mut self, document: &Document) -> Result<bool, ApplicationError>;

    /// Iterates stored documents in insertion order.
    fn iter(&self) -> Box<dyn Iterator<Item = &Document> + '_>;

    /// Number of stored records, duplicates included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First document (in insertion order) whose id equals `id` byte for byte.
    fn find_first(&self, id: &str) -> Result<Option<Document>, ApplicationError> {
        Ok(self
            .iter()
            .find(|document| document.id_str() == id && document.has_id())
            .cloned())
    }
}

// --- Application Services (Use Cases) ---

/// Single-owner document store: `save`, `search` and `find_by_id` over an
/// injected repository.
pub struct DocumentManager {
    repo: Box<dyn DocumentRepository>,
    config: StoreConfig,
}

impl DocumentManager {
    pub fn new(repo: Box<dyn DocumentRepository>, config: StoreConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Stores `document`, assigning a fresh id when it has none, and returns
    /// the stored value. `created` is left exactly as supplied.
    #[instrument(skip(self, document), fields(mode = ?self.config.save_mode))]
    pub fn save(&mut self, mut document: Document) -> Result<Document, ApplicationError> {
        if !document.has_id() {
            let id = DocumentId::generate();
            debug!(doc_id = %id, "Assigned generated id to document");
            document.id = Some(id);
        }

        let replaced = match self.config.save_mode {
            SaveMode::Append => false,
            SaveMode::Upsert => self.repo.replace(&document)?,
        };
        if !replaced {
            self.repo.append(document.clone())?;
        }

        info!(
            doc_id = %document.id_str(),
            replaced,
            total = self.repo.len(),
            "Document saved"
        );
        Ok(document)
    }

    /// Returns a snapshot of every stored document matching all clauses of
    /// `request`, in insertion order.
    #[instrument(skip(self, request))]
    pub fn search(&self, request: &SearchRequest) -> Result<Vec<Document>, ApplicationError> {
        let mut hits = Vec::new();
        for document in self.repo.iter() {
            match request.matches(document) {
                Ok(true) => hits.push(document.clone()),
                Ok(false) => {}
                Err(e) => {
                    warn!(doc_id = %document.id_str(), "Search aborted on malformed document: {}", e);
                    return Err(e.into());
                }
            }
        }
        info!(
            scanned = self.repo.len(),
            hits = hits.len(),
            unfiltered = request.is_unfiltered(),
            "Search completed"
        );
        Ok(hits)
    }

    /// Looks up the earliest stored document with exactly this id.
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: &str) -> Result<Option<Document>, ApplicationError> {
        let found = self.repo.find_first(id)?;
        debug!(found = found.is_some(), "Lookup by id completed");
        Ok(found)
    }

    pub fn len(&self) -> usize {
        self.repo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repo.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use domain::Author;

    /// Plain vector-backed repository used to exercise the service in isolation.
    #[derive(Default)]
    struct VecRepository {
        documents: Vec<Document>,
    }

    impl DocumentRepository for VecRepository {
        fn append(&mut self, document: Document) -> Result<(), ApplicationError> {
            self.documents.push(document);
            Ok(())
        }

        fn replace(&mut self, document: &Document) -> Result<bool, ApplicationError> {
            match self.documents.iter_mut().find(|d| d.id == document.id) {
                Some(slot) => {
                    *slot = document.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        fn iter(&self) -> Box<dyn Iterator<Item = &Document> + '_> {
            Box::new(self.documents.iter())
        }

        fn len(&self) -> usize {
            self.documents.len()
        }
    }

    fn manager(save_mode: SaveMode) -> DocumentManager {
        DocumentManager::new(
            Box::new(VecRepository::default()),
            StoreConfig::with_save_mode(save_mode),
        )
    }

    fn doc(title: &str) -> Document {
        Document::builder()
            .title(title)
            .content("body")
            .author(Author::new("a-1", "Ada"))
            .created(Utc.timestamp_opt(10, 0).unwrap())
            .build()
    }

    #[test]
    fn save_assigns_id_and_keeps_created() {
        let mut manager = manager(SaveMode::Append);
        let original = doc("Alpha");
        let saved = manager.save(original.clone()).unwrap();
        assert!(saved.has_id());
        assert_eq!(saved.created, original.created);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn save_replaces_empty_id() {
        let mut manager = manager(SaveMode::Append);
        let mut original = doc("Alpha");
        original.id = Some(DocumentId::new(""));
        let saved = manager.save(original).unwrap();
        assert!(!saved.id_str().is_empty());
    }

    #[test]
    fn append_mode_keeps_duplicates_and_find_returns_earliest() {
        let mut manager = manager(SaveMode::Append);
        let first = manager.save(doc("First")).unwrap();
        let mut second = doc("Second");
        second.id = first.id.clone();
        manager.save(second).unwrap();

        assert_eq!(manager.len(), 2);
        let found = manager.find_by_id(first.id_str()).unwrap().unwrap();
        assert_eq!(found.title.as_deref(), Some("First"));
    }

    #[test]
    fn upsert_mode_replaces_in_place() {
        let mut manager = manager(SaveMode::Upsert);
        let first = manager.save(doc("First")).unwrap();
        manager.save(doc("Other")).unwrap();
        let mut updated = doc("Updated");
        updated.id = first.id.clone();
        manager.save(updated).unwrap();

        assert_eq!(manager.len(), 2);
        let titles: Vec<_> = manager
            .search(&SearchRequest::default())
            .unwrap()
            .into_iter()
            .filter_map(|d| d.title)
            .collect();
        assert_eq!(titles, vec!["Updated", "Other"]);
    }

    #[test]
    fn search_fails_fast_on_malformed_document() {
        let mut manager = manager(SaveMode::Append);
        manager.save(doc("Alpha")).unwrap();
        manager
            .save(Document::builder().id("no-title").build())
            .unwrap();

        let result = manager.search(&SearchRequest::default().title_prefixes(["A"]));
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::MalformedDocument { ref id, field: "title" })) if id == "no-title"
        ));
    }

    #[test]
    fn find_by_id_is_case_sensitive() {
        let mut manager = manager(SaveMode::Append);
        manager.save(Document::builder().id("Doc-1").build()).unwrap();
        assert!(manager.find_by_id("Doc-1").unwrap().is_some());
        assert!(manager.find_by_id("doc-1").unwrap().is_none());
    }

    #[test]
    fn config_parses_lowercase_mode_and_defaults() {
        assert_eq!(
            StoreConfig::from_json(r#"{"save_mode": "upsert"}"#).unwrap().save_mode,
            SaveMode::Upsert
        );
        assert_eq!(StoreConfig::from_json("{}").unwrap(), StoreConfig::default());
        assert!(matches!(
            StoreConfig::from_json(r#"{"save_mode": "merge"}"#),
            Err(ApplicationError::InvalidConfig(_))
        ));
    }
}
