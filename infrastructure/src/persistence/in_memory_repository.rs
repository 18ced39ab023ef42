use application::{ApplicationError, DocumentRepository};
use domain::Document;
use tracing::{debug, instrument, trace};

/// Insertion-ordered, owned document collection. Lives as long as its owner;
/// no locking, so callers hold it behind `&mut` for writes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentRepository {
    documents: Vec<Document>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
        }
    }

    /// Read-only view of the stored records, in insertion order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}

impl DocumentRepository for InMemoryDocumentRepository {
    #[instrument(skip(self, document), fields(doc_id = %document.id_str()))]
    fn append(&mut self, document: Document) -> Result<(), ApplicationError> {
        self.documents.push(document);
        debug!(position = self.documents.len() - 1, "Appended document to in-memory store");
        Ok(())
    }

    #[instrument(skip(self, document), fields(doc_id = %document.id_str()))]
    fn replace(&mut self, document: &Document) -> Result<bool, ApplicationError> {
        let position = self
            .documents
            .iter()
            .position(|stored| stored.has_id() && stored.id == document.id);
        match position {
            Some(index) => {
                self.documents[index] = document.clone();
                debug!(position = index, "Replaced document in in-memory store");
                Ok(true)
            }
            None => {
                trace!("No stored document with this id to replace");
                Ok(false)
            }
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Document> + '_> {
        Box::new(self.documents.iter())
    }

    fn len(&self) -> usize {
        self.documents.len()
    }
}
