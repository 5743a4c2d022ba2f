use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    chunk_resume, ports::FragmentIndex, sanitize_filename, DomainError, ResumeDocument,
};

/// Accepts extracted resume text, chunks it, and indexes the chunks under
/// the session's scope so retrieval can find them.
pub struct IngestService {
    index: Arc<dyn FragmentIndex>,
    chunk_size: usize,
}

impl IngestService {
    pub fn new(index: Arc<dyn FragmentIndex>, chunk_size: usize) -> Self {
        Self { index, chunk_size }
    }

    #[instrument(skip(self, content), fields(scope_id, file_name, chunks))]
    pub async fn ingest(
        &self,
        scope_id: &str,
        file_name: &str,
        content: &str,
    ) -> Result<(ResumeDocument, usize), DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::validation("Resume content must not be empty"));
        }

        let file_name = sanitize_filename(file_name);
        let relative_path = format!("{scope_id}/{file_name}");

        let chunks = chunk_resume(content, self.chunk_size);
        tracing::Span::current().record("chunks", chunks.len());

        self.index.index(scope_id, &relative_path, &chunks).await?;

        Ok((ResumeDocument::new(scope_id, relative_path), chunks.len()))
    }

    #[instrument(skip(self))]
    pub async fn remove_scope(&self, scope_id: &str) -> Result<(), DomainError> {
        self.index.remove_scope(scope_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::domain::ResumeChunk;

    #[derive(Default)]
    struct RecordingIndex {
        indexed: Mutex<Vec<(String, String, usize)>>,
    }

    #[async_trait]
    impl FragmentIndex for RecordingIndex {
        async fn index(
            &self,
            scope_id: &str,
            relative_path: &str,
            chunks: &[ResumeChunk],
        ) -> Result<(), DomainError> {
            self.indexed.lock().unwrap().push((
                scope_id.to_string(),
                relative_path.to_string(),
                chunks.len(),
            ));
            Ok(())
        }

        async fn remove_scope(&self, _scope_id: &str) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn ingest_sanitizes_name_and_indexes_chunks() {
        let index = Arc::new(RecordingIndex::default());
        let service = IngestService::new(index.clone(), 1000);

        let (doc, chunk_count) = service
            .ingest(
                "resume/2025-01-24/ab12cd34",
                "Alan Susa (final).pdf",
                "Seven years of data engineering.\n\nMigrated Oracle to Redshift.",
            )
            .await
            .unwrap();

        assert_eq!(
            doc.relative_path,
            "resume/2025-01-24/ab12cd34/Alan_Susa__final_.pdf"
        );
        assert_eq!(chunk_count, 1);

        let indexed = index.indexed.lock().unwrap();
        assert_eq!(indexed.len(), 1);
        assert_eq!(indexed[0].0, "resume/2025-01-24/ab12cd34");
        assert_eq!(indexed[0].1, doc.relative_path);
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let index = Arc::new(RecordingIndex::default());
        let service = IngestService::new(index.clone(), 1000);

        let err = service
            .ingest("resume/x", "empty.pdf", "   ")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert!(index.indexed.lock().unwrap().is_empty());
    }
}
