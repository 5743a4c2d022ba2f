use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub id: Uuid,
    pub scope_id: String,
    pub relative_path: String,
    pub created_at: chrono::DateTime<Utc>,
}

impl ResumeDocument {
    pub fn new(scope_id: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope_id: scope_id.into(),
            relative_path: relative_path.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeChunk {
    pub id: Uuid,
    pub content: String,
    pub chunk_index: usize,
}

impl ResumeChunk {
    pub fn new(content: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            chunk_index,
        }
    }
}

/// Replaces every character outside `[A-Za-z0-9_.]` with an underscore so
/// uploaded filenames are safe as path segments.
pub fn sanitize_filename(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Scope paths follow `resume/<date>/<8-char id>`, one per upload session.
pub fn new_scope_path() -> String {
    let date = Utc::now().format("%Y-%m-%d");
    let id = Uuid::new_v4().simple().to_string();
    format!("resume/{}/{}", date, &id[..8])
}

/// Splits resume text into chunks by paragraph boundaries.
///
/// Paragraphs are joined until they exceed `chunk_size`, then a new chunk
/// starts. Each chunk is assigned a sequential index starting from 0.
pub fn chunk_resume(content: &str, chunk_size: usize) -> Vec<ResumeChunk> {
    let paragraphs: Vec<&str> = content
        .split("\n\n")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut chunk_index = 0;

    for paragraph in paragraphs {
        let would_exceed =
            !current.is_empty() && current.len() + paragraph.len() + 2 > chunk_size;

        if would_exceed {
            chunks.push(ResumeChunk::new(&current, chunk_index));
            current.clear();
            chunk_index += 1;
        }

        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }

    if !current.is_empty() {
        chunks.push(ResumeChunk::new(&current, chunk_index));
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Alan Susa (2024).pdf"), "Alan_Susa__2024_.pdf");
        assert_eq!(sanitize_filename("resume.pdf"), "resume.pdf");
    }

    #[test]
    fn test_scope_path_shape() {
        let path = new_scope_path();
        let parts: Vec<&str> = path.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "resume");
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn test_chunk_resume_single_chunk() {
        let chunks = chunk_resume("Hello world.\n\nThis is a test.", 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello world.\n\nThis is a test.");
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn test_chunk_resume_multiple_chunks() {
        let content = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let chunks = chunk_resume(content, 30);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[1].chunk_index, 1);
        assert_eq!(chunks[2].chunk_index, 2);
    }

    #[test]
    fn test_chunk_resume_empty() {
        assert!(chunk_resume("", 100).is_empty());
    }
}
