mod conversation;
mod fragment;
mod resume;

pub use conversation::{ConversationSession, Message, MessageRole, DEFAULT_SLIDE_WINDOW};
pub use fragment::{FragmentHit, RetrievedFragment, ScopeFilter, SearchRequest};
pub use resume::{chunk_resume, new_scope_path, sanitize_filename, ResumeChunk, ResumeDocument};
