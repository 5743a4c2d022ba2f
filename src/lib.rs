//! Recruiter-facing resume assistant: upload resume text, index it into a
//! scoped search store, then chat over it with retrieval-augmented,
//! streamed answers or request auto-generated analytics.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
