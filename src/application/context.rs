use crate::domain::RetrievedFragment;

/// Serializes fragments into a single context block, each prefixed with its
/// 1-based position label. Deterministic and order-sensitive.
pub fn assemble_context(fragments: &[RetrievedFragment]) -> String {
    fragments
        .iter()
        .enumerate()
        .map(|(i, f)| format!("Context document {}: {}", i + 1, f.text))
        .collect::<Vec<_>>()
        .join("\n")
}
