//! Prompt templates for condensation, answer generation, and analytics.

use crate::domain::Message;

/// Renders a history window as `Role: content` lines for prompt inclusion.
pub fn render_history(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn condense_prompt(history: &[Message], question: &str) -> String {
    format!(
        "Based on the chat history below and the question, generate a query that extends the question \
with the chat history provided. The query should be in natural language. \
Answer with only the query. Do not add any explanation.\n\n\
<chat_history>\n{}\n</chat_history>\n<question>\n{}\n</question>",
        render_history(history),
        question
    )
}

pub fn answer_prompt(history: &[Message], context: &str, question: &str) -> String {
    format!(
        "You are a helpful AI assistant for recruiters. Your task is to provide clear, concise, \
and relevant information about candidates based on their resumes.\n\
Use the following context to answer the question, and if you're not sure about something, please say so.\n\
Consider the chat history when providing your response to maintain conversation continuity.\n\
Do not mention the context or chat history used in your answer.\n\
Only answer the question if you can extract it from the context provided.\n\n\
Chat History:\n{}\n\n\
Context from resumes:\n{}\n\n\
User Question: {}",
        render_history(history),
        context,
        question
    )
}

const INSIGHTS_SCHEMA: &str = r#"{
    "total_candidates": <int>,
    "skills": {"<skill>": <count>, ...},
    "average_experience": <float>,
    "total_projects": <int>,
    "candidates": [
        {
            "name": "<candidate_name>",
            "experience": <int>,
            "projects": <int>,
            "key_achievements": "<key achievements>",
            "ai_take": "<your assessment of suitable roles for this candidate>"
        },
        ...
    ]
}"#;

pub fn insights_prompt(candidate_count: usize, context: &str) -> String {
    format!(
        "Analyze {} resumes and provide structured insights in JSON format. \
The response must be ONLY valid JSON with no additional text or formatting. \
The JSON should include:\n{}\n\n\
Context from resumes: {}",
        candidate_count, INSIGHTS_SCHEMA, context
    )
}
