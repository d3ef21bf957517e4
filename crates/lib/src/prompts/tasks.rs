//! # Default Task Prompts
//!
//! This module contains the default, hardcoded prompt templates for query generation.
//! They can be overridden by the server's `config.yml` or through `PipelineSettings`.

// --- Query Generation ---

/// The system prompt sent alongside every query-generation instruction.
///
/// Placeholders: `{dialect}`
pub const QUERY_SYSTEM_PROMPT: &str = r#"You are an expert {dialect} generator for a medical records database. Reply with a single read-only {dialect} statement and nothing else."#;

/// Instruction template for the interactive agent, which expects a `SELECT ... ;` statement.
///
/// Placeholders: `{schema}`, `{dialect}`, `{question}`
pub const STATEMENT_USER_PROMPT: &str = r#"{schema}
- Always generate valid {dialect} SQL
- Include COUNT when query asks "how many" or "number of"
- End the statement with a semicolon
- Only provide SQL, no explanation

Convert this natural language query into a valid SQL statement.
Query: {question}"#;

/// Instruction template for the HTTP agent, whose answers are usually wrapped in code fences.
///
/// Placeholders: `{schema}`, `{dialect}`, `{question}`
pub const CODE_FENCE_USER_PROMPT: &str = r#"You are an expert SQL generator for {dialect}.

{schema}

Rules:
1. Use proper joins to fetch accurate data.
2. Only use the columns listed above.
3. Output SQL only.
4. Return zero rows if no matching data exists.

User question: "{question}""#;
