//! Prompt text sent to the model.

use hange_core::CommitContext;

pub const EXPLAIN_INSTRUCTIONS: &str = r#"You are a senior software engineer explaining a codebase to a teammate.

You receive one or more project files (source code, configuration, documentation).

Structure your answer as follows:
1. A short overview of what the files do together.
2. The project layout, organised by folder: what each folder holds, its responsibilities and how folders relate. Describe individual files only when they stand alone, such as the only file in a folder or files at the root. Mention the key types, interfaces and functions where they matter.
3. Notable design decisions and patterns, edge cases and assumptions, and how someone could safely extend the code.

Style:
- Write it as a code walkthrough: clear, concise and technical.
- When something is ambiguous, say so and explain why instead of guessing.
- Never invent files, functions or behavior that are not present.
- Do not suggest follow-up activities.

Base the explanation only on the provided file names and contents."#;

const EXPLAIN_INPUT: &str =
    "You are given the following project files. Explain them from a developer's perspective.\n\nFiles: ";

pub const COMMIT_INSTRUCTIONS: &str = r#"You write Git commit messages.

Hard requirements:

- Output exactly one line of plain text.
- No quotes, no markdown, no code fences, no trailing period.
- Keep it short and specific, ideally 72 characters or fewer.
- Summarize the net change across all files, what changed and why, using the diff and the provided context."#;

/// Input naming every uploaded file.
pub fn explain_input(filenames: &[String]) -> String {
    format!("{}{}", EXPLAIN_INPUT, filenames.join(", "))
}

/// Sectioned input for a commit message. Empty sections are omitted.
pub fn commit_input(context: &CommitContext) -> String {
    let mut input = String::new();

    if !context.user_input.trim().is_empty() {
        input.push_str(&format!("User provided context:\n{}\n\n", context.user_input.trim()));
    }

    if !context.status.trim().is_empty() {
        input.push_str(&format!("GIT STATUS (porcelain):\n{}\n\n", context.status));
    }

    if !context.staged_status.trim().is_empty() {
        input.push_str(&format!("GIT STAGED STATUS:\n{}\n\n", context.staged_status));
    }

    if !context.diff.trim().is_empty() {
        input.push_str("STAGED PATCH (unified diff):\n<<<BEGIN PATCH>>>\n");
        input.push_str(&context.diff);
        input.push_str("\n<<<END PATCH>>>\n\n");
    }

    input
}
