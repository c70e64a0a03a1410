//! Prompt builder: role-specific system message + summary and context block.

use ocean_model::{KnowledgeSnippet, Query, UserRole};

use super::summary::RecordSummary;

const STUDENT: &str = r#"
You explain ocean float measurements to a student. Use plain words, define any technical
term you need, and keep the answer under 150 words.
"#;

const RESEARCHER: &str = r#"
You brief an oceanographer on float measurements. Be precise, give values with units,
mention the data source and QC caveats. Keep the answer under 200 words.
"#;

const POLICYMAKER: &str = r#"
You brief a policymaker on ocean conditions. Lead with what the numbers mean for people and
ecosystems, avoid jargon, and keep the answer under 150 words.
"#;

const GROUNDING: &str =
    "Only state numbers that appear in the data summary. If the data is synthetic or mock, say so.";

/// System message for the audience of `role`.
pub fn system_prompt(role: UserRole) -> String {
    let register = match role {
        UserRole::Student => STUDENT,
        UserRole::Researcher => RESEARCHER,
        UserRole::Policymaker => POLICYMAKER,
    };
    format!("{}\n{GROUNDING}", register.trim())
}

/// User prompt: question, data summary, then as much context as fits in `max_ctx_chars`.
///
/// Snippets keep their ranking order; the last one that does not fit is cut
/// at a char boundary.
pub fn build_user_prompt(
    query: &Query,
    summary: &RecordSummary,
    snippets: &[KnowledgeSnippet],
    max_ctx_chars: usize,
) -> String {
    let mut out = String::new();
    out.push_str("Question:\n");
    out.push_str(query.raw_text.trim());
    out.push_str("\n\n");

    out.push_str("Region: ");
    out.push_str(
        &query
            .region
            .map(|r| r.label())
            .unwrap_or_else(|| "not specified".into()),
    );
    out.push_str("\n\nData summary:\n");
    out.push_str(&summary.render());

    if !snippets.is_empty() {
        out.push_str("\nBackground (top-ranked):\n");
        let mut budget = max_ctx_chars;

        for (i, s) in snippets.iter().enumerate() {
            let header = format!("[{}] {} (score {:.3})\n", i + 1, s.source_id, s.score);
            let text = s.text.trim();

            if header.len() >= budget {
                break;
            }
            out.push_str(&header);
            budget -= header.len();

            let take = budget.saturating_sub(2);
            if text.len() > take {
                out.push_str(safe_truncate(text, take));
                out.push_str("\n…\n");
                break;
            }
            out.push_str(text);
            out.push('\n');
            budget -= text.len() + 1;
        }
    }

    out
}

pub(crate) fn safe_truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        let mut end = max;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}
