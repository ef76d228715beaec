use crate::domain::{Platform, Program};
use crate::utils::error::Result;

/// Normalize a CRM source string: trim whitespace, strip surrounding single
/// or double quotes, trim again. CRM data arrives inconsistently quoted, so
/// this is the single sanitization point for source comparisons.
pub fn sanitize_source(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim()
        .to_string()
}

/// Resolve the support programs attached to `program` that the student's
/// declared source is eligible for.
///
/// A support program with an empty source list is unrestricted. Otherwise the
/// sanitized student source must appear in the support program's sanitized,
/// comma-split source list. A missing student source matches only
/// unrestricted supports.
pub async fn eligible_support_programs<P: Platform>(
    platform: &P,
    program: &Program,
    student_source: Option<&str>,
) -> Result<Vec<Program>> {
    let source = student_source
        .map(sanitize_source)
        .filter(|s| !s.is_empty());

    let mut eligible = Vec::new();
    for code in &program.support_programs {
        match platform.get_program(code).await? {
            Some(support) => {
                if accepts_source(&support, source.as_deref()) {
                    eligible.push(support);
                }
            }
            None => {
                tracing::warn!(
                    "Support program {} attached to {} does not exist",
                    code,
                    program.code
                );
            }
        }
    }
    Ok(eligible)
}

fn accepts_source(support: &Program, source: Option<&str>) -> bool {
    let list = support
        .support_sources
        .as_deref()
        .map(str::trim)
        .unwrap_or("");
    if list.is_empty() {
        return true;
    }
    let Some(source) = source else {
        return false;
    };
    list.split(',').any(|entry| sanitize_source(entry) == source)
}
