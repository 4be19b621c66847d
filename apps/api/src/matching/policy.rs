use crate::models::requirement::MatchMode;

/// Compares one requirement string against one candidate string.
///
/// - blank or absent requirement → satisfied
/// - `Exact` → case-insensitive equality
/// - `Including` → requirement is a case-insensitive substring of the candidate
///   (never the other way round)
pub fn matches(requirement: Option<&str>, candidate: &str, mode: MatchMode) -> bool {
    let requirement = match requirement {
        Some(r) if !r.trim().is_empty() => r.to_lowercase(),
        _ => return true,
    };
    let candidate = candidate.to_lowercase();

    match mode {
        MatchMode::Exact => candidate == requirement,
        MatchMode::Including => candidate.contains(&requirement),
    }
}
