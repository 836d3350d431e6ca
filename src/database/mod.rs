pub mod manager;
pub mod models;
pub mod projects;
pub mod schema;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use projects::{ProjectFilter, ProjectRepository, ProjectSort};
pub use users::{FollowGraph, UserFilter, UserRepository};

/// Turn free text into an ILIKE substring pattern, escaping LIKE wildcards.
pub(crate) fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("react"), "%react%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
