//! Field rules shared by the auth, user and project handlers.
//!
//! Handlers feed request fields through a [`Validator`], which collects every
//! failure and turns them into a single 400 "Validation failed" response.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::ApiError;

pub const YEARS: &[&str] = &["First Year", "Second Year", "Third Year", "Final Year", "Alumni"];

pub const BRANCHES: &[&str] = &[
    "Computer Science",
    "Information Technology",
    "Electronics",
    "Mechanical",
    "Civil",
    "Chemical",
    "Electrical",
    "Biomedical",
    "Aerospace",
    "Other",
];

pub const CATEGORIES: &[&str] = &[
    "Web Development",
    "Mobile Development",
    "AI/ML",
    "Data Science",
    "IoT",
    "Blockchain",
    "Game Development",
    "Desktop Applications",
    "DevOps",
    "Cybersecurity",
    "AR/VR",
    "Other",
];

pub const TAGS: &[&str] = &[
    "Web3",
    "ML",
    "DevTool",
    "AI",
    "Blockchain",
    "Mobile",
    "Web",
    "Data Science",
    "IoT",
    "AR/VR",
    "Game Dev",
    "Other",
];

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_BIO_LENGTH: usize = 500;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_LONG_DESCRIPTION_LENGTH: usize = 2000;
pub const MAX_COMMENT_LENGTH: usize = 500;
pub const MAX_OWNER_NAME_LENGTH: usize = 50;

// `\w` is ASCII-only here, as in the address rules browsers apply
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u)^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("valid regex"));
static GITHUB_REPO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u)^https://github\.com/[\w-]+/[\w.-]+/?$").expect("valid regex"));
static GITHUB_PROFILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u)^https://github\.com/[\w-]+/?$").expect("valid regex"));
static LINKEDIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u)^https://www\.linkedin\.com/in/[\w-]+/?$").expect("valid regex"));
static HTTP_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://.+").expect("valid regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn is_github_repo_url(url: &str) -> bool {
    GITHUB_REPO.is_match(url)
}

pub fn is_github_profile_url(url: &str) -> bool {
    url.is_empty() || GITHUB_PROFILE.is_match(url)
}

pub fn is_linkedin_url(url: &str) -> bool {
    url.is_empty() || LINKEDIN.is_match(url)
}

pub fn is_http_url(url: &str) -> bool {
    url.is_empty() || HTTP_URL.is_match(url)
}

/// Lowercase and trim, the form emails are stored and looked up in
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Accept either a JSON array of strings or a comma-separated string.
/// Entries are trimmed and blanks dropped. Anything else yields `None`.
pub fn split_list(value: &Value) -> Option<Vec<String>> {
    let items: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => return None,
    };
    Some(items)
}

/// Collects validation failures for one request
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors.push(message.into());
        }
        self
    }

    /// Present and not blank
    pub fn required(&mut self, value: Option<&str>, message: impl Into<String>) -> &mut Self {
        let ok = value.is_some_and(|v| !v.trim().is_empty());
        self.check(ok, message)
    }

    /// Absent values pass
    pub fn max_chars(&mut self, value: Option<&str>, max: usize, message: impl Into<String>) -> &mut Self {
        let ok = value.map_or(true, |v| v.chars().count() <= max);
        self.check(ok, message)
    }

    /// Absent values pass
    pub fn one_of(&mut self, value: Option<&str>, allowed: &[&str], message: impl Into<String>) -> &mut Self {
        let ok = value.map_or(true, |v| allowed.contains(&v));
        self.check(ok, message)
    }

    /// Absent values pass
    pub fn each_one_of(&mut self, values: Option<&[String]>, allowed: &[&str], field: &str) -> &mut Self {
        for value in values.unwrap_or_default() {
            if !allowed.contains(&value.as_str()) {
                self.errors.push(format!("`{}` is not a valid {}", value, field));
            }
        }
        self
    }

    /// Absent values pass
    pub fn url(&mut self, value: Option<&str>, rule: fn(&str) -> bool, message: impl Into<String>) -> &mut Self {
        let ok = value.map_or(true, rule);
        self.check(ok, message)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(std::mem::take(&mut self.errors)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_rule() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("ada.lovelace-1@mail.example.org"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada example.com"));
        assert!(!is_valid_email("ada@example.museum"));
        assert!(!is_valid_email("adá@example.com"));
    }

    #[test]
    fn github_urls() {
        assert!(is_github_repo_url("https://github.com/ada/collab"));
        assert!(is_github_repo_url("https://github.com/ada/collab.rs/"));
        assert!(!is_github_repo_url("http://github.com/ada/collab"));
        assert!(!is_github_repo_url("https://github.com/ada"));
        assert!(!is_github_repo_url("https://github.com/ada/collab/tree/main"));

        assert!(is_github_profile_url(""));
        assert!(is_github_profile_url("https://github.com/ada"));
        assert!(!is_github_profile_url("https://github.com/ada/collab"));
    }

    #[test]
    fn other_urls() {
        assert!(is_linkedin_url("https://www.linkedin.com/in/ada-l/"));
        assert!(!is_linkedin_url("https://linkedin.com/in/ada"));
        assert!(is_http_url("http://ada.dev"));
        assert!(!is_http_url("ftp://ada.dev"));
        assert!(is_http_url(""));
    }

    #[test]
    fn split_list_accepts_both_shapes() {
        assert_eq!(
            split_list(&json!("Rust, Axum ,, Postgres")),
            Some(vec!["Rust".to_string(), "Axum".into(), "Postgres".into()])
        );
        assert_eq!(
            split_list(&json!([" AI ", "", 3, "Web"])),
            Some(vec!["AI".to_string(), "Web".into()])
        );
        assert_eq!(split_list(&json!("")), Some(vec![]));
        assert_eq!(split_list(&Value::Null), None);
        assert_eq!(split_list(&json!(12)), None);
    }

    #[test]
    fn validator_collects_every_failure() {
        let mut v = Validator::new();
        v.required(Some("  "), "Name is required")
            .max_chars(Some("abcdef"), 5, "Too long")
            .one_of(Some("Sixth Year"), YEARS, "Invalid year")
            .one_of(None, YEARS, "never")
            .each_one_of(Some(&["AI".to_string(), "Cooking".to_string()]), TAGS, "tag");
        assert!(!v.is_empty());

        match v.finish() {
            Err(ApiError::ValidationError { message, errors }) => {
                assert_eq!(message, "Validation failed");
                assert_eq!(
                    errors,
                    vec!["Name is required", "Too long", "Invalid year", "`Cooking` is not a valid tag"]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn max_chars_counts_characters_not_bytes() {
        let mut v = Validator::new();
        v.max_chars(Some("ééééé"), 5, "Too long");
        assert!(v.finish().is_ok());
    }
}
