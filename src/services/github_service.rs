//! Thin client over the GitHub REST API and the GitHub OAuth web flow.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::{config, GithubConfig};
use crate::database::models::GithubData;

static REPO_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"github\.com/([^/]+)/([^/]+)").expect("valid regex"));

#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    #[error("invalid GitHub URL: {0}")]
    InvalidUrl(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("GitHub OAuth is not configured")]
    NotConfigured,

    #[error("GitHub returned {status} for {path}")]
    Status { status: StatusCode, path: String },

    #[error("GitHub OAuth error: {0}")]
    OAuth(String),

    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Owner and repository name pulled out of a GitHub URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    fn path(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{}", self.owner, self.repo, suffix)
    }
}

pub fn parse_github_url(url: &str) -> Option<RepoRef> {
    let caps = REPO_URL.captures(url)?;
    let owner = caps.get(1)?.as_str().to_string();
    let repo = caps.get(2)?.as_str();
    let repo = repo.strip_suffix(".git").unwrap_or(repo).to_string();
    Some(RepoRef { owner, repo })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readme {
    pub content: String,
    pub download_url: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributor {
    pub id: i64,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    pub contributions: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// The GitHub identity returned at the end of the OAuth flow
#[derive(Debug, Clone, PartialEq)]
pub struct GithubProfile {
    pub id: String,
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct RepoPayload {
    stargazers_count: i64,
    forks_count: i64,
    watchers_count: i64,
    language: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    description: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    default_branch: Option<String>,
    size: i64,
    open_issues_count: i64,
    license: Option<LicensePayload>,
    homepage: Option<String>,
}

#[derive(Deserialize)]
struct LicensePayload {
    name: String,
}

#[derive(Deserialize)]
struct ReadmePayload {
    download_url: Option<String>,
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct TokenPayload {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct UserPayload {
    id: i64,
    login: String,
    name: Option<String>,
    avatar_url: Option<String>,
    email: Option<String>,
}

#[derive(Deserialize)]
struct EmailPayload {
    email: String,
    primary: bool,
    verified: bool,
}

pub struct GithubService {
    client: Client,
    settings: GithubConfig,
    redirect_uri: String,
}

static SERVICE: OnceLock<GithubService> = OnceLock::new();

impl GithubService {
    pub fn new(settings: GithubConfig, redirect_uri: String) -> Result<Self, GithubError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            settings,
            redirect_uri,
        })
    }

    /// Process-wide instance built from the application config
    pub fn shared() -> Result<&'static GithubService, GithubError> {
        if let Some(service) = SERVICE.get() {
            return Ok(service);
        }
        let cfg = config();
        let redirect_uri = format!("{}/api/auth/github/callback", cfg.server.backend_url.trim_end_matches('/'));
        let service = Self::new(cfg.github.clone(), redirect_uri)?;
        Ok(SERVICE.get_or_init(|| service))
    }

    fn api(&self, path: &str) -> RequestBuilder {
        let request = self
            .client
            .get(format!("{}{}", self.settings.api_url, path))
            .header(header::ACCEPT, "application/vnd.github+json");
        match self.settings.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str, what: &str) -> Result<T, GithubError> {
        let response = self.api(path).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(GithubError::NotFound(what.to_string())),
            status if !status.is_success() => Err(GithubError::Status {
                status,
                path: path.to_string(),
            }),
            _ => Ok(response.json::<T>().await?),
        }
    }

    fn repo_ref(url: &str) -> Result<RepoRef, GithubError> {
        parse_github_url(url).ok_or_else(|| GithubError::InvalidUrl(url.to_string()))
    }

    pub async fn repo_info(&self, url: &str) -> Result<GithubData, GithubError> {
        let repo = Self::repo_ref(url)?;
        let payload: RepoPayload = self.get_json(&repo.path(""), "Repository").await?;
        let contributors = self.fetch_contributors(&repo).await?;

        Ok(GithubData {
            stars: payload.stargazers_count,
            forks: payload.forks_count,
            language: payload.language.unwrap_or_else(|| "Unknown".to_string()),
            last_updated: payload.updated_at,
            contributors: contributors.len() as i64,
            watchers: payload.watchers_count,
            description: payload.description,
            topics: payload.topics,
            default_branch: payload.default_branch,
            size: payload.size,
            open_issues: payload.open_issues_count,
            license: payload.license.map(|l| l.name),
            homepage: payload.homepage.filter(|h| !h.is_empty()),
        })
    }

    /// README text and links, or `None` when the repo has none or GitHub fails
    pub async fn readme(&self, url: &str) -> Option<Readme> {
        match self.fetch_readme(url).await {
            Ok(readme) => Some(readme),
            Err(e) => {
                debug!("README unavailable for {}: {}", url, e);
                None
            }
        }
    }

    async fn fetch_readme(&self, url: &str) -> Result<Readme, GithubError> {
        let repo = Self::repo_ref(url)?;
        let path = repo.path("/readme");
        let meta: ReadmePayload = self.get_json(&path, "README").await?;

        let response = self
            .api(&path)
            .header(header::ACCEPT, "application/vnd.github.raw")
            .send()
            .await?
            .error_for_status()?;
        let content = response.text().await?;

        Ok(Readme {
            content,
            download_url: meta.download_url,
            html_url: meta.html_url,
        })
    }

    async fn fetch_contributors(&self, repo: &RepoRef) -> Result<Vec<Contributor>, GithubError> {
        // Empty repositories answer 204 with no body
        let response = self.api(&repo.path("/contributors?per_page=100")).send().await?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(Vec::new()),
            StatusCode::NOT_FOUND => Err(GithubError::NotFound("Repository".to_string())),
            status if !status.is_success() => Err(GithubError::Status {
                status,
                path: repo.path("/contributors"),
            }),
            _ => Ok(response.json().await?),
        }
    }

    pub async fn contributors(&self, url: &str) -> Vec<Contributor> {
        let result = match Self::repo_ref(url) {
            Ok(repo) => self.fetch_contributors(&repo).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            warn!("Failed to fetch contributors for {}: {}", url, e);
            Vec::new()
        })
    }

    /// Bytes of code per language
    pub async fn languages(&self, url: &str) -> HashMap<String, u64> {
        let result = match Self::repo_ref(url) {
            Ok(repo) => self.get_json(&repo.path("/languages"), "Repository").await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            warn!("Failed to fetch languages for {}: {}", url, e);
            HashMap::new()
        })
    }

    /// True when the URL names a repository GitHub will serve
    pub async fn validate_repo_url(&self, url: &str) -> bool {
        let Ok(repo) = Self::repo_ref(url) else {
            return false;
        };
        match self.api(&repo.path("")).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Failed to validate {}: {}", url, e);
                false
            }
        }
    }

    pub fn oauth_enabled(&self) -> bool {
        self.settings.oauth_enabled()
    }

    pub fn authorize_url(&self, state: &str) -> Result<String, GithubError> {
        let client_id = self.settings.client_id.as_deref().ok_or(GithubError::NotConfigured)?;
        let mut url = Url::parse(&format!("{}/login/oauth/authorize", self.settings.oauth_url))
            .map_err(|e| GithubError::OAuth(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", "user:email")
            .append_pair("state", state);
        Ok(url.into())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<String, GithubError> {
        let (Some(client_id), Some(client_secret)) =
            (self.settings.client_id.as_deref(), self.settings.client_secret.as_deref())
        else {
            return Err(GithubError::NotConfigured);
        };

        let payload: TokenPayload = self
            .client
            .post(format!("{}/login/oauth/access_token", self.settings.oauth_url))
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match payload {
            TokenPayload {
                access_token: Some(token),
                ..
            } => Ok(token),
            TokenPayload {
                error, error_description, ..
            } => Err(GithubError::OAuth(
                error_description.or(error).unwrap_or_else(|| "no access token".to_string()),
            )),
        }
    }

    pub async fn fetch_profile(&self, access_token: &str) -> Result<GithubProfile, GithubError> {
        let user: UserPayload = self
            .client
            .get(format!("{}/user", self.settings.api_url))
            .bearer_auth(access_token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let email = match user.email.filter(|e| !e.is_empty()) {
            Some(email) => Some(email),
            None => self.primary_email(access_token).await,
        };

        Ok(GithubProfile {
            id: user.id.to_string(),
            login: user.login,
            name: user.name.filter(|n| !n.is_empty()),
            avatar_url: user.avatar_url,
            email,
        })
    }

    /// Private addresses only show up on `/user/emails`
    async fn primary_email(&self, access_token: &str) -> Option<String> {
        let response = self
            .client
            .get(format!("{}/user/emails", self.settings.api_url))
            .bearer_auth(access_token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let emails: Vec<EmailPayload> = match response {
            Ok(r) => r.json().await.ok()?,
            Err(e) => {
                debug!("Could not list GitHub emails: {}", e);
                return None;
            }
        };
        pick_primary_email(emails)
    }
}

fn pick_primary_email(emails: Vec<EmailPayload>) -> Option<String> {
    emails.into_iter().find(|e| e.primary && e.verified).map(|e| e.email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GithubConfig {
        GithubConfig {
            token: None,
            client_id: Some("client-123".into()),
            client_secret: Some("secret".into()),
            api_url: "https://api.github.com".into(),
            oauth_url: "https://github.com".into(),
            user_agent: "collab-test".into(),
        }
    }

    #[test]
    fn parses_repo_urls() {
        assert_eq!(
            parse_github_url("https://github.com/rust-lang/rust"),
            Some(RepoRef {
                owner: "rust-lang".into(),
                repo: "rust".into()
            })
        );
        assert_eq!(
            parse_github_url("https://github.com/ada/collab.git").map(|r| r.repo),
            Some("collab".into())
        );
        assert_eq!(
            parse_github_url("https://github.com/ada/collab/tree/main").map(|r| r.repo),
            Some("collab".into())
        );
        assert_eq!(parse_github_url("https://gitlab.com/ada/collab"), None);
        assert_eq!(parse_github_url("https://github.com/ada"), None);
    }

    #[test]
    fn authorize_url_carries_state_and_scope() {
        let service = GithubService::new(settings(), "http://localhost:5000/api/auth/github/callback".into()).unwrap();
        let url = Url::parse(&service.authorize_url("abc.def").unwrap()).unwrap();
        let query: HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/login/oauth/authorize");
        assert_eq!(query["client_id"], "client-123");
        assert_eq!(query["scope"], "user:email");
        assert_eq!(query["state"], "abc.def");
        assert_eq!(query["redirect_uri"], "http://localhost:5000/api/auth/github/callback");
    }

    #[test]
    fn authorize_url_requires_client_id() {
        let mut s = settings();
        s.client_id = None;
        let service = GithubService::new(s, "http://x/cb".into()).unwrap();
        assert!(matches!(service.authorize_url("s"), Err(GithubError::NotConfigured)));
        assert!(!service.oauth_enabled());
    }

    #[test]
    fn primary_email_must_be_verified() {
        let emails = vec![
            EmailPayload {
                email: "old@example.com".into(),
                primary: false,
                verified: true,
            },
            EmailPayload {
                email: "main@example.com".into(),
                primary: true,
                verified: false,
            },
        ];
        assert_eq!(pick_primary_email(emails), None);

        let emails = vec![EmailPayload {
            email: "main@example.com".into(),
            primary: true,
            verified: true,
        }];
        assert_eq!(pick_primary_email(emails), Some("main@example.com".into()));
    }

    #[tokio::test]
    async fn invalid_urls_fail_without_network() {
        let service = GithubService::new(settings(), "http://x/cb".into()).unwrap();
        assert!(!service.validate_repo_url("not a url").await);
        assert!(service.contributors("https://example.com/nope").await.is_empty());
        assert!(service.languages("nope").await.is_empty());
        assert!(service.readme("nope").await.is_none());
        assert!(matches!(
            service.repo_info("https://example.com").await,
            Err(GithubError::InvalidUrl(_))
        ));
    }

    #[test]
    fn contributor_type_field_round_trips() {
        let c: Contributor = serde_json::from_value(serde_json::json!({
            "id": 1, "login": "ada", "avatar_url": "a", "html_url": "h",
            "contributions": 9, "type": "User"
        }))
        .unwrap();
        assert_eq!(c.kind, "User");
        assert_eq!(serde_json::to_value(&c).unwrap()["type"], "User");
    }
}
