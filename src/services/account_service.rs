//! Resolving a GitHub identity to a local account.

use async_trait::async_trait;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::models::user::{AUTH_PROVIDER_GITHUB, NOT_SPECIFIED};
use crate::database::models::{GithubLink, NewUser, User};
use crate::database::UserRepository;
use crate::services::github_service::GithubProfile;
use crate::validation::MAX_NAME_LENGTH;

/// The user lookups account linking needs
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_github_id(&self, github_id: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn link_github(&self, user: &User, link: GithubLink) -> Result<User, DatabaseError>;
    async fn create(&self, new: NewUser) -> Result<User, DatabaseError>;
}

#[async_trait]
impl AccountStore for UserRepository {
    async fn find_by_github_id(&self, github_id: &str) -> Result<Option<User>, DatabaseError> {
        UserRepository::find_by_github_id(self, github_id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        UserRepository::find_by_email(self, email).await
    }

    async fn link_github(&self, user: &User, link: GithubLink) -> Result<User, DatabaseError> {
        UserRepository::link_github(self, user.id, link).await
    }

    async fn create(&self, new: NewUser) -> Result<User, DatabaseError> {
        UserRepository::create(self, new).await
    }
}

/// Find or create the local user behind a GitHub login.
///
/// An account already carrying this GitHub id is refreshed. Otherwise an
/// account with the same email is linked, and failing that a new
/// GitHub-only account is created.
pub async fn link_github_account<S: AccountStore + ?Sized>(
    store: &S,
    profile: &GithubProfile,
) -> Result<User, DatabaseError> {
    let avatar = profile.avatar_url.clone().filter(|a| !a.is_empty());

    if let Some(user) = store.find_by_github_id(&profile.id).await? {
        let link = GithubLink {
            github_id: profile.id.clone(),
            github_username: profile.login.clone(),
            avatar,
            switch_provider: false,
        };
        return store.link_github(&user, link).await;
    }

    let email = profile.email.as_deref().map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty());

    if let Some(email) = email.as_deref() {
        if let Some(user) = store.find_by_email(email).await? {
            info!("Linking GitHub account {} to existing user {}", profile.login, user.id);
            let link = GithubLink {
                github_id: profile.id.clone(),
                github_username: profile.login.clone(),
                avatar,
                switch_provider: true,
            };
            return store.link_github(&user, link).await;
        }
    }

    info!("Creating user for GitHub account {}", profile.login);
    store
        .create(NewUser {
            name: display_name(profile),
            email: email.unwrap_or_else(|| format!("{}@github.local", profile.login.to_lowercase())),
            password_hash: None,
            avatar: avatar.unwrap_or_default(),
            bio: None,
            year: NOT_SPECIFIED.to_string(),
            branch: NOT_SPECIFIED.to_string(),
            skills: Vec::new(),
            github_id: Some(profile.id.clone()),
            github_username: Some(profile.login.clone()),
            auth_provider: AUTH_PROVIDER_GITHUB.to_string(),
        })
        .await
}

/// GitHub display names can outgrow the local column
fn display_name(profile: &GithubProfile) -> String {
    let name = profile.name.as_deref().unwrap_or(&profile.login);
    name.chars().take(MAX_NAME_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::user::AUTH_PROVIDER_LOCAL;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct MemoryStore {
        users: Mutex<Vec<User>>,
    }

    impl MemoryStore {
        fn with(users: Vec<User>) -> Self {
            Self {
                users: Mutex::new(users),
            }
        }

        fn count(&self) -> usize {
            self.users.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AccountStore for MemoryStore {
        async fn find_by_github_id(&self, github_id: &str) -> Result<Option<User>, DatabaseError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.github_id.as_deref() == Some(github_id))
                .cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
        }

        async fn link_github(&self, user: &User, link: GithubLink) -> Result<User, DatabaseError> {
            let mut users = self.users.lock().unwrap();
            let stored = users
                .iter_mut()
                .find(|u| u.id == user.id)
                .ok_or_else(|| DatabaseError::NotFound("User not found".into()))?;
            stored.github_id = Some(link.github_id);
            stored.github_username = Some(link.github_username);
            if let Some(avatar) = link.avatar {
                stored.avatar = avatar;
            }
            if link.switch_provider {
                stored.auth_provider = AUTH_PROVIDER_GITHUB.into();
            }
            Ok(stored.clone())
        }

        async fn create(&self, new: NewUser) -> Result<User, DatabaseError> {
            let user = User {
                id: Uuid::new_v4(),
                name: new.name,
                email: new.email,
                password_hash: new.password_hash,
                avatar: new.avatar,
                bio: new.bio,
                year: new.year,
                branch: new.branch,
                github_profile: None,
                github_id: new.github_id,
                github_username: new.github_username,
                linkedin_profile: None,
                portfolio_url: None,
                skills: new.skills,
                is_verified: false,
                role: "student".into(),
                auth_provider: new.auth_provider,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.users.lock().unwrap().push(user.clone());
            Ok(user)
        }
    }

    fn local_user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: email.into(),
            password_hash: Some("hash".into()),
            avatar: "old.png".into(),
            bio: None,
            year: "Final Year".into(),
            branch: "Computer Science".into(),
            github_profile: None,
            github_id: None,
            github_username: None,
            linkedin_profile: None,
            portfolio_url: None,
            skills: vec![],
            is_verified: false,
            role: "student".into(),
            auth_provider: AUTH_PROVIDER_LOCAL.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn profile(email: Option<&str>) -> GithubProfile {
        GithubProfile {
            id: "42".into(),
            login: "AdaL".into(),
            name: None,
            avatar_url: Some("https://avatars.example/42".into()),
            email: email.map(String::from),
        }
    }

    #[tokio::test]
    async fn known_github_id_refreshes_username_and_keeps_provider() {
        let mut existing = local_user("ada@example.com");
        existing.github_id = Some("42".into());
        existing.github_username = Some("old-login".into());
        let store = MemoryStore::with(vec![existing.clone()]);

        let mut p = profile(None);
        p.avatar_url = None;
        let user = link_github_account(&store, &p).await.unwrap();

        assert_eq!(user.id, existing.id);
        assert_eq!(user.github_username.as_deref(), Some("AdaL"));
        assert_eq!(user.avatar, "old.png");
        assert_eq!(user.auth_provider, AUTH_PROVIDER_LOCAL);
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn matching_email_links_existing_account() {
        let existing = local_user("ada@example.com");
        let store = MemoryStore::with(vec![existing.clone()]);

        let user = link_github_account(&store, &profile(Some("ADA@Example.com"))).await.unwrap();

        assert_eq!(user.id, existing.id);
        assert_eq!(user.github_id.as_deref(), Some("42"));
        assert_eq!(user.auth_provider, AUTH_PROVIDER_GITHUB);
        assert_eq!(user.avatar, "https://avatars.example/42");
        assert!(user.password_hash.is_some());
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn unknown_identity_creates_github_user() {
        let store = MemoryStore::default();

        let user = link_github_account(&store, &profile(Some("new@example.com"))).await.unwrap();

        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.name, "AdaL");
        assert!(user.password_hash.is_none());
        assert_eq!(user.year, NOT_SPECIFIED);
        assert_eq!(user.branch, NOT_SPECIFIED);
        assert_eq!(user.auth_provider, AUTH_PROVIDER_GITHUB);
    }

    #[tokio::test]
    async fn missing_email_uses_placeholder_address() {
        let store = MemoryStore::default();
        let mut p = profile(None);
        p.name = Some("Ada Lovelace".into());

        let user = link_github_account(&store, &p).await.unwrap();

        assert_eq!(user.email, "adal@github.local");
        assert_eq!(user.name, "Ada Lovelace");
    }
}
