//! bcrypt password hashing.

use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hash a password on the blocking pool; bcrypt at cost 12 takes hundreds of ms.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(ok)
}
