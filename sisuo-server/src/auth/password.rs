//! Password hashing and verification with bcrypt
//!
//! Both run on the blocking pool; bcrypt at the default cost takes long
//! enough to stall a runtime worker.

use super::AuthError;

/// Hash `password` at `cost`.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Check `password` against a stored bcrypt hash.
///
/// A malformed stored hash is an error, not a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .map_err(|e| AuthError::Hash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("s3cret".into(), 4).await.unwrap();
        assert_ne!(hash, "s3cret");
        assert!(verify_password("s3cret".into(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrong".into(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_error() {
        let err = verify_password("x".into(), "plaintext".into()).await.unwrap_err();
        assert!(matches!(err, AuthError::Hash(_)));
    }
}
