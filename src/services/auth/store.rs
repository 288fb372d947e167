/*
 * Responsibility
 * - 起動時に構築する資格情報ストア (username → Argon2 PHC hash + roles)
 * - Authenticator 実装として Client に束ねられる
 * - 構築後は read-only (リクエスト間で状態を持たない)
 * - 未知の username でも dummy hash を検証し、応答時間で存在を漏らさない
 */
use std::{collections::HashMap, sync::Arc};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use thiserror::Error;

use super::{
    authenticator::{AuthenticationError, Authenticator},
    credentials::UsernamePasswordCredentials,
    profile::{USERNAME_ATTRIBUTE, UserProfile},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicate user: {0}")]
    DuplicateUser(String),
    #[error("invalid user entry: {0}")]
    InvalidEntry(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Argon2id PHC string for `password` with a fresh random salt.
///
/// This is the format `AUTH_USERS` expects.
pub fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Hash(e.to_string()))
}

/// `false` for a mismatch and for an unparsable hash alike.
fn verify_password(password: &[u8], phc: &str) -> bool {
    PasswordHash::new(phc)
        .is_ok_and(|parsed| Argon2::default().verify_password(password, &parsed).is_ok())
}

#[derive(Clone)]
struct UserRecord {
    password_hash: Arc<str>,
    roles: Vec<String>,
}

/// Username/password store loaded once at startup.
#[derive(Clone)]
pub struct InMemoryCredentialStore {
    users: HashMap<String, UserRecord>,
    // Verified for unknown usernames so both paths cost one Argon2 run.
    dummy_hash: Arc<str>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Result<Self, StoreError> {
        Ok(Self {
            users: HashMap::new(),
            dummy_hash: Arc::from(hash_password("unknown-user")?),
        })
    }

    /// Adds a user with a cleartext password (hashed before storing).
    pub fn with_user<I, R>(self, username: &str, password: &str, roles: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let hash = hash_password(password)?;
        self.insert(username, &hash, roles.into_iter().map(Into::into).collect())
    }

    /// Parses `username:<argon2 PHC string>[:role|role]` entries.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        entries.into_iter().try_fold(Self::new()?, |store, entry| {
            // PHC strings never contain ':'
            let mut parts = entry.splitn(3, ':');
            let username = parts.next().unwrap_or_default().trim();
            let phc = parts
                .next()
                .ok_or_else(|| StoreError::InvalidEntry(username.to_string()))?
                .trim();
            let roles = parts
                .next()
                .map(|r| {
                    r.split('|')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            store.insert(username, phc, roles)
        })
    }

    fn insert(mut self, username: &str, phc: &str, roles: Vec<String>) -> Result<Self, StoreError> {
        if username.is_empty() {
            return Err(StoreError::InvalidEntry("empty username".to_string()));
        }
        if PasswordHash::new(phc).is_err() {
            return Err(StoreError::InvalidEntry(username.to_string()));
        }
        if self.users.contains_key(username) {
            return Err(StoreError::DuplicateUser(username.to_string()));
        }
        self.users.insert(
            username.to_string(),
            UserRecord {
                password_hash: Arc::from(phc),
                roles,
            },
        );
        Ok(self)
    }
}

#[async_trait]
impl Authenticator for InMemoryCredentialStore {
    async fn authenticate(
        &self,
        credentials: &UsernamePasswordCredentials,
    ) -> Result<UserProfile, AuthenticationError> {
        if credentials.username().is_empty() {
            return Err(AuthenticationError::MalformedCredentials("blank username"));
        }

        let record = self.users.get(credentials.username());
        let hash = record
            .map(|r| Arc::clone(&r.password_hash))
            .unwrap_or_else(|| Arc::clone(&self.dummy_hash));

        // Argon2 is CPU bound; keep it off the I/O threads.
        let password = credentials.password().to_owned();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(password.as_bytes(), &hash))
                .await
                .map_err(|e| AuthenticationError::BackendUnavailable(e.to_string()))?;

        match record {
            Some(record) if matches => Ok(UserProfile::new(credentials.username())
                .with_attribute(USERNAME_ATTRIBUTE, credentials.username())
                .with_roles(record.roles.iter().cloned())),
            _ => Err(AuthenticationError::InvalidCredentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_argon2id() {
        let first = hash_password("pw").expect("hash");
        let second = hash_password("pw").expect("hash");

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(verify_password(b"pw", &first));
        assert!(verify_password(b"pw", &second));
        assert!(!verify_password(b"pW", &first));
    }

    #[tokio::test]
    async fn authenticates_known_user_and_attaches_roles() {
        let store = InMemoryCredentialStore::new()
            .and_then(|s| s.with_user("alice", "wonderland", ["admin", "reader"]))
            .expect("store");

        let profile = store
            .authenticate(&UsernamePasswordCredentials::new("alice", "wonderland"))
            .await
            .expect("profile");
        assert_eq!(profile.id, "alice");
        assert!(profile.has_role("admin"));
        assert!(profile.has_role("reader"));
        assert_eq!(
            profile.attributes.get(USERNAME_ATTRIBUTE).map(String::as_str),
            Some("alice")
        );
    }

    #[tokio::test]
    async fn rejects_wrong_password_and_unknown_user() {
        let store = InMemoryCredentialStore::new()
            .and_then(|s| s.with_user("alice", "wonderland", Vec::<String>::new()))
            .expect("store");

        assert_eq!(
            store
                .authenticate(&UsernamePasswordCredentials::new("alice", "nope"))
                .await
                .unwrap_err(),
            AuthenticationError::InvalidCredentials
        );
        assert_eq!(
            store
                .authenticate(&UsernamePasswordCredentials::new("mallory", "wonderland"))
                .await
                .unwrap_err(),
            AuthenticationError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn unknown_user_is_checked_against_the_dummy_hash() {
        let store = InMemoryCredentialStore::new().expect("store");
        assert!(PasswordHash::new(&store.dummy_hash).is_ok());

        // the dummy password itself must not open an account that does not exist
        assert_eq!(
            store
                .authenticate(&UsernamePasswordCredentials::new("ghost", "unknown-user"))
                .await
                .unwrap_err(),
            AuthenticationError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn parses_phc_entries() {
        let entry = format!("bob:{}:writer|reader", hash_password("builder").expect("hash"));
        let store = InMemoryCredentialStore::from_entries([entry.as_str()]).expect("store");

        let profile = store
            .authenticate(&UsernamePasswordCredentials::new("bob", "builder"))
            .await
            .expect("profile");
        assert!(profile.has_role("writer"));
    }

    #[test]
    fn duplicate_users_are_rejected() {
        let entry = format!("bob:{}", hash_password("x").expect("hash"));
        let result = InMemoryCredentialStore::from_entries([entry.as_str(), entry.as_str()]);
        assert_eq!(result.err(), Some(StoreError::DuplicateUser("bob".into())));
    }

    #[test]
    fn malformed_entries_are_rejected() {
        assert!(InMemoryCredentialStore::from_entries(["bob"]).is_err());
        assert!(InMemoryCredentialStore::from_entries(["bob:not-a-phc-string"]).is_err());
        // an unsalted hex digest is no longer accepted
        assert!(
            InMemoryCredentialStore::from_entries([
                "bob:30c952fa0f1a5f5c0a2d8a3e1b1f1f1b1a1c1d1e1f2a2b2c2d2e2f3a3b3c70c4"
            ])
            .is_err()
        );
        let nameless = format!(":{}", hash_password("x").expect("hash"));
        assert_eq!(
            InMemoryCredentialStore::from_entries([nameless.as_str()]).err(),
            Some(StoreError::InvalidEntry("empty username".into()))
        );
    }
}
