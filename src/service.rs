//! Account operations: register, login, link and delete.

use std::sync::Arc;

use crate::models::{Id, NewLink, NewUser, User};
use crate::store::AccountStore;
use crate::{crypto, Error, Result};

/// Account operations over an injected [`AccountStore`].
///
/// Each call is independent. The store handle is the only shared state.
#[derive(Clone)]
pub struct Accounts {
    store : Arc<dyn AccountStore>,
}

impl Accounts {
    pub fn new(store : Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    async fn require_user(&self, username : &str) -> Result<User> {
        self.store
            .find_user(username)
            .await?
            .ok_or_else(|| Error::UserNotFound(username.to_string()))
    }

    /// Create a user and return its id.
    ///
    /// The email is expected to be validated by the caller.
    pub async fn register(
        &self,
        username : &str,
        email : &str,
        password : &str,
    ) -> Result<Id> {
        if self.store.find_user(username).await?.is_some() {
            return Err(Error::UsernameTaken(username.to_string()));
        }

        let password_hash =
            crypto::encode_password_blocking(password.to_string()).await?;

        let id = self
            .store
            .insert_user(NewUser {
                username,
                email,
                password_hash : &password_hash,
            })
            .await?;

        tracing::info!(%username, user_id = %id, "registered user");

        Ok(id)
    }

    /// Check a username/password pair and return the user's id.
    ///
    /// An unknown username and a wrong password both yield
    /// [`Error::UserNotFound`].
    pub async fn login(&self, username : &str, password : &str) -> Result<Id> {
        let user = self.require_user(username).await?;

        let ok = crypto::verify_password_blocking(
            user.password_hash,
            password.to_string(),
        )
        .await?;

        if !ok {
            tracing::debug!(%username, "password mismatch");
            return Err(Error::UserNotFound(username.to_string()));
        }

        Ok(user.id)
    }

    /// Attach an external id to a user, returning the new link's id.
    pub async fn link(&self, username : &str, link_id : &str) -> Result<Id> {
        let user = self.require_user(username).await?;

        let id = self
            .store
            .insert_link(NewLink {
                user_id : &user.id,
                link_id,
            })
            .await?;

        tracing::info!(%username, %link_id, id = %id, "linked user");

        Ok(id)
    }

    /// Remove a user and every link referencing it.
    ///
    /// Links go first so a failure part way never leaves links pointing at
    /// a missing user. Nothing is rolled back.
    pub async fn delete(&self, username : &str) -> Result<Id> {
        let user = self.require_user(username).await?;

        let links = self.store.delete_links(&user.id).await?;
        self.store.delete_user(&user.id).await?;

        tracing::info!(%username, user_id = %user.id, links, "deleted user");

        Ok(user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn accounts() -> (Arc<MemoryStore>, Accounts) {
        let store = Arc::new(MemoryStore::new());
        (Arc::clone(&store), Accounts::new(store))
    }

    #[tokio::test]
    async fn duplicate_register_is_a_conflict() {
        let (store, accounts) = accounts();

        accounts.register("alice", "alice@x.com", "pw1").await.unwrap();
        let err = accounts
            .register("alice", "other@x.com", "pw2")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UsernameTaken(_)));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn register_stores_a_digest_not_the_password() {
        let (store, accounts) = accounts();

        accounts.register("alice", "alice@x.com", "pw1").await.unwrap();
        let user = store.find_user("alice").await.unwrap().unwrap();

        assert_eq!(user.email, "alice@x.com");
        assert_ne!(user.password_hash, "pw1");
        assert!(crypto::verify_password(&user.password_hash, b"pw1").unwrap());
    }

    #[tokio::test]
    async fn login_returns_the_registered_id() {
        let (_, accounts) = accounts();

        let id = accounts.register("alice", "alice@x.com", "pw1").await.unwrap();

        assert_eq!(accounts.login("alice", "pw1").await.unwrap(), id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_both_not_found() {
        let (_, accounts) = accounts();

        accounts.register("alice", "alice@x.com", "pw1").await.unwrap();

        let wrong = accounts.login("alice", "wrong").await.unwrap_err();
        let unknown = accounts.login("nobody", "pw1").await.unwrap_err();

        assert!(matches!(wrong, Error::UserNotFound(_)));
        assert!(matches!(unknown, Error::UserNotFound(_)));
        assert_eq!(wrong.detail(), unknown.detail());
    }

    #[tokio::test]
    async fn link_references_the_user() {
        let (store, accounts) = accounts();

        let user_id =
            accounts.register("alice", "alice@x.com", "pw1").await.unwrap();
        let id = accounts.link("alice", "ext-42").await.unwrap();

        let links = store.find_links(&user_id).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, id);
        assert_eq!(links[0].link_id, "ext-42");
    }

    #[tokio::test]
    async fn duplicate_links_are_allowed() {
        let (store, accounts) = accounts();

        let user_id =
            accounts.register("alice", "alice@x.com", "pw1").await.unwrap();
        let a = accounts.link("alice", "ext-42").await.unwrap();
        let b = accounts.link("alice", "ext-42").await.unwrap();

        assert_ne!(a, b);
        assert_eq!(store.find_links(&user_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn link_to_unknown_user_creates_nothing() {
        let (store, accounts) = accounts();

        let err = accounts.link("nobody", "ext-42").await.unwrap_err();

        assert!(matches!(err, Error::UserNotFound(_)));
        assert_eq!(store.link_count().await, 0);
    }

    #[tokio::test]
    async fn delete_removes_user_and_links() {
        let (store, accounts) = accounts();

        let alice =
            accounts.register("alice", "alice@x.com", "pw1").await.unwrap();
        let bob = accounts.register("bob", "bob@x.com", "pw2").await.unwrap();
        accounts.link("alice", "ext-1").await.unwrap();
        accounts.link("alice", "ext-2").await.unwrap();
        accounts.link("bob", "ext-3").await.unwrap();

        assert_eq!(accounts.delete("alice").await.unwrap(), alice);

        assert!(store.find_user("alice").await.unwrap().is_none());
        assert!(store.find_links(&alice).await.unwrap().is_empty());
        assert_eq!(store.find_links(&bob).await.unwrap().len(), 1);
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn delete_unknown_user_changes_nothing() {
        let (store, accounts) = accounts();

        accounts.register("alice", "alice@x.com", "pw1").await.unwrap();
        accounts.link("alice", "ext-1").await.unwrap();

        let err = accounts.delete("nobody").await.unwrap_err();

        assert!(matches!(err, Error::UserNotFound(_)));
        assert_eq!(store.user_count().await, 1);
        assert_eq!(store.link_count().await, 1);
    }

    #[tokio::test]
    async fn full_account_lifecycle() {
        let (store, accounts) = accounts();

        let id = accounts.register("alice", "alice@x.com", "pw1").await.unwrap();
        assert_eq!(accounts.login("alice", "pw1").await.unwrap(), id);
        assert!(matches!(
            accounts.login("alice", "wrong").await,
            Err(Error::UserNotFound(_))
        ));

        accounts.link("alice", "ext-42").await.unwrap();
        assert_eq!(accounts.delete("alice").await.unwrap(), id);

        assert!(matches!(
            accounts.login("alice", "pw1").await,
            Err(Error::UserNotFound(_))
        ));
        assert!(store.find_links(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn username_can_be_reused_after_delete() {
        let (_, accounts) = accounts();

        let first =
            accounts.register("alice", "alice@x.com", "pw1").await.unwrap();
        accounts.delete("alice").await.unwrap();
        let second =
            accounts.register("alice", "alice@x.com", "pw2").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(accounts.login("alice", "pw2").await.unwrap(), second);
    }
}
