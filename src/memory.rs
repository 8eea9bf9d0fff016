//! In-memory account store.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::{Id, Link, NewLink, NewUser, User};
use crate::store::AccountStore;
use crate::{Error, Result};

#[derive(Debug, Default)]
struct Inner {
    users : Vec<User>,
    links : Vec<Link>,
}

/// Process-local [`AccountStore`].
///
/// Nothing survives a restart. The username check and the insert happen
/// under one lock, so concurrent registrations cannot both succeed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner : Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.inner.lock().await.users.len()
    }

    /// Number of stored links across all users.
    pub async fn link_count(&self) -> usize {
        self.inner.lock().await.links.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_user(&self, username : &str) -> Result<Option<User>> {
        let inner = self.inner.lock().await;

        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_user(&self, user : NewUser<'_>) -> Result<Id> {
        let mut inner = self.inner.lock().await;

        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(Error::UsernameTaken(user.username.to_string()));
        }

        let id = Id::generate();
        inner.users.push(User {
            id :            id.clone(),
            username :      user.username.to_string(),
            email :         user.email.to_string(),
            password_hash : user.password_hash.to_string(),
        });

        Ok(id)
    }

    async fn delete_user(&self, id : &Id) -> Result<u64> {
        let mut inner = self.inner.lock().await;

        match inner.users.iter().position(|u| &u.id == id) {
            Some(idx) => {
                inner.users.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn insert_link(&self, link : NewLink<'_>) -> Result<Id> {
        let mut inner = self.inner.lock().await;

        let id = Id::generate();
        inner.links.push(Link {
            id :      id.clone(),
            user_id : link.user_id.clone(),
            link_id : link.link_id.to_string(),
        });

        Ok(id)
    }

    async fn find_links(&self, user_id : &Id) -> Result<Vec<Link>> {
        let inner = self.inner.lock().await;

        Ok(inner
            .links
            .iter()
            .filter(|l| &l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_links(&self, user_id : &Id) -> Result<u64> {
        let mut inner = self.inner.lock().await;

        let before = inner.links.len();
        inner.links.retain(|l| &l.user_id != user_id);

        Ok((before - inner.links.len()) as u64)
    }
}
