//! Data-access trait for account stores.

use async_trait::async_trait;

use crate::models::{Id, Link, NewLink, NewUser, User};
use crate::Result;

/// Document persistence used by [`Accounts`](crate::service::Accounts).
///
/// Implementations only look up, insert and delete by field. Business rules
/// (password checks, which error a missing user maps to) live in the service.
///
/// Lookups return `Ok(None)` / an empty list when nothing matches.
#[async_trait]
pub trait AccountStore : Send + Sync {
    /// Look up a user by exact username.
    async fn find_user(&self, username : &str) -> Result<Option<User>>;

    /// Insert a user and return its generated id.
    ///
    /// Fails with [`Error::UsernameTaken`](crate::Error::UsernameTaken) when
    /// the store itself can see the username is already present.
    async fn insert_user(&self, user : NewUser<'_>) -> Result<Id>;

    /// Delete the user with the given id, returning how many were removed.
    async fn delete_user(&self, id : &Id) -> Result<u64>;

    /// Insert a link and return its generated id.
    async fn insert_link(&self, link : NewLink<'_>) -> Result<Id>;

    /// All links referencing the given user id.
    async fn find_links(&self, user_id : &Id) -> Result<Vec<Link>>;

    /// Delete every link referencing the given user id.
    async fn delete_links(&self, user_id : &Id) -> Result<u64>;
}
