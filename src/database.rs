use async_trait::async_trait;
use rusqlite::types::{FromSql, FromSqlResult, ValueRef};
use rusqlite::{ffi, Connection};
use tokio::sync::Mutex;

use crate::models::{self, Id, NewLink, NewUser};
use crate::store::AccountStore;
use crate::{Error, Result};

const SCHEMA : &str = include_str!("../schema.sql");

// SQLITE_CONSTRAINT_UNIQUE
const UNIQUE_VIOLATION : i64 = 2067;

fn error_code_match(
    err : &rusqlite::Error,
    code : ffi::ErrorCode,
    ext : i64,
) -> bool {
    matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == code
                && i64::from(e.extended_code) == ext)
}

macro_rules! db_method {
        ($name:ident (
            &$self:ident,
            $conn:ident,
            $($pname:ident : $ptype:ty),*
        ) -> $ret:ty $body:block ) => {
            pub async fn $name (&$self, $( $pname : $ptype, )* ) -> $ret {
                let $conn = $self.conn.lock().await;
                tokio::task::block_in_place(|| $body)
            }
        }
    }

/// SQLite backed [`AccountStore`].
///
/// One connection guarded by an async mutex. Queries run through
/// `block_in_place`, so this needs the multi-threaded runtime.
pub struct Db {
    conn : Mutex<Connection>,
}

impl Db {
    pub fn new<P : AsRef<std::path::Path>>(p : P) -> Result<Self> {
        let conn = Connection::open(p)?;

        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn : Mutex::new(conn),
        })
    }

    db_method! {get_user_by_name(
        &self,
        conn,
        username : &str
    ) -> Result<Option<models::User>> {
        let mut stmt = conn
            .prepare_cached("SELECT * FROM users WHERE users.username = ?")?;

        let mut rows = stmt.query(rusqlite::params![username])?;

        match rows.next()? {
            Some(row) => Ok(Some(row_parse(row)?)),
            None => Ok(None),
        }
    }}

    db_method! {insert_user(
        &self,
        conn,
        user : NewUser<'_>
    ) -> Result<Id> {
        let id = Id::generate();

        conn
            .prepare_cached(
                "INSERT INTO users (id, username, email, password_hash) \
                 VALUES (?, ?, ?, ?)"
            )?
            .execute(rusqlite::params![
                id.as_str(),
                user.username,
                user.email,
                user.password_hash
            ])
            .map_err(|err| {
                if error_code_match(
                    &err,
                    ffi::ErrorCode::ConstraintViolation,
                    UNIQUE_VIOLATION
                ) {
                    Error::UsernameTaken(user.username.to_string())
                } else {
                    err.into()
                }
            })?;

        Ok(id)
    }}

    db_method! {delete_user(&self, conn, id : &Id) -> Result<u64> {
        let n = conn
            .prepare_cached("DELETE FROM users WHERE users.id = ?")?
            .execute(rusqlite::params![id.as_str()])?;

        Ok(n as u64)
    }}

    db_method! {insert_link(
        &self,
        conn,
        link : NewLink<'_>
    ) -> Result<Id> {
        let id = Id::generate();

        conn
            .prepare_cached(
                "INSERT INTO links (id, user_id, link_id) VALUES (?, ?, ?)"
            )?
            .execute(rusqlite::params![
                id.as_str(),
                link.user_id.as_str(),
                link.link_id
            ])?;

        Ok(id)
    }}

    db_method! {get_links(
        &self,
        conn,
        user_id : &Id
    ) -> Result<Vec<models::Link>> {
        let mut stmt = conn
            .prepare_cached("SELECT * FROM links WHERE links.user_id = ?")?;

        let mut rows = stmt
            .query(rusqlite::params![user_id.as_str()])?;

        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(row_parse::<models::Link>(row)?);
        }

        Ok(links)
    }}

    db_method! {delete_links(&self, conn, user_id : &Id) -> Result<u64> {
        let n = conn
            .prepare_cached("DELETE FROM links WHERE links.user_id = ?")?
            .execute(rusqlite::params![user_id.as_str()])?;

        Ok(n as u64)
    }}
}

#[async_trait]
impl AccountStore for Db {
    async fn find_user(&self, username : &str) -> Result<Option<models::User>> {
        self.get_user_by_name(username).await
    }

    async fn insert_user(&self, user : NewUser<'_>) -> Result<Id> {
        Db::insert_user(self, user).await
    }

    async fn delete_user(&self, id : &Id) -> Result<u64> {
        Db::delete_user(self, id).await
    }

    async fn insert_link(&self, link : NewLink<'_>) -> Result<Id> {
        Db::insert_link(self, link).await
    }

    async fn find_links(&self, user_id : &Id) -> Result<Vec<models::Link>> {
        self.get_links(user_id).await
    }

    async fn delete_links(&self, user_id : &Id) -> Result<u64> {
        Db::delete_links(self, user_id).await
    }
}

fn row_parse<T : FromRow>(row : &rusqlite::Row<'_>) -> Result<T> {
    Ok(T::from_row(row)?)
}

trait FromRow: Sized {
    fn from_row(row : &rusqlite::Row<'_>) -> rusqlite::Result<Self>;
}

// columns are looked up by field name, so `SELECT *` column order does not
// matter
macro_rules! impl_from_row {
        ($ty:ty { $($field:ident),* }) => {
            impl FromRow for $ty {
                fn from_row(row : &rusqlite::Row<'_>) -> rusqlite::Result<$ty> {
                    Ok(Self{
                    $(
                        $field : row.get(stringify!($field))?,
                    )*
                    })
                }
            }
        }
    }

impl_from_row! {models::User {
    id, username, email, password_hash
}}

impl_from_row! {models::Link {
    id, user_id, link_id
}}

impl FromSql for Id {
    fn column_result(value : ValueRef) -> FromSqlResult<Id> {
        String::column_result(value).map(Id::from)
    }
}
