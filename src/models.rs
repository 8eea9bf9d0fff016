use std::fmt;

use serde::Serialize;

/// Store assigned document identifier.
///
/// Built from 12 random bytes rendered as lowercase hex, so it has the
/// same shape as a document store object id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn generate() -> Self {
        let bytes : [u8; 12] = rand::random();

        Id(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Id {
    fn from(s : String) -> Self {
        Id(s)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id :            Id,
    pub username :      String,
    pub email :         String,
    pub password_hash : String,
}

#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub username :      &'a str,
    pub email :         &'a str,
    pub password_hash : &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id :      Id,
    pub user_id : Id,
    pub link_id : String,
}

#[derive(Debug, Clone, Copy)]
pub struct NewLink<'a> {
    pub user_id : &'a Id,
    pub link_id : &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_hex_and_distinct() {
        let a = Id::generate();
        let b = Id::generate();

        assert_eq!(a.as_str().len(), 24);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
