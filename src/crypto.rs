use rand::{thread_rng, Rng};

use crate::Result;

pub fn encode_password(pass : &[u8]) -> Result<String> {
    let mut salt = [0; 32];
    thread_rng().fill(&mut salt);

    Ok(argon2::hash_encoded(pass, &salt, &Default::default())?)
}

pub fn verify_password(encoded : &str, pass : &[u8]) -> Result<bool> {
    Ok(argon2::verify_encoded(encoded, pass)?)
}

/// Runs [`encode_password`] on the blocking pool.
pub async fn encode_password_blocking(pass : String) -> Result<String> {
    tokio::task::spawn_blocking(move || encode_password(pass.as_bytes()))
        .await?
}

/// Runs [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(
    encoded : String,
    pass : String,
) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        verify_password(&encoded, pass.as_bytes())
    })
    .await?
}
