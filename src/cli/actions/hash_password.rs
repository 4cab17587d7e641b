use crate::auth::hash_password;
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub struct Args {
    pub password: SecretString,
}

/// Print the Argon2id PHC string for the given password.
/// # Errors
/// Returns an error if hashing fails.
pub async fn execute(args: Args) -> Result<()> {
    let hash = hash_password(args.password.expose_secret()).await?;
    println!("{hash}");
    Ok(())
}
