//! Password credentials.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

mod argon2_hashing {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn generate_b64_salt() -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    pub fn hash<T: AsRef<str>>(plain: &[u8], b64_salt: T) -> Result<String> {
        let salt = SaltString::from_b64(b64_salt.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string())
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .verify_password(plain_pw, &password_hash)
            .is_ok())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PasswordHasher {
    Argon2,
}

impl FromStr for PasswordHasher {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "argon2" => Ok(PasswordHasher::Argon2),
            _ => bail!("Unknown hasher {}", s),
        }
    }
}

impl fmt::Display for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordHasher::Argon2 => f.write_str("argon2"),
        }
    }
}

impl PasswordHasher {
    pub fn generate_b64_salt(&self) -> String {
        match self {
            PasswordHasher::Argon2 => argon2_hashing::generate_b64_salt(),
        }
    }

    pub fn hash<T: AsRef<str>>(&self, plain: &[u8], b64_salt: T) -> Result<String> {
        match self {
            PasswordHasher::Argon2 => argon2_hashing::hash(plain, b64_salt),
        }
    }

    /// The argon2 hash string embeds its salt, so the stored salt is not consulted.
    pub fn verify<T: AsRef<str>>(&self, plain_pw: &str, target_hash: T) -> Result<bool> {
        match self {
            PasswordHasher::Argon2 => argon2_hashing::verify(plain_pw.as_bytes(), target_hash),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PasswordCredentials {
    pub user_id: usize,
    pub salt: String,
    pub hash: String,
    pub hasher: PasswordHasher,

    pub created: SystemTime,
    pub last_tried: Option<SystemTime>,
    pub last_used: Option<SystemTime>,
}

impl PasswordCredentials {
    pub fn create(user_id: usize, password: &str) -> Result<Self> {
        let hasher = PasswordHasher::Argon2;
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(password.as_bytes(), &salt)?;
        Ok(Self {
            user_id,
            salt,
            hash,
            hasher,
            created: SystemTime::now(),
            last_tried: None,
            last_used: None,
        })
    }

    pub fn verify(&self, password: &str) -> Result<bool> {
        self.hasher.verify(password, &self.hash)
    }
}
