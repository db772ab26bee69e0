//! Test fixture creation for the mood database

use super::constants::*;
use anyhow::Result;
use mood_fusion_server::user::{NewUser, SqliteUserStore, UserManager, DB_FILE_NAME};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Creates a temporary database with the two test users.
/// Returns (temp_dir, db_path)
pub fn create_test_db_with_users() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join(DB_FILE_NAME);

    let user_manager = UserManager::new(Arc::new(SqliteUserStore::new(&db_path)?));
    for (handle, email, password) in [
        (TEST_USER, TEST_EMAIL, TEST_PASS),
        (OTHER_USER, OTHER_EMAIL, OTHER_PASS),
    ] {
        user_manager.sign_up(&NewUser {
            handle: handle.to_string(),
            email: email.to_string(),
            full_name: TEST_FULL_NAME.to_string(),
            dob: None,
            password: password.to_string(),
        })?;
    }

    Ok((dir, db_path))
}
