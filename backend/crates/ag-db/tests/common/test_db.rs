use ag_core::Identity;
use ag_db::IdentityRepository;

use sqlx::SqlitePool;

/// In-memory database with the schema applied
pub async fn create_test_pool() -> SqlitePool {
    ag_db::connect_in_memory()
        .await
        .expect("Failed to create test pool")
}

/// Persists an identity so foreign keys on tokens and logs resolve
pub async fn create_test_identity(pool: &SqlitePool, email: &str) -> Identity {
    let identity = super::build_identity(email);
    IdentityRepository::new(pool.clone())
        .create(&identity)
        .await
        .expect("Failed to create test identity");
    identity
}
