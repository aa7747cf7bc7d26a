use crate::database::DocumentStore;
use crate::models::USERS_COLLECTION;
use mongodb::bson::doc;

/// Seeds the configured login user. Only inserts when no user with that
/// email exists; failures are logged and startup continues.
pub async fn seed_default_user(store: &dyn DocumentStore, email: &str, password: &str) {
    match store.find_one(USERS_COLLECTION, doc! { "email": email }).await {
        Ok(Some(_)) => {
            log::info!("👤 Seed user {} already exists — skipping seed", email);
        }
        Ok(None) => {
            match store
                .insert_one(USERS_COLLECTION, doc! { "email": email, "password": password })
                .await
            {
                Ok(_) => log::info!("   ✅ Seeded user {}", email),
                Err(e) => log::error!("   ❌ Failed to seed user {}: {}", email, e),
            }
        }
        Err(e) => log::error!("   ❌ Failed to look up seed user {}: {}", email, e),
    }
}
