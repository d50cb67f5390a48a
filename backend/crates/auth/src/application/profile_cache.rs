//! Profile Cache
//!
//! Stores the signed-in user's profile under `stored_user_profile` so the UI
//! can paint before the identity provider answers.

use std::sync::Arc;

use kernel::tier::UserTier;
use platform::kv::KeyValueStore;

use crate::domain::entity::identity::VerifiedIdentity;
use crate::domain::entity::user_profile::UserProfile;
use crate::error::{AuthError, AuthResult};

pub const PROFILE_KEY: &str = "stored_user_profile";

pub struct ProfileCache<K>
where
    K: KeyValueStore,
{
    store: Arc<K>,
}

impl<K> ProfileCache<K>
where
    K: KeyValueStore + Sync,
{
    pub fn new(store: Arc<K>) -> Self {
        Self { store }
    }

    /// Cached profile, if any. Unparseable data is removed and reported as absent.
    pub async fn load(&self) -> AuthResult<Option<UserProfile>> {
        let Some(raw) = self.store.get(PROFILE_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupt cached profile");
                self.store.remove(PROFILE_KEY).await?;
                Ok(None)
            }
        }
    }

    pub async fn store(&self, profile: &UserProfile) -> AuthResult<()> {
        let json =
            serde_json::to_string(profile).map_err(|e| AuthError::Internal(e.to_string()))?;
        self.store.set(PROFILE_KEY, &json).await?;
        Ok(())
    }

    /// Record a sign-in. The cached tier is the caller's best knowledge of it.
    pub async fn sign_in(
        &self,
        identity: &VerifiedIdentity,
        tier: UserTier,
    ) -> AuthResult<UserProfile> {
        let profile = UserProfile::from_identity(identity).with_tier(tier);
        self.store(&profile).await?;
        tracing::info!(user_id = %identity.user_id, tier = %tier, "Cached user profile");
        Ok(profile)
    }

    pub async fn sign_out(&self) -> AuthResult<()> {
        self.store.remove(PROFILE_KEY).await?;
        tracing::info!("User session cleared from storage");
        Ok(())
    }
}
