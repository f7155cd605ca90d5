use crate::database::DbPool;
use crate::entities::{UserRole, profile_entity as profiles};
use crate::error::{AppError, AppResult};
use crate::models::{ProfileResponse, SessionContext};
use crate::utils::Claims;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, SqlErr};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

struct CachedSession {
    context: SessionContext,
    // token expiry (unix seconds)
    expires_at: i64,
}

/// Per-session caller context. A session is keyed by the token's
/// `session_id` (or subject plus issue time) and lives until sign-out,
/// until its token expires or until the role of its user changes.
#[derive(Clone)]
pub struct SessionService {
    pool: DbPool,
    contexts: Arc<RwLock<HashMap<String, CachedSession>>>,
    // session key -> token expiry (unix seconds)
    signed_out: Arc<RwLock<HashMap<String, i64>>>,
}

impl SessionService {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            contexts: Arc::new(RwLock::new(HashMap::new())),
            signed_out: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Loads the caller's profile, creating a `user` profile on first
    /// sign-in, and caches the resulting context.
    pub async fn start(&self, claims: &Claims) -> AppResult<SessionContext> {
        if self.is_revoked(claims) {
            return Err(AppError::AuthError("Session has been signed out".to_string()));
        }

        let user_id = claims.user_id()?;
        let profile = self.load_or_create_profile(user_id).await?;
        let ctx = SessionContext {
            user_id,
            session_id: claims.session_key(),
            role: profile.role,
            profile: ProfileResponse::from(profile),
        };

        let now = Utc::now().timestamp();
        let mut contexts = self.contexts.write().unwrap_or_else(PoisonError::into_inner);
        contexts.retain(|_, cached| cached.expires_at > now);
        contexts.insert(
            ctx.session_id.clone(),
            CachedSession {
                context: ctx.clone(),
                expires_at: claims.exp,
            },
        );
        drop(contexts);
        log::info!("Session started for user {} as {}", user_id, ctx.role);
        Ok(ctx)
    }

    /// Cached context for the token's session, starting one if needed.
    pub async fn resolve(&self, claims: &Claims) -> AppResult<SessionContext> {
        if self.is_revoked(claims) {
            return Err(AppError::AuthError("Session has been signed out".to_string()));
        }

        let now = Utc::now().timestamp();
        let cached = self
            .contexts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&claims.session_key())
            .filter(|cached| cached.expires_at > now)
            .map(|cached| cached.context.clone());
        match cached {
            Some(ctx) => Ok(ctx),
            None => self.start(claims).await,
        }
    }

    /// Drops the cached context and rejects the session until its token
    /// would have expired anyway.
    pub fn sign_out(&self, claims: &Claims) {
        let key = claims.session_key();
        self.contexts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);

        let now = Utc::now().timestamp();
        let mut signed_out = self
            .signed_out
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        signed_out.retain(|_, exp| *exp > now);
        signed_out.insert(key, claims.exp);
        log::info!("Session signed out for user {}", claims.sub);
    }

    pub fn is_revoked(&self, claims: &Claims) -> bool {
        self.signed_out
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&claims.session_key())
    }

    /// Forgets every cached context of `user_id`, so the next request
    /// reloads the profile (after a role or profile change).
    pub fn invalidate_user(&self, user_id: Uuid) {
        self.contexts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, cached| cached.context.user_id != user_id);
    }

    pub fn cached_sessions(&self) -> usize {
        self.contexts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn load_or_create_profile(&self, user_id: Uuid) -> AppResult<profiles::Model> {
        if let Some(p) = profiles::Entity::find_by_id(user_id).one(self.pool.as_ref()).await? {
            return Ok(p);
        }

        let now = Utc::now();
        let profile = profiles::ActiveModel {
            id: Set(user_id),
            full_name: Set(None),
            phone: Set(None),
            role: Set(UserRole::User),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };
        match profile.insert(self.pool.as_ref()).await {
            Ok(p) => {
                log::info!("Created profile for user {user_id}");
                Ok(p)
            }
            // a concurrent first request created it
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                profiles::Entity::find_by_id(user_id)
                    .one(self.pool.as_ref())
                    .await?
                    .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn claims(user_id: Uuid, session: &str) -> Claims {
        Claims {
            sub: user_id.to_string(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
            session_id: Some(session.to_string()),
            email: None,
        }
    }

    fn profile(id: Uuid, role: UserRole) -> profiles::Model {
        profiles::Model {
            id,
            full_name: Some("Sari".into()),
            phone: None,
            role,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_start_loads_existing_profile_once() {
        let user_id = Uuid::new_v4();
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[profile(user_id, UserRole::Kasir)]])
            .into_connection()
            .into();
        let sessions = SessionService::new(db);
        let c = claims(user_id, "s1");

        let ctx = sessions.start(&c).await.unwrap();
        assert_eq!(ctx.role, UserRole::Kasir);
        assert_eq!(ctx.session_id, "s1");

        // served from cache; the mock has no more rows
        let again = sessions.resolve(&c).await.unwrap();
        assert_eq!(again, ctx);
    }

    #[tokio::test]
    async fn test_first_sign_in_creates_user_profile() {
        let user_id = Uuid::new_v4();
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<profiles::Model>::new()])
            .append_query_results([[profile(user_id, UserRole::User)]])
            .into_connection()
            .into();
        let sessions = SessionService::new(db);

        let ctx = sessions.resolve(&claims(user_id, "s1")).await.unwrap();
        assert_eq!(ctx.role, UserRole::User);
        assert_eq!(ctx.profile.id, user_id);
    }

    #[tokio::test]
    async fn test_signed_out_session_is_rejected() {
        let user_id = Uuid::new_v4();
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[profile(user_id, UserRole::User)]])
            .into_connection()
            .into();
        let sessions = SessionService::new(db);
        let c = claims(user_id, "s1");
        sessions.start(&c).await.unwrap();

        sessions.sign_out(&c);

        assert!(sessions.is_revoked(&c));
        assert!(matches!(
            sessions.resolve(&c).await,
            Err(AppError::AuthError(_))
        ));
        assert!(matches!(sessions.start(&c).await, Err(AppError::AuthError(_))));
        assert!(!sessions.is_revoked(&claims(user_id, "s2")));
    }

    #[tokio::test]
    async fn test_invalidate_user_reloads_role() {
        let user_id = Uuid::new_v4();
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[profile(user_id, UserRole::User)]])
            .append_query_results([[profile(user_id, UserRole::Admin)]])
            .into_connection()
            .into();
        let sessions = SessionService::new(db);
        let c = claims(user_id, "s1");

        assert_eq!(sessions.resolve(&c).await.unwrap().role, UserRole::User);
        sessions.invalidate_user(user_id);
        assert_eq!(sessions.resolve(&c).await.unwrap().role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_expired_sessions_are_evicted() {
        let user_id = Uuid::new_v4();
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[profile(user_id, UserRole::User)]])
            .append_query_results([[profile(user_id, UserRole::User)]])
            .into_connection()
            .into();
        let sessions = SessionService::new(db);

        let mut stale = claims(user_id, "old");
        stale.exp = Utc::now().timestamp() - 60;
        sessions.start(&stale).await.unwrap();
        assert_eq!(sessions.cached_sessions(), 1);

        sessions.start(&claims(user_id, "fresh")).await.unwrap();
        assert_eq!(sessions.cached_sessions(), 1);
    }
}
