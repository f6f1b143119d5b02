//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! Everything expensive (JWT keys, the DB pool, the engagement core with its
//! catalogs) is built once at startup; cloning the state only bumps refcounts.

use crate::auth::JwtService;
use crate::config::AppConfig;
use crate::store::{EngagementStore, PgEngagementStore};
use engagement_drift_shared::{EngagementCore, SeededRandom};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    /// Log, nudge and plan persistence used by the analysis services
    pub store: Arc<dyn EngagementStore>,
    /// Scoring engine, message pools and plan configuration
    pub core: Arc<EngagementCore>,
    /// Prometheus handle, absent when no recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state backed by PostgreSQL
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        let store = Arc::new(PgEngagementStore::new(db.clone()));
        Self::with_store(db, config, store)
    }

    /// Create a state with a custom store
    pub fn with_store(db: PgPool, config: AppConfig, store: Arc<dyn EngagementStore>) -> Self {
        let jwt = JwtService::new(&config.jwt.secret, config.jwt.access_token_expiry_secs);
        let core = EngagementCore::with_settings(
            config.analysis.window(),
            config.analysis.auto_restore_days,
        );

        Self {
            db,
            config: Arc::new(config),
            jwt,
            store,
            core: Arc::new(core),
            metrics: None,
        }
    }

    /// Attach the Prometheus handle served on `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    #[inline]
    pub fn store(&self) -> &dyn EngagementStore {
        self.store.as_ref()
    }

    #[inline]
    pub fn core(&self) -> &EngagementCore {
        &self.core
    }

    /// Random source for one request; seeded when `analysis.nudge_seed` is set
    pub fn random(&self) -> SeededRandom {
        SeededRandom::new(self.config.analysis.nudge_seed)
    }
}
