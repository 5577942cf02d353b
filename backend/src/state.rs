//! Shared application state injected into every handler.
//!
//! `AppState` is created once in `main.rs` and registered as `web::Data`. All
//! members are cheap to clone handles; none of them holds per-request mutable
//! data, so handlers never coordinate with each other beyond what the database
//! itself provides.

use crate::auth::token::TokenService;
use crate::config::ServerConfig;
use crate::db::Database;
use crate::error::AppError;
use crate::registry::TemplateRegistry;
use crate::render::chromium::ChromiumEngine;
use crate::render::RenderPipeline;
use crate::uploads::UploadStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Persistence handle every store operation runs against.
    pub db: Database,

    /// Issues and verifies bearer tokens.
    pub tokens: TokenService,

    /// Template modules keyed by document-type slug. Built at start-up and
    /// never mutated afterwards, so it is shared without a lock.
    pub registry: Arc<TemplateRegistry>,

    /// Turns themed HTML into PDF bytes through the headless engine.
    pub renderer: RenderPipeline,

    /// Storage for uploaded profile pictures.
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(
        db: Database,
        tokens: TokenService,
        registry: TemplateRegistry,
        renderer: RenderPipeline,
        uploads: UploadStore,
    ) -> Self {
        Self {
            db,
            tokens,
            registry: Arc::new(registry),
            renderer,
            uploads,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, AppError> {
        let engine = ChromiumEngine::new(config.chrome.clone());
        Ok(Self::new(
            Database::open(&config.database)?,
            TokenService::new(&config.jwt_secret, config.token_ttl()),
            TemplateRegistry::builtin(),
            RenderPipeline::new(Arc::new(engine), config.render_timeout()),
            UploadStore::new(config.upload_dir.clone()),
        ))
    }
}
