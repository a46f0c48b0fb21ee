//! Library Catalog Server
//!
//! Books and authors served three ways: HTML pages with forms, a
//! hand-written JSON endpoint pair, and a resource router whose relation
//! style (hyperlinks or plain ids) is chosen in configuration.

use std::sync::Arc;

use tera::Tera;

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod repository;
pub mod serializers;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::{memory::MemoryRepository, Repository};
use serializers::Representation;
use services::{
    notices::{MemoryNotices, NoticeStore},
    Services,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<Services>,
    pub templates: Arc<Tera>,
    pub representation: Representation,
}

impl AppState {
    /// Wire the state over an already connected store and notice backend
    pub fn new(
        config: AppConfig,
        repository: Repository,
        notices: Arc<dyn NoticeStore>,
    ) -> AppResult<Self> {
        let templates = api::pages::load_templates()?;
        let representation =
            Representation::new(config.api.representation, &config.server.public_url);
        let services = Services::new(repository, notices, config.auth.clone());

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
            templates: Arc::new(templates),
            representation,
        })
    }

    /// State backed entirely by process memory
    pub fn in_memory(config: AppConfig) -> AppResult<Self> {
        let notices = Arc::new(MemoryNotices::new(config.sessions.notice_ttl_seconds));
        Self::new(config, Arc::new(MemoryRepository::new()), notices)
    }
}
