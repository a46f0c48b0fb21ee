//! Business logic services

pub mod auth;
pub mod catalog;
pub mod notices;

use std::sync::Arc;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub notices: Arc<dyn notices::NoticeStore>,
}

impl Services {
    /// Create all services over the given repository and notice store
    pub fn new(
        repository: Repository,
        notices: Arc<dyn notices::NoticeStore>,
        auth_config: AuthConfig,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(auth_config),
            catalog: catalog::CatalogService::new(repository),
            notices,
        }
    }
}
