use std::sync::Arc;

use crate::api::{ApiError, HttpReportApi, ReportApi};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub api: Arc<dyn ReportApi>,
}

impl AppContext {
    pub fn new(config: AppConfig, api: Arc<dyn ReportApi>) -> Self {
        Self {
            config: Arc::new(config),
            api,
        }
    }

    /// Context talking HTTP to the configured server.
    pub fn connect(config: AppConfig) -> Result<Self, ApiError> {
        let api = Arc::new(HttpReportApi::from_config(&config)?);
        Ok(Self::new(config, api))
    }
}
