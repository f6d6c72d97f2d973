use std::sync::Arc;

use super::{
    config::Config,
    database::{RedisStore, SurveyStore, init_redis},
    error::StartupError,
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn SurveyStore>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>, StartupError> {
        let connection = init_redis(&config.database_url).await?;
        let store = RedisStore::new(connection, config.collection.clone());

        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: Config, store: Arc<dyn SurveyStore>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
