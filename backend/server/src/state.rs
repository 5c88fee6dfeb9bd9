use std::sync::Arc;

use crate::{
    auth::Keys,
    config::Config,
    database::init_mongo,
    store::{Store, StoreResult},
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub keys: Keys,
}

impl AppState {
    pub async fn new(config: Config) -> StoreResult<Arc<Self>> {
        let store = init_mongo(
            &config.mongo_url,
            &config.mongo_database,
            config.mongo_transactions,
        )
        .await?;

        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: Config, store: Arc<dyn Store>) -> Arc<Self> {
        let keys = Keys::new(&config.jwt_secret, config.token_ttl_hours);

        Arc::new(Self {
            config,
            store,
            keys,
        })
    }
}
