use crate::config::AppConfig;
use crate::storage::Pool;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub config: AppConfig,
}
