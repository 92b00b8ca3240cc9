use std::sync::Arc;

use crate::application::floors::FloorService;
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct ApiState {
    pub floors: Arc<FloorService>,
    /// `None` when floors are served from the in-process repository.
    pub db: Option<Arc<PostgresRepositories>>,
}
