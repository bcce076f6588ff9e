use crate::store::DashboardStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct HttpServerState {
    pub name: Arc<String>,
    pub store: Arc<DashboardStore>,
}
