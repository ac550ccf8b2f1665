//! 所有处理函数共享的应用状态

use crate::server::session::SessionStore;
use crate::server::ServerConfig;

#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub sessions: SessionStore,
}
