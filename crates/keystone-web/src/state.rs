//! Shared application state

use std::sync::Arc;

use keystone_core::Database;

use crate::config::Config;
use crate::mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub mailer: Arc<Mailer>,
    pub config: Arc<Config>,
}
