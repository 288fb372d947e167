/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - security: Client / Authorizer registry (起動後は read-only)
 *   - protected: 保護ルートの HandlerOptions
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::{HandlerOptions, SecurityConfig};

#[derive(Clone, Debug)]
pub struct AppState {
    pub security: Arc<SecurityConfig>,
    pub protected: HandlerOptions,
}

impl AppState {
    pub fn new(security: SecurityConfig, protected: HandlerOptions) -> Self {
        Self {
            security: Arc::new(security),
            protected,
        }
    }
}
