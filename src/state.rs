/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::middleware::jwt::JwtGate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<JwtGate>,
}

impl AppState {
    pub fn new(gate: Arc<JwtGate>) -> Self {
        Self { gate }
    }
}
