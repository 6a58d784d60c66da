/*
 * Responsibility
 * - Token verification behind the HTTP layer (keys, claims, classification)
 * - No axum types here except through error.rs
 */
pub mod auth;
