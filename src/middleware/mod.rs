/*
 * Responsibility
 * - middleware の公開インターフェース
 * - jwt: token gate, cors: browser policy, logger: access log, recovery: panic -> 500
 */
pub mod cors;
pub mod jwt;
pub mod logger;
pub mod recovery;
