/*!
 * Request locals
 *
 * Public API:
 * - RequestLocals
 * - Locals (extractor)
 */

mod core;
mod types;

pub use core::Locals;
pub use types::RequestLocals;
