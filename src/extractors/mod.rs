pub mod locals;

pub use locals::{Locals, RequestLocals};
