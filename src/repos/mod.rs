pub mod memory;
pub use self::memory::*;

pub mod order;
pub use self::order::*;
