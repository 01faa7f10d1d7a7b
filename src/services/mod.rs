pub mod types;
pub use self::types::*;

pub mod system;
pub use self::system::*;

pub mod order;
pub use self::order::*;

pub mod report;
pub use self::report::*;
