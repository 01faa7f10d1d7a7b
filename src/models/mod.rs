pub mod common;
pub use self::common::*;

pub mod pricing;
pub use self::pricing::*;

pub mod order;
pub use self::order::*;

pub mod storefront;
pub use self::storefront::*;

pub mod ledger;
pub use self::ledger::*;

pub mod special_order;
pub use self::special_order::*;

pub mod summary;
pub use self::summary::*;
