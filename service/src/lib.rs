mod error;
mod input;
mod mutation;
mod query;

pub use error::*;
pub use input::*;
pub use mutation::*;
pub use query::*;

pub use sea_orm;
