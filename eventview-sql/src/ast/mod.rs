mod expression;
mod join;
mod literal;
mod order;
mod query;
mod select;
mod sql_identifier;
mod table;

pub use expression::*;
pub use join::*;
pub use literal::*;
pub use order::*;
pub use query::*;
pub use select::*;
pub use sql_identifier::*;
pub use table::*;
