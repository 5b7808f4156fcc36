//! Interactive login through a platform web-authentication broker.

pub mod bridge;
pub mod broker;
pub mod query;
pub mod token;
pub mod user;

pub use bridge::*;
pub use broker::*;
pub use query::append_query_parameter;
pub use token::parse_callback_payload;
pub use user::*;
