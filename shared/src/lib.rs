pub mod error;
pub mod ledger;
pub mod models;
pub mod roster;
pub mod validation;
pub mod user_info;

pub use error::ErrorResponse;
pub use models::*;
pub use roster::Roster;
pub use validation::*;
pub use user_info::*;
