pub mod person;
pub mod user;

pub use person::{PhotoInfo, Person};
pub use user::User;
