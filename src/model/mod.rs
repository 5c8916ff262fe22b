pub mod presence;
pub mod role;
pub mod user;
