pub mod hasher;
pub mod passwords;

pub use hasher::PasswordHasher;
pub use passwords::{Creator, PasswordService};
