pub mod auth;
pub mod creator;
pub mod params;

pub use auth::RequireKeyAuth;
pub use creator::CREATOR_HEADER;
