pub mod health;
pub use self::health::health;

pub mod user_login;
pub mod user_profile;
