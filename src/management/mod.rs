mod auth;

pub use auth::AppCredentials;
pub use auth::TokenManager;
pub use auth::is_expired;
