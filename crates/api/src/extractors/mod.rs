//! Custom Axum extractors.

pub mod current_user;
pub mod flash;

pub use current_user::CurrentUser;
pub use flash::Flash;
