pub mod health;
pub mod pages;
pub mod password_reset;
pub mod signup;

pub use health::health_check;
pub use pages::{fallback, forgot_page, login_page, signup_page};
pub use password_reset::{request_password_reset, reset_page, reset_password};
pub use signup::create_account;
