pub mod email;
pub mod password;
pub mod password_reset;
pub mod session;
pub mod signup;

#[cfg(test)]
pub mod testing;

pub use email::EmailService;
pub use password_reset::{NotificationSender, PasswordResetService, TokenState};
pub use session::SessionService;
pub use signup::SignupService;
