pub mod login;

pub use login::{AuthError, AuthService};
