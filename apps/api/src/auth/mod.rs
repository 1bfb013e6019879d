mod session;

pub use session::{create_session_handler, logout_handler, me_handler};

pub const SESSION_USER_KEY: &str = "user_identity";
