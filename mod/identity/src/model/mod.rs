pub mod event;
pub mod session;
pub mod user;

pub use event::UserEvent;
pub use session::{AuthResponse, IssuedSession, Session};
pub use user::{User, UserPublic};
