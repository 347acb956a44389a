pub mod credentials;
pub mod session;

pub use credentials::StoreCredentials;
pub use session::{Session, SessionContext};
