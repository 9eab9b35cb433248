//! Authentication layer: wallet signature verification, replay protection,
//! and session tokens.

pub mod middleware;
pub mod protocol;
pub mod session;
pub mod verify;

pub use middleware::{AppState, AuthSession};
pub use protocol::{AuthError, AuthFailure, Authenticated, AuthenticationProtocol};
pub use session::{derive_nonce, generate_session_token};
pub use verify::{recover_signer, verify_signature};
