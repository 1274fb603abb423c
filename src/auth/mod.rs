pub mod credentials;
pub mod gateway;
pub mod password;
pub mod tokens;

pub use credentials::CredentialService;
pub use gateway::Identity;
pub use tokens::{SessionToken, TokenSigner};
