//! Configuration module

mod deploy;

pub use deploy::AuthConfig;
pub use deploy::DeployConfig;
pub use deploy::SecurityConfig;
pub use deploy::ServerConfig;
pub use deploy::TokenConfig;
pub use deploy::CONFIG_FILE;
