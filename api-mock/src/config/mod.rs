pub mod builder;
pub mod loader;
pub mod types;
pub mod validator;

pub use builder::HarnessConfigBuilder;
pub use loader::{bootstrap_env, ConfigLoader, DefaultConfigLoader};
pub use types::{BootstrapConfig, Credentials, HarnessConfig};
pub use validator::ConfigValidatorImpl;
