pub mod asc;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod resolver;
pub mod util;

pub use asc::{AppStoreConnectClient, BearerToken};
pub use config::{Config, Credentials};
pub use error::{ResolutionError, SigningError};
pub use resolver::{BuildNumberResolver, FALLBACK_BUILD_NUMBER, next_build_number};
pub use util::{first_resource, resource_attribute, resource_id};
