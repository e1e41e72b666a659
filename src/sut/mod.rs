//! Configuration of the system under test
//!
//! The suite reads its target environment (hosts, credentials, driver
//! location, feature flags) from a properties file generated by the build.

mod properties;
mod store;

pub use properties::Properties;
pub use store::{
    default_source, keys, parse_flag, source_for, ConfigStore, SutConfig,
    DEFAULT_PROPERTIES_FILE, PROPERTIES_ENV,
};
