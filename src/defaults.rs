//! Default values for the entity server connection.

pub const SERVER_URL: &str = "http://localhost:8080";
pub const SERVER_URL_ENV: &str = "CIM_SERVER_URL";
pub const ENTITY_PATH_PREFIX: &str = "/CIM/";
pub const ENTITY_PATH_SUFFIX: &str = ".json";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
