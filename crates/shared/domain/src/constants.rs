/// `OpenAPI` tag for operational endpoints (health).
pub const SYSTEM_TAG: &str = "System";
/// `OpenAPI` tag for image upload and listing endpoints.
pub const IMAGES_TAG: &str = "Images";

/// Prefix of environment variables overriding the config file (`IMGHUB__FETCH__TIMEOUT_SECS`).
pub const ENV_PREFIX: &str = "IMGHUB";
/// Config file loaded when no path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "server.toml";
