// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Provenance";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "provenance";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".provenance";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "provenance.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "PROVENANCE_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "PROVENANCE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "PROVENANCE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "PROVENANCE_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

// =============================================================================
// Provenance Proxy
// =============================================================================

/// Environment variable for the provenance proxy base URL
pub const ENV_PROXY_URL: &str = "PROVENANCE_PROXY_URL";

/// Default provenance proxy (sandbox)
pub const DEFAULT_PROXY_URL: &str = "https://sandbox.food.ibm.com/ift/api/provenance-proxy";

/// Proxy HTTP timeout in seconds
pub const DEFAULT_PROXY_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Connector
// =============================================================================

/// Environment variable for the connector base URL (uploads disabled when unset)
pub const ENV_CONNECTOR_URL: &str = "PROVENANCE_CONNECTOR_URL";

/// Connector HTTP timeout in seconds
pub const DEFAULT_CONNECTOR_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Trace Building
// =============================================================================

/// Environment variable for the record-set build strategy
pub const ENV_TRACE_STRATEGY: &str = "PROVENANCE_TRACE_STRATEGY";

// =============================================================================
// Request Limits
// =============================================================================

/// Default body limit for API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Maximum length of an item, lot or event identifier in a path
pub const MAX_ID_LEN: usize = 256;
