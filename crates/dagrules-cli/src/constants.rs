//! CLI constants

// ============================================================================
// FILES
// ============================================================================

/// Tool settings file looked up in the project directory
pub const DEFAULT_SETTINGS_FILENAME: &str = "dagrules.toml";

/// Rule document, relative to the project directory
pub const DEFAULT_RULES_FILENAME: &str = "dagrules.yml";

/// Compiled dbt manifest, relative to the project directory
pub const DEFAULT_MANIFEST_PATH: &str = "target/manifest.json";

// ============================================================================
// ENVIRONMENT
// ============================================================================

/// Prefix of settings environment variables (`DAGRULES_OUTPUT__FORMAT=json`)
pub const SETTINGS_ENV_PREFIX: &str = "DAGRULES_";

/// Separator for nested settings keys in environment variables
pub const SETTINGS_ENV_SEPARATOR: &str = "__";

/// Log filter override
pub const LOG_ENV_VAR: &str = "DAGRULES_LOG";

/// dbt project root
pub const PROJECT_DIR_ENV_VAR: &str = "DBT_ROOT";

pub const DEFAULT_LOG_LEVEL: &str = "warn";

// ============================================================================
// EXIT CODES
// ============================================================================

pub const EXIT_RULES_FAILED: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_IO_ERROR: u8 = 3;
