//! Centralized constants for endpoints, defaults, and report wording.

/// Default warning window in days.
pub const DEFAULT_WARNING_DAYS: i64 = 30;

/// Recipient placeholder when no owner tag resolves.
pub const RECIPIENT_NOT_DEFINED: &str = "(not defined)";

/// Default identity provider authority host.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Default Microsoft Graph base URL (without API version).
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com";

/// Graph API version segment.
pub const GRAPH_API_VERSION: &str = "v1.0";

/// Scope requested with the client-credentials grant.
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Properties requested when listing application registrations.
pub const APPLICATION_SELECT: &str =
    "id,appId,displayName,notes,info,passwordCredentials,keyCredentials";

/// Deep link prefix for an application's credentials blade (append the app id).
pub const PORTAL_CREDENTIALS_BLADE: &str =
    "https://portal.azure.com/#view/Microsoft_AAD_RegisteredApps/ApplicationMenuBlade/~/Credentials/appId/";

/// Per-request HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 60;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "appcred-watch.toml";

/// Env var naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "APPCRED_WATCH_CONFIG";

/// Tag used when forwarding run summaries to journald.
pub const JOURNALD_TAG: &str = "appcred-watch";

/// Seconds in a day, for whole-day arithmetic.
pub const SECONDS_PER_DAY: i64 = 86_400;
