//! API constants for the FlashArray REST 2.x interface

use std::time::Duration;

/// REST version used when the caller does not pin one
pub const DEFAULT_API_VERSION: &str = "2.17";

/// Base API path shared by every versioned endpoint
pub const API_BASE_PATH: &str = "/api";

/// Unversioned endpoint listing the REST versions the array supports
pub const API_VERSION_ENDPOINT: &str = "api_version";

/// Per-request timeout applied when nothing else is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// User agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("flasharray-client/", env!("CARGO_PKG_VERSION"));

/// Wait applied when the per-minute request bucket is exhausted
pub const MINUTE_BUCKET_WAIT: Duration = Duration::from_secs(60);

/// Wait always applied after a 429 to cover the per-second bucket
pub const SECOND_BUCKET_WAIT: Duration = Duration::from_secs(1);

/// Full versioned API path, e.g. `/api/2.17`
pub fn api_path(version: &str) -> String {
    format!("{}/{}", API_BASE_PATH, version)
}

/// Build the URL of a resource group endpoint
pub fn group_endpoint(target: &str, version: &str, segment: &str, sub_path: Option<&str>) -> String {
    let base = format!("{}{}/{}", target.trim_end_matches('/'), api_path(version), segment);
    match sub_path {
        Some(sub) => format!("{}/{}", base, sub),
        None => base,
    }
}

/// Build the URL of the unversioned api_version endpoint
pub fn api_version_endpoint(target: &str) -> String {
    format!("{}{}/{}", target.trim_end_matches('/'), API_BASE_PATH, API_VERSION_ENDPOINT)
}

/// Header names used by the array
pub mod headers {
    pub const AUTHORIZATION: &str = "Authorization";
    pub const X_REQUEST_ID: &str = "X-Request-ID";
    pub const X_RATELIMIT_SEC: &str = "X-RateLimit-Limit-second";
    pub const X_RATELIMIT_MIN: &str = "X-RateLimit-Limit-minute";
    pub const X_RATELIMIT_REMAINING_SEC: &str = "X-RateLimit-Remaining-second";
    pub const X_RATELIMIT_REMAINING_MIN: &str = "X-RateLimit-Remaining-minute";
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}

/// Query parameter names shared by most list endpoints
pub mod params {
    pub const IDS: &str = "ids";
    pub const NAMES: &str = "names";
    pub const SORT: &str = "sort";
    pub const FILTER: &str = "filter";
    pub const LIMIT: &str = "limit";
    pub const OFFSET: &str = "offset";
    pub const CONTINUATION_TOKEN: &str = "continuation_token";
    pub const TOTAL_ITEM_COUNT: &str = "total_item_count";
    pub const TOTAL_ONLY: &str = "total_only";
    pub const DESTROYED: &str = "destroyed";
    pub const MEMBER_IDS: &str = "member_ids";
    pub const MEMBER_NAMES: &str = "member_names";
    pub const GROUP_IDS: &str = "group_ids";
    pub const GROUP_NAMES: &str = "group_names";
    pub const SOURCE_IDS: &str = "source_ids";
    pub const SOURCE_NAMES: &str = "source_names";

    /// Endpoint-specific parameters that accept a list of values
    pub const MULTI_VALUED: &[&str] = &[
        MEMBER_IDS,
        MEMBER_NAMES,
        GROUP_IDS,
        GROUP_NAMES,
        SOURCE_IDS,
        SOURCE_NAMES,
        "host_names",
        "host_group_names",
        "volume_names",
        "protocol_endpoint_ids",
        "protocol_endpoint_names",
        "remote_names",
        "on",
    ];
}
