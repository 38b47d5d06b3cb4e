use http::header::HeaderName;

pub const HEADER_X_YOTI_AUTH_KEY: HeaderName = HeaderName::from_static("x-yoti-auth-key");
pub const HEADER_X_YOTI_AUTH_DIGEST: HeaderName = HeaderName::from_static("x-yoti-auth-digest");
pub const HEADER_X_YOTI_SDK: HeaderName = HeaderName::from_static("x-yoti-sdk");
pub const HEADER_X_YOTI_SDK_VERSION: HeaderName = HeaderName::from_static("x-yoti-sdk-version");

pub const QUERY_APP_ID: &str = "appId";
pub const QUERY_SDK_ID: &str = "sdkId";
pub const QUERY_NONCE: &str = "nonce";
pub const QUERY_TIMESTAMP: &str = "timestamp";

pub const CONTENT_TYPE_JSON: &str = "application/json";

pub const DEFAULT_CONNECT_API_URL: &str = "https://api.yoti.com/api/v1";
pub const DEFAULT_DOC_SCAN_API_URL: &str = "https://api.yoti.com/idverify/v1";
pub const DEFAULT_SANDBOX_API_URL: &str = "https://api.yoti.com/sandbox/v1";
pub const DEFAULT_CONNECT_BASE_URL: &str = "https://www.yoti.com/connect";

pub const DEFAULT_SDK_IDENTIFIER: &str = "Rust";
pub const DEFAULT_SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const SHARING_OUTCOME_SUCCESS: &str = "SUCCESS";
