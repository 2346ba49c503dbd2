//! FlashArray REST 2.x API module
//!
//! Reference resolution and parameter normalization feed a per-group
//! transport invoker, wrapped in a status-driven retry loop whose outcome is
//! translated into typed results with lazy pagination.

pub mod auth;
pub mod client;
pub mod constants;
pub mod endpoints;
pub mod groups;
pub mod params;
pub mod query;
pub mod resilience;
pub mod transport;

pub use auth::{StaticTokenManager, TokenManager};
pub use client::{ClientBuilder, FlashArrayClient};
pub use groups::{Endpoint, GroupApi, Operation, ResourceGroup, Verb};
pub use params::{CallArguments, CallOptions, Coercion, ParamValue, Reference, ReferenceRole, ReferenceTarget};
pub use query::{ApiResult, ErrorEntry, ErrorResult, ItemPager, ResponseHeaders, ValidResult};
pub use resilience::{
    ApiLogger, EventSink, FailureClass, LogLevel, MonitoringConfig, OperationContext, OperationMetrics, ResilienceConfig,
    RetryConfig, RetryPolicy,
};
pub use transport::{ApiException, HttpRequest, HttpTransport, RawResponse, ReqwestTransport, TransportConfig};
