use super::auth::{StaticTokenManager, TokenManager, token_from_header};
use super::constants;
use super::groups::{Endpoint, GroupApi, GroupRegistry, InvokerContext, ResourceGroup, ensure_request_id};
use super::params::{CallArguments, normalize_multi_valued, resolve_references};
use super::query::translate::translate_success;
use super::query::{ApiResult, translate_error};
use super::resilience::{ApiLogger, Completion, EventSink, OperationContext, ResilienceConfig, RetryConfig, RetryPolicy};
use super::transport::{HttpRequest, HttpTransport, InvokeError, ReqwestTransport, TransportConfig};
use crate::error::{ClientError, Result};
use log::{debug, info};
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// State shared by a client, its clones and every pager it hands out
pub(crate) struct ClientCore {
    registry: GroupRegistry,
    retry_policy: RetryPolicy,
    logger: ApiLogger,
}

/// FlashArray REST 2.x client with connection pooling
///
/// Cloning is cheap; clones share the transport, the credential and the
/// group registry.
#[derive(Clone)]
pub struct FlashArrayClient {
    core: Arc<ClientCore>,
}

#[derive(Deserialize)]
struct ApiVersions {
    version: Vec<String>,
}

impl FlashArrayClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Execute one logical call: resolve references, normalize parameters,
    /// run the retry loop and translate the outcome.
    pub async fn call(&self, endpoint: Endpoint, args: CallArguments) -> Result<ApiResult> {
        let (args, context) = self.core.prepare(endpoint, args)?;
        self.core.execute_prepared(endpoint, args, context).await
    }

    /// Run a call on the tokio runtime and hand back its join handle
    pub fn spawn_call(&self, endpoint: Endpoint, args: CallArguments) -> JoinHandle<Result<ApiResult>> {
        let client = self.clone();
        tokio::spawn(async move { client.call(endpoint, args).await })
    }

    /// Current bearer token, optionally forcing the token manager to renew it
    pub async fn get_access_token(&self, refresh: bool) -> Result<String> {
        let header = self
            .core
            .registry
            .context()
            .token_manager
            .get_header(refresh)
            .await
            .map_err(|e| ClientError::authentication("Could not obtain an access token", Some(e)))?;
        Ok(token_from_header(&header).to_string())
    }

    /// REST version this client speaks
    pub fn get_rest_version(&self) -> &str {
        &self.core.registry.context().api_version
    }

    pub fn target(&self) -> &str {
        &self.core.registry.context().target
    }

    pub fn retry_config(&self) -> &RetryConfig {
        self.core.retry_policy.config()
    }

    /// REST versions the array advertises on its unversioned `api_version` endpoint
    pub async fn supported_rest_versions(&self) -> Result<Vec<String>> {
        let context = self.core.registry.context();
        let url = constants::api_version_endpoint(&context.target);
        let request = HttpRequest {
            method: Method::GET,
            url: url.clone(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            timeout: context.timeout,
        };

        let response = context
            .transport
            .send(request)
            .await
            .map_err(|e| ClientError::transport(format!("GET {} failed", url), Some(e)))?;

        if !response.is_success() {
            return Err(ClientError::transport(
                format!("GET {} returned HTTP {}", url, response.status),
                None,
            ));
        }

        let versions: ApiVersions = serde_json::from_str(&response.body)
            .map_err(|e| ClientError::transport("Unexpected api_version response body", Some(e.into())))?;
        Ok(versions.version)
    }

    /// API binding of one resource group, created on first use
    pub fn group(&self, group: ResourceGroup) -> Arc<GroupApi> {
        self.core.registry.get(group)
    }

    /// Resource groups bound so far
    pub fn loaded_groups(&self) -> Vec<ResourceGroup> {
        self.core.registry.loaded()
    }
}

impl std::fmt::Debug for FlashArrayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlashArrayClient")
            .field("target", &self.target())
            .field("api_version", &self.get_rest_version())
            .field("retry", self.retry_config())
            .finish()
    }
}

impl ClientCore {
    /// Pre-flight: everything that can fail before any network I/O
    fn prepare(&self, endpoint: Endpoint, mut args: CallArguments) -> Result<(CallArguments, OperationContext)> {
        resolve_references(&mut args, endpoint.references)?;
        let coercions = normalize_multi_valued(&mut args);
        let request_id = ensure_request_id(&mut args);

        let context = self.start_context(endpoint, &request_id);
        for coercion in &coercions {
            self.logger.log_coercion(&context, &coercion.parameter, &coercion.message());
        }

        Ok((args, context))
    }

    fn start_context(&self, endpoint: Endpoint, request_id: &str) -> OperationContext {
        self.logger
            .start_operation(&endpoint.operation.name(), endpoint.group.segment(), request_id)
    }

    /// Re-run a prepared call for the page after `continuation_token`
    pub(crate) async fn fetch_page(
        self: &Arc<Self>,
        endpoint: Endpoint,
        args: CallArguments,
        page: u32,
        continuation_token: &str,
    ) -> Result<ApiResult> {
        let request_id = args.request_id.clone().unwrap_or_default();
        let context = self.start_context(endpoint, &request_id);
        self.logger.log_page_fetch(&context, page, continuation_token);
        self.execute_prepared(endpoint, args, context).await
    }

    async fn execute_prepared(
        self: &Arc<Self>,
        endpoint: Endpoint,
        args: CallArguments,
        context: OperationContext,
    ) -> Result<ApiResult> {
        let api = self.registry.get(endpoint.group);
        let mut metrics = context.create_metrics(false, None, None);

        let attempt = || {
            let api = &api;
            let args = &args;
            let logger = &self.logger;
            let context = &context;
            async move {
                let operation = endpoint.operation;
                logger.log_request(
                    context,
                    operation.verb.method().as_str(),
                    &api.url(operation),
                    &args.to_query_pairs(),
                );

                let sent = Instant::now();
                let result = api.invoke(operation, args).await;
                match &result {
                    Ok(response) => logger.log_response(context, response.status, &response.headers, sent.elapsed()),
                    Err(InvokeError::Status(exception)) => {
                        logger.log_response(context, exception.status, &exception.headers, sent.elapsed())
                    }
                    Err(InvokeError::Local(_)) => {}
                }
                result
            }
        };
        let refresh = || self.refresh_credentials();

        let completion = self
            .retry_policy
            .execute(attempt, refresh, &self.logger, &context, &mut metrics)
            .await;

        let result = match completion {
            Ok(Completion::Success(response)) => {
                metrics.finish(&context, true, None);
                Ok(ApiResult::Valid(translate_success(self, endpoint, args, response)))
            }
            Ok(Completion::Failed(exception)) => {
                let error = translate_error(exception);
                metrics.finish(&context, false, error.message().map(str::to_string));
                Ok(ApiResult::Error(error))
            }
            Err(error) => {
                metrics.finish(&context, false, Some(error.to_string()));
                Err(error)
            }
        };

        self.logger.complete_operation(&context, &metrics);
        result
    }

    async fn refresh_credentials(&self) -> Result<()> {
        debug!("Refreshing credentials after an authentication failure");
        self.registry
            .context()
            .token_manager
            .get_header(true)
            .await
            .map(|_| ())
            .map_err(|e| ClientError::authentication("Credential refresh failed", Some(e)))
    }
}

/// Builder for `FlashArrayClient`
pub struct ClientBuilder {
    target: Option<String>,
    api_version: String,
    access_token: Option<String>,
    token_manager: Option<Arc<dyn TokenManager>>,
    transport: Option<Arc<dyn HttpTransport>>,
    transport_config: TransportConfig,
    timeout: Duration,
    resilience: ResilienceConfig,
    event_sink: Option<Arc<dyn EventSink>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            target: None,
            api_version: constants::DEFAULT_API_VERSION.to_string(),
            access_token: None,
            token_manager: None,
            transport: None,
            transport_config: TransportConfig::default(),
            timeout: constants::DEFAULT_TIMEOUT,
            resilience: ResilienceConfig::default(),
            event_sink: None,
        }
    }
}

impl ClientBuilder {
    /// Array address; `https://` is assumed when no scheme is given
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Pre-issued bearer token; mutually exclusive with `token_manager`
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn token_manager(mut self, manager: Arc<dyn TokenManager>) -> Self {
        self.token_manager = Some(manager);
        self
    }

    /// Replace the reqwest transport, e.g. with a scripted one in tests
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = config;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.transport_config.user_agent = user_agent.into();
        self
    }

    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.transport_config.verify_ssl = verify;
        self
    }

    pub fn ssl_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.transport_config.ssl_cert = Some(path.into());
        self
    }

    /// Default per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn resilience(mut self, config: ResilienceConfig) -> Self {
        self.resilience = config;
        self
    }

    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.resilience.retry = config;
        self
    }

    /// Finite retry budget; `None` retries without limit
    pub fn max_retries(mut self, retries: Option<u32>) -> Self {
        self.resilience.retry.max_retries = retries;
        self
    }

    /// Also deliver every structured log event to `sink`
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<FlashArrayClient> {
        let target = normalize_target(self.target.as_deref())?;

        if self.api_version.trim().is_empty() {
            return Err(ClientError::validation("API version must not be empty"));
        }

        let token_manager: Arc<dyn TokenManager> = match (self.access_token, self.token_manager) {
            (Some(token), None) => {
                if token.trim().is_empty() {
                    return Err(ClientError::validation("Access token must not be empty"));
                }
                Arc::new(StaticTokenManager::new(token))
            }
            (None, Some(manager)) => manager,
            (Some(_), Some(_)) => {
                return Err(ClientError::validation(
                    "Provide either an access token or a token manager, not both",
                ));
            }
            (None, None) => {
                return Err(ClientError::validation(
                    "An access token or a token manager is required",
                ));
            }
        };

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.transport_config)?),
        };

        info!("FlashArray client for {} using REST {}", target, self.api_version);

        let registry = GroupRegistry::new(InvokerContext {
            target,
            api_version: self.api_version,
            timeout: self.timeout,
            transport,
            token_manager,
        });

        let logger = match self.event_sink {
            Some(sink) => ApiLogger::with_sink(self.resilience.monitoring, sink),
            None => ApiLogger::new(self.resilience.monitoring),
        };

        Ok(FlashArrayClient {
            core: Arc::new(ClientCore {
                registry,
                retry_policy: RetryPolicy::new(self.resilience.retry),
                logger,
            }),
        })
    }
}

fn normalize_target(target: Option<&str>) -> Result<String> {
    let target = target
        .map(|t| t.trim().trim_end_matches('/'))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ClientError::validation("A target array address is required"))?;

    if target.starts_with("http://") || target.starts_with("https://") {
        Ok(target.to_string())
    } else {
        Ok(format!("https://{}", target))
    }
}
