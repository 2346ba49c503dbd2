//! Resource groups and the transport invoker
//!
//! Every API area (volumes, hosts, ...) is a `ResourceGroup`. The client
//! owns a `GroupRegistry` that lazily creates one `GroupApi` per group; a
//! `GroupApi` turns an `(operation, arguments)` pair into exactly one HTTP
//! attempt.

use super::auth::TokenManager;
use super::constants::{self, headers};
use super::params::{CallArguments, ReferenceRole, ReferenceTarget};
use super::transport::{ApiException, HttpRequest, HttpTransport, InvokeError, RawResponse};
use crate::error::ClientError;
use log::debug;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

macro_rules! resource_groups {
    ($($variant:ident => $segment:literal),+ $(,)?) => {
        /// Named area of the management API
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ResourceGroup {
            $($variant),+
        }

        impl ResourceGroup {
            pub const ALL: &'static [ResourceGroup] = &[$(ResourceGroup::$variant),+];

            /// URL path segment, e.g. `protection-groups`
            pub fn segment(&self) -> &'static str {
                match self {
                    $(ResourceGroup::$variant => $segment),+
                }
            }
        }
    };
}

resource_groups! {
    Admins => "admins",
    Alerts => "alerts",
    ApiClients => "api-clients",
    Arrays => "arrays",
    Audits => "audits",
    Certificates => "certificates",
    Connections => "connections",
    Controllers => "controllers",
    Drives => "drives",
    Hardware => "hardware",
    HostGroups => "host-groups",
    Hosts => "hosts",
    NetworkInterfaces => "network-interfaces",
    Pods => "pods",
    Ports => "ports",
    ProtectionGroupSnapshots => "protection-group-snapshots",
    ProtectionGroups => "protection-groups",
    Sessions => "sessions",
    Subnets => "subnets",
    VolumeGroups => "volume-groups",
    VolumeSnapshots => "volume-snapshots",
    Volumes => "volumes",
}

impl FromStr for ResourceGroup {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        ResourceGroup::ALL
            .iter()
            .copied()
            .find(|group| group.segment() == wanted)
            .ok_or_else(|| ClientError::validation(format!("Unknown resource group '{}'", s)))
    }
}

impl std::fmt::Display for ResourceGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.segment())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Patch,
    Delete,
}

impl Verb {
    pub fn method(&self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }
}

/// One HTTP verb + path within a resource group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    pub verb: Verb,
    pub sub_path: Option<&'static str>,
}

impl Operation {
    pub const GET: Self = Self::new(Verb::Get, None);
    pub const POST: Self = Self::new(Verb::Post, None);
    pub const PATCH: Self = Self::new(Verb::Patch, None);
    pub const DELETE: Self = Self::new(Verb::Delete, None);

    pub const fn new(verb: Verb, sub_path: Option<&'static str>) -> Self {
        Self { verb, sub_path }
    }

    pub const fn sub(verb: Verb, sub_path: &'static str) -> Self {
        Self::new(verb, Some(sub_path))
    }

    pub fn name(&self) -> String {
        let verb = format!("{:?}", self.verb).to_lowercase();
        match self.sub_path {
            Some(sub) => format!("{} {}", verb, sub),
            None => verb,
        }
    }
}

/// Static description of one API endpoint
#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub group: ResourceGroup,
    pub operation: Operation,
    /// Reference roles the endpoint accepts and the parameters they fill
    pub references: &'static [(ReferenceRole, ReferenceTarget)],
}

impl Endpoint {
    pub const fn new(
        group: ResourceGroup,
        operation: Operation,
        references: &'static [(ReferenceRole, ReferenceTarget)],
    ) -> Self {
        Self {
            group,
            operation,
            references,
        }
    }
}

/// Settings shared by every group API of one client
pub(crate) struct InvokerContext {
    pub target: String,
    pub api_version: String,
    pub timeout: Duration,
    pub transport: Arc<dyn HttpTransport>,
    pub token_manager: Arc<dyn TokenManager>,
}

/// Make sure the call carries a request id, generating one when missing or empty
pub fn ensure_request_id(args: &mut CallArguments) -> String {
    match &args.request_id {
        Some(id) if !id.is_empty() => id.clone(),
        _ => {
            let id = uuid::Uuid::new_v4().to_string();
            args.request_id = Some(id.clone());
            id
        }
    }
}

/// Typed entry point for the operations of one resource group
pub struct GroupApi {
    group: ResourceGroup,
    context: Arc<InvokerContext>,
}

impl GroupApi {
    pub(crate) fn new(group: ResourceGroup, context: Arc<InvokerContext>) -> Self {
        Self { group, context }
    }

    pub fn group(&self) -> ResourceGroup {
        self.group
    }

    pub fn url(&self, operation: Operation) -> String {
        constants::group_endpoint(
            &self.context.target,
            &self.context.api_version,
            self.group.segment(),
            operation.sub_path,
        )
    }

    /// Perform exactly one HTTP attempt
    pub async fn invoke(&self, operation: Operation, args: &CallArguments) -> Result<RawResponse, InvokeError> {
        let authorization = self
            .context
            .token_manager
            .get_header(false)
            .await
            .map_err(|e| ClientError::authentication("Could not obtain an authorization header", Some(e)))?;

        let request = self.build_request(operation, args, &authorization)?;
        debug!("{} {} ({} query params)", request.method, request.url, request.query.len());

        let response = self
            .context
            .transport
            .send(request)
            .await
            .map_err(|e| ClientError::transport(format!("{} {} failed", operation.name(), self.group), Some(e)))?;

        if response.is_success() {
            Ok(response)
        } else {
            Err(InvokeError::Status(ApiException::from(response)))
        }
    }

    pub fn build_request(
        &self,
        operation: Operation,
        args: &CallArguments,
        authorization: &str,
    ) -> Result<HttpRequest, ClientError> {
        let request_id = match &args.request_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => uuid::Uuid::new_v4().to_string(),
        };

        let mut request_headers = HeaderMap::new();
        insert_header(&mut request_headers, headers::AUTHORIZATION, authorization)?;
        insert_header(&mut request_headers, headers::X_REQUEST_ID, &request_id)?;
        insert_header(&mut request_headers, "Accept", headers::CONTENT_TYPE_JSON)?;

        Ok(HttpRequest {
            method: operation.verb.method(),
            url: self.url(operation),
            query: args.to_query_pairs(),
            headers: request_headers,
            body: args.body.clone(),
            timeout: args.options.timeout.unwrap_or(self.context.timeout),
        })
    }
}

fn insert_header(map: &mut HeaderMap, name: &str, value: &str) -> Result<(), ClientError> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ClientError::validation(format!("Invalid header name '{}'", name)))?;
    let value = HeaderValue::from_str(value)
        .map_err(|_| ClientError::validation(format!("Invalid value for header '{}'", name.as_str())))?;
    map.insert(name, value);
    Ok(())
}

/// Lazily populated cache of group APIs, keyed by resource group
pub struct GroupRegistry {
    context: Arc<InvokerContext>,
    groups: Mutex<HashMap<ResourceGroup, Arc<GroupApi>>>,
}

impl GroupRegistry {
    pub(crate) fn new(context: InvokerContext) -> Self {
        Self {
            context: Arc::new(context),
            groups: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, group: ResourceGroup) -> Arc<GroupApi> {
        let mut groups = self.groups.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        groups
            .entry(group)
            .or_insert_with(|| {
                debug!("Creating API binding for resource group {}", group);
                Arc::new(GroupApi::new(group, self.context.clone()))
            })
            .clone()
    }

    /// Groups that have been bound so far
    pub fn loaded(&self) -> Vec<ResourceGroup> {
        let groups = self.groups.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut loaded: Vec<_> = groups.keys().copied().collect();
        loaded.sort();
        loaded
    }

    pub(crate) fn context(&self) -> &InvokerContext {
        &self.context
    }
}
