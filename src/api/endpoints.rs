//! Endpoint table
//!
//! Each entry declares an `Endpoint` constant and a matching async wrapper on
//! `FlashArrayClient`, e.g. `client.get_volumes(args)`.

use super::client::FlashArrayClient;
use super::groups::{Endpoint, Operation, ResourceGroup, Verb};
use super::params::{CallArguments, ReferenceRole, ReferenceTarget};
use super::query::ApiResult;
use crate::error::Result;

type Bindings = &'static [(ReferenceRole, ReferenceTarget)];

const NONE: Bindings = &[];
const PRIMARY: Bindings = &[(ReferenceRole::Primary, ReferenceTarget::PRIMARY)];
const NAMED: Bindings = &[(ReferenceRole::Primary, ReferenceTarget::NAMES_ONLY)];
const MEMBERSHIP: Bindings = &[
    (ReferenceRole::Groups, ReferenceTarget::GROUPS),
    (ReferenceRole::Members, ReferenceTarget::MEMBERS),
];
const SNAPSHOTS: Bindings = &[
    (ReferenceRole::Primary, ReferenceTarget::PRIMARY),
    (ReferenceRole::Sources, ReferenceTarget::SOURCES),
];
const COPY: Bindings = &[
    (ReferenceRole::Primary, ReferenceTarget::NAMES_ONLY),
    (ReferenceRole::Sources, ReferenceTarget::SOURCES),
];

macro_rules! endpoints {
    ($($method:ident, $constant:ident => $group:ident, $operation:expr, $bindings:expr;)+) => {
        $(
            pub const $constant: Endpoint = Endpoint::new(ResourceGroup::$group, $operation, $bindings);
        )+

        /// Every declared endpoint with its wrapper name
        pub const ALL: &[(&str, Endpoint)] = &[$((stringify!($method), $constant)),+];

        impl FlashArrayClient {
            $(
                pub async fn $method(&self, args: CallArguments) -> Result<ApiResult> {
                    self.call($constant, args).await
                }
            )+
        }
    };
}

endpoints! {
    get_admins, GET_ADMINS => Admins, Operation::GET, NAMED;
    get_alerts, GET_ALERTS => Alerts, Operation::GET, PRIMARY;
    get_api_clients, GET_API_CLIENTS => ApiClients, Operation::GET, PRIMARY;
    get_arrays, GET_ARRAYS => Arrays, Operation::GET, NONE;
    patch_arrays, PATCH_ARRAYS => Arrays, Operation::PATCH, NONE;
    get_arrays_space, GET_ARRAYS_SPACE => Arrays, Operation::sub(Verb::Get, "space"), NONE;
    get_arrays_performance, GET_ARRAYS_PERFORMANCE => Arrays, Operation::sub(Verb::Get, "performance"), NONE;
    get_audits, GET_AUDITS => Audits, Operation::GET, PRIMARY;
    get_certificates, GET_CERTIFICATES => Certificates, Operation::GET, NAMED;
    get_connections, GET_CONNECTIONS => Connections, Operation::GET, NONE;
    post_connections, POST_CONNECTIONS => Connections, Operation::POST, NONE;
    delete_connections, DELETE_CONNECTIONS => Connections, Operation::DELETE, NONE;
    get_controllers, GET_CONTROLLERS => Controllers, Operation::GET, NAMED;
    get_drives, GET_DRIVES => Drives, Operation::GET, NAMED;
    get_hardware, GET_HARDWARE => Hardware, Operation::GET, NAMED;
    get_host_groups, GET_HOST_GROUPS => HostGroups, Operation::GET, NAMED;
    post_host_groups, POST_HOST_GROUPS => HostGroups, Operation::POST, NAMED;
    delete_host_groups, DELETE_HOST_GROUPS => HostGroups, Operation::DELETE, NAMED;
    get_host_groups_hosts, GET_HOST_GROUPS_HOSTS => HostGroups, Operation::sub(Verb::Get, "hosts"), MEMBERSHIP;
    post_host_groups_hosts, POST_HOST_GROUPS_HOSTS => HostGroups, Operation::sub(Verb::Post, "hosts"), MEMBERSHIP;
    delete_host_groups_hosts, DELETE_HOST_GROUPS_HOSTS => HostGroups, Operation::sub(Verb::Delete, "hosts"), MEMBERSHIP;
    get_hosts, GET_HOSTS => Hosts, Operation::GET, NAMED;
    post_hosts, POST_HOSTS => Hosts, Operation::POST, NAMED;
    patch_hosts, PATCH_HOSTS => Hosts, Operation::PATCH, NAMED;
    delete_hosts, DELETE_HOSTS => Hosts, Operation::DELETE, NAMED;
    get_network_interfaces, GET_NETWORK_INTERFACES => NetworkInterfaces, Operation::GET, NAMED;
    get_pods, GET_PODS => Pods, Operation::GET, PRIMARY;
    post_pods, POST_PODS => Pods, Operation::POST, NAMED;
    patch_pods, PATCH_PODS => Pods, Operation::PATCH, PRIMARY;
    delete_pods, DELETE_PODS => Pods, Operation::DELETE, PRIMARY;
    get_ports, GET_PORTS => Ports, Operation::GET, NONE;
    get_protection_group_snapshots, GET_PROTECTION_GROUP_SNAPSHOTS => ProtectionGroupSnapshots, Operation::GET, SNAPSHOTS;
    post_protection_group_snapshots, POST_PROTECTION_GROUP_SNAPSHOTS => ProtectionGroupSnapshots, Operation::POST, SNAPSHOTS;
    delete_protection_group_snapshots, DELETE_PROTECTION_GROUP_SNAPSHOTS => ProtectionGroupSnapshots, Operation::DELETE, NAMED;
    get_protection_groups, GET_PROTECTION_GROUPS => ProtectionGroups, Operation::GET, PRIMARY;
    post_protection_groups, POST_PROTECTION_GROUPS => ProtectionGroups, Operation::POST, NAMED;
    patch_protection_groups, PATCH_PROTECTION_GROUPS => ProtectionGroups, Operation::PATCH, PRIMARY;
    delete_protection_groups, DELETE_PROTECTION_GROUPS => ProtectionGroups, Operation::DELETE, PRIMARY;
    get_protection_groups_volumes, GET_PROTECTION_GROUPS_VOLUMES => ProtectionGroups, Operation::sub(Verb::Get, "volumes"), MEMBERSHIP;
    post_protection_groups_volumes, POST_PROTECTION_GROUPS_VOLUMES => ProtectionGroups, Operation::sub(Verb::Post, "volumes"), MEMBERSHIP;
    delete_protection_groups_volumes, DELETE_PROTECTION_GROUPS_VOLUMES => ProtectionGroups, Operation::sub(Verb::Delete, "volumes"), MEMBERSHIP;
    get_sessions, GET_SESSIONS => Sessions, Operation::GET, PRIMARY;
    get_subnets, GET_SUBNETS => Subnets, Operation::GET, PRIMARY;
    get_volume_groups, GET_VOLUME_GROUPS => VolumeGroups, Operation::GET, PRIMARY;
    post_volume_groups, POST_VOLUME_GROUPS => VolumeGroups, Operation::POST, NAMED;
    patch_volume_groups, PATCH_VOLUME_GROUPS => VolumeGroups, Operation::PATCH, PRIMARY;
    delete_volume_groups, DELETE_VOLUME_GROUPS => VolumeGroups, Operation::DELETE, PRIMARY;
    get_volume_snapshots, GET_VOLUME_SNAPSHOTS => VolumeSnapshots, Operation::GET, SNAPSHOTS;
    post_volume_snapshots, POST_VOLUME_SNAPSHOTS => VolumeSnapshots, Operation::POST, SNAPSHOTS;
    patch_volume_snapshots, PATCH_VOLUME_SNAPSHOTS => VolumeSnapshots, Operation::PATCH, PRIMARY;
    delete_volume_snapshots, DELETE_VOLUME_SNAPSHOTS => VolumeSnapshots, Operation::DELETE, PRIMARY;
    get_volumes, GET_VOLUMES => Volumes, Operation::GET, PRIMARY;
    post_volumes, POST_VOLUMES => Volumes, Operation::POST, COPY;
    patch_volumes, PATCH_VOLUMES => Volumes, Operation::PATCH, PRIMARY;
    delete_volumes, DELETE_VOLUMES => Volumes, Operation::DELETE, PRIMARY;
    get_volumes_performance, GET_VOLUMES_PERFORMANCE => Volumes, Operation::sub(Verb::Get, "performance"), PRIMARY;
    get_volumes_space, GET_VOLUMES_SPACE => Volumes, Operation::sub(Verb::Get, "space"), PRIMARY;
    get_volumes_protection_groups, GET_VOLUMES_PROTECTION_GROUPS => Volumes, Operation::sub(Verb::Get, "protection-groups"), MEMBERSHIP;
}

/// The default listing endpoint of a resource group, used by the CLI
pub fn list_endpoint(group: ResourceGroup) -> Endpoint {
    ALL.iter()
        .map(|(_, endpoint)| *endpoint)
        .find(|endpoint| endpoint.group == group && endpoint.operation == Operation::GET)
        .unwrap_or(Endpoint::new(group, Operation::GET, PRIMARY))
}
