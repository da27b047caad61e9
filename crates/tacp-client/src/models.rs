//! ThinkAgile CP API models
//!
//! These models match the payload shapes of the TACP portal REST API.
//! The wire format is camelCase; every model renames accordingly.

use serde::{Deserialize, Serialize};

/// Envelope returned by every asynchronous mutating call.
///
/// The platform queues an action and returns its UUID together with the UUID
/// of the object being created or mutated. Callers poll the action until it
/// reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub action_uuid: Option<String>,
    pub object_uuid: Option<String>,
}

/// A queued platform action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub uuid: String,
    pub status: ActionStatus,
    pub message: Option<String>,
}

/// Terminal and in-flight action states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionStatus {
    Completed,
    Failed,
    #[serde(rename = "In Progress")]
    InProgress,
    Queued,
}

/// Power state of an application instance as reported by the platform
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InstanceState {
    Running,
    #[serde(rename = "Shut down")]
    ShutDown,
    Paused,
    Restarting,
    Resuming,
    Creating,
    Deleting,
}

/// A power operation that can be issued against an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Start,
    Stop,
    Shutdown,
    Restart,
    ForceRestart,
    Pause,
    Resume,
}

impl PowerAction {
    /// URL path segment for the corresponding power endpoint
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            PowerAction::Start => "start",
            PowerAction::Stop => "stop",
            PowerAction::Shutdown => "shutdown",
            PowerAction::Restart => "restart",
            PowerAction::ForceRestart => "force-restart",
            PowerAction::Pause => "pause",
            PowerAction::Resume => "resume",
        }
    }
}

/// One entry in an instance's (or template's) boot order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BootDevice {
    pub name: String,
    pub order: u32,
    pub disk_uuid: Option<String>,
    pub vnic_uuid: Option<String>,
}

/// A virtual disk attached to an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDisk {
    pub uuid: String,
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

/// Application instance properties
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub uuid: String,
    pub name: String,
    pub status: InstanceState,
    pub datacenter_uuid: String,
    pub migration_zone_uuid: Option<String>,
    pub flash_pool_uuid: Option<String>,
    pub template_uuid: Option<String>,
    pub vcpus: u32,
    /// Memory in bytes
    pub memory: u64,
    pub vm_mode: Option<String>,
    pub description: Option<String>,
    pub boot_order: Vec<BootDevice>,
    pub disks: Vec<InstanceDisk>,
    pub application_group_uuid: Option<String>,
}

/// vNIC options embedded in an instance create or vNIC add request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkOptionsPayload {
    pub name: String,
    pub automatic_mac_assignment: bool,
    pub mac_address: Option<String>,
    pub network_uuid: String,
    pub firewall_override_uuid: Option<String>,
    pub vnic_uuid: String,
}

/// Request body for creating an application instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstancePayload {
    pub name: String,
    pub datacenter_uuid: String,
    pub migration_zone_uuid: String,
    pub flash_pool_uuid: String,
    pub template_uuid: String,
    pub vcpus: u32,
    /// Memory in bytes
    pub memory: u64,
    pub vm_mode: String,
    pub networks: Vec<NetworkOptionsPayload>,
    pub boot_order: Vec<BootDevice>,
    pub hardware_assisted_virtualization_enabled: bool,
    pub enable_automatic_recovery: bool,
    pub description: Option<String>,
    pub application_group_uuid: Option<String>,
}

/// Request body for adding a disk to an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskPayload {
    pub uuid: String,
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

/// VLAN (tagged) network
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vlan {
    pub uuid: String,
    pub name: String,
    pub vlan_tag: u16,
}

/// Request body for creating a VLAN network
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVlanPayload {
    pub name: String,
    pub location_uuid: String,
    pub vlan_tag: u16,
}

/// DHCP service configuration for a VNET
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DhcpServicePayload {
    pub domain_name: Option<String>,
    pub start_ip_range: String,
    pub end_ip_range: String,
    pub lease_time: Option<u64>,
    pub primary_dns_server_ip_address: Option<String>,
    pub secondary_dns_server_ip_address: Option<String>,
    pub static_bindings: Vec<StaticBindingPayload>,
}

/// Static DHCP binding inside a VNET DHCP service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StaticBindingPayload {
    pub hostname: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
}

/// Routing service configuration (the NFV appliance's outside interface)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutingServicePayload {
    #[serde(rename = "type")]
    pub network_type: String,
    pub network_uuid: String,
    pub address_mode: String,
    pub ip_address: Option<String>,
    pub subnet_mask: Option<String>,
    pub gateway: Option<String>,
    pub firewall_override_uuid: Option<String>,
}

/// Sizing for the auto-deployed NFV appliance of a VNET
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfvInstancePayload {
    pub datacenter_uuid: Option<String>,
    pub migration_zone_uuid: Option<String>,
    pub flash_pool_uuid: Option<String>,
    pub vcpus: u32,
    /// Memory in bytes
    pub memory: u64,
    pub enable_automatic_recovery: bool,
}

/// VNET (routed) network
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vnet {
    pub uuid: String,
    pub name: String,
    pub network_address: String,
    pub subnet_mask: String,
    pub default_gateway: String,
    pub nfv_instance_uuid: Option<String>,
    pub dhcp_service: Option<DhcpServicePayload>,
    pub routing_service: Option<RoutingServicePayload>,
}

/// Request body for creating a VNET network
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVnetPayload {
    pub name: String,
    pub automatic_deployment: bool,
    pub deploy_now: bool,
    pub network_address: String,
    pub subnet_mask: String,
    pub default_gateway: String,
    pub dhcp_service: Option<DhcpServicePayload>,
    pub routing_service: Option<RoutingServicePayload>,
    pub nfv_instance: Option<NfvInstancePayload>,
    pub firewall_profile_uuid: Option<String>,
    pub firewall_override_uuid: Option<String>,
}

/// Virtual datacenter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datacenter {
    pub uuid: String,
    pub name: String,
}

/// CPU/memory allocation for one category inside a migration zone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAllocationPayload {
    pub category_uuid: String,
    pub allocated_cpus: u32,
    pub allocated_memory_bytes: u64,
}

/// One resource allocation inside a datacenter create request.
///
/// Exactly one of `migration_zone_uuid` (with category allocations) or
/// `flash_pool_uuid` (with an allocated capacity) is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatacenterAllocationPayload {
    pub migration_zone_uuid: Option<String>,
    pub category_allocations: Option<Vec<CategoryAllocationPayload>>,
    pub flash_pool_uuid: Option<String>,
    /// Allocated storage capacity in bytes
    pub allocated_capacity: Option<u64>,
}

/// Request body for creating a virtual datacenter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatacenterPayload {
    pub name: String,
    pub is_support_widget_enabled: bool,
    pub resource_allocations: Vec<DatacenterAllocationPayload>,
}

/// Category reference inside a migration zone's allocations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAllocation {
    pub category_uuid: String,
}

/// Allocation summary of a migration zone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationZoneAllocations {
    pub categories: Vec<CategoryAllocation>,
}

/// Migration zone (named pool of compute capacity)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationZone {
    pub uuid: String,
    pub name: String,
    pub allocations: Option<MigrationZoneAllocations>,
}

/// Storage (flash) pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoragePool {
    pub uuid: String,
    pub name: String,
}

/// Instance template available in a datacenter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub uuid: String,
    pub name: String,
    pub boot_order: Vec<BootDevice>,
}

/// Marketplace template definable as an instance source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceTemplate {
    pub uuid: String,
    pub name: String,
    pub version: String,
    pub default_cpus: u32,
    pub default_memory_bytes: u64,
    pub description: Option<String>,
}

/// Request body for downloading a marketplace template into a datacenter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceTemplateDownloadPayload {
    pub uuid: String,
    pub name: String,
    pub description: Option<String>,
    pub allocated_cpus: u32,
    pub allocated_memory_bytes: u64,
    pub datacenter_uuid: String,
    pub version: String,
}

/// Physical site (location)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub uuid: String,
    pub name: String,
}

/// Instance category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub uuid: String,
    pub name: String,
}

/// Application group inside a datacenter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationGroup {
    pub uuid: String,
    pub name: String,
    pub datacenter_uuid: Option<String>,
}

/// Firewall profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallProfile {
    pub uuid: String,
    pub name: String,
}

/// Firewall override scoped to a datacenter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallOverride {
    pub uuid: String,
    pub name: String,
}
