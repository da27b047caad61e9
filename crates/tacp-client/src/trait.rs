//! TacpClient trait for mocking
//!
//! This trait abstracts the TacpClient to enable mocking in unit tests.
//! The concrete TacpClient implements this trait, and tests can use mock implementations.

use crate::error::TacpError;
use crate::models::*;

/// Trait for ThinkAgile CP API client operations
///
/// This trait enables mocking of TACP API calls for unit testing.
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait TacpClientTrait: Send + Sync {
    /// Get the portal base URL
    fn base_url(&self) -> &str;

    /// Validate the API key by making a lightweight authenticated request
    async fn validate_api_key(&self) -> Result<(), TacpError>;

    // Actions
    async fn get_action(&self, uuid: &str) -> Result<Action, TacpError>;

    // Application instances
    async fn get_instances(&self) -> Result<Vec<Instance>, TacpError>;
    async fn get_instance(&self, uuid: &str) -> Result<Instance, TacpError>;
    async fn find_instance_by_name(&self, name: &str) -> Result<Option<Instance>, TacpError>;
    async fn create_instance(&self, payload: &CreateInstancePayload) -> Result<ActionResponse, TacpError>;
    async fn delete_instance(&self, uuid: &str) -> Result<ActionResponse, TacpError>;
    async fn power_instance(&self, uuid: &str, action: PowerAction) -> Result<ActionResponse, TacpError>;
    async fn add_instance_vnic(&self, uuid: &str, payload: &NetworkOptionsPayload) -> Result<ActionResponse, TacpError>;
    async fn add_instance_disk(&self, uuid: &str, payload: &DiskPayload) -> Result<ActionResponse, TacpError>;
    async fn resize_instance_disk(&self, instance_uuid: &str, disk_uuid: &str, size: u64) -> Result<ActionResponse, TacpError>;
    async fn set_instance_boot_order(&self, uuid: &str, boot_order: &[BootDevice]) -> Result<ActionResponse, TacpError>;

    // Application groups
    async fn get_application_groups(&self) -> Result<Vec<ApplicationGroup>, TacpError>;
    async fn find_application_group_by_name(&self, name: &str) -> Result<Option<ApplicationGroup>, TacpError>;
    async fn create_application_group(&self, name: &str, datacenter_uuid: &str) -> Result<ActionResponse, TacpError>;

    // VLAN networks
    async fn get_vlans(&self) -> Result<Vec<Vlan>, TacpError>;
    async fn find_vlan_by_name(&self, name: &str) -> Result<Option<Vlan>, TacpError>;
    async fn create_vlan(&self, payload: &CreateVlanPayload) -> Result<ActionResponse, TacpError>;
    async fn delete_vlan(&self, uuid: &str) -> Result<ActionResponse, TacpError>;

    // VNET networks
    async fn get_vnets(&self) -> Result<Vec<Vnet>, TacpError>;
    async fn get_vnet(&self, uuid: &str) -> Result<Vnet, TacpError>;
    async fn find_vnet_by_name(&self, name: &str) -> Result<Option<Vnet>, TacpError>;
    async fn create_vnet(&self, payload: &CreateVnetPayload) -> Result<ActionResponse, TacpError>;
    async fn delete_vnet(&self, uuid: &str) -> Result<ActionResponse, TacpError>;

    // Datacenters
    async fn get_datacenters(&self) -> Result<Vec<Datacenter>, TacpError>;
    async fn find_datacenter_by_name(&self, name: &str) -> Result<Option<Datacenter>, TacpError>;
    async fn create_datacenter(&self, payload: &CreateDatacenterPayload) -> Result<Datacenter, TacpError>;
    async fn assign_datacenter_networks(&self, uuid: &str, network_uuids: &[String]) -> Result<(), TacpError>;
    async fn get_datacenter_firewall_overrides(&self, uuid: &str) -> Result<Vec<FirewallOverride>, TacpError>;

    // Capacity resources
    async fn get_migration_zones(&self) -> Result<Vec<MigrationZone>, TacpError>;
    async fn find_migration_zone_by_name(&self, name: &str) -> Result<Option<MigrationZone>, TacpError>;
    async fn get_storage_pools(&self) -> Result<Vec<StoragePool>, TacpError>;
    async fn find_storage_pool_by_name(&self, name: &str) -> Result<Option<StoragePool>, TacpError>;

    // Templates
    async fn get_templates(&self) -> Result<Vec<Template>, TacpError>;
    async fn get_template(&self, uuid: &str) -> Result<Template, TacpError>;
    async fn find_template_by_name(&self, name: &str) -> Result<Option<Template>, TacpError>;
    async fn get_marketplace_templates(&self) -> Result<Vec<MarketplaceTemplate>, TacpError>;
    async fn find_marketplace_template_by_name(&self, name: &str) -> Result<Option<MarketplaceTemplate>, TacpError>;
    async fn download_marketplace_template(&self, payload: &MarketplaceTemplateDownloadPayload) -> Result<ActionResponse, TacpError>;

    // Organization resources
    async fn get_sites(&self) -> Result<Vec<Site>, TacpError>;
    async fn get_categories(&self) -> Result<Vec<Category>, TacpError>;
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, TacpError>;
    async fn get_firewall_profiles(&self) -> Result<Vec<FirewallProfile>, TacpError>;
    async fn find_firewall_profile_by_name(&self, name: &str) -> Result<Option<FirewallProfile>, TacpError>;
}
