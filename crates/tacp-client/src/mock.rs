//! Mock TacpClient for unit testing
//!
//! This module provides a mock implementation of TacpClientTrait that can be
//! used in unit tests without requiring a reachable ThinkAgile CP portal.

use crate::error::TacpError;
use crate::models::*;
use crate::tacp_trait::TacpClientTrait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Mock TacpClient for testing
///
/// Resources live in in-memory stores keyed by UUID. Mutating calls behave
/// like the platform: they queue an action (completed immediately unless the
/// test stalls actions) and update the stores so follow-up reads observe the
/// new state.
#[derive(Clone)]
pub struct MockTacpClient {
    base_url: String,
    instances: Arc<Mutex<HashMap<String, Instance>>>,
    application_groups: Arc<Mutex<HashMap<String, ApplicationGroup>>>,
    vlans: Arc<Mutex<HashMap<String, Vlan>>>,
    vnets: Arc<Mutex<HashMap<String, Vnet>>>,
    datacenters: Arc<Mutex<HashMap<String, Datacenter>>>,
    datacenter_networks: Arc<Mutex<HashMap<String, Vec<String>>>>,
    firewall_overrides: Arc<Mutex<HashMap<String, Vec<FirewallOverride>>>>,
    migration_zones: Arc<Mutex<HashMap<String, MigrationZone>>>,
    storage_pools: Arc<Mutex<HashMap<String, StoragePool>>>,
    templates: Arc<Mutex<HashMap<String, Template>>>,
    marketplace_templates: Arc<Mutex<HashMap<String, MarketplaceTemplate>>>,
    template_downloads: Arc<Mutex<Vec<MarketplaceTemplateDownloadPayload>>>,
    sites: Arc<Mutex<HashMap<String, Site>>>,
    categories: Arc<Mutex<HashMap<String, Category>>>,
    firewall_profiles: Arc<Mutex<HashMap<String, FirewallProfile>>>,
    actions: Arc<Mutex<HashMap<String, Action>>>,
    power_log: Arc<Mutex<Vec<(String, PowerAction)>>>,
    // When true, newly queued actions stay in progress (for timeout tests)
    stall_actions: Arc<Mutex<bool>>,
}

impl std::fmt::Debug for MockTacpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTacpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl MockTacpClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            instances: Arc::new(Mutex::new(HashMap::new())),
            application_groups: Arc::new(Mutex::new(HashMap::new())),
            vlans: Arc::new(Mutex::new(HashMap::new())),
            vnets: Arc::new(Mutex::new(HashMap::new())),
            datacenters: Arc::new(Mutex::new(HashMap::new())),
            datacenter_networks: Arc::new(Mutex::new(HashMap::new())),
            firewall_overrides: Arc::new(Mutex::new(HashMap::new())),
            migration_zones: Arc::new(Mutex::new(HashMap::new())),
            storage_pools: Arc::new(Mutex::new(HashMap::new())),
            templates: Arc::new(Mutex::new(HashMap::new())),
            marketplace_templates: Arc::new(Mutex::new(HashMap::new())),
            template_downloads: Arc::new(Mutex::new(Vec::new())),
            sites: Arc::new(Mutex::new(HashMap::new())),
            categories: Arc::new(Mutex::new(HashMap::new())),
            firewall_profiles: Arc::new(Mutex::new(HashMap::new())),
            actions: Arc::new(Mutex::new(HashMap::new())),
            power_log: Arc::new(Mutex::new(Vec::new())),
            stall_actions: Arc::new(Mutex::new(false)),
        }
    }

    /// Add an instance to the mock store (for test setup)
    pub fn add_instance(&self, instance: Instance) {
        self.instances.lock().unwrap().insert(instance.uuid.clone(), instance);
    }

    /// Add a VLAN network to the mock store (for test setup)
    pub fn add_vlan(&self, vlan: Vlan) {
        self.vlans.lock().unwrap().insert(vlan.uuid.clone(), vlan);
    }

    /// Add a VNET network to the mock store (for test setup)
    pub fn add_vnet(&self, vnet: Vnet) {
        self.vnets.lock().unwrap().insert(vnet.uuid.clone(), vnet);
    }

    /// Add a datacenter to the mock store (for test setup)
    pub fn add_datacenter(&self, datacenter: Datacenter) {
        self.datacenters.lock().unwrap().insert(datacenter.uuid.clone(), datacenter);
    }

    /// Add a migration zone to the mock store (for test setup)
    pub fn add_migration_zone(&self, zone: MigrationZone) {
        self.migration_zones.lock().unwrap().insert(zone.uuid.clone(), zone);
    }

    /// Add a storage pool to the mock store (for test setup)
    pub fn add_storage_pool(&self, pool: StoragePool) {
        self.storage_pools.lock().unwrap().insert(pool.uuid.clone(), pool);
    }

    /// Add a template to the mock store (for test setup)
    pub fn add_template(&self, template: Template) {
        self.templates.lock().unwrap().insert(template.uuid.clone(), template);
    }

    /// Add a marketplace template to the mock store (for test setup)
    pub fn add_marketplace_template(&self, template: MarketplaceTemplate) {
        self.marketplace_templates
            .lock()
            .unwrap()
            .insert(template.uuid.clone(), template);
    }

    /// Add a site to the mock store (for test setup)
    pub fn add_site(&self, site: Site) {
        self.sites.lock().unwrap().insert(site.uuid.clone(), site);
    }

    /// Add a category to the mock store (for test setup)
    pub fn add_category(&self, category: Category) {
        self.categories.lock().unwrap().insert(category.uuid.clone(), category);
    }

    /// Add a firewall profile to the mock store (for test setup)
    pub fn add_firewall_profile(&self, profile: FirewallProfile) {
        self.firewall_profiles.lock().unwrap().insert(profile.uuid.clone(), profile);
    }

    /// Add a firewall override scoped to a datacenter (for test setup)
    pub fn add_firewall_override(&self, datacenter_uuid: &str, fw_override: FirewallOverride) {
        self.firewall_overrides
            .lock()
            .unwrap()
            .entry(datacenter_uuid.to_string())
            .or_default()
            .push(fw_override);
    }

    /// Make newly queued actions stay in progress (for timeout tests)
    pub fn stall_actions(&self) {
        *self.stall_actions.lock().unwrap() = true;
    }

    /// Power actions issued so far, in order (for assertions)
    pub fn power_log(&self) -> Vec<(String, PowerAction)> {
        self.power_log.lock().unwrap().clone()
    }

    /// Marketplace template downloads requested so far (for assertions)
    pub fn template_downloads(&self) -> Vec<MarketplaceTemplateDownloadPayload> {
        self.template_downloads.lock().unwrap().clone()
    }

    /// Networks assigned to a datacenter (for assertions)
    pub fn networks_of_datacenter(&self, uuid: &str) -> Vec<String> {
        self.datacenter_networks
            .lock()
            .unwrap()
            .get(uuid)
            .cloned()
            .unwrap_or_default()
    }

    /// Queue an action for an object, completed unless actions are stalled
    fn queue_action(&self, object_uuid: Option<String>) -> ActionResponse {
        let uuid = Uuid::new_v4().to_string();
        let status = if *self.stall_actions.lock().unwrap() {
            ActionStatus::InProgress
        } else {
            ActionStatus::Completed
        };
        self.actions.lock().unwrap().insert(
            uuid.clone(),
            Action { uuid: uuid.clone(), status, message: None },
        );
        ActionResponse { action_uuid: Some(uuid), object_uuid }
    }
}

#[async_trait::async_trait]
impl TacpClientTrait for MockTacpClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_api_key(&self) -> Result<(), TacpError> {
        Ok(())
    }

    async fn get_action(&self, uuid: &str) -> Result<Action, TacpError> {
        self.actions
            .lock()
            .unwrap()
            .get(uuid)
            .cloned()
            .ok_or_else(|| TacpError::NotFound(format!("action {uuid}")))
    }

    async fn get_instances(&self) -> Result<Vec<Instance>, TacpError> {
        Ok(self.instances.lock().unwrap().values().cloned().collect())
    }

    async fn get_instance(&self, uuid: &str) -> Result<Instance, TacpError> {
        self.instances
            .lock()
            .unwrap()
            .get(uuid)
            .cloned()
            .ok_or_else(|| TacpError::NotFound(format!("application {uuid}")))
    }

    async fn find_instance_by_name(&self, name: &str) -> Result<Option<Instance>, TacpError> {
        Ok(self
            .instances
            .lock()
            .unwrap()
            .values()
            .find(|i| i.name == name)
            .cloned())
    }

    async fn create_instance(
        &self,
        payload: &CreateInstancePayload,
    ) -> Result<ActionResponse, TacpError> {
        let uuid = Uuid::new_v4().to_string();
        let disks = payload
            .boot_order
            .iter()
            .filter_map(|device| {
                device.disk_uuid.as_ref().map(|disk_uuid| InstanceDisk {
                    uuid: disk_uuid.clone(),
                    name: device.name.clone(),
                    size: 0,
                })
            })
            .collect();
        let instance = Instance {
            uuid: uuid.clone(),
            name: payload.name.clone(),
            // A freshly created instance is powered off until started
            status: InstanceState::ShutDown,
            datacenter_uuid: payload.datacenter_uuid.clone(),
            migration_zone_uuid: Some(payload.migration_zone_uuid.clone()),
            flash_pool_uuid: Some(payload.flash_pool_uuid.clone()),
            template_uuid: Some(payload.template_uuid.clone()),
            vcpus: payload.vcpus,
            memory: payload.memory,
            vm_mode: Some(payload.vm_mode.clone()),
            description: payload.description.clone(),
            boot_order: payload.boot_order.clone(),
            disks,
            application_group_uuid: payload.application_group_uuid.clone(),
        };
        self.instances.lock().unwrap().insert(uuid.clone(), instance);
        Ok(self.queue_action(Some(uuid)))
    }

    async fn delete_instance(&self, uuid: &str) -> Result<ActionResponse, TacpError> {
        self.instances.lock().unwrap().remove(uuid);
        Ok(self.queue_action(Some(uuid.to_string())))
    }

    async fn power_instance(
        &self,
        uuid: &str,
        action: PowerAction,
    ) -> Result<ActionResponse, TacpError> {
        let mut instances = self.instances.lock().unwrap();
        let instance = instances
            .get_mut(uuid)
            .ok_or_else(|| TacpError::NotFound(format!("application {uuid}")))?;
        instance.status = match action {
            PowerAction::Start | PowerAction::Resume | PowerAction::Restart | PowerAction::ForceRestart => {
                InstanceState::Running
            }
            PowerAction::Stop | PowerAction::Shutdown => InstanceState::ShutDown,
            PowerAction::Pause => InstanceState::Paused,
        };
        drop(instances);
        self.power_log.lock().unwrap().push((uuid.to_string(), action));
        Ok(self.queue_action(Some(uuid.to_string())))
    }

    async fn add_instance_vnic(
        &self,
        uuid: &str,
        payload: &NetworkOptionsPayload,
    ) -> Result<ActionResponse, TacpError> {
        let mut instances = self.instances.lock().unwrap();
        let instance = instances
            .get_mut(uuid)
            .ok_or_else(|| TacpError::NotFound(format!("application {uuid}")))?;
        instance.boot_order.push(BootDevice {
            name: payload.name.clone(),
            order: 0,
            disk_uuid: None,
            vnic_uuid: Some(payload.vnic_uuid.clone()),
        });
        drop(instances);
        Ok(self.queue_action(Some(uuid.to_string())))
    }

    async fn add_instance_disk(
        &self,
        uuid: &str,
        payload: &DiskPayload,
    ) -> Result<ActionResponse, TacpError> {
        let mut instances = self.instances.lock().unwrap();
        let instance = instances
            .get_mut(uuid)
            .ok_or_else(|| TacpError::NotFound(format!("application {uuid}")))?;
        instance.disks.push(InstanceDisk {
            uuid: payload.uuid.clone(),
            name: payload.name.clone(),
            size: payload.size,
        });
        instance.boot_order.push(BootDevice {
            name: payload.name.clone(),
            order: 0,
            disk_uuid: Some(payload.uuid.clone()),
            vnic_uuid: None,
        });
        drop(instances);
        Ok(self.queue_action(Some(uuid.to_string())))
    }

    async fn resize_instance_disk(
        &self,
        instance_uuid: &str,
        disk_uuid: &str,
        size: u64,
    ) -> Result<ActionResponse, TacpError> {
        let mut instances = self.instances.lock().unwrap();
        let instance = instances
            .get_mut(instance_uuid)
            .ok_or_else(|| TacpError::NotFound(format!("application {instance_uuid}")))?;
        let disk = instance
            .disks
            .iter_mut()
            .find(|d| d.uuid == disk_uuid)
            .ok_or_else(|| TacpError::NotFound(format!("disk {disk_uuid}")))?;
        disk.size = size;
        drop(instances);
        Ok(self.queue_action(Some(instance_uuid.to_string())))
    }

    async fn set_instance_boot_order(
        &self,
        uuid: &str,
        boot_order: &[BootDevice],
    ) -> Result<ActionResponse, TacpError> {
        let mut instances = self.instances.lock().unwrap();
        let instance = instances
            .get_mut(uuid)
            .ok_or_else(|| TacpError::NotFound(format!("application {uuid}")))?;
        instance.boot_order = boot_order.to_vec();
        drop(instances);
        Ok(self.queue_action(Some(uuid.to_string())))
    }

    async fn get_application_groups(&self) -> Result<Vec<ApplicationGroup>, TacpError> {
        Ok(self.application_groups.lock().unwrap().values().cloned().collect())
    }

    async fn find_application_group_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ApplicationGroup>, TacpError> {
        Ok(self
            .application_groups
            .lock()
            .unwrap()
            .values()
            .find(|g| g.name == name)
            .cloned())
    }

    async fn create_application_group(
        &self,
        name: &str,
        datacenter_uuid: &str,
    ) -> Result<ActionResponse, TacpError> {
        let uuid = Uuid::new_v4().to_string();
        self.application_groups.lock().unwrap().insert(
            uuid.clone(),
            ApplicationGroup {
                uuid: uuid.clone(),
                name: name.to_string(),
                datacenter_uuid: Some(datacenter_uuid.to_string()),
            },
        );
        Ok(self.queue_action(Some(uuid)))
    }

    async fn get_vlans(&self) -> Result<Vec<Vlan>, TacpError> {
        Ok(self.vlans.lock().unwrap().values().cloned().collect())
    }

    async fn find_vlan_by_name(&self, name: &str) -> Result<Option<Vlan>, TacpError> {
        Ok(self.vlans.lock().unwrap().values().find(|v| v.name == name).cloned())
    }

    async fn create_vlan(&self, payload: &CreateVlanPayload) -> Result<ActionResponse, TacpError> {
        let uuid = Uuid::new_v4().to_string();
        self.vlans.lock().unwrap().insert(
            uuid.clone(),
            Vlan {
                uuid: uuid.clone(),
                name: payload.name.clone(),
                vlan_tag: payload.vlan_tag,
            },
        );
        Ok(self.queue_action(Some(uuid)))
    }

    async fn delete_vlan(&self, uuid: &str) -> Result<ActionResponse, TacpError> {
        self.vlans.lock().unwrap().remove(uuid);
        Ok(self.queue_action(Some(uuid.to_string())))
    }

    async fn get_vnets(&self) -> Result<Vec<Vnet>, TacpError> {
        Ok(self.vnets.lock().unwrap().values().cloned().collect())
    }

    async fn get_vnet(&self, uuid: &str) -> Result<Vnet, TacpError> {
        self.vnets
            .lock()
            .unwrap()
            .get(uuid)
            .cloned()
            .ok_or_else(|| TacpError::NotFound(format!("vnet {uuid}")))
    }

    async fn find_vnet_by_name(&self, name: &str) -> Result<Option<Vnet>, TacpError> {
        Ok(self.vnets.lock().unwrap().values().find(|v| v.name == name).cloned())
    }

    async fn create_vnet(&self, payload: &CreateVnetPayload) -> Result<ActionResponse, TacpError> {
        let uuid = Uuid::new_v4().to_string();
        // Auto-deployment spins up an NFV appliance instance alongside the VNET
        let mut nfv_instance_uuid = None;
        if payload.automatic_deployment {
            if let Some(nfv) = &payload.nfv_instance {
                let instance = Instance {
                    uuid: Uuid::new_v4().to_string(),
                    name: format!("{} NFV", payload.name),
                    status: InstanceState::Running,
                    datacenter_uuid: nfv.datacenter_uuid.clone().unwrap_or_default(),
                    migration_zone_uuid: nfv.migration_zone_uuid.clone(),
                    flash_pool_uuid: nfv.flash_pool_uuid.clone(),
                    template_uuid: None,
                    vcpus: nfv.vcpus,
                    memory: nfv.memory,
                    vm_mode: None,
                    description: None,
                    boot_order: Vec::new(),
                    disks: Vec::new(),
                    application_group_uuid: None,
                };
                nfv_instance_uuid = Some(instance.uuid.clone());
                self.instances.lock().unwrap().insert(instance.uuid.clone(), instance);
            }
        }
        self.vnets.lock().unwrap().insert(
            uuid.clone(),
            Vnet {
                uuid: uuid.clone(),
                name: payload.name.clone(),
                network_address: payload.network_address.clone(),
                subnet_mask: payload.subnet_mask.clone(),
                default_gateway: payload.default_gateway.clone(),
                nfv_instance_uuid,
                dhcp_service: payload.dhcp_service.clone(),
                routing_service: payload.routing_service.clone(),
            },
        );
        Ok(self.queue_action(Some(uuid)))
    }

    async fn delete_vnet(&self, uuid: &str) -> Result<ActionResponse, TacpError> {
        self.vnets.lock().unwrap().remove(uuid);
        Ok(self.queue_action(Some(uuid.to_string())))
    }

    async fn get_datacenters(&self) -> Result<Vec<Datacenter>, TacpError> {
        Ok(self.datacenters.lock().unwrap().values().cloned().collect())
    }

    async fn find_datacenter_by_name(&self, name: &str) -> Result<Option<Datacenter>, TacpError> {
        Ok(self
            .datacenters
            .lock()
            .unwrap()
            .values()
            .find(|d| d.name == name)
            .cloned())
    }

    async fn create_datacenter(
        &self,
        payload: &CreateDatacenterPayload,
    ) -> Result<Datacenter, TacpError> {
        let uuid = Uuid::new_v4().to_string();
        let datacenter = Datacenter { uuid: uuid.clone(), name: payload.name.clone() };
        self.datacenters.lock().unwrap().insert(uuid, datacenter.clone());
        Ok(datacenter)
    }

    async fn assign_datacenter_networks(
        &self,
        uuid: &str,
        network_uuids: &[String],
    ) -> Result<(), TacpError> {
        self.datacenter_networks
            .lock()
            .unwrap()
            .insert(uuid.to_string(), network_uuids.to_vec());
        Ok(())
    }

    async fn get_datacenter_firewall_overrides(
        &self,
        uuid: &str,
    ) -> Result<Vec<FirewallOverride>, TacpError> {
        Ok(self
            .firewall_overrides
            .lock()
            .unwrap()
            .get(uuid)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_migration_zones(&self) -> Result<Vec<MigrationZone>, TacpError> {
        Ok(self.migration_zones.lock().unwrap().values().cloned().collect())
    }

    async fn find_migration_zone_by_name(
        &self,
        name: &str,
    ) -> Result<Option<MigrationZone>, TacpError> {
        Ok(self
            .migration_zones
            .lock()
            .unwrap()
            .values()
            .find(|z| z.name == name)
            .cloned())
    }

    async fn get_storage_pools(&self) -> Result<Vec<StoragePool>, TacpError> {
        Ok(self.storage_pools.lock().unwrap().values().cloned().collect())
    }

    async fn find_storage_pool_by_name(&self, name: &str) -> Result<Option<StoragePool>, TacpError> {
        Ok(self
            .storage_pools
            .lock()
            .unwrap()
            .values()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn get_templates(&self) -> Result<Vec<Template>, TacpError> {
        Ok(self.templates.lock().unwrap().values().cloned().collect())
    }

    async fn get_template(&self, uuid: &str) -> Result<Template, TacpError> {
        self.templates
            .lock()
            .unwrap()
            .get(uuid)
            .cloned()
            .ok_or_else(|| TacpError::NotFound(format!("template {uuid}")))
    }

    async fn find_template_by_name(&self, name: &str) -> Result<Option<Template>, TacpError> {
        Ok(self.templates.lock().unwrap().values().find(|t| t.name == name).cloned())
    }

    async fn get_marketplace_templates(&self) -> Result<Vec<MarketplaceTemplate>, TacpError> {
        Ok(self.marketplace_templates.lock().unwrap().values().cloned().collect())
    }

    async fn find_marketplace_template_by_name(
        &self,
        name: &str,
    ) -> Result<Option<MarketplaceTemplate>, TacpError> {
        Ok(self
            .marketplace_templates
            .lock()
            .unwrap()
            .values()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn download_marketplace_template(
        &self,
        payload: &MarketplaceTemplateDownloadPayload,
    ) -> Result<ActionResponse, TacpError> {
        self.template_downloads.lock().unwrap().push(payload.clone());
        Ok(self.queue_action(Some(payload.uuid.clone())))
    }

    async fn get_sites(&self) -> Result<Vec<Site>, TacpError> {
        Ok(self.sites.lock().unwrap().values().cloned().collect())
    }

    async fn get_categories(&self) -> Result<Vec<Category>, TacpError> {
        Ok(self.categories.lock().unwrap().values().cloned().collect())
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, TacpError> {
        Ok(self.categories.lock().unwrap().values().find(|c| c.name == name).cloned())
    }

    async fn get_firewall_profiles(&self) -> Result<Vec<FirewallProfile>, TacpError> {
        Ok(self.firewall_profiles.lock().unwrap().values().cloned().collect())
    }

    async fn find_firewall_profile_by_name(
        &self,
        name: &str,
    ) -> Result<Option<FirewallProfile>, TacpError> {
        Ok(self
            .firewall_profiles
            .lock()
            .unwrap()
            .values()
            .find(|p| p.name == name)
            .cloned())
    }
}
