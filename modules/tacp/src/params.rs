//! Task-parameter parsing and validation.
//!
//! Parameter structs deserialize from the YAML task file. All validation
//! that can be done without a remote call lives here, so bad input fails
//! fast before anything touches the platform.

use crate::error::ModuleError;
use serde::Deserialize;
use std::net::Ipv4Addr;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;
const TIB: u64 = 1024 * GIB;

fn default_true() -> bool {
    true
}

/// Desired state of an application instance.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DesiredState {
    Started,
    Shutdown,
    Stopped,
    Restarted,
    ForceRestarted,
    Paused,
    Absent,
}

/// Desired presence of a network or other named resource.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    #[default]
    Present,
    Absent,
}

/// Kind of virtual network.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    #[serde(alias = "VLAN")]
    Vlan,
    #[serde(alias = "VNET")]
    Vnet,
}

/// Instance VM mode.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
pub enum VmMode {
    #[default]
    #[serde(alias = "enhanced")]
    Enhanced,
    #[serde(alias = "compatibility")]
    Compatibility,
}

impl VmMode {
    pub fn as_str(self) -> &'static str {
        match self {
            VmMode::Enhanced => "Enhanced",
            VmMode::Compatibility => "Compatibility",
        }
    }
}

/// A virtual disk declared for an instance.
#[derive(Debug, Clone, Deserialize)]
pub struct DiskParams {
    pub name: String,
    pub size_gb: u64,
    pub boot_order: u32,
}

/// A vNIC declared for an instance.
#[derive(Debug, Clone, Deserialize)]
pub struct NicParams {
    pub name: String,
    #[serde(rename = "type")]
    pub network_type: NetworkKind,
    pub network: String,
    pub boot_order: u32,
    pub mac_address: Option<String>,
    pub firewall_override: Option<String>,
}

/// Parameters for the instance handler.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceParams {
    pub name: String,
    pub state: DesiredState,
    pub datacenter: Option<String>,
    pub migration_zone: Option<String>,
    pub storage_pool: Option<String>,
    pub template: Option<String>,
    pub vcpu_cores: Option<u32>,
    pub memory: Option<String>,
    #[serde(default)]
    pub disks: Vec<DiskParams>,
    #[serde(default)]
    pub nics: Vec<NicParams>,
    #[serde(default = "default_true")]
    pub vtx_enabled: bool,
    #[serde(default = "default_true")]
    pub auto_recovery_enabled: bool,
    pub description: Option<String>,
    #[serde(default)]
    pub vm_mode: VmMode,
    pub application_group: Option<String>,
}

impl InstanceParams {
    /// Names of supplied parameters that only make sense at creation time.
    ///
    /// An existing instance can only have its power state changed, so any of
    /// these supplied alongside an existing name is a validation error.
    pub fn creation_only_fields_supplied(&self) -> Vec<&'static str> {
        let mut supplied = Vec::new();
        if self.datacenter.is_some() {
            supplied.push("datacenter");
        }
        if self.migration_zone.is_some() {
            supplied.push("migration_zone");
        }
        if self.storage_pool.is_some() {
            supplied.push("storage_pool");
        }
        if self.template.is_some() {
            supplied.push("template");
        }
        if self.vcpu_cores.is_some() {
            supplied.push("vcpu_cores");
        }
        if !self.disks.is_empty() {
            supplied.push("disks");
        }
        if !self.nics.is_empty() {
            supplied.push("nics");
        }
        if self.description.is_some() {
            supplied.push("description");
        }
        if self.application_group.is_some() {
            supplied.push("application_group");
        }
        supplied
    }

    /// Validates everything needed before the creation path makes its first
    /// remote call.
    pub fn validate_for_create(&self) -> Result<(), ModuleError> {
        let mut missing = Vec::new();
        if self.datacenter.is_none() {
            missing.push("datacenter");
        }
        if self.migration_zone.is_none() {
            missing.push("migration_zone");
        }
        if self.storage_pool.is_none() {
            missing.push("storage_pool");
        }
        if self.template.is_none() {
            missing.push("template");
        }
        if self.vcpu_cores.is_none() {
            missing.push("vcpu_cores");
        }
        if self.memory.is_none() {
            missing.push("memory");
        }
        if !missing.is_empty() {
            return Err(ModuleError::Validation(format!(
                "cannot create instance {}, missing required parameter(s): {}",
                self.name,
                missing.join(", ")
            )));
        }
        if self.vcpu_cores == Some(0) {
            return Err(ModuleError::Validation(
                "vcpu_cores must be a positive integer".to_string(),
            ));
        }
        if let Some(memory) = &self.memory {
            parse_memory(memory)?;
        }
        validate_boot_order(&self.disks, &self.nics)?;
        for nic in &self.nics {
            if let Some(mac) = &nic.mac_address {
                if !is_valid_mac(mac) {
                    return Err(ModuleError::Validation(format!(
                        "invalid MAC address {} for NIC {}",
                        mac, nic.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// DHCP static host binding.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticBindingParams {
    pub hostname: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
}

/// DHCP service declared for a VNET.
#[derive(Debug, Clone, Deserialize)]
pub struct DhcpParams {
    pub dhcp_start: String,
    pub dhcp_end: String,
    pub domain_name: Option<String>,
    pub lease_time: Option<u64>,
    pub dns1: Option<String>,
    pub dns2: Option<String>,
    #[serde(default)]
    pub static_bindings: Vec<StaticBindingParams>,
}

/// Routing service (outside interface) declared for a VNET.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingParams {
    pub network: String,
    #[serde(rename = "type")]
    pub network_type: NetworkKind,
    pub address_mode: String,
    pub ip_address: Option<String>,
    pub subnet_mask: Option<String>,
    pub gateway: Option<String>,
    pub firewall_override: Option<String>,
}

fn default_nfv_cpu_cores() -> u32 {
    1
}

fn default_nfv_memory() -> String {
    "1G".to_string()
}

/// Sizing for the auto-deployed NFV appliance of a VNET.
#[derive(Debug, Clone, Deserialize)]
pub struct NfvParams {
    pub datacenter: Option<String>,
    pub storage_pool: Option<String>,
    pub migration_zone: Option<String>,
    #[serde(default = "default_nfv_cpu_cores")]
    pub cpu_cores: u32,
    #[serde(default = "default_nfv_memory")]
    pub memory: String,
    #[serde(default = "default_true")]
    pub auto_recovery: bool,
}

/// Parameters for the network handler.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkParams {
    pub name: String,
    #[serde(default)]
    pub state: Presence,
    pub network_type: NetworkKind,
    pub site_name: Option<String>,
    pub vlan_tag: Option<u16>,
    pub firewall_override: Option<String>,
    pub firewall_profile: Option<String>,
    #[serde(default = "default_true")]
    pub autodeploy_nfv: bool,
    pub nfv: Option<NfvParams>,
    pub network_address: Option<String>,
    pub subnet_mask: Option<String>,
    pub gateway: Option<String>,
    pub dhcp: Option<DhcpParams>,
    pub routing: Option<RoutingParams>,
}

impl NetworkParams {
    /// Names of supplied parameters that only make sense at creation time.
    pub fn creation_only_fields_supplied(&self) -> Vec<&'static str> {
        let mut supplied = Vec::new();
        if self.vlan_tag.is_some() {
            supplied.push("vlan_tag");
        }
        if self.firewall_override.is_some() {
            supplied.push("firewall_override");
        }
        if self.firewall_profile.is_some() {
            supplied.push("firewall_profile");
        }
        if self.nfv.is_some() {
            supplied.push("nfv");
        }
        if self.network_address.is_some() {
            supplied.push("network_address");
        }
        if self.subnet_mask.is_some() {
            supplied.push("subnet_mask");
        }
        if self.gateway.is_some() {
            supplied.push("gateway");
        }
        if self.dhcp.is_some() {
            supplied.push("dhcp");
        }
        if self.routing.is_some() {
            supplied.push("routing");
        }
        supplied
    }

    /// Validates creation input for the declared network kind.
    pub fn validate_for_create(&self) -> Result<(), ModuleError> {
        match self.network_type {
            NetworkKind::Vlan => {
                let Some(tag) = self.vlan_tag else {
                    return Err(ModuleError::Validation(format!(
                        "cannot create VLAN network {}, vlan_tag is required",
                        self.name
                    )));
                };
                if !(1..=4094).contains(&tag) {
                    return Err(ModuleError::Validation(
                        "vlan_tag parameter is invalid - must be in range 1-4094".to_string(),
                    ));
                }
            }
            NetworkKind::Vnet => {
                let mut missing = Vec::new();
                if self.network_address.is_none() {
                    missing.push("network_address");
                }
                if self.subnet_mask.is_none() {
                    missing.push("subnet_mask");
                }
                if self.gateway.is_none() {
                    missing.push("gateway");
                }
                if self.dhcp.is_none() {
                    missing.push("dhcp");
                }
                if self.routing.is_none() {
                    missing.push("routing");
                }
                if !missing.is_empty() {
                    return Err(ModuleError::Validation(format!(
                        "cannot create VNET network {}, missing required parameter(s): {}",
                        self.name,
                        missing.join(", ")
                    )));
                }
                if let (Some(address), Some(mask), Some(dhcp)) =
                    (&self.network_address, &self.subnet_mask, &self.dhcp)
                {
                    validate_dhcp_range(address, mask, &dhcp.dhcp_start, &dhcp.dhcp_end)?;
                    for binding in &dhcp.static_bindings {
                        if let Some(mac) = &binding.mac_address {
                            if !is_valid_mac(mac) {
                                return Err(ModuleError::Validation(format!(
                                    "invalid MAC address {mac} in DHCP static binding"
                                )));
                            }
                        }
                    }
                }
                if let Some(nfv) = &self.nfv {
                    parse_memory(&nfv.memory)?;
                }
            }
        }
        Ok(())
    }
}

/// One migration-zone allocation inside a datacenter declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct MigrationZoneAllocationParams {
    pub name: String,
    pub category: Option<String>,
    pub cpu_cores: u32,
    pub memory_gb: u64,
}

/// One storage-pool allocation inside a datacenter declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoragePoolAllocationParams {
    pub name: String,
    pub storage_gb: u64,
}

/// A network assigned to a datacenter.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkRefParams {
    pub name: String,
    pub network_type: NetworkKind,
}

/// A marketplace template downloaded into a datacenter.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDownloadParams {
    pub name: String,
    pub new_name: Option<String>,
    pub description: Option<String>,
    pub cpu_cores: Option<u32>,
    pub memory_mb: Option<u64>,
    #[serde(default)]
    pub wait_to_download: bool,
}

/// Parameters for the datacenter handler.
#[derive(Debug, Clone, Deserialize)]
pub struct DatacenterParams {
    pub name: String,
    #[serde(default)]
    pub support_widget_for_vdc_users: bool,
    pub migration_zones: Vec<MigrationZoneAllocationParams>,
    pub storage_pools: Vec<StoragePoolAllocationParams>,
    #[serde(default)]
    pub networks: Vec<NetworkRefParams>,
    #[serde(default)]
    pub templates: Vec<TemplateDownloadParams>,
}

/// Resource kinds the info handler can list.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Application,
    ApplicationGroup,
    Category,
    Datacenter,
    FirewallProfile,
    MarketplaceTemplate,
    MigrationZone,
    Site,
    StoragePool,
    Template,
    Vlan,
    Vnet,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Application => "application",
            ResourceKind::ApplicationGroup => "application_group",
            ResourceKind::Category => "category",
            ResourceKind::Datacenter => "datacenter",
            ResourceKind::FirewallProfile => "firewall_profile",
            ResourceKind::MarketplaceTemplate => "marketplace_template",
            ResourceKind::MigrationZone => "migration_zone",
            ResourceKind::Site => "site",
            ResourceKind::StoragePool => "storage_pool",
            ResourceKind::Template => "template",
            ResourceKind::Vlan => "vlan",
            ResourceKind::Vnet => "vnet",
        }
    }
}

/// Parameters for the info handler.
#[derive(Debug, Clone, Deserialize)]
pub struct InfoParams {
    pub resource: ResourceKind,
}

/// Converts a human-readable memory amount to bytes.
///
/// Accepts a bare byte count or a value with a k/kb/m/mb/g/gb/t/tb suffix,
/// case-insensitive.
pub fn parse_memory(value: &str) -> Result<u64, ModuleError> {
    let lower = value.trim().to_lowercase();
    let digits_end = lower
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(lower.len());
    let (amount, unit) = lower.split_at(digits_end);
    let amount: u64 = amount
        .parse()
        .map_err(|_| ModuleError::Validation(format!("{value} is not a valid memory amount")))?;
    let multiplier = match unit {
        "" => 1,
        "k" | "kb" => KIB,
        "m" | "mb" => MIB,
        "g" | "gb" => GIB,
        "t" | "tb" => TIB,
        _ => {
            return Err(ModuleError::Validation(format!(
                "{value} is not a valid memory amount"
            )));
        }
    };
    amount
        .checked_mul(multiplier)
        .ok_or_else(|| ModuleError::Validation(format!("{value} is not a valid memory amount")))
}

/// Checks that the boot-order values across all declared disks and NICs are
/// exactly the distinct integers 1..=N.
pub fn validate_boot_order(disks: &[DiskParams], nics: &[NicParams]) -> Result<(), ModuleError> {
    let mut orders: Vec<u32> = disks
        .iter()
        .map(|d| d.boot_order)
        .chain(nics.iter().map(|n| n.boot_order))
        .collect();
    orders.sort_unstable();
    let expected: Vec<u32> = (1..=orders.len() as u32).collect();
    if orders != expected {
        return Err(ModuleError::Validation(format!(
            "boot_order values across disks and nics must be the distinct integers 1 through {}",
            orders.len()
        )));
    }
    Ok(())
}

/// Checks a MAC address of the form aa:bb:cc:dd:ee:ff.
pub fn is_valid_mac(mac: &str) -> bool {
    let groups: Vec<&str> = mac.split(':').collect();
    groups.len() == 6
        && groups
            .iter()
            .all(|g| g.len() == 2 && g.chars().all(|c| c.is_ascii_hexdigit()))
}

fn parse_ipv4(value: &str, what: &str) -> Result<u32, ModuleError> {
    value
        .trim()
        .parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| ModuleError::Validation(format!("{value} is not a valid IPv4 {what}")))
}

/// Checks that a DHCP range lies within the declared subnet and is ordered.
pub fn validate_dhcp_range(
    network_address: &str,
    subnet_mask: &str,
    start: &str,
    end: &str,
) -> Result<(), ModuleError> {
    let network = parse_ipv4(network_address, "network address")?;
    let mask = parse_ipv4(subnet_mask, "subnet mask")?;
    let start_ip = parse_ipv4(start, "address")?;
    let end_ip = parse_ipv4(end, "address")?;
    if start_ip & mask != network & mask || end_ip & mask != network & mask {
        return Err(ModuleError::Validation(format!(
            "DHCP range {start}-{end} is not within subnet {network_address}/{subnet_mask}"
        )));
    }
    if start_ip > end_ip {
        return Err(ModuleError::Validation(format!(
            "DHCP range start {start} is above range end {end}"
        )));
    }
    Ok(())
}
