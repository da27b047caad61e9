//! Virtual network reconciler.
//!
//! Handles VLAN (tagged) and VNET (routed) networks. VNET creation covers
//! the DHCP service, the routing service, and the optional auto-deployed NFV
//! appliance; VNET deletion removes the NFV instance before the network.

use super::{await_action, require};
use crate::error::ModuleError;
use crate::params::{self, NetworkKind, NetworkParams, Presence};
use crate::result::ModuleResult;
use crate::wait::ACTION_TIMEOUT;
use tacp_client::{
    CreateVlanPayload, CreateVnetPayload, DhcpServicePayload, NfvInstancePayload,
    RoutingServicePayload, StaticBindingPayload, TacpClientTrait,
};
use tracing::{debug, info};

/// Reconciles the declared network against the platform.
pub async fn reconcile(
    client: &dyn TacpClientTrait,
    params: &NetworkParams,
) -> Result<ModuleResult, ModuleError> {
    info!("Reconciling {:?} network {}", params.network_type, params.name);
    match params.network_type {
        NetworkKind::Vlan => reconcile_vlan(client, params).await,
        NetworkKind::Vnet => reconcile_vnet(client, params).await,
    }
}

/// Resolves the site the network lives in. A single-site organization does
/// not need a site_name; anything else does.
async fn resolve_site(
    client: &dyn TacpClientTrait,
    params: &NetworkParams,
) -> Result<String, ModuleError> {
    let mut sites = client.get_sites().await?;
    if sites.len() == 1 {
        return Ok(sites.remove(0).uuid);
    }
    let Some(site_name) = &params.site_name else {
        return Err(ModuleError::Validation(
            "site_name is required when the organization has more than one site".to_string(),
        ));
    };
    let site = sites.into_iter().find(|s| &s.name == site_name);
    Ok(require(site, "Site", site_name)?.uuid)
}

fn reject_creation_only_fields(params: &NetworkParams) -> Result<(), ModuleError> {
    let supplied = params.creation_only_fields_supplied();
    if supplied.is_empty() {
        return Ok(());
    }
    Err(ModuleError::Validation(format!(
        "network {} already exists and cannot be modified beyond creation and deletion; \
         the following parameter(s) are invalid: {}",
        params.name,
        supplied.join(", ")
    )))
}

async fn reconcile_vlan(
    client: &dyn TacpClientTrait,
    params: &NetworkParams,
) -> Result<ModuleResult, ModuleError> {
    let existing = client.find_vlan_by_name(&params.name).await?;

    match (params.state, existing) {
        (Presence::Present, Some(_)) => {
            reject_creation_only_fields(params)?;
            Ok(ModuleResult::ok(
                false,
                format!("VLAN network {} is already present, nothing to do.", params.name),
            ))
        }
        (Presence::Present, None) => {
            params.validate_for_create()?;
            let location_uuid = resolve_site(client, params).await?;
            let Some(vlan_tag) = params.vlan_tag else {
                return Err(ModuleError::Validation(format!(
                    "cannot create VLAN network {}, vlan_tag is required",
                    params.name
                )));
            };
            let payload = CreateVlanPayload {
                name: params.name.clone(),
                location_uuid,
                vlan_tag,
            };
            let response = client.create_vlan(&payload).await?;
            await_action(client, &response, "VLAN create", ACTION_TIMEOUT).await?;

            let created = require(
                client.find_vlan_by_name(&params.name).await?,
                "VLAN network",
                &params.name,
            )?;
            let resource =
                serde_json::to_value(&created).map_err(|e| ModuleError::Remote(e.into()))?;
            Ok(ModuleResult::with_resource(
                true,
                format!("Created VLAN network {}.", params.name),
                resource,
            ))
        }
        (Presence::Absent, Some(vlan)) => {
            let response = client.delete_vlan(&vlan.uuid).await?;
            await_action(client, &response, "VLAN delete", ACTION_TIMEOUT).await?;
            Ok(ModuleResult::ok(
                true,
                format!("Deleted VLAN network {}.", params.name),
            ))
        }
        (Presence::Absent, None) => Ok(ModuleResult::ok(
            false,
            format!("VLAN network {} is already absent, nothing to do.", params.name),
        )),
    }
}

async fn reconcile_vnet(
    client: &dyn TacpClientTrait,
    params: &NetworkParams,
) -> Result<ModuleResult, ModuleError> {
    let existing = client.find_vnet_by_name(&params.name).await?;

    match (params.state, existing) {
        (Presence::Present, Some(_)) => {
            reject_creation_only_fields(params)?;
            Ok(ModuleResult::ok(
                false,
                format!("VNET network {} is already present, nothing to do.", params.name),
            ))
        }
        (Presence::Present, None) => create_vnet(client, params).await,
        (Presence::Absent, Some(vnet)) => {
            // The NFV appliance has to go before its network
            if let Some(nfv_uuid) = &vnet.nfv_instance_uuid {
                debug!("Deleting NFV instance {} of VNET {}", nfv_uuid, params.name);
                let response = client.delete_instance(nfv_uuid).await?;
                await_action(client, &response, "NFV instance delete", ACTION_TIMEOUT).await?;
            }
            let response = client.delete_vnet(&vnet.uuid).await?;
            await_action(client, &response, "VNET delete", ACTION_TIMEOUT).await?;
            Ok(ModuleResult::ok(
                true,
                format!("Deleted VNET network {}.", params.name),
            ))
        }
        (Presence::Absent, None) => Ok(ModuleResult::ok(
            false,
            format!("VNET network {} is already absent, nothing to do.", params.name),
        )),
    }
}

async fn create_vnet(
    client: &dyn TacpClientTrait,
    params: &NetworkParams,
) -> Result<ModuleResult, ModuleError> {
    params.validate_for_create()?;

    let Some(network_address) = &params.network_address else {
        return Err(missing_vnet_field("network_address"));
    };
    let Some(subnet_mask) = &params.subnet_mask else {
        return Err(missing_vnet_field("subnet_mask"));
    };
    let Some(gateway) = &params.gateway else {
        return Err(missing_vnet_field("gateway"));
    };
    let Some(dhcp) = &params.dhcp else {
        return Err(missing_vnet_field("dhcp"));
    };
    let Some(routing) = &params.routing else {
        return Err(missing_vnet_field("routing"));
    };

    let nfv_instance = match &params.nfv {
        Some(nfv) => Some(build_nfv_payload(client, nfv).await?),
        None => None,
    };
    let nfv_datacenter_uuid = nfv_instance
        .as_ref()
        .and_then(|nfv| nfv.datacenter_uuid.clone());

    let static_bindings = dhcp
        .static_bindings
        .iter()
        .map(|binding| StaticBindingPayload {
            hostname: binding.hostname.clone(),
            ip_address: binding.ip_address.clone(),
            mac_address: binding.mac_address.clone(),
        })
        .collect();

    let dhcp_service = DhcpServicePayload {
        domain_name: dhcp.domain_name.clone(),
        start_ip_range: dhcp.dhcp_start.clone(),
        end_ip_range: dhcp.dhcp_end.clone(),
        lease_time: dhcp.lease_time,
        primary_dns_server_ip_address: dhcp.dns1.clone(),
        secondary_dns_server_ip_address: dhcp.dns2.clone(),
        static_bindings,
    };

    let routing_network_uuid = match routing.network_type {
        NetworkKind::Vlan => {
            require(
                client.find_vlan_by_name(&routing.network).await?,
                "VLAN network",
                &routing.network,
            )?
            .uuid
        }
        NetworkKind::Vnet => {
            require(
                client.find_vnet_by_name(&routing.network).await?,
                "VNET network",
                &routing.network,
            )?
            .uuid
        }
    };
    let routing_override_uuid = match &routing.firewall_override {
        Some(name) => Some(
            resolve_firewall_override(client, nfv_datacenter_uuid.as_deref(), name).await?,
        ),
        None => None,
    };
    let routing_service = RoutingServicePayload {
        network_type: match routing.network_type {
            NetworkKind::Vlan => "VLAN".to_string(),
            NetworkKind::Vnet => "VNET".to_string(),
        },
        network_uuid: routing_network_uuid,
        address_mode: routing.address_mode.clone(),
        ip_address: routing.ip_address.clone(),
        subnet_mask: routing.subnet_mask.clone(),
        gateway: routing.gateway.clone(),
        firewall_override_uuid: routing_override_uuid,
    };

    let firewall_profile_uuid = match &params.firewall_profile {
        Some(name) => Some(
            require(
                client.find_firewall_profile_by_name(name).await?,
                "Firewall profile",
                name,
            )?
            .uuid,
        ),
        None => None,
    };
    let firewall_override_uuid = match &params.firewall_override {
        Some(name) => Some(
            resolve_firewall_override(client, nfv_datacenter_uuid.as_deref(), name).await?,
        ),
        None => None,
    };

    let payload = CreateVnetPayload {
        name: params.name.clone(),
        automatic_deployment: params.autodeploy_nfv,
        deploy_now: true,
        network_address: network_address.clone(),
        subnet_mask: subnet_mask.clone(),
        default_gateway: gateway.clone(),
        dhcp_service: Some(dhcp_service),
        routing_service: Some(routing_service),
        nfv_instance,
        firewall_profile_uuid,
        firewall_override_uuid,
    };

    let response = client.create_vnet(&payload).await?;
    await_action(client, &response, "VNET create", ACTION_TIMEOUT).await?;

    let created = require(
        client.find_vnet_by_name(&params.name).await?,
        "VNET network",
        &params.name,
    )?;
    let resource = serde_json::to_value(&created).map_err(|e| ModuleError::Remote(e.into()))?;
    Ok(ModuleResult::with_resource(
        true,
        format!("Created VNET network {}.", params.name),
        resource,
    ))
}

fn missing_vnet_field(field: &str) -> ModuleError {
    ModuleError::Validation(format!("{field} is required to create a VNET network"))
}

/// Firewall overrides are scoped to a datacenter; the NFV appliance's
/// datacenter is the only one in play for a VNET.
async fn resolve_firewall_override(
    client: &dyn TacpClientTrait,
    datacenter_uuid: Option<&str>,
    name: &str,
) -> Result<String, ModuleError> {
    let Some(datacenter_uuid) = datacenter_uuid else {
        return Err(ModuleError::Validation(format!(
            "firewall override {name} cannot be resolved without an nfv datacenter"
        )));
    };
    let overrides = client.get_datacenter_firewall_overrides(datacenter_uuid).await?;
    let found = overrides.into_iter().find(|o| o.name == name);
    Ok(require(found, "Firewall override", name)?.uuid)
}

async fn build_nfv_payload(
    client: &dyn TacpClientTrait,
    nfv: &params::NfvParams,
) -> Result<NfvInstancePayload, ModuleError> {
    let datacenter_uuid = match &nfv.datacenter {
        Some(name) => Some(
            require(client.find_datacenter_by_name(name).await?, "Datacenter", name)?.uuid,
        ),
        None => None,
    };
    let flash_pool_uuid = match &nfv.storage_pool {
        Some(name) => Some(
            require(client.find_storage_pool_by_name(name).await?, "Storage pool", name)?.uuid,
        ),
        None => None,
    };
    let migration_zone_uuid = match &nfv.migration_zone {
        Some(name) => Some(
            require(
                client.find_migration_zone_by_name(name).await?,
                "Migration zone",
                name,
            )?
            .uuid,
        ),
        None => None,
    };
    Ok(NfvInstancePayload {
        datacenter_uuid,
        migration_zone_uuid,
        flash_pool_uuid,
        vcpus: nfv.cpu_cores,
        memory: params::parse_memory(&nfv.memory)?,
        enable_automatic_recovery: nfv.auto_recovery,
    })
}
