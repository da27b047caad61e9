//! Application instance reconciler.
//!
//! Handles creation, deletion, and power-state transitions. Creation builds
//! the full device list from the chosen template plus the declared disks and
//! NICs, then applies the requested power state.

use super::{await_action, require};
use crate::error::ModuleError;
use crate::params::{self, DesiredState, InstanceParams, NetworkKind, NicParams};
use crate::result::ModuleResult;
use crate::wait::ACTION_TIMEOUT;
use tacp_client::{
    BootDevice, CreateInstancePayload, DiskPayload, Instance, InstanceState,
    NetworkOptionsPayload, PowerAction, TacpClientTrait, Template,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Reconciles the declared instance against the platform.
pub async fn reconcile(
    client: &dyn TacpClientTrait,
    params: &InstanceParams,
) -> Result<ModuleResult, ModuleError> {
    info!("Reconciling instance {}", params.name);
    match client.find_instance_by_name(&params.name).await? {
        Some(instance) => reconcile_existing(client, params, &instance).await,
        None if params.state == DesiredState::Absent => Ok(ModuleResult::ok(
            false,
            format!("Instance {} is already absent, nothing to do.", params.name),
        )),
        None => create_and_apply_state(client, params).await,
    }
}

/// Ordered power actions that move an instance from its current state to the
/// desired one. Total over the states the platform reports; transitional
/// states (creating, deleting, restarting, resuming) get no plan.
pub(crate) fn power_plan(current: InstanceState, desired: DesiredState) -> Vec<PowerAction> {
    match (current, desired) {
        (InstanceState::Running, DesiredState::Started) => vec![],
        (InstanceState::Running, DesiredState::Shutdown) => vec![PowerAction::Shutdown],
        (InstanceState::Running, DesiredState::Stopped) => vec![PowerAction::Stop],
        (InstanceState::Running, DesiredState::Restarted) => vec![PowerAction::Restart],
        (InstanceState::Running, DesiredState::ForceRestarted) => vec![PowerAction::ForceRestart],
        (InstanceState::Running, DesiredState::Paused) => vec![PowerAction::Pause],

        (InstanceState::ShutDown, DesiredState::Started) => vec![PowerAction::Start],
        (InstanceState::ShutDown, DesiredState::Shutdown) => vec![],
        (InstanceState::ShutDown, DesiredState::Stopped) => vec![],
        (InstanceState::ShutDown, DesiredState::Restarted) => vec![PowerAction::Start],
        (InstanceState::ShutDown, DesiredState::ForceRestarted) => vec![PowerAction::Start],
        (InstanceState::ShutDown, DesiredState::Paused) => {
            vec![PowerAction::Start, PowerAction::Pause]
        }

        (InstanceState::Paused, DesiredState::Started) => vec![PowerAction::Resume],
        (InstanceState::Paused, DesiredState::Shutdown) => {
            vec![PowerAction::Resume, PowerAction::Shutdown]
        }
        (InstanceState::Paused, DesiredState::Stopped) => vec![PowerAction::Stop],
        (InstanceState::Paused, DesiredState::Restarted) => {
            vec![PowerAction::Resume, PowerAction::Restart]
        }
        (InstanceState::Paused, DesiredState::ForceRestarted) => {
            vec![PowerAction::Resume, PowerAction::ForceRestart]
        }
        (InstanceState::Paused, DesiredState::Paused) => vec![],

        // Deletion is handled before power planning
        (_, DesiredState::Absent) => vec![],
        // No power action can be issued while a transition is in flight
        (
            InstanceState::Restarting
            | InstanceState::Resuming
            | InstanceState::Creating
            | InstanceState::Deleting,
            _,
        ) => vec![],
    }
}

async fn reconcile_existing(
    client: &dyn TacpClientTrait,
    params: &InstanceParams,
    instance: &Instance,
) -> Result<ModuleResult, ModuleError> {
    let creation_only = params.creation_only_fields_supplied();
    if !creation_only.is_empty() {
        return Err(ModuleError::Validation(format!(
            "instance {} already exists and can only have its power state changed; \
             the following parameter(s) are invalid: {}",
            params.name,
            creation_only.join(", ")
        )));
    }

    if params.state == DesiredState::Absent {
        let response = client.delete_instance(&instance.uuid).await?;
        await_action(client, &response, "instance delete", ACTION_TIMEOUT).await?;
        return Ok(ModuleResult::ok(
            true,
            format!("Deleted instance {}.", params.name),
        ));
    }

    let changed = apply_power_state(client, instance, params.state).await?;
    let msg = if changed {
        format!("Applied power state to instance {}.", params.name)
    } else {
        format!("Instance {} is already in the desired state.", params.name)
    };
    Ok(ModuleResult::ok(changed, msg))
}

async fn apply_power_state(
    client: &dyn TacpClientTrait,
    instance: &Instance,
    desired: DesiredState,
) -> Result<bool, ModuleError> {
    let plan = power_plan(instance.status, desired);
    if plan.is_empty() {
        debug!(
            "Instance {} already satisfies desired state {:?}",
            instance.name, desired
        );
        return Ok(false);
    }
    for action in plan {
        info!("Issuing power action {:?} on instance {}", action, instance.name);
        let response = client.power_instance(&instance.uuid, action).await?;
        await_action(client, &response, "power action", ACTION_TIMEOUT).await?;
    }
    Ok(true)
}

fn required<'a, T>(value: &'a Option<T>, name: &str) -> Result<&'a T, ModuleError> {
    value
        .as_ref()
        .ok_or_else(|| ModuleError::Validation(format!("{name} is required to create an instance")))
}

async fn create_and_apply_state(
    client: &dyn TacpClientTrait,
    params: &InstanceParams,
) -> Result<ModuleResult, ModuleError> {
    params.validate_for_create()?;

    let datacenter_name = required(&params.datacenter, "datacenter")?;
    let migration_zone_name = required(&params.migration_zone, "migration_zone")?;
    let storage_pool_name = required(&params.storage_pool, "storage_pool")?;
    let template_name = required(&params.template, "template")?;
    let vcpus = *required(&params.vcpu_cores, "vcpu_cores")?;
    let memory = params::parse_memory(required(&params.memory, "memory")?)?;

    let datacenter = require(
        client.find_datacenter_by_name(datacenter_name).await?,
        "Datacenter",
        datacenter_name,
    )?;
    let migration_zone = require(
        client.find_migration_zone_by_name(migration_zone_name).await?,
        "Migration zone",
        migration_zone_name,
    )?;
    let storage_pool = require(
        client.find_storage_pool_by_name(storage_pool_name).await?,
        "Storage pool",
        storage_pool_name,
    )?;
    let template_ref = require(
        client.find_template_by_name(template_name).await?,
        "Template",
        template_name,
    )?;
    let template = client.get_template(&template_ref.uuid).await?;

    let application_group_uuid = match &params.application_group {
        Some(group_name) => {
            Some(resolve_application_group(client, group_name, &datacenter.uuid).await?)
        }
        None => None,
    };

    // NICs named in the template ride along on the create payload; the rest
    // are added afterwards.
    let mut networks = Vec::new();
    for nic in &params.nics {
        let template_vnic = template
            .boot_order
            .iter()
            .find(|device| device.vnic_uuid.is_some() && device.name == nic.name);
        if let Some(device) = template_vnic {
            let vnic_uuid = device.vnic_uuid.clone().unwrap_or_default();
            networks.push(network_options(client, &datacenter.uuid, nic, vnic_uuid).await?);
        }
    }

    let payload = CreateInstancePayload {
        name: params.name.clone(),
        datacenter_uuid: datacenter.uuid.clone(),
        migration_zone_uuid: migration_zone.uuid.clone(),
        flash_pool_uuid: storage_pool.uuid.clone(),
        template_uuid: template.uuid.clone(),
        vcpus,
        memory,
        vm_mode: params.vm_mode.as_str().to_string(),
        networks,
        boot_order: template.boot_order.clone(),
        hardware_assisted_virtualization_enabled: params.vtx_enabled,
        enable_automatic_recovery: params.auto_recovery_enabled,
        description: params.description.clone(),
        application_group_uuid,
    };

    info!("Creating instance {}", params.name);
    let response = client.create_instance(&payload).await?;
    await_action(client, &response, "instance create", ACTION_TIMEOUT).await?;

    let Some(instance) = client.find_instance_by_name(&params.name).await? else {
        return Ok(ModuleResult::failure(
            true,
            format!(
                "Instance {} was created but could not be read back from the platform.",
                params.name
            ),
        ));
    };

    // Remote state is mutated from here on; report which step failed and let
    // re-invocation be the recovery path.
    if let Err(e) = add_missing_vnics(client, params, &instance, &template).await {
        return Ok(ModuleResult::failure(
            true,
            format!("Instance {} was created but adding vNICs failed: {e}", params.name),
        ));
    }
    if let Err(e) = apply_disks(client, params, &instance, &template).await {
        return Ok(ModuleResult::failure(
            true,
            format!("Instance {} was created but the disk step failed: {e}", params.name),
        ));
    }
    if let Err(e) = set_boot_order(client, params, &instance.uuid).await {
        return Ok(ModuleResult::failure(
            true,
            format!(
                "Instance {} was created but updating the boot order failed: {e}",
                params.name
            ),
        ));
    }

    let instance = client.get_instance(&instance.uuid).await?;
    if let Err(e) = apply_power_state(client, &instance, params.state).await {
        return Ok(ModuleResult::failure(
            true,
            format!(
                "Instance {} was created but applying the power state failed: {e}",
                params.name
            ),
        ));
    }

    let instance = client.get_instance(&instance.uuid).await?;
    let resource = serde_json::to_value(&instance).map_err(|e| ModuleError::Remote(e.into()))?;
    Ok(ModuleResult::with_resource(
        true,
        format!("Created instance {}.", params.name),
        resource,
    ))
}

async fn resolve_application_group(
    client: &dyn TacpClientTrait,
    name: &str,
    datacenter_uuid: &str,
) -> Result<String, ModuleError> {
    if let Some(group) = client.find_application_group_by_name(name).await? {
        return Ok(group.uuid);
    }
    debug!("Creating application group {} in datacenter {}", name, datacenter_uuid);
    let response = client.create_application_group(name, datacenter_uuid).await?;
    await_action(client, &response, "application group create", ACTION_TIMEOUT).await?;
    require(response.object_uuid, "Application group", name)
}

async fn network_options(
    client: &dyn TacpClientTrait,
    datacenter_uuid: &str,
    nic: &NicParams,
    vnic_uuid: String,
) -> Result<NetworkOptionsPayload, ModuleError> {
    let network_uuid = match nic.network_type {
        NetworkKind::Vlan => {
            require(
                client.find_vlan_by_name(&nic.network).await?,
                "VLAN network",
                &nic.network,
            )?
            .uuid
        }
        NetworkKind::Vnet => {
            require(
                client.find_vnet_by_name(&nic.network).await?,
                "VNET network",
                &nic.network,
            )?
            .uuid
        }
    };

    let firewall_override_uuid = match &nic.firewall_override {
        Some(override_name) => {
            let overrides = client.get_datacenter_firewall_overrides(datacenter_uuid).await?;
            let found = overrides.into_iter().find(|o| &o.name == override_name);
            Some(require(found, "Firewall override", override_name)?.uuid)
        }
        None => None,
    };

    Ok(NetworkOptionsPayload {
        name: nic.name.clone(),
        automatic_mac_assignment: nic.mac_address.is_none(),
        mac_address: nic.mac_address.clone(),
        network_uuid,
        firewall_override_uuid,
        vnic_uuid,
    })
}

/// Adds declared NICs that are not part of the instance's template.
async fn add_missing_vnics(
    client: &dyn TacpClientTrait,
    params: &InstanceParams,
    instance: &Instance,
    template: &Template,
) -> Result<(), ModuleError> {
    let template_vnic_names: Vec<&str> = template
        .boot_order
        .iter()
        .filter(|device| device.vnic_uuid.is_some())
        .map(|device| device.name.as_str())
        .collect();

    for nic in &params.nics {
        if template_vnic_names.contains(&nic.name.as_str()) {
            continue;
        }
        let vnic_uuid = Uuid::new_v4().to_string();
        let payload = network_options(client, &instance.datacenter_uuid, nic, vnic_uuid).await?;
        debug!("Adding vNIC {} to instance {}", nic.name, instance.name);
        let response = client.add_instance_vnic(&instance.uuid, &payload).await?;
        await_action(client, &response, "vNIC add", ACTION_TIMEOUT).await?;
    }
    Ok(())
}

/// Adds declared disks not in the template and resizes the ones that are.
async fn apply_disks(
    client: &dyn TacpClientTrait,
    params: &InstanceParams,
    instance: &Instance,
    template: &Template,
) -> Result<(), ModuleError> {
    let template_disk_names: Vec<&str> = template
        .boot_order
        .iter()
        .filter(|device| device.disk_uuid.is_some())
        .map(|device| device.name.as_str())
        .collect();

    // Re-read for current disk sizes
    let current = client.get_instance(&instance.uuid).await?;

    for disk in &params.disks {
        let target_size = params::parse_memory(&format!("{}gb", disk.size_gb))?;

        if template_disk_names.contains(&disk.name.as_str()) {
            let existing = require(
                current.disks.iter().find(|d| d.name == disk.name),
                "Disk",
                &disk.name,
            )?;
            if target_size < existing.size {
                return Err(ModuleError::Validation(format!(
                    "Failed to resize disk {} from {} bytes to {} bytes. \
                     Cannot shrink a template's disk.",
                    existing.name, existing.size, target_size
                )));
            }
            if target_size > existing.size {
                debug!("Resizing disk {} on instance {}", disk.name, instance.name);
                let response = client
                    .resize_instance_disk(&instance.uuid, &existing.uuid, target_size)
                    .await?;
                await_action(client, &response, "disk resize", ACTION_TIMEOUT).await?;
            }
            continue;
        }

        let payload = DiskPayload {
            uuid: Uuid::new_v4().to_string(),
            name: disk.name.clone(),
            size: target_size,
        };
        debug!("Adding disk {} to instance {}", disk.name, instance.name);
        let response = client.add_instance_disk(&instance.uuid, &payload).await?;
        await_action(client, &response, "disk add", ACTION_TIMEOUT).await?;
    }
    Ok(())
}

/// Rewrites the instance's boot order from the declared device orders.
async fn set_boot_order(
    client: &dyn TacpClientTrait,
    params: &InstanceParams,
    instance_uuid: &str,
) -> Result<(), ModuleError> {
    let instance = client.get_instance(instance_uuid).await?;

    let mut boot_order = Vec::with_capacity(instance.boot_order.len());
    for device in &instance.boot_order {
        let order = if device.vnic_uuid.is_some() {
            params
                .nics
                .iter()
                .find(|nic| nic.name == device.name)
                .map(|nic| nic.boot_order)
        } else {
            params
                .disks
                .iter()
                .find(|disk| disk.name == device.name)
                .map(|disk| disk.boot_order)
        };
        let Some(order) = order else {
            return Err(ModuleError::Validation(format!(
                "device {} on instance {} has no boot_order in the task parameters",
                device.name, instance.name
            )));
        };
        boot_order.push(BootDevice {
            name: device.name.clone(),
            order,
            disk_uuid: device.disk_uuid.clone(),
            vnic_uuid: device.vnic_uuid.clone(),
        });
    }
    boot_order.sort_by_key(|device| device.order);

    let response = client.set_instance_boot_order(instance_uuid, &boot_order).await?;
    await_action(client, &response, "boot order update", ACTION_TIMEOUT).await
}
