//! Virtual datacenter reconciler.
//!
//! A datacenter is created from owned migration-zone allocations (CPU and
//! memory per category), storage-pool allocations, assigned networks, and
//! marketplace templates downloaded into it. All referenced resources are
//! checked up front so nothing is created when the declaration is broken.

use super::{await_action, require};
use crate::error::ModuleError;
use crate::params::{self, DatacenterParams, NetworkKind, TemplateDownloadParams};
use crate::result::ModuleResult;
use crate::wait::TEMPLATE_DOWNLOAD_TIMEOUT;
use tacp_client::{
    CategoryAllocationPayload, CreateDatacenterPayload, DatacenterAllocationPayload,
    MarketplaceTemplateDownloadPayload, TacpClientTrait,
};
use tracing::{debug, info};

/// Reconciles the declared datacenter against the platform.
pub async fn reconcile(
    client: &dyn TacpClientTrait,
    params: &DatacenterParams,
) -> Result<ModuleResult, ModuleError> {
    info!("Reconciling datacenter {}", params.name);

    if let Some(existing) = client.find_datacenter_by_name(&params.name).await? {
        let resource =
            serde_json::to_value(&existing).map_err(|e| ModuleError::Remote(e.into()))?;
        return Ok(ModuleResult::with_resource(
            false,
            format!("Datacenter {} is already present, nothing to do.", params.name),
            resource,
        ));
    }

    validate_referenced_resources(client, params).await?;

    let mut resource_allocations = Vec::new();
    for zone in &params.migration_zones {
        resource_allocations.push(migration_zone_allocation(client, zone).await?);
    }
    for pool in &params.storage_pools {
        let storage_pool = require(
            client.find_storage_pool_by_name(&pool.name).await?,
            "Storage pool",
            &pool.name,
        )?;
        let allocated_capacity = params::parse_memory(&format!("{}gb", pool.storage_gb))?;
        resource_allocations.push(DatacenterAllocationPayload {
            migration_zone_uuid: None,
            category_allocations: None,
            flash_pool_uuid: Some(storage_pool.uuid),
            allocated_capacity: Some(allocated_capacity),
        });
    }

    let payload = CreateDatacenterPayload {
        name: params.name.clone(),
        is_support_widget_enabled: params.support_widget_for_vdc_users,
        resource_allocations,
    };
    let datacenter = client.create_datacenter(&payload).await?;

    // The datacenter exists from here on; failures report changed and leave
    // cleanup to the portal, there is no delete endpoint to roll back with.
    if let Err(e) = assign_networks(client, params, &datacenter.uuid).await {
        return Ok(ModuleResult::failure(
            true,
            format!(
                "Datacenter {} was created but assigning networks failed: {e}\n\
                 The datacenter creation has not been rolled back. Currently datacenters \
                 must be deleted manually in the ThinkAgile CP portal GUI.",
                params.name
            ),
        ));
    }
    if let Err(e) = download_templates(client, params, &datacenter.uuid).await {
        return Ok(ModuleResult::failure(
            true,
            format!(
                "Datacenter {} was created but downloading templates failed: {e}\n\
                 The datacenter creation has not been rolled back. Currently datacenters \
                 must be deleted manually in the ThinkAgile CP portal GUI.",
                params.name
            ),
        ));
    }

    let resource = serde_json::to_value(&datacenter).map_err(|e| ModuleError::Remote(e.into()))?;
    Ok(ModuleResult::with_resource(
        true,
        format!("Created datacenter {}.", params.name),
        resource,
    ))
}

/// Checks every referenced migration zone, storage pool, network, and
/// marketplace template before anything is created.
async fn validate_referenced_resources(
    client: &dyn TacpClientTrait,
    params: &DatacenterParams,
) -> Result<(), ModuleError> {
    let mut missing = Vec::new();

    for zone in &params.migration_zones {
        if client.find_migration_zone_by_name(&zone.name).await?.is_none() {
            missing.push(format!("migration_zone: {}", zone.name));
        }
    }
    for pool in &params.storage_pools {
        if client.find_storage_pool_by_name(&pool.name).await?.is_none() {
            missing.push(format!("storage_pool: {}", pool.name));
        }
    }
    for network in &params.networks {
        let found = match network.network_type {
            NetworkKind::Vlan => client.find_vlan_by_name(&network.name).await?.is_some(),
            NetworkKind::Vnet => client.find_vnet_by_name(&network.name).await?.is_some(),
        };
        if !found {
            missing.push(format!("network: {}", network.name));
        }
    }
    for template in &params.templates {
        if client
            .find_marketplace_template_by_name(&template.name)
            .await?
            .is_none()
        {
            missing.push(format!("template: {}", template.name));
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ModuleError::Validation(format!(
            "the following resources could not be found: {}",
            missing.join(", ")
        )))
    }
}

async fn migration_zone_allocation(
    client: &dyn TacpClientTrait,
    zone: &params::MigrationZoneAllocationParams,
) -> Result<DatacenterAllocationPayload, ModuleError> {
    let migration_zone = require(
        client.find_migration_zone_by_name(&zone.name).await?,
        "Migration zone",
        &zone.name,
    )?;

    let category_name = zone.category.as_deref().unwrap_or("Default");
    let category = require(
        client.find_category_by_name(category_name).await?,
        "Category",
        category_name,
    )?;

    let zone_has_category = migration_zone
        .allocations
        .as_ref()
        .is_some_and(|allocations| {
            allocations
                .categories
                .iter()
                .any(|c| c.category_uuid == category.uuid)
        });
    if !zone_has_category {
        return Err(ModuleError::Validation(format!(
            "Category {} is not present in migration zone {}",
            category_name, migration_zone.name
        )));
    }

    let allocated_memory_bytes = params::parse_memory(&format!("{}gb", zone.memory_gb))?;
    Ok(DatacenterAllocationPayload {
        migration_zone_uuid: Some(migration_zone.uuid),
        category_allocations: Some(vec![CategoryAllocationPayload {
            category_uuid: category.uuid,
            allocated_cpus: zone.cpu_cores,
            allocated_memory_bytes,
        }]),
        flash_pool_uuid: None,
        allocated_capacity: None,
    })
}

async fn assign_networks(
    client: &dyn TacpClientTrait,
    params: &DatacenterParams,
    datacenter_uuid: &str,
) -> Result<(), ModuleError> {
    if params.networks.is_empty() {
        return Ok(());
    }
    let mut network_uuids = Vec::with_capacity(params.networks.len());
    for network in &params.networks {
        let uuid = match network.network_type {
            NetworkKind::Vlan => {
                require(
                    client.find_vlan_by_name(&network.name).await?,
                    "VLAN network",
                    &network.name,
                )?
                .uuid
            }
            NetworkKind::Vnet => {
                require(
                    client.find_vnet_by_name(&network.name).await?,
                    "VNET network",
                    &network.name,
                )?
                .uuid
            }
        };
        network_uuids.push(uuid);
    }
    debug!(
        "Assigning {} network(s) to datacenter {}",
        network_uuids.len(),
        datacenter_uuid
    );
    client
        .assign_datacenter_networks(datacenter_uuid, &network_uuids)
        .await?;
    Ok(())
}

async fn download_templates(
    client: &dyn TacpClientTrait,
    params: &DatacenterParams,
    datacenter_uuid: &str,
) -> Result<(), ModuleError> {
    for template in &params.templates {
        let payload = template_download_payload(client, template, datacenter_uuid).await?;
        debug!(
            "Downloading marketplace template {} into datacenter {}",
            template.name, datacenter_uuid
        );
        let response = client.download_marketplace_template(&payload).await?;
        if template.wait_to_download {
            await_action(client, &response, "template download", TEMPLATE_DOWNLOAD_TIMEOUT)
                .await?;
        }
    }
    Ok(())
}

/// Builds a download request from the marketplace defaults with the declared
/// overrides applied.
async fn template_download_payload(
    client: &dyn TacpClientTrait,
    template: &TemplateDownloadParams,
    datacenter_uuid: &str,
) -> Result<MarketplaceTemplateDownloadPayload, ModuleError> {
    let marketplace = require(
        client
            .find_marketplace_template_by_name(&template.name)
            .await?,
        "Marketplace template",
        &template.name,
    )?;

    let allocated_memory_bytes = match template.memory_mb {
        Some(memory_mb) => params::parse_memory(&format!("{memory_mb}mb"))?,
        None => marketplace.default_memory_bytes,
    };

    Ok(MarketplaceTemplateDownloadPayload {
        uuid: marketplace.uuid,
        name: template.new_name.clone().unwrap_or(marketplace.name),
        description: template.description.clone().or(marketplace.description),
        allocated_cpus: template.cpu_cores.unwrap_or(marketplace.default_cpus),
        allocated_memory_bytes,
        datacenter_uuid: datacenter_uuid.to_string(),
        version: marketplace.version,
    })
}
