//! Read-only inventory queries.

use crate::error::ModuleError;
use crate::params::{InfoParams, ResourceKind};
use crate::result::ModuleResult;
use tacp_client::TacpClientTrait;
use tracing::info;

fn to_json<T: serde::Serialize>(items: Vec<T>) -> Result<(usize, serde_json::Value), ModuleError> {
    let count = items.len();
    let value = serde_json::to_value(items).map_err(|e| ModuleError::Remote(e.into()))?;
    Ok((count, value))
}

/// Lists all resources of the requested kind. Never mutates anything.
pub async fn query(
    client: &dyn TacpClientTrait,
    params: &InfoParams,
) -> Result<ModuleResult, ModuleError> {
    info!("Querying {} resources", params.resource.as_str());
    let (count, value) = match params.resource {
        ResourceKind::Application => to_json(client.get_instances().await?)?,
        ResourceKind::ApplicationGroup => to_json(client.get_application_groups().await?)?,
        ResourceKind::Category => to_json(client.get_categories().await?)?,
        ResourceKind::Datacenter => to_json(client.get_datacenters().await?)?,
        ResourceKind::FirewallProfile => to_json(client.get_firewall_profiles().await?)?,
        ResourceKind::MarketplaceTemplate => to_json(client.get_marketplace_templates().await?)?,
        ResourceKind::MigrationZone => to_json(client.get_migration_zones().await?)?,
        ResourceKind::Site => to_json(client.get_sites().await?)?,
        ResourceKind::StoragePool => to_json(client.get_storage_pools().await?)?,
        ResourceKind::Template => to_json(client.get_templates().await?)?,
        ResourceKind::Vlan => to_json(client.get_vlans().await?)?,
        ResourceKind::Vnet => to_json(client.get_vnets().await?)?,
    };
    Ok(ModuleResult::with_resource(
        false,
        format!("Retrieved {count} {} resource(s).", params.resource.as_str()),
        value,
    ))
}
