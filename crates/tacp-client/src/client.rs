//! ThinkAgile CP API client
//!
//! Implements the TACP portal REST API client used by the automation
//! modules. The portal exposes flat list/get endpoints per resource type;
//! lookups by name filter the list response client-side.

use crate::error::TacpError;
use crate::models::*;
use crate::tacp_trait::TacpClientTrait;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// ThinkAgile CP API client
#[derive(Debug)]
pub struct TacpClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TacpClient {
    /// Create a new TACP client
    ///
    /// # Arguments
    /// * `base_url` - Portal base URL (e.g., "https://manage.cp.lenovo.com")
    /// * `api_key` - API key generated in the portal's Developer Options
    pub fn new(base_url: String, api_key: String) -> Result<Self, TacpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(TacpError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Issue a request and map non-success statuses into `TacpError`.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<reqwest::Response, TacpError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(TacpError::Http)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let text = response.text().await.unwrap_or_default();
            return Err(TacpError::Authentication(format!("{status} - {text}")));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(TacpError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TacpError::Api(format!("{status} - {text}")));
        }

        Ok(response)
    }

    /// GET a JSON document
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TacpError> {
        let response = self.send(Method::GET, path, None::<&()>).await?;

        // Capture the response body for better error messages on decode failures
        let text = response.text().await.map_err(TacpError::Http)?;
        serde_json::from_str(&text).map_err(|e| {
            TacpError::Api(format!(
                "error decoding response body: {} - Response (first 500 chars): {}",
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }

    /// POST a JSON body and decode the response
    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, TacpError> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        response.json().await.map_err(TacpError::Http)
    }

    /// PUT a JSON body and decode the response
    async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, TacpError> {
        let response = self.send(Method::PUT, path, Some(body)).await?;
        response.json().await.map_err(TacpError::Http)
    }

    /// PUT without a body, decoding the action envelope
    async fn put_action(&self, path: &str) -> Result<ActionResponse, TacpError> {
        let response = self.send(Method::PUT, path, None::<&()>).await?;
        response.json().await.map_err(TacpError::Http)
    }

    /// DELETE, decoding the action envelope
    async fn delete_action(&self, path: &str) -> Result<ActionResponse, TacpError> {
        let response = self.send(Method::DELETE, path, None::<&()>).await?;
        response.json().await.map_err(TacpError::Http)
    }
}

/// Find an item by exact name in a listing
fn find_by_name<T>(items: Vec<T>, name: &str, item_name: impl Fn(&T) -> &str) -> Option<T> {
    items.into_iter().find(|item| item_name(item) == name)
}

#[async_trait::async_trait]
impl TacpClientTrait for TacpClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validate the API key by listing sites, the cheapest authenticated call.
    async fn validate_api_key(&self) -> Result<(), TacpError> {
        debug!("Validating TACP API key and connectivity");
        self.get_sites().await?;
        debug!("API key validated successfully");
        Ok(())
    }

    async fn get_action(&self, uuid: &str) -> Result<Action, TacpError> {
        self.get_json(&format!("/api/actions/{uuid}")).await
    }

    async fn get_instances(&self) -> Result<Vec<Instance>, TacpError> {
        self.get_json("/api/applications").await
    }

    async fn get_instance(&self, uuid: &str) -> Result<Instance, TacpError> {
        self.get_json(&format!("/api/applications/{uuid}")).await
    }

    async fn find_instance_by_name(&self, name: &str) -> Result<Option<Instance>, TacpError> {
        Ok(find_by_name(self.get_instances().await?, name, |i| &i.name))
    }

    async fn create_instance(
        &self,
        payload: &CreateInstancePayload,
    ) -> Result<ActionResponse, TacpError> {
        self.post_json("/api/applications", payload).await
    }

    async fn delete_instance(&self, uuid: &str) -> Result<ActionResponse, TacpError> {
        self.delete_action(&format!("/api/applications/{uuid}")).await
    }

    async fn power_instance(
        &self,
        uuid: &str,
        action: PowerAction,
    ) -> Result<ActionResponse, TacpError> {
        self.put_action(&format!("/api/applications/{uuid}/{}", action.endpoint()))
            .await
    }

    async fn add_instance_vnic(
        &self,
        uuid: &str,
        payload: &NetworkOptionsPayload,
    ) -> Result<ActionResponse, TacpError> {
        self.post_json(&format!("/api/applications/{uuid}/vnics"), payload)
            .await
    }

    async fn add_instance_disk(
        &self,
        uuid: &str,
        payload: &DiskPayload,
    ) -> Result<ActionResponse, TacpError> {
        self.post_json(&format!("/api/applications/{uuid}/disks"), payload)
            .await
    }

    async fn resize_instance_disk(
        &self,
        instance_uuid: &str,
        disk_uuid: &str,
        size: u64,
    ) -> Result<ActionResponse, TacpError> {
        self.put_json(
            &format!("/api/applications/{instance_uuid}/disks/{disk_uuid}"),
            &serde_json::json!({ "size": size }),
        )
        .await
    }

    async fn set_instance_boot_order(
        &self,
        uuid: &str,
        boot_order: &[BootDevice],
    ) -> Result<ActionResponse, TacpError> {
        self.put_json(
            &format!("/api/applications/{uuid}/boot-order"),
            &serde_json::json!({ "bootOrder": boot_order }),
        )
        .await
    }

    async fn get_application_groups(&self) -> Result<Vec<ApplicationGroup>, TacpError> {
        self.get_json("/api/application-groups").await
    }

    async fn find_application_group_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ApplicationGroup>, TacpError> {
        Ok(find_by_name(self.get_application_groups().await?, name, |g| &g.name))
    }

    async fn create_application_group(
        &self,
        name: &str,
        datacenter_uuid: &str,
    ) -> Result<ActionResponse, TacpError> {
        self.post_json(
            "/api/application-groups",
            &serde_json::json!({ "name": name, "datacenterUuid": datacenter_uuid }),
        )
        .await
    }

    async fn get_vlans(&self) -> Result<Vec<Vlan>, TacpError> {
        self.get_json("/api/vlans").await
    }

    async fn find_vlan_by_name(&self, name: &str) -> Result<Option<Vlan>, TacpError> {
        Ok(find_by_name(self.get_vlans().await?, name, |v| &v.name))
    }

    async fn create_vlan(&self, payload: &CreateVlanPayload) -> Result<ActionResponse, TacpError> {
        self.post_json("/api/vlans", payload).await
    }

    async fn delete_vlan(&self, uuid: &str) -> Result<ActionResponse, TacpError> {
        self.delete_action(&format!("/api/vlans/{uuid}")).await
    }

    async fn get_vnets(&self) -> Result<Vec<Vnet>, TacpError> {
        self.get_json("/api/vnets").await
    }

    async fn get_vnet(&self, uuid: &str) -> Result<Vnet, TacpError> {
        self.get_json(&format!("/api/vnets/{uuid}")).await
    }

    async fn find_vnet_by_name(&self, name: &str) -> Result<Option<Vnet>, TacpError> {
        Ok(find_by_name(self.get_vnets().await?, name, |v| &v.name))
    }

    async fn create_vnet(&self, payload: &CreateVnetPayload) -> Result<ActionResponse, TacpError> {
        self.post_json("/api/vnets", payload).await
    }

    async fn delete_vnet(&self, uuid: &str) -> Result<ActionResponse, TacpError> {
        self.delete_action(&format!("/api/vnets/{uuid}")).await
    }

    async fn get_datacenters(&self) -> Result<Vec<Datacenter>, TacpError> {
        self.get_json("/api/datacenters").await
    }

    async fn find_datacenter_by_name(&self, name: &str) -> Result<Option<Datacenter>, TacpError> {
        Ok(find_by_name(self.get_datacenters().await?, name, |d| &d.name))
    }

    async fn create_datacenter(
        &self,
        payload: &CreateDatacenterPayload,
    ) -> Result<Datacenter, TacpError> {
        self.post_json("/api/datacenters", payload).await
    }

    async fn assign_datacenter_networks(
        &self,
        uuid: &str,
        network_uuids: &[String],
    ) -> Result<(), TacpError> {
        self.send(
            Method::PUT,
            &format!("/api/datacenters/{uuid}/networks"),
            Some(&serde_json::json!({ "networkUuids": network_uuids })),
        )
        .await?;
        Ok(())
    }

    async fn get_datacenter_firewall_overrides(
        &self,
        uuid: &str,
    ) -> Result<Vec<FirewallOverride>, TacpError> {
        self.get_json(&format!("/api/datacenters/{uuid}/firewall-overrides"))
            .await
    }

    async fn get_migration_zones(&self) -> Result<Vec<MigrationZone>, TacpError> {
        self.get_json("/api/migration-zones").await
    }

    async fn find_migration_zone_by_name(
        &self,
        name: &str,
    ) -> Result<Option<MigrationZone>, TacpError> {
        Ok(find_by_name(self.get_migration_zones().await?, name, |z| &z.name))
    }

    async fn get_storage_pools(&self) -> Result<Vec<StoragePool>, TacpError> {
        self.get_json("/api/flash-pools").await
    }

    async fn find_storage_pool_by_name(&self, name: &str) -> Result<Option<StoragePool>, TacpError> {
        Ok(find_by_name(self.get_storage_pools().await?, name, |p| &p.name))
    }

    async fn get_templates(&self) -> Result<Vec<Template>, TacpError> {
        self.get_json("/api/templates").await
    }

    async fn get_template(&self, uuid: &str) -> Result<Template, TacpError> {
        self.get_json(&format!("/api/templates/{uuid}")).await
    }

    async fn find_template_by_name(&self, name: &str) -> Result<Option<Template>, TacpError> {
        Ok(find_by_name(self.get_templates().await?, name, |t| &t.name))
    }

    async fn get_marketplace_templates(&self) -> Result<Vec<MarketplaceTemplate>, TacpError> {
        self.get_json("/api/marketplace-templates").await
    }

    async fn find_marketplace_template_by_name(
        &self,
        name: &str,
    ) -> Result<Option<MarketplaceTemplate>, TacpError> {
        Ok(find_by_name(self.get_marketplace_templates().await?, name, |t| &t.name))
    }

    async fn download_marketplace_template(
        &self,
        payload: &MarketplaceTemplateDownloadPayload,
    ) -> Result<ActionResponse, TacpError> {
        self.post_json(
            &format!("/api/marketplace-templates/{}/download", payload.uuid),
            payload,
        )
        .await
    }

    async fn get_sites(&self) -> Result<Vec<Site>, TacpError> {
        self.get_json("/api/locations").await
    }

    async fn get_categories(&self) -> Result<Vec<Category>, TacpError> {
        self.get_json("/api/categories").await
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, TacpError> {
        Ok(find_by_name(self.get_categories().await?, name, |c| &c.name))
    }

    async fn get_firewall_profiles(&self) -> Result<Vec<FirewallProfile>, TacpError> {
        self.get_json("/api/firewall-profiles").await
    }

    async fn find_firewall_profile_by_name(
        &self,
        name: &str,
    ) -> Result<Option<FirewallProfile>, TacpError> {
        Ok(find_by_name(self.get_firewall_profiles().await?, name, |p| &p.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped_from_base_url() {
        let client =
            TacpClient::new("https://manage.cp.lenovo.com/".to_string(), "key".to_string())
                .expect("client should build");
        assert_eq!(client.base_url(), "https://manage.cp.lenovo.com");
    }

    #[test]
    fn power_action_endpoints() {
        assert_eq!(PowerAction::Start.endpoint(), "start");
        assert_eq!(PowerAction::ForceRestart.endpoint(), "force-restart");
        assert_eq!(PowerAction::Resume.endpoint(), "resume");
    }

    #[test]
    fn find_by_name_matches_exactly() {
        let items = vec!["VM1".to_string(), "VM10".to_string()];
        let found = find_by_name(items, "VM1", |s| s.as_str());
        assert_eq!(found.as_deref(), Some("VM1"));
    }
}
