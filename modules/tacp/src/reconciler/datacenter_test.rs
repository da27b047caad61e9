//! Unit tests for the datacenter reconciler

#[cfg(test)]
mod tests {
    use crate::params::DatacenterParams;
    use crate::reconciler::datacenter::reconcile;
    use tacp_client::{
        Category, CategoryAllocation, Datacenter, MarketplaceTemplate, MigrationZone,
        MigrationZoneAllocations, MockTacpClient, StoragePool, TacpClientTrait, Vlan,
    };

    fn params_from_yaml(yaml: &str) -> DatacenterParams {
        serde_yaml::from_str(yaml).unwrap()
    }

    const DATACENTER_YAML: &str = r"
name: Datacenter2
migration_zones:
  - name: Zone1
    cpu_cores: 8
    memory_gb: 32
storage_pools:
  - name: Pool1
    storage_gb: 500
networks:
  - name: Lab
    network_type: VLAN
templates:
  - name: 'CentOS 7.5 (64-bit)'
    new_name: 'CentOS base image'
    wait_to_download: true
";

    fn seeded_client() -> MockTacpClient {
        let client = MockTacpClient::new("https://test-portal");
        client.add_category(Category {
            uuid: "cat-default".to_string(),
            name: "Default".to_string(),
        });
        client.add_migration_zone(MigrationZone {
            uuid: "mz-1".to_string(),
            name: "Zone1".to_string(),
            allocations: Some(MigrationZoneAllocations {
                categories: vec![CategoryAllocation {
                    category_uuid: "cat-default".to_string(),
                }],
            }),
        });
        client.add_storage_pool(StoragePool {
            uuid: "pool-1".to_string(),
            name: "Pool1".to_string(),
        });
        client.add_vlan(Vlan {
            uuid: "vlan-1".to_string(),
            name: "Lab".to_string(),
            vlan_tag: 100,
        });
        client.add_marketplace_template(MarketplaceTemplate {
            uuid: "mkt-1".to_string(),
            name: "CentOS 7.5 (64-bit)".to_string(),
            version: "7.5".to_string(),
            default_cpus: 2,
            default_memory_bytes: 4 * 1024 * 1024 * 1024,
            description: Some("CentOS marketplace image".to_string()),
        });
        client
    }

    #[tokio::test]
    async fn test_create_datacenter_with_allocations() {
        let client = seeded_client();
        let params = params_from_yaml(DATACENTER_YAML);

        let result = reconcile(&client, &params).await.unwrap();
        assert!(result.changed);
        assert!(!result.failed);
        assert!(result.resource.is_some());

        let datacenter = client
            .find_datacenter_by_name("Datacenter2")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            client.networks_of_datacenter(&datacenter.uuid),
            vec!["vlan-1".to_string()]
        );

        let downloads = client.template_downloads();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].name, "CentOS base image");
        assert_eq!(downloads[0].datacenter_uuid, datacenter.uuid);
        // Overrides not declared fall back to the marketplace defaults
        assert_eq!(downloads[0].allocated_cpus, 2);
        assert_eq!(downloads[0].allocated_memory_bytes, 4 * 1024 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_existing_datacenter_is_noop() {
        let client = seeded_client();
        client.add_datacenter(Datacenter {
            uuid: "dc-2".to_string(),
            name: "Datacenter2".to_string(),
        });
        let params = params_from_yaml(DATACENTER_YAML);

        let result = reconcile(&client, &params).await.unwrap();
        assert!(!result.changed);
        assert!(!result.failed);
        assert!(result.msg.contains("already present"));
    }

    #[tokio::test]
    async fn test_missing_references_fail_before_creation() {
        let client = seeded_client();
        let yaml = DATACENTER_YAML.replace("name: Pool1", "name: NoSuchPool");
        let params = params_from_yaml(&yaml);

        let result = reconcile(&client, &params).await;
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("NoSuchPool"));
        assert!(client
            .find_datacenter_by_name("Datacenter2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_category_must_exist_in_migration_zone() {
        let client = seeded_client();
        client.add_category(Category {
            uuid: "cat-other".to_string(),
            name: "Other".to_string(),
        });
        let yaml = DATACENTER_YAML.replace(
            "  - name: Zone1\n",
            "  - name: Zone1\n    category: Other\n",
        );
        let params = params_from_yaml(&yaml);

        let result = reconcile(&client, &params).await;
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("not present in migration zone"));
    }

    #[tokio::test]
    async fn test_template_download_overrides() {
        let client = seeded_client();
        let yaml = DATACENTER_YAML.replace(
            "    wait_to_download: true\n",
            "    wait_to_download: false\n    cpu_cores: 4\n    memory_mb: 8192\n",
        );
        let params = params_from_yaml(&yaml);

        let result = reconcile(&client, &params).await.unwrap();
        assert!(result.changed);

        let downloads = client.template_downloads();
        assert_eq!(downloads[0].allocated_cpus, 4);
        assert_eq!(downloads[0].allocated_memory_bytes, 8192 * 1024 * 1024);
    }
}
