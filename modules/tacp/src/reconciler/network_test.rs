//! Unit tests for the network reconciler

#[cfg(test)]
mod tests {
    use crate::params::NetworkParams;
    use crate::reconciler::network::reconcile;
    use tacp_client::{
        Datacenter, MigrationZone, MockTacpClient, Site, StoragePool, TacpClientTrait, Vlan, Vnet,
    };

    fn params_from_yaml(yaml: &str) -> NetworkParams {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn seeded_client() -> MockTacpClient {
        let client = MockTacpClient::new("https://test-portal");
        client.add_site(Site {
            uuid: "site-1".to_string(),
            name: "Site1".to_string(),
        });
        client.add_datacenter(Datacenter {
            uuid: "dc-1".to_string(),
            name: "Datacenter1".to_string(),
        });
        client.add_migration_zone(MigrationZone {
            uuid: "mz-1".to_string(),
            name: "Zone1".to_string(),
            allocations: None,
        });
        client.add_storage_pool(StoragePool {
            uuid: "pool-1".to_string(),
            name: "Pool1".to_string(),
        });
        client.add_vlan(Vlan {
            uuid: "vlan-ext".to_string(),
            name: "External".to_string(),
            vlan_tag: 10,
        });
        client
    }

    const VNET_YAML: &str = r"
name: Internal
network_type: VNET
network_address: 192.168.100.0
subnet_mask: 255.255.255.0
gateway: 192.168.100.1
dhcp:
  dhcp_start: 192.168.100.10
  dhcp_end: 192.168.100.200
  domain_name: lab.local
  lease_time: 86400
  dns1: 192.168.100.1
routing:
  network: External
  type: VLAN
  address_mode: static
  ip_address: 10.0.0.5
  subnet_mask: 255.255.255.0
  gateway: 10.0.0.1
nfv:
  datacenter: Datacenter1
  storage_pool: Pool1
  migration_zone: Zone1
  cpu_cores: 1
  memory: 1G
";

    #[tokio::test]
    async fn test_create_vlan_network() {
        let client = seeded_client();
        let params = params_from_yaml(
            r"
name: Lab
network_type: VLAN
vlan_tag: 100
",
        );

        let result = reconcile(&client, &params).await.unwrap();
        assert!(result.changed);
        assert!(!result.failed);
        assert!(result.resource.is_some());

        let vlan = client.find_vlan_by_name("Lab").await.unwrap().unwrap();
        assert_eq!(vlan.vlan_tag, 100);
    }

    #[tokio::test]
    async fn test_create_vlan_requires_site_name_with_multiple_sites() {
        let client = seeded_client();
        client.add_site(Site {
            uuid: "site-2".to_string(),
            name: "Site2".to_string(),
        });
        let params = params_from_yaml(
            r"
name: Lab
network_type: VLAN
vlan_tag: 100
",
        );

        let result = reconcile(&client, &params).await;
        assert!(result.is_err());

        let params = params_from_yaml(
            r"
name: Lab
network_type: VLAN
vlan_tag: 100
site_name: Site2
",
        );
        let result = reconcile(&client, &params).await.unwrap();
        assert!(result.changed);
    }

    #[tokio::test]
    async fn test_existing_vlan_is_noop_without_creation_fields() {
        let client = seeded_client();
        client.add_vlan(Vlan {
            uuid: "vlan-lab".to_string(),
            name: "Lab".to_string(),
            vlan_tag: 100,
        });
        let params = params_from_yaml(
            r"
name: Lab
network_type: VLAN
",
        );

        let result = reconcile(&client, &params).await.unwrap();
        assert!(!result.changed);
        assert!(!result.failed);
        assert!(result.msg.contains("already present"));
    }

    #[tokio::test]
    async fn test_existing_vlan_rejects_creation_fields() {
        let client = seeded_client();
        client.add_vlan(Vlan {
            uuid: "vlan-lab".to_string(),
            name: "Lab".to_string(),
            vlan_tag: 100,
        });
        let params = params_from_yaml(
            r"
name: Lab
network_type: VLAN
vlan_tag: 200
",
        );

        let result = reconcile(&client, &params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_vlan() {
        let client = seeded_client();
        client.add_vlan(Vlan {
            uuid: "vlan-lab".to_string(),
            name: "Lab".to_string(),
            vlan_tag: 100,
        });
        let params = params_from_yaml(
            r"
name: Lab
state: absent
network_type: VLAN
",
        );

        let result = reconcile(&client, &params).await.unwrap();
        assert!(result.changed);
        assert!(client.find_vlan_by_name("Lab").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_vlan_is_noop() {
        let client = seeded_client();
        let params = params_from_yaml(
            r"
name: Lab
state: absent
network_type: VLAN
",
        );

        let result = reconcile(&client, &params).await.unwrap();
        assert!(!result.changed);
        assert!(!result.failed);
    }

    #[tokio::test]
    async fn test_create_vnet_deploys_nfv_appliance() {
        let client = seeded_client();
        let params = params_from_yaml(VNET_YAML);

        let result = reconcile(&client, &params).await.unwrap();
        assert!(result.changed);
        assert!(!result.failed);

        let vnet = client.find_vnet_by_name("Internal").await.unwrap().unwrap();
        assert_eq!(vnet.network_address, "192.168.100.0");
        assert!(vnet.dhcp_service.is_some());
        assert!(vnet.routing_service.is_some());
        let nfv_uuid = vnet.nfv_instance_uuid.expect("NFV appliance deployed");
        assert!(client.get_instance(&nfv_uuid).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_vnet_rejects_dhcp_range_outside_subnet() {
        let client = seeded_client();
        let yaml = VNET_YAML.replace("192.168.100.200", "192.168.200.200");
        let params = params_from_yaml(&yaml);

        let result = reconcile(&client, &params).await;
        assert!(result.is_err());
        assert!(client.find_vnet_by_name("Internal").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_vnet_removes_nfv_instance_first() {
        let client = seeded_client();
        let params = params_from_yaml(VNET_YAML);
        reconcile(&client, &params).await.unwrap();
        let vnet = client.find_vnet_by_name("Internal").await.unwrap().unwrap();
        let nfv_uuid = vnet.nfv_instance_uuid.clone().unwrap();

        let params = params_from_yaml(
            r"
name: Internal
state: absent
network_type: VNET
",
        );
        let result = reconcile(&client, &params).await.unwrap();
        assert!(result.changed);
        assert!(client.find_vnet_by_name("Internal").await.unwrap().is_none());
        assert!(client.get_instance(&nfv_uuid).await.is_err());
    }
}
