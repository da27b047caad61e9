//! Unit tests for the instance reconciler

#[cfg(test)]
mod tests {
    use crate::params::{DesiredState, InstanceParams};
    use crate::reconciler::instance::{power_plan, reconcile};
    use tacp_client::{
        BootDevice, Datacenter, Instance, InstanceState, MigrationZone, MockTacpClient,
        PowerAction, StoragePool, TacpClientTrait, Template, Vlan,
    };

    fn instance_yaml(state: &str) -> String {
        format!(
            r"
name: Web Server 1
state: {state}
datacenter: Datacenter1
migration_zone: Zone1
storage_pool: Pool1
template: CentOS 7.5 (64-bit) - Lenovo Template
vcpu_cores: 2
memory: 4G
disks:
  - name: Disk 0
    size_gb: 50
    boot_order: 1
nics:
  - name: vNIC 0
    type: VLAN
    network: Lab
    boot_order: 2
"
        )
    }

    fn params_from_yaml(yaml: &str) -> InstanceParams {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn seeded_client() -> MockTacpClient {
        let client = MockTacpClient::new("https://test-portal");
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
        client.add_template(Template {
            uuid: "tpl-1".to_string(),
            name: "CentOS 7.5 (64-bit) - Lenovo Template".to_string(),
            boot_order: vec![
                BootDevice {
                    name: "Disk 0".to_string(),
                    order: 1,
                    disk_uuid: Some("tpl-disk-0".to_string()),
                    vnic_uuid: None,
                },
                BootDevice {
                    name: "vNIC 0".to_string(),
                    order: 2,
                    disk_uuid: None,
                    vnic_uuid: Some("tpl-vnic-0".to_string()),
                },
            ],
        });
        client.add_vlan(Vlan {
            uuid: "vlan-1".to_string(),
            name: "Lab".to_string(),
            vlan_tag: 100,
        });
        client
    }

    fn existing_instance(status: InstanceState) -> Instance {
        Instance {
            uuid: "app-1".to_string(),
            name: "Web Server 1".to_string(),
            status,
            datacenter_uuid: "dc-1".to_string(),
            migration_zone_uuid: Some("mz-1".to_string()),
            flash_pool_uuid: Some("pool-1".to_string()),
            template_uuid: Some("tpl-1".to_string()),
            vcpus: 2,
            memory: 4 * 1024 * 1024 * 1024,
            vm_mode: Some("Enhanced".to_string()),
            description: None,
            boot_order: Vec::new(),
            disks: Vec::new(),
            application_group_uuid: None,
        }
    }

    #[test]
    fn test_power_plan_running_started_is_noop() {
        assert!(power_plan(InstanceState::Running, DesiredState::Started).is_empty());
    }

    #[test]
    fn test_power_plan_paused_shutdown_resumes_first() {
        assert_eq!(
            power_plan(InstanceState::Paused, DesiredState::Shutdown),
            vec![PowerAction::Resume, PowerAction::Shutdown]
        );
    }

    #[test]
    fn test_power_plan_shutdown_restarted_starts() {
        assert_eq!(
            power_plan(InstanceState::ShutDown, DesiredState::Restarted),
            vec![PowerAction::Start]
        );
    }

    #[test]
    fn test_power_plan_shutdown_paused_starts_then_pauses() {
        assert_eq!(
            power_plan(InstanceState::ShutDown, DesiredState::Paused),
            vec![PowerAction::Start, PowerAction::Pause]
        );
    }

    #[tokio::test]
    async fn test_create_instance_and_start() {
        let client = seeded_client();
        let params = params_from_yaml(&instance_yaml("started"));

        let result = reconcile(&client, &params).await.unwrap();
        assert!(result.changed);
        assert!(!result.failed);
        assert!(result.resource.is_some());

        let instance = client
            .find_instance_by_name("Web Server 1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(instance.status, InstanceState::Running);
        assert_eq!(instance.vcpus, 2);
        assert_eq!(instance.memory, 4 * 1024 * 1024 * 1024);
        assert_eq!(
            client.power_log(),
            vec![(instance.uuid.clone(), PowerAction::Start)]
        );
    }

    #[tokio::test]
    async fn test_create_adds_devices_not_in_template() {
        let client = seeded_client();
        let mut params = params_from_yaml(&instance_yaml("shutdown"));
        params.disks.push(crate::params::DiskParams {
            name: "Disk 1".to_string(),
            size_gb: 200,
            boot_order: 3,
        });

        let result = reconcile(&client, &params).await.unwrap();
        assert!(result.changed);
        assert!(!result.failed);

        let instance = client
            .find_instance_by_name("Web Server 1")
            .await
            .unwrap()
            .unwrap();
        assert!(instance.disks.iter().any(|d| d.name == "Disk 1"));
        // Boot order was rewritten from the declared device orders
        let orders: Vec<u32> = instance.boot_order.iter().map(|d| d.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        // shutdown on a freshly created instance issues no power action
        assert!(client.power_log().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_boot_order() {
        let client = seeded_client();
        let mut params = params_from_yaml(&instance_yaml("started"));
        params.nics[0].boot_order = 1;

        let result = reconcile(&client, &params).await;
        assert!(result.is_err());
        assert!(client
            .find_instance_by_name("Web Server 1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_fails_fast_on_unknown_template() {
        let client = seeded_client();
        let mut params = params_from_yaml(&instance_yaml("started"));
        params.template = Some("No Such Template".to_string());

        let result = reconcile(&client, &params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_partial_failure_reports_changed() {
        let client = seeded_client();
        let mut params = params_from_yaml(&instance_yaml("started"));
        // Not in the template and pointing at a network that does not exist,
        // so the vNIC step fails after the instance was created
        params.nics.push(crate::params::NicParams {
            name: "vNIC 1".to_string(),
            network_type: crate::params::NetworkKind::Vlan,
            network: "No Such Network".to_string(),
            boot_order: 3,
            mac_address: None,
            firewall_override: None,
        });

        let result = reconcile(&client, &params).await.unwrap();
        assert!(result.failed);
        assert!(result.changed);
        assert!(result.msg.contains("vNIC"));
        assert!(client
            .find_instance_by_name("Web Server 1")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_absent_missing_instance_is_noop() {
        let client = seeded_client();
        let params = params_from_yaml(
            r"
name: Web Server 1
state: absent
",
        );

        let result = reconcile(&client, &params).await.unwrap();
        assert!(!result.changed);
        assert!(!result.failed);
    }

    #[tokio::test]
    async fn test_absent_deletes_existing_instance() {
        let client = seeded_client();
        client.add_instance(existing_instance(InstanceState::Running));
        let params = params_from_yaml(
            r"
name: Web Server 1
state: absent
",
        );

        let result = reconcile(&client, &params).await.unwrap();
        assert!(result.changed);
        assert!(client
            .find_instance_by_name("Web Server 1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_existing_instance_rejects_creation_parameters() {
        let client = seeded_client();
        client.add_instance(existing_instance(InstanceState::Running));
        let params = params_from_yaml(&instance_yaml("restarted"));

        let result = reconcile(&client, &params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_existing_running_instance_shutdown() {
        let client = seeded_client();
        client.add_instance(existing_instance(InstanceState::Running));
        let params = params_from_yaml(
            r"
name: Web Server 1
state: shutdown
",
        );

        let result = reconcile(&client, &params).await.unwrap();
        assert!(result.changed);
        assert_eq!(
            client.power_log(),
            vec![("app-1".to_string(), PowerAction::Shutdown)]
        );
    }

    #[tokio::test]
    async fn test_existing_instance_already_in_desired_state() {
        let client = seeded_client();
        client.add_instance(existing_instance(InstanceState::Running));
        let params = params_from_yaml(
            r"
name: Web Server 1
state: started
",
        );

        let result = reconcile(&client, &params).await.unwrap();
        assert!(!result.changed);
        assert!(client.power_log().is_empty());
    }

    #[tokio::test]
    async fn test_restarted_always_issues_power_action() {
        let client = seeded_client();
        client.add_instance(existing_instance(InstanceState::ShutDown));
        let params = params_from_yaml(
            r"
name: Web Server 1
state: restarted
",
        );

        let result = reconcile(&client, &params).await.unwrap();
        assert!(result.changed);
        assert_eq!(
            client.power_log(),
            vec![("app-1".to_string(), PowerAction::Start)]
        );
    }
}
