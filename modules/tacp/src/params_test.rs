//! Unit tests for task-parameter parsing and validation

#[cfg(test)]
mod tests {
    use crate::params::*;

    fn disk(name: &str, size_gb: u64, boot_order: u32) -> DiskParams {
        DiskParams { name: name.to_string(), size_gb, boot_order }
    }

    fn nic(name: &str, boot_order: u32) -> NicParams {
        NicParams {
            name: name.to_string(),
            network_type: NetworkKind::Vlan,
            network: "Lab".to_string(),
            boot_order,
            mac_address: None,
            firewall_override: None,
        }
    }

    #[test]
    fn test_parse_memory_plain_bytes() {
        assert_eq!(parse_memory("4096").unwrap(), 4096);
    }

    #[test]
    fn test_parse_memory_suffixes() {
        assert_eq!(parse_memory("4G").unwrap(), 4 * 1024 * 1024 * 1024);
        assert_eq!(parse_memory("8gb").unwrap(), 8 * 1024 * 1024 * 1024);
        assert_eq!(parse_memory("512MB").unwrap(), 512 * 1024 * 1024);
        assert_eq!(parse_memory("2k").unwrap(), 2048);
        assert_eq!(parse_memory("1TB").unwrap(), 1024_u64.pow(4));
    }

    #[test]
    fn test_parse_memory_rejects_overflowing_amount() {
        assert!(parse_memory("18446744073709551615g").is_err());
        assert!(parse_memory(&format!("{}t", u64::MAX / 1024)).is_err());
    }

    #[test]
    fn test_parse_memory_rejects_garbage() {
        assert!(parse_memory("lots").is_err());
        assert!(parse_memory("4X").is_err());
        assert!(parse_memory("G4").is_err());
        assert!(parse_memory("").is_err());
    }

    #[test]
    fn test_boot_order_valid() {
        let disks = vec![disk("Disk 0", 50, 1), disk("Disk 1", 100, 3)];
        let nics = vec![nic("vNIC 0", 2)];
        assert!(validate_boot_order(&disks, &nics).is_ok());
    }

    #[test]
    fn test_boot_order_duplicate_rejected() {
        let disks = vec![disk("Disk 0", 50, 1)];
        let nics = vec![nic("vNIC 0", 1)];
        assert!(validate_boot_order(&disks, &nics).is_err());
    }

    #[test]
    fn test_boot_order_must_start_at_one() {
        let disks = vec![disk("Disk 0", 50, 2)];
        let nics = vec![nic("vNIC 0", 3)];
        assert!(validate_boot_order(&disks, &nics).is_err());
    }

    #[test]
    fn test_mac_address_format() {
        assert!(is_valid_mac("aa:bb:cc:dd:ee:ff"));
        assert!(is_valid_mac("00:11:22:33:44:55"));
        assert!(!is_valid_mac("aa-bb-cc-dd-ee-ff"));
        assert!(!is_valid_mac("aa:bb:cc:dd:ee"));
        assert!(!is_valid_mac("aa:bb:cc:dd:ee:fg"));
    }

    #[test]
    fn test_dhcp_range_inside_subnet() {
        assert!(
            validate_dhcp_range("192.168.1.0", "255.255.255.0", "192.168.1.10", "192.168.1.100")
                .is_ok()
        );
    }

    #[test]
    fn test_dhcp_range_outside_subnet_rejected() {
        assert!(
            validate_dhcp_range("192.168.1.0", "255.255.255.0", "192.168.2.10", "192.168.2.100")
                .is_err()
        );
    }

    #[test]
    fn test_dhcp_range_reversed_rejected() {
        assert!(
            validate_dhcp_range("192.168.1.0", "255.255.255.0", "192.168.1.100", "192.168.1.10")
                .is_err()
        );
    }

    #[test]
    fn test_instance_params_from_yaml_defaults() {
        let yaml = r"
name: Web Server 1
state: started
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
";
        let params: InstanceParams = serde_yaml::from_str(yaml).unwrap();
        assert!(params.vtx_enabled);
        assert!(params.auto_recovery_enabled);
        assert_eq!(params.vm_mode, VmMode::Enhanced);
        assert!(params.validate_for_create().is_ok());
    }

    #[test]
    fn test_instance_params_missing_creation_fields() {
        let yaml = r"
name: Web Server 1
state: started
";
        let params: InstanceParams = serde_yaml::from_str(yaml).unwrap();
        let err = params.validate_for_create().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("datacenter"));
        assert!(msg.contains("memory"));
    }

    #[test]
    fn test_instance_creation_only_fields() {
        let yaml = r"
name: Web Server 1
state: restarted
template: CentOS 7.5 (64-bit) - Lenovo Template
";
        let params: InstanceParams = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params.creation_only_fields_supplied(), vec!["template"]);
    }

    #[test]
    fn test_network_params_vlan_tag_range() {
        let yaml = r"
name: Lab
network_type: VLAN
vlan_tag: 4095
";
        let params: NetworkParams = serde_yaml::from_str(yaml).unwrap();
        assert!(params.validate_for_create().is_err());

        let yaml = r"
name: Lab
network_type: VLAN
vlan_tag: 4094
";
        let params: NetworkParams = serde_yaml::from_str(yaml).unwrap();
        assert!(params.validate_for_create().is_ok());
    }

    #[test]
    fn test_network_params_vnet_requires_services() {
        let yaml = r"
name: Internal
network_type: VNET
";
        let params: NetworkParams = serde_yaml::from_str(yaml).unwrap();
        let msg = params.validate_for_create().unwrap_err().to_string();
        assert!(msg.contains("dhcp"));
        assert!(msg.contains("routing"));
    }

    #[test]
    fn test_network_params_nfv_defaults() {
        let yaml = r"
name: Internal
network_type: VNET
nfv:
  datacenter: Datacenter1
";
        let params: NetworkParams = serde_yaml::from_str(yaml).unwrap();
        let nfv = params.nfv.unwrap();
        assert_eq!(nfv.cpu_cores, 1);
        assert_eq!(parse_memory(&nfv.memory).unwrap(), 1024 * 1024 * 1024);
        assert!(nfv.auto_recovery);
    }

    #[test]
    fn test_info_params_resource_kinds() {
        let params: InfoParams = serde_yaml::from_str("resource: storage_pool").unwrap();
        assert_eq!(params.resource, ResourceKind::StoragePool);
        assert_eq!(params.resource.as_str(), "storage_pool");
    }

    #[test]
    fn test_presence_defaults_to_present() {
        let yaml = r"
name: Lab
network_type: VLAN
vlan_tag: 100
";
        let params: NetworkParams = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params.state, Presence::Present);
    }
}
