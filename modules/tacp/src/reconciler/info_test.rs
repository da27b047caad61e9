//! Unit tests for the info handler

#[cfg(test)]
mod tests {
    use crate::params::InfoParams;
    use crate::reconciler::info::query;
    use tacp_client::{MockTacpClient, StoragePool};

    #[tokio::test]
    async fn test_query_storage_pools() {
        let client = MockTacpClient::new("https://test-portal");
        client.add_storage_pool(StoragePool {
            uuid: "pool-1".to_string(),
            name: "Pool1".to_string(),
        });
        client.add_storage_pool(StoragePool {
            uuid: "pool-2".to_string(),
            name: "Pool2".to_string(),
        });
        let params: InfoParams = serde_yaml::from_str("resource: storage_pool").unwrap();

        let result = query(&client, &params).await.unwrap();
        assert!(!result.changed);
        assert!(!result.failed);
        assert!(result.msg.contains('2'));
        let resource = result.resource.unwrap();
        assert_eq!(resource.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_query_empty_kind() {
        let client = MockTacpClient::new("https://test-portal");
        let params: InfoParams = serde_yaml::from_str("resource: datacenter").unwrap();

        let result = query(&client, &params).await.unwrap();
        assert!(!result.changed);
        assert_eq!(result.resource.unwrap().as_array().unwrap().len(), 0);
    }
}
