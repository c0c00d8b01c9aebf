//! Implementation of the ResourceClient trait for InMemoryClient.

use async_trait::async_trait;
use tracing::trace;

use docdeploy_client::{
    AccountRef, AccountResource, ClientError, CollectionResource, CollectionSpec, DatabaseResource,
    DatabaseSpec, ResourceClient, StoredProcedureResource, StoredProcedureSpec, collection_path,
    database_path, stored_procedure_path,
};

use crate::journal::ClientCall;
use crate::storage::{CollectionEntry, InMemoryClient};

#[async_trait]
impl ResourceClient for InMemoryClient {
    async fn account(&self) -> Result<Option<AccountResource>, ClientError> {
        self.record(ClientCall::GetAccount, &self.account_ref.name)
            .await?;
        Ok(self.account.clone())
    }

    async fn get_database(&self, database: &str) -> Result<Option<DatabaseResource>, ClientError> {
        let path = database_path(database);
        self.record(
            ClientCall::GetDatabase {
                database: database.to_string(),
            },
            &path,
        )
        .await?;
        Ok(self.databases.pin().get(&path).cloned())
    }

    async fn create_database(&self, spec: &DatabaseSpec) -> Result<DatabaseResource, ClientError> {
        let path = database_path(&spec.id);
        self.record(
            ClientCall::CreateDatabase {
                database: spec.id.clone(),
            },
            &path,
        )
        .await?;

        let resource = DatabaseResource {
            id: spec.id.clone(),
            rid: None,
            etag: Some(self.next_etag()),
        };
        let guard = self.databases.pin();
        if guard.get(&path).is_some() {
            return Err(ClientError::already_exists(path));
        }
        guard.insert(path.clone(), resource.clone());
        trace!(%path, "created database");
        Ok(resource)
    }

    async fn get_collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Option<CollectionResource>, ClientError> {
        let path = collection_path(database, collection);
        self.record(
            ClientCall::GetCollection {
                database: database.to_string(),
                collection: collection.to_string(),
            },
            &path,
        )
        .await?;
        Ok(self.collections.pin().get(&path).map(|e| e.resource.clone()))
    }

    async fn create_collection(
        &self,
        database: &str,
        spec: &CollectionSpec,
    ) -> Result<CollectionResource, ClientError> {
        let path = collection_path(database, &spec.id);
        self.record(
            ClientCall::CreateCollection {
                database: database.to_string(),
                spec: spec.clone(),
            },
            &path,
        )
        .await?;

        if !self.databases.pin().contains_key(&database_path(database)) {
            return Err(ClientError::not_found(database_path(database)));
        }
        if spec.offer_throughput == 0 {
            return Err(ClientError::invalid_resource(
                path,
                "offer throughput must be positive",
            ));
        }

        let resource = CollectionResource {
            id: spec.id.clone(),
            partition_key: spec.partition_key.clone(),
            indexing_policy: Some(spec.indexing_policy.clone()),
            etag: Some(self.next_etag()),
        };
        let guard = self.collections.pin();
        if guard.get(&path).is_some() {
            return Err(ClientError::already_exists(path));
        }
        guard.insert(
            path.clone(),
            CollectionEntry {
                resource: resource.clone(),
                offer_throughput: Some(spec.offer_throughput),
            },
        );
        trace!(%path, "created collection");
        Ok(resource)
    }

    async fn get_stored_procedure(
        &self,
        database: &str,
        collection: &str,
        procedure: &str,
    ) -> Result<Option<StoredProcedureResource>, ClientError> {
        let path = stored_procedure_path(database, collection, procedure);
        self.record(
            ClientCall::GetStoredProcedure {
                database: database.to_string(),
                collection: collection.to_string(),
                procedure: procedure.to_string(),
            },
            &path,
        )
        .await?;
        Ok(self.procedures.pin().get(&path).cloned())
    }

    async fn create_stored_procedure(
        &self,
        database: &str,
        collection: &str,
        spec: &StoredProcedureSpec,
    ) -> Result<StoredProcedureResource, ClientError> {
        let path = stored_procedure_path(database, collection, &spec.id);
        self.record(
            ClientCall::CreateStoredProcedure {
                database: database.to_string(),
                collection: collection.to_string(),
                spec: spec.clone(),
            },
            &path,
        )
        .await?;

        if !self
            .collections
            .pin()
            .contains_key(&collection_path(database, collection))
        {
            return Err(ClientError::not_found(collection_path(database, collection)));
        }

        let resource = StoredProcedureResource {
            id: spec.id.clone(),
            body: spec.body.clone(),
            etag: Some(self.next_etag()),
        };
        let guard = self.procedures.pin();
        if guard.get(&path).is_some() {
            return Err(ClientError::already_exists(path));
        }
        guard.insert(path.clone(), resource.clone());
        trace!(%path, "created stored procedure");
        Ok(resource)
    }

    async fn update_stored_procedure(
        &self,
        database: &str,
        collection: &str,
        spec: &StoredProcedureSpec,
    ) -> Result<StoredProcedureResource, ClientError> {
        let path = stored_procedure_path(database, collection, &spec.id);
        self.record(
            ClientCall::UpdateStoredProcedure {
                database: database.to_string(),
                collection: collection.to_string(),
                spec: spec.clone(),
            },
            &path,
        )
        .await?;

        let guard = self.procedures.pin();
        if guard.get(&path).is_none() {
            return Err(ClientError::not_found(path));
        }
        let resource = StoredProcedureResource {
            id: spec.id.clone(),
            body: spec.body.clone(),
            etag: Some(self.next_etag()),
        };
        guard.insert(path.clone(), resource.clone());
        trace!(%path, "replaced stored procedure");
        Ok(resource)
    }

    fn account_ref(&self) -> &AccountRef {
        &self.account_ref
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::ClientOperation;
    use docdeploy_client::{IndexingPolicyDescriptor, PartitionKeyDefinition};
    use docdeploy_core::IndexingMode;

    fn as_client(client: &InMemoryClient) -> &dyn ResourceClient {
        client
    }

    fn collection_spec(name: &str) -> CollectionSpec {
        CollectionSpec {
            id: name.to_string(),
            partition_key: PartitionKeyDefinition::hash("/pk"),
            indexing_policy: IndexingPolicyDescriptor {
                automatic: true,
                indexing_mode: IndexingMode::Consistent,
                included_paths: vec![],
                excluded_paths: vec![],
            },
            offer_throughput: 400,
        }
    }

    #[tokio::test]
    async fn test_account_lookup() {
        let client = InMemoryClient::new();
        let account = as_client(&client).account().await.unwrap();
        assert_eq!(account.unwrap().name, "local");

        let missing = InMemoryClient::without_account();
        assert!(as_client(&missing).account().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_database_create_and_get() {
        let client = InMemoryClient::new();
        let api = as_client(&client);

        assert!(api.get_database("D1").await.unwrap().is_none());
        let created = api
            .create_database(&DatabaseSpec { id: "D1".into() })
            .await
            .unwrap();
        assert_eq!(created.id, "D1");
        assert!(api.get_database("D1").await.unwrap().is_some());

        let err = api
            .create_database(&DatabaseSpec { id: "D1".into() })
            .await
            .unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_collection_requires_database() {
        let client = InMemoryClient::new();
        let err = as_client(&client)
            .create_collection("D1", &collection_spec("C1"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        client.seed_database("D1");
        as_client(&client)
            .create_collection("D1", &collection_spec("C1"))
            .await
            .unwrap();
        let entry = client.collection("D1", "C1").unwrap();
        assert_eq!(entry.offer_throughput, Some(400));
        assert!(entry.resource.partition_key.is_single_path("/pk"));
    }

    #[tokio::test]
    async fn test_stored_procedure_update_replaces_body() {
        let client = InMemoryClient::new();
        client.seed_database("D1");
        client.seed_collection("D1", "C1", "/pk");
        client.seed_stored_procedure("D1", "C1", "SP1", "function(){}");

        let spec = StoredProcedureSpec {
            id: "SP1".into(),
            body: "function(x){}".into(),
        };
        as_client(&client)
            .update_stored_procedure("D1", "C1", &spec)
            .await
            .unwrap();
        assert_eq!(
            client.stored_procedure_body("D1", "C1", "SP1").as_deref(),
            Some("function(x){}")
        );

        let missing = StoredProcedureSpec {
            id: "SP2".into(),
            body: String::new(),
        };
        let err = as_client(&client)
            .update_stored_procedure("D1", "C1", &missing)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_journal_records_in_order() {
        let client = InMemoryClient::new();
        let api = as_client(&client);
        api.account().await.unwrap();
        api.get_database("D1").await.unwrap();
        api.create_database(&DatabaseSpec { id: "D1".into() })
            .await
            .unwrap();

        let ops: Vec<_> = client.calls().await.iter().map(|c| c.operation()).collect();
        assert_eq!(
            ops,
            vec![
                ClientOperation::GetAccount,
                ClientOperation::GetDatabase,
                ClientOperation::CreateDatabase
            ]
        );
        assert_eq!(client.mutating_calls().await.len(), 1);

        client.clear_calls().await;
        assert!(client.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_is_transport_error() {
        let client = InMemoryClient::new();
        client.fail_on(ClientOperation::GetCollection, "dbs/D1/colls/C1");

        let err = as_client(&client)
            .get_collection("D1", "C1")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Connection { .. }));
        assert!(as_client(&client).get_collection("D1", "C2").await.is_ok());
    }
}
