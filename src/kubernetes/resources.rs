// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Persistence of cluster-scoped kpack resources

use crate::error::{KpError, Result};
use async_trait::async_trait;
use kube::{
    api::{DeleteParams, PostParams},
    Api, Client, Resource, ResourceExt,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use tracing::{debug, info, instrument};

/// Get/create/update/delete of one resource kind.
///
/// `update` carries the resourceVersion read by `get`; a stale version fails
/// with `KpError::Conflict` and is never retried here.
#[async_trait]
pub trait ResourceClient<K>: Send + Sync {
    async fn get(&self, name: &str) -> Result<K>;
    async fn create(&self, resource: &K) -> Result<K>;
    async fn update(&self, resource: &K) -> Result<K>;
    async fn delete(&self, name: &str) -> Result<()>;
}

/// `ResourceClient` over the Kubernetes API
pub struct KubeResources<K> {
    api: Api<K>,
}

impl<K> KubeResources<K>
where
    K: Resource<DynamicType = ()>,
{
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }
}

fn kind<K: Resource<DynamicType = ()>>() -> String {
    K::kind(&()).to_string()
}

/// Map API status codes onto the error taxonomy
fn classify<K: Resource<DynamicType = ()>>(err: kube::Error, name: &str) -> KpError {
    match err {
        kube::Error::Api(ref response) if response.code == 404 => KpError::NotFound {
            kind: kind::<K>(),
            name: name.to_string(),
        },
        kube::Error::Api(ref response) if response.reason == "AlreadyExists" => {
            KpError::AlreadyExists {
                kind: kind::<K>(),
                name: name.to_string(),
            }
        }
        kube::Error::Api(ref response) if response.code == 409 => KpError::Conflict {
            kind: kind::<K>(),
            name: name.to_string(),
        },
        e => KpError::KubeError(e),
    }
}

#[async_trait]
impl<K> ResourceClient<K> for KubeResources<K>
where
    K: Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    #[instrument(skip(self), fields(kind = %kind::<K>()))]
    async fn get(&self, name: &str) -> Result<K> {
        debug!("Getting {}", name);
        self.api.get(name).await.map_err(|e| classify::<K>(e, name))
    }

    #[instrument(skip(self, resource), fields(kind = %kind::<K>(), name = %resource.name_any()))]
    async fn create(&self, resource: &K) -> Result<K> {
        let name = resource.name_any();
        let created = self
            .api
            .create(&PostParams::default(), resource)
            .await
            .map_err(|e| classify::<K>(e, &name))?;
        info!("{} {} created", kind::<K>(), name);
        Ok(created)
    }

    #[instrument(skip(self, resource), fields(kind = %kind::<K>(), name = %resource.name_any()))]
    async fn update(&self, resource: &K) -> Result<K> {
        let name = resource.name_any();
        let updated = self
            .api
            .replace(&name, &PostParams::default(), resource)
            .await
            .map_err(|e| classify::<K>(e, &name))?;
        info!("{} {} updated", kind::<K>(), name);
        Ok(updated)
    }

    #[instrument(skip(self), fields(kind = %kind::<K>()))]
    async fn delete(&self, name: &str) -> Result<()> {
        self.api
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| classify::<K>(e, name))?;
        info!("{} {} deleted", kind::<K>(), name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{status_json, MockService};
    use crate::types::{ClusterStore, ClusterStoreSpec, StoreImage};

    const STORES: &str = "/apis/kpack.io/v1alpha1/clusterstores";

    fn store_json(name: &str, version: &str) -> String {
        serde_json::json!({
            "apiVersion": "kpack.io/v1alpha1",
            "kind": "ClusterStore",
            "metadata": { "name": name, "resourceVersion": version },
            "spec": { "sources": [{ "image": "canonical.example/repo/default@sha256:aa" }] }
        })
        .to_string()
    }

    fn make_store(name: &str) -> ClusterStore {
        let mut store = ClusterStore::new(
            name,
            ClusterStoreSpec {
                sources: vec![StoreImage {
                    image: "canonical.example/repo/default@sha256:aa".to_string(),
                }],
            },
        );
        store.metadata.resource_version = Some("1".to_string());
        store
    }

    #[tokio::test]
    async fn test_get_existing_store() {
        let client = MockService::new()
            .on_get(&format!("{}/default", STORES), 200, &store_json("default", "7"))
            .into_client();

        let store = KubeResources::<ClusterStore>::new(client)
            .get("default")
            .await
            .unwrap();

        assert_eq!(store.name_any(), "default");
        assert_eq!(store.resource_version().as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_get_missing_store_is_not_found() {
        let client = MockService::new().into_client();

        let err = KubeResources::<ClusterStore>::new(client)
            .get("missing")
            .await
            .unwrap_err();

        match err {
            KpError::NotFound { kind, name } => {
                assert_eq!(kind, "ClusterStore");
                assert_eq!(name, "missing");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_create_store() {
        let client = MockService::new()
            .on_post(STORES, 201, &store_json("default", "1"))
            .into_client();

        let created = KubeResources::<ClusterStore>::new(client)
            .create(&make_store("default"))
            .await
            .unwrap();

        assert_eq!(created.spec.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_create_existing_store_already_exists() {
        let client = MockService::new()
            .on_post(
                STORES,
                409,
                &status_json(409, "AlreadyExists", "clusterstores.kpack.io \"default\" already exists"),
            )
            .into_client();

        let err = KubeResources::<ClusterStore>::new(client)
            .create(&make_store("default"))
            .await
            .unwrap_err();

        assert!(matches!(err, KpError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_update_stale_store_is_conflict() {
        let client = MockService::new()
            .on_put(
                &format!("{}/default", STORES),
                409,
                &status_json(409, "Conflict", "the object has been modified"),
            )
            .into_client();

        let err = KubeResources::<ClusterStore>::new(client)
            .update(&make_store("default"))
            .await
            .unwrap_err();

        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_delete_missing_store_is_not_found() {
        let client = MockService::new().into_client();

        let err = KubeResources::<ClusterStore>::new(client)
            .delete("default")
            .await
            .unwrap_err();

        assert!(matches!(err, KpError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_server_error_is_passed_through() {
        let client = MockService::new()
            .on_get(
                &format!("{}/default", STORES),
                500,
                &status_json(500, "InternalError", "etcd unavailable"),
            )
            .into_client();

        let err = KubeResources::<ClusterStore>::new(client)
            .get("default")
            .await
            .unwrap_err();

        assert!(matches!(err, KpError::KubeError(_)));
    }
}
