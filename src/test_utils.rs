// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: an in-memory registry, in-memory resources, and a mock
//! Kubernetes API.

use crate::constants::labels;
use crate::error::{KpError, Result};
use crate::image::{manifest_bytes, ImageFetcher, ImageHandle, ImageRelocator, RelocatedReference};
use crate::kubernetes::ResourceClient;
use async_trait::async_trait;
use http::{Request, Response};
use kube::client::Body;
use kube::{Client, Resource, ResourceExt};
use oci_distribution::client::{Config as BlobConfig, ImageLayer};
use oci_distribution::manifest::OciImageManifest;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// Build an image whose config carries `labels` and whose single layer holds `content`.
pub fn make_image(source: &str, labels: BTreeMap<String, String>, content: &str) -> ImageHandle {
    let config = serde_json::json!({
        "architecture": "amd64",
        "os": "linux",
        "config": { "Labels": labels },
    });
    let config = BlobConfig::new(
        serde_json::to_vec(&config).unwrap(),
        "application/vnd.oci.image.config.v1+json".to_string(),
        None,
    );
    let layer = ImageLayer::new(
        content.as_bytes().to_vec(),
        "application/vnd.oci.image.layer.v1.tar".to_string(),
        None,
    );
    let manifest = OciImageManifest::build(std::slice::from_ref(&layer), &config, None);
    ImageHandle::new(source, manifest, config, vec![layer]).unwrap()
}

/// Labels of a buildpackage, optionally aggregating `children` in one order group
pub fn buildpackage_labels(
    id: &str,
    version: &str,
    children: &[(&str, &str)],
) -> BTreeMap<String, String> {
    let metadata = serde_json::json!({
        "id": id,
        "version": version,
        "homepage": format!("https://example.com/{}", id),
        "stacks": [{ "id": "io.buildpacks.stacks.bionic" }],
    });
    let group: Vec<_> = children
        .iter()
        .map(|(id, version)| serde_json::json!({ "id": id, "version": version }))
        .collect();
    let layers = serde_json::json!({
        id: { version: { "api": "0.2", "order": [{ "group": group }] } }
    });

    BTreeMap::from([
        (labels::BUILDPACKAGE_METADATA.to_string(), metadata.to_string()),
        (labels::BUILDPACK_LAYERS.to_string(), layers.to_string()),
    ])
}

/// Write `image` as an OCI layout tarball
pub fn write_layout_archive(path: &Path, image: &ImageHandle) {
    let mut builder = tar::Builder::new(File::create(path).unwrap());
    let mut append = |name: &str, data: &[u8]| {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, data).unwrap();
    };
    let blob_path = |digest: &str| format!("blobs/{}", digest.replace(':', "/"));

    let manifest = manifest_bytes(image.manifest()).unwrap();
    let index = serde_json::json!({
        "schemaVersion": 2,
        "manifests": [{
            "mediaType": "application/vnd.oci.image.manifest.v1+json",
            "digest": image.digest(),
            "size": manifest.len(),
        }]
    });

    append("oci-layout", br#"{"imageLayoutVersion":"1.0.0"}"#);
    append("index.json", &serde_json::to_vec(&index).unwrap());
    append(&blob_path(image.digest()), &manifest);
    append(&blob_path(&image.manifest().config.digest), &image.config().data);
    for (descriptor, layer) in image.manifest().layers.iter().zip(image.layers()) {
        append(&blob_path(&descriptor.digest), &layer.data);
    }
    drop(append);
    builder.finish().unwrap();
}

/// In-memory registry. Relocated images become fetchable under their new reference.
#[derive(Default)]
pub struct FakeRegistry {
    images: Mutex<HashMap<String, ImageHandle>>,
    relocations: Mutex<Vec<(String, String)>>,
    failing_destinations: Mutex<HashSet<String>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `image` fetchable under its source reference
    pub fn add(&self, image: ImageHandle) {
        self.images
            .lock()
            .unwrap()
            .insert(image.source().to_string(), image);
    }

    pub fn get(&self, reference: &str) -> Option<ImageHandle> {
        self.images.lock().unwrap().get(reference).cloned()
    }

    /// `(source, destination)` pairs in call order
    pub fn relocations(&self) -> Vec<(String, String)> {
        self.relocations.lock().unwrap().clone()
    }

    pub fn fail_relocations_to(&self, destination: &str) {
        self.failing_destinations
            .lock()
            .unwrap()
            .insert(destination.to_string());
    }
}

#[async_trait]
impl ImageFetcher for FakeRegistry {
    async fn fetch(&self, reference: &str) -> Result<ImageHandle> {
        self.get(reference).ok_or_else(|| KpError::FetchFailed {
            reference: reference.to_string(),
            reason: "MANIFEST_UNKNOWN: manifest unknown".to_string(),
        })
    }
}

#[async_trait]
impl ImageRelocator for FakeRegistry {
    async fn relocate(
        &self,
        image: &ImageHandle,
        destination: &str,
    ) -> Result<RelocatedReference> {
        if self.failing_destinations.lock().unwrap().contains(destination) {
            return Err(KpError::RelocationFailed {
                image: image.source().to_string(),
                destination: destination.to_string(),
                reason: "UNAUTHORIZED: authentication required".to_string(),
            });
        }

        let relocated = RelocatedReference::new(destination, image.digest())?;
        self.relocations
            .lock()
            .unwrap()
            .push((image.source().to_string(), destination.to_string()));
        self.images
            .lock()
            .unwrap()
            .insert(relocated.to_string(), image.clone());
        Ok(relocated)
    }
}

/// In-memory resources with resourceVersion checks on update.
pub struct FakeResources<K> {
    items: Mutex<BTreeMap<String, K>>,
    next_version: Mutex<u64>,
}

impl<K> Default for FakeResources<K> {
    fn default() -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            next_version: Mutex::new(1),
        }
    }
}

impl<K> FakeResources<K>
where
    K: Resource<DynamicType = ()> + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `resource` as if another client had created it
    pub fn seed(&self, mut resource: K) -> K {
        resource.meta_mut().resource_version = Some(self.bump());
        self.items
            .lock()
            .unwrap()
            .insert(resource.name_any(), resource.clone());
        resource
    }

    pub fn stored(&self, name: &str) -> Option<K> {
        self.items.lock().unwrap().get(name).cloned()
    }

    fn bump(&self) -> String {
        let mut next = self.next_version.lock().unwrap();
        let version = next.to_string();
        *next += 1;
        version
    }

    fn kind() -> String {
        K::kind(&()).to_string()
    }
}

#[async_trait]
impl<K> ResourceClient<K> for FakeResources<K>
where
    K: Resource<DynamicType = ()> + Clone + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> Result<K> {
        self.stored(name).ok_or_else(|| KpError::NotFound {
            kind: Self::kind(),
            name: name.to_string(),
        })
    }

    async fn create(&self, resource: &K) -> Result<K> {
        let name = resource.name_any();
        if self.stored(&name).is_some() {
            return Err(KpError::AlreadyExists {
                kind: Self::kind(),
                name,
            });
        }
        Ok(self.seed(resource.clone()))
    }

    async fn update(&self, resource: &K) -> Result<K> {
        let name = resource.name_any();
        let current = self.get(&name).await?;
        if current.resource_version() != resource.resource_version() {
            return Err(KpError::Conflict {
                kind: Self::kind(),
                name,
            });
        }
        Ok(self.seed(resource.clone()))
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| KpError::NotFound {
                kind: Self::kind(),
                name: name.to_string(),
            })
    }
}

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, status_json(404, "NotFound", "not found")));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// A Kubernetes `Status` failure body
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}
