use crate::types::PodIdentity;
use anyhow::Context;
use async_trait::async_trait;
use futures::io::AsyncRead;
use k8s_openapi::api::core::v1::{Event, Pod};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{
    Api, Client, Config,
    api::{ListParams, LogParams},
};
use std::path::Path;
use std::pin::Pin;
use tracing::info;

/// Owned handle to an open pod log stream. Dropping it releases the connection.
pub type LogStream = Pin<Box<dyn AsyncRead + Send>>;

/// The read-only slice of the Kubernetes API the pod tools need.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Open the log stream of a pod.
    async fn log_stream(&self, pod: &PodIdentity, params: &LogParams)
    -> anyhow::Result<LogStream>;

    /// Fetch a pod object.
    async fn get_pod(&self, pod: &PodIdentity) -> anyhow::Result<Pod>;

    /// List events in a namespace, filtered server side by `params`.
    async fn list_events(&self, namespace: &str, params: &ListParams)
    -> anyhow::Result<Vec<Event>>;
}

/// `ClusterApi` backed by a live `kube::Client`.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn log_stream(
        &self,
        pod: &PodIdentity,
        params: &LogParams,
    ) -> anyhow::Result<LogStream> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), &pod.namespace);
        let stream = api.log_stream(&pod.name, params).await?;
        Ok(Box::pin(stream))
    }

    async fn get_pod(&self, pod: &PodIdentity) -> anyhow::Result<Pod> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), &pod.namespace);
        Ok(api.get(&pod.name).await?)
    }

    async fn list_events(
        &self,
        namespace: &str,
        params: &ListParams,
    ) -> anyhow::Result<Vec<Event>> {
        let api: Api<Event> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(params).await?.items)
    }
}

/// Build a client from an explicit kubeconfig and/or context, or infer one
/// (in-cluster service account, then `$KUBECONFIG`/`~/.kube/config`).
pub async fn initialize_client(
    kubeconfig: Option<&Path>,
    context: Option<&str>,
) -> anyhow::Result<Client> {
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("failed to read kubeconfig {}", path.display()))?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .context("failed to load kubeconfig")?
        }
        None if context.is_some() => Config::from_kubeconfig(&options).await.map_err(|e| {
            anyhow::anyhow!(
                "Context '{}' not found in kubeconfig: {}",
                context.unwrap_or_default(),
                e
            )
        })?,
        None => Config::infer()
            .await
            .context("failed to retrieve Kubeconfig")?,
    };

    info!("Using cluster at {}", config.cluster_url);
    Client::try_from(config).context("failed to construct client")
}
