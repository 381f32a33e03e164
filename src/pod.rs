use crate::kubernetes::ClusterApi;
use crate::types::{EventRecord, PodIdentity};
use crate::utils::{display_or_empty, group_version_kind, tail_lines};
use anyhow::Context;
use futures::io::AsyncReadExt;
use k8s_openapi::api::core::v1::Event;
use kube::ResourceExt;
use kube::api::{ListParams, LogParams};
use tracing::{debug, info};

/// Maximum number of events returned to the caller.
pub const DEFAULT_MAX_EVENTS: usize = 10;
/// Maximum number of log lines returned to the caller.
pub const DEFAULT_MAX_LOG_LINES: usize = 10;

/// Bounds applied to every read made by a [`PodAccessor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorConfig {
    pub max_events: usize,
    pub max_log_lines: usize,
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
            max_log_lines: DEFAULT_MAX_LOG_LINES,
        }
    }
}

impl AccessorConfig {
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    pub fn with_max_log_lines(mut self, max_log_lines: usize) -> Self {
        self.max_log_lines = max_log_lines;
        self
    }
}

/// Encodes one event record for the wire.
pub type EventEncoder = fn(&EventRecord) -> serde_json::Result<Vec<u8>>;

fn encode_event(record: &EventRecord) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(record)
}

/// Bounded, read-only access to a single pod's logs and events.
pub struct PodAccessor<C> {
    cluster: C,
    config: AccessorConfig,
    encode: EventEncoder,
}

impl<C: ClusterApi> PodAccessor<C> {
    pub fn new(cluster: C, config: AccessorConfig) -> Self {
        Self {
            cluster,
            config,
            encode: encode_event,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_encoder(mut self, encode: EventEncoder) -> Self {
        self.encode = encode;
        self
    }

    pub fn config(&self) -> &AccessorConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn cluster(&self) -> &C {
        &self.cluster
    }

    /// Return the tail of the pod's log, at most `max_log_lines` lines.
    ///
    /// `container` selects one container of a multi-container pod; without it
    /// the API server picks the default container.
    pub async fn get_logs(
        &self,
        pod: &PodIdentity,
        container: Option<&str>,
    ) -> anyhow::Result<Vec<u8>> {
        let params = LogParams {
            tail_lines: Some(i64::try_from(self.config.max_log_lines).unwrap_or(i64::MAX)),
            container: container.map(str::to_string),
            ..Default::default()
        };

        let mut stream = self
            .cluster
            .log_stream(pod, &params)
            .await
            .context("failed to read data from pod log stream")?;

        let mut buf = Vec::new();
        let read = stream.read_to_end(&mut buf).await;
        // Release the connection before inspecting the outcome.
        drop(stream);
        read.context("failed to read pod log stream")?;

        let keep = tail_lines(&buf, self.config.max_log_lines).len();
        if keep < buf.len() {
            debug!(
                "Trimming {} log bytes from {} beyond the last {} lines",
                buf.len() - keep,
                pod,
                self.config.max_log_lines
            );
            buf.drain(..buf.len() - keep);
        }
        Ok(buf)
    }

    /// Return up to `max_events` events involving the pod, each encoded as a
    /// standalone JSON object and concatenated in listing order.
    pub async fn get_events(&self, pod: &PodIdentity) -> anyhow::Result<Vec<u8>> {
        let found = self
            .cluster
            .get_pod(pod)
            .await
            .context("failed to look up pod")?;

        let selector = format!("involvedObject.name={}", found.name_any());
        let params = ListParams::default().fields(&selector);
        let events = self
            .cluster
            .list_events(&pod.namespace, &params)
            .await
            .context("failed to look up events for pod")?;

        let mut out = Vec::new();
        let mut seen = 0;
        for event in &events {
            if seen >= self.config.max_events {
                break;
            }
            match (self.encode)(&convert(event)) {
                Ok(encoded) => {
                    out.extend_from_slice(&encoded);
                    seen += 1;
                }
                // Skip it, the remaining events may still be useful.
                Err(e) => info!(error = %e, "failed to marshal event"),
            }
        }

        debug!("Returning {} of {} events for pod {}", seen, events.len(), pod);
        Ok(out)
    }
}

/// Project a cluster event onto the fields tool callers care about.
pub fn convert(event: &Event) -> EventRecord {
    EventRecord {
        reason: event.reason.clone().unwrap_or_default(),
        message: event.message.clone().unwrap_or_default(),
        event_time: display_or_empty(event.event_time.as_ref().map(|t| &t.0)),
        action: event.action.clone().unwrap_or_default(),
        reporting_controller: event.reporting_component.clone().unwrap_or_default(),
        reporting_instance: event.reporting_instance.clone().unwrap_or_default(),
        related: event
            .related
            .as_ref()
            .map(group_version_kind)
            .unwrap_or_default(),
        first_timestamp: display_or_empty(event.first_timestamp.as_ref().map(|t| &t.0)),
        last_timestamp: display_or_empty(event.last_timestamp.as_ref().map(|t| &t.0)),
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::kubernetes::LogStream;
    use async_trait::async_trait;
    use futures::io::{AsyncRead, Cursor};
    use k8s_openapi::api::core::v1::{ObjectReference, Pod};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::io;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};

    /// Log stream that counts how many times it has been released.
    struct FakeStream {
        data: Cursor<Vec<u8>>,
        fail: bool,
        drops: Arc<AtomicUsize>,
    }

    impl AsyncRead for FakeStream {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut [u8],
        ) -> Poll<io::Result<usize>> {
            if self.fail {
                return Poll::Ready(Err(io::Error::other("connection reset by peer")));
            }
            Pin::new(&mut self.data).poll_read(cx, buf)
        }
    }

    impl Drop for FakeStream {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// In-memory cluster. `list_events` honours `involvedObject.name` field
    /// selectors the way the API server does.
    #[derive(Default)]
    pub struct FakeCluster {
        pub pods: Vec<Pod>,
        pub events: Vec<Event>,
        pub logs: Vec<u8>,
        pub fail_open: bool,
        pub fail_read: bool,
        pub fail_list: bool,
        pub stream_drops: Arc<AtomicUsize>,
        pub list_calls: AtomicUsize,
        pub log_params: Mutex<Option<LogParams>>,
    }

    impl FakeCluster {
        pub fn with_pod(namespace: &str, name: &str) -> Self {
            Self {
                pods: vec![pod(namespace, name)],
                ..Default::default()
            }
        }

        pub fn event(mut self, event: Event) -> Self {
            self.events.push(event);
            self
        }

        pub fn logs(mut self, logs: &str) -> Self {
            self.logs = logs.as_bytes().to_vec();
            self
        }
    }

    pub fn pod(namespace: &str, name: &str) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn event(namespace: &str, name: &str, involved: &str, reason: &str) -> Event {
        Event {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            involved_object: ObjectReference {
                name: Some(involved.to_string()),
                ..Default::default()
            },
            reason: Some(reason.to_string()),
            message: Some(format!("message for {}", reason)),
            ..Default::default()
        }
    }

    #[async_trait]
    impl ClusterApi for FakeCluster {
        async fn log_stream(
            &self,
            _pod: &PodIdentity,
            params: &LogParams,
        ) -> anyhow::Result<LogStream> {
            *self.log_params.lock().unwrap() = Some(params.clone());
            if self.fail_open {
                anyhow::bail!("container \"app\" is waiting to start");
            }
            Ok(Box::pin(FakeStream {
                data: Cursor::new(self.logs.clone()),
                fail: self.fail_read,
                drops: self.stream_drops.clone(),
            }))
        }

        async fn get_pod(&self, pod: &PodIdentity) -> anyhow::Result<Pod> {
            self.pods
                .iter()
                .find(|p| {
                    p.metadata.namespace.as_deref() == Some(pod.namespace.as_str())
                        && p.metadata.name.as_deref() == Some(pod.name.as_str())
                })
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("pods \"{}\" not found", pod.name))
        }

        async fn list_events(
            &self,
            namespace: &str,
            params: &ListParams,
        ) -> anyhow::Result<Vec<Event>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list {
                anyhow::bail!("events is forbidden");
            }
            let involved = params
                .field_selector
                .as_deref()
                .and_then(|s| s.strip_prefix("involvedObject.name="));
            Ok(self
                .events
                .iter()
                .filter(|e| e.metadata.namespace.as_deref() == Some(namespace))
                .filter(|e| involved.is_none() || e.involved_object.name.as_deref() == involved)
                .cloned()
                .collect())
        }
    }
}
