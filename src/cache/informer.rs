//! Watch-driven informer
//!
//! Runs a `kube` watcher in a background task and applies its events to a
//! [`ClusterIndexer`], keeping both secondary indexes current.

use super::indexer::{ClusterIndexer, IndexWriter};
use super::lister::ClusterLister;
use futures::{Stream, StreamExt};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tokio::task::JoinHandle;

/// Informer feeding one indexer from a watch across all clusters
pub struct ClusterInformer<K> {
    indexer: ClusterIndexer<K>,
    handle: Option<JoinHandle<()>>,
}

impl<K> ClusterInformer<K>
where
    K: Resource + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    pub fn new(indexer: ClusterIndexer<K>) -> Self {
        Self {
            indexer,
            handle: None,
        }
    }

    /// Start watching `api`; restarts the watch if one is already running
    ///
    /// Watch failures are retried with exponential backoff for as long as
    /// the informer runs. Must be called from within a tokio runtime.
    pub fn run(&mut self, api: Api<K>, config: watcher::Config) {
        self.stop();

        let writer = IndexWriter::new(self.indexer.clone());
        let resource = self.indexer.resource().to_string();
        let stream = watcher(api, config).default_backoff();

        let handle = tokio::spawn(async move {
            drive(stream, writer, &resource).await;
        });

        self.handle = Some(handle);
    }

    pub fn indexer(&self) -> &ClusterIndexer<K> {
        &self.indexer
    }

    pub fn lister(&self) -> ClusterLister<K> {
        ClusterLister::new(self.indexer.clone())
    }

    /// Whether the watch task is still running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Abort the watch task; the indexer keeps its last content
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl<K> Drop for ClusterInformer<K> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Apply every event of `stream` to `writer` until the stream ends
///
/// Errors are logged and skipped; pacing retries is up to the stream.
async fn drive<K, S>(stream: S, mut writer: IndexWriter<K>, resource: &str)
where
    K: Resource,
    S: Stream<Item = Result<watcher::Event<K>, watcher::Error>>,
{
    let mut stream = Box::pin(stream);
    let mut error_count = 0u32;

    while let Some(event) = stream.next().await {
        match event {
            Ok(event) => {
                if error_count > 0 {
                    tracing::info!("{} watcher recovered after {} error(s)", resource, error_count);
                    error_count = 0;
                }
                writer.apply_watcher_event(event);
            }
            Err(e) => {
                error_count += 1;
                if error_count == 1 || error_count.is_multiple_of(10) {
                    tracing::warn!("{} watcher error ({}): {}", resource, error_count, e);
                }
            }
        }
    }

    tracing::debug!("{} watch stream ended", resource);
}
