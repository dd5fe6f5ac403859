//! Shared helpers for connector integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::field::{Field as TracingField, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::Registry;

use xetra_connector::{ObjectStorage, Result, S3BucketConnector};
use xetra_storage::ObjectStoreBackend;

pub const ENDPOINT: &str = "https://s3.eu-central-1.amazonaws.com";
pub const BUCKET: &str = "test-bucket";

/// Messages of INFO-and-above events, in emission order.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<String>>>);

impl CapturedLogs {
    pub fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages().iter().filter(|m| m.contains(needle)).count()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &TracingField, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

struct CaptureLayer {
    logs: CapturedLogs,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() > Level::INFO {
            return;
        }
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.logs.0.lock().unwrap().push(visitor.0);
    }
}

/// Capture log events on the current thread until the guard is dropped.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = Registry::default().with(CaptureLayer { logs: logs.clone() });
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

/// A connector over a fresh in-memory bucket.
pub fn memory_connector() -> (S3BucketConnector, Arc<ObjectStoreBackend>) {
    let backend = Arc::new(ObjectStoreBackend::in_memory());
    let connector = S3BucketConnector::with_storage(backend.clone(), ENDPOINT, BUCKET);
    (connector, backend)
}

/// `[["A","B"],["C","D"]]` with columns `col1,col2`.
pub fn two_by_two() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("col1", DataType::Utf8, true),
        Field::new("col2", DataType::Utf8, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec!["A", "C"])),
            Arc::new(StringArray::from(vec!["B", "D"])),
        ],
    )
    .unwrap()
}

/// Storage double that snapshots the captured log messages at each call.
pub struct RecordingStorage {
    inner: ObjectStoreBackend,
    logs: CapturedLogs,
    pub puts: Mutex<Vec<(String, Vec<String>)>>,
    pub gets: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingStorage {
    pub fn new(logs: CapturedLogs) -> Self {
        Self {
            inner: ObjectStoreBackend::in_memory(),
            logs,
            puts: Mutex::new(Vec::new()),
            gets: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), self.logs.messages()));
        self.inner.put(key, data).await
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.gets
            .lock()
            .unwrap()
            .push((key.to_string(), self.logs.messages()));
        self.inner.get(key).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.list(prefix).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.inner.exists(key).await
    }
}
