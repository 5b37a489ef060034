//! Integration test verifying that `#[instrument]` annotations produce the
//! expected spans on store operations.

#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use tokencache_store::{CredentialStore, MemoryStore};
use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan};

// ---------------------------------------------------------------------------
// Collecting layer that records span names as they are created
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct SpanCollector {
    spans: Arc<Mutex<Vec<String>>>,
}

impl<S> tracing_subscriber::Layer<S> for SpanCollector
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        _attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if let Some(span) = ctx.span(id) {
            self.spans.lock().expect("lock poisoned").push(span.name().to_owned());
        }
    }
}

fn collect_spans(op: impl FnOnce(&MemoryStore)) -> Vec<String> {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);

    let subscriber = tracing_subscriber::registry().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    op(&MemoryStore::new());

    let recorded = spans.lock().expect("lock poisoned").clone();
    recorded
}

#[test]
fn memory_store_put_creates_span() {
    let recorded = collect_spans(|store| {
        store.put(b"key-1".to_vec(), b"value-1".to_vec()).expect("put should succeed");
    });
    assert!(recorded.iter().any(|s| s == "put"), "expected a 'put' span, got: {recorded:?}");
}

#[test]
fn memory_store_get_creates_span() {
    let recorded = collect_spans(|store| {
        let _ = store.get(b"missing");
    });
    assert!(recorded.iter().any(|s| s == "get"), "expected a 'get' span, got: {recorded:?}");
}

#[test]
fn memory_store_enumerate_creates_span() {
    let recorded = collect_spans(|store| {
        let _ = store.enumerate(b"prefix");
    });
    assert!(
        recorded.iter().any(|s| s == "enumerate"),
        "expected an 'enumerate' span, got: {recorded:?}"
    );
}
