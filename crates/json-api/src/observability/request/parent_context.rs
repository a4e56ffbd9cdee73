//! W3C `traceparent` extraction for requests arriving from a traced caller.

use opentelemetry::{
    Context,
    propagation::{Extractor, TextMapPropagator as _},
    trace::TraceContextExt as _,
};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use salvo::http::{HeaderMap, HeaderName};

struct Headers<'a>(&'a HeaderMap);

impl Extractor for Headers<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

/// The remote span context, if the headers carry a valid one.
///
/// Extraction starts from an empty context so that a request without trace
/// headers becomes a new root instead of a child of whatever span is active.
pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    let context = TraceContextPropagator::new().extract_with_context(&Context::new(), &Headers(headers));

    context
        .span()
        .span_context()
        .is_valid()
        .then_some(context)
}
