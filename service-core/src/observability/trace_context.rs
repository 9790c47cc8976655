//! W3C Trace Context propagation for outbound HTTP calls.
//!
//! Engines that call remote inference backends attach the current span's
//! `traceparent`/`tracestate` so the backend's spans join the same trace.
//!
//! See: https://www.w3.org/TR/trace-context/

use opentelemetry::trace::TraceContextExt;
use reqwest::header::HeaderMap;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Header name for W3C traceparent
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Header name for W3C tracestate
pub const TRACESTATE_HEADER: &str = "tracestate";

/// Trace headers for the current span.
///
/// Empty when there is no valid OpenTelemetry context (e.g. OTLP export is
/// disabled or the call happens outside any span).
pub fn trace_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    let context = Span::current().context();
    let otel_span = context.span();
    let span_context = otel_span.span_context();

    if !span_context.is_valid() {
        return headers;
    }

    // version-trace_id-span_id-trace_flags
    let traceparent = format!(
        "00-{}-{}-{:02x}",
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    );
    if let Ok(value) = traceparent.parse() {
        headers.insert(TRACEPARENT_HEADER, value);
    }

    let tracestate = span_context.trace_state().header();
    if !tracestate.is_empty()
        && let Ok(value) = tracestate.parse()
    {
        headers.insert(TRACESTATE_HEADER, value);
    }

    headers
}

/// Attach the current trace context to an outgoing request.
pub trait TracedRequestExt {
    fn with_trace_context(self) -> Self;
}

impl TracedRequestExt for reqwest::RequestBuilder {
    fn with_trace_context(self) -> Self {
        self.headers(trace_headers())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_headers_outside_a_span() {
        assert!(trace_headers().is_empty());
    }

    #[test]
    fn traced_request_without_context_has_no_traceparent() {
        let request = reqwest::Client::new()
            .get("http://localhost/api/models/gpt2")
            .with_trace_context()
            .build()
            .unwrap();

        assert!(request.headers().get(TRACEPARENT_HEADER).is_none());
    }
}
