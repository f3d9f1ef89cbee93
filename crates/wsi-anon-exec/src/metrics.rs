//! Run counters as tracing events.
//!
//! Wire a subscriber in the binary layer to collect them.

pub fn emit_span(event: &str, key_values: &[(&str, String)]) {
    let span = tracing::debug_span!("wsi_anon", event);
    let _guard = span.enter();
    for (k, v) in key_values {
        tracing::debug!(%event, %k, %v, "metric");
    }
}
