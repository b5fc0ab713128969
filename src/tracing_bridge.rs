//! Bridge from Bevy's `tracing` spans to Micromegas thread-local spans.
//!
//! Bevy (with the `trace` feature) emits `tracing` spans for every schedule
//! run and every system execution. [`ScopeBridgeLayer`] listens for the span
//! kinds it was configured with and forwards them as Micromegas named-scope
//! events, so the fixed-tick schedule and the ghost systems show up in the
//! trace timeline next to the spans the crate records itself.

use micromegas_tracing::dispatch::{on_begin_named_scope, on_end_named_scope};
use micromegas_tracing::intern_string::intern_string;
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

// All bridged spans share a single static source location.
micromegas_tracing::static_span_location!(BRIDGE_LOCATION);

/// Scope name stored in a bridged span's extensions.
struct BridgedSpan {
    name: &'static str,
}

/// Extracts the `name` field from a span's attributes.
#[derive(Default)]
struct NameVisitor {
    name: Option<String>,
}

impl Visit for NameVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "name" {
            self.name = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "name" {
            self.name = Some(format!("{:?}", value));
        }
    }
}

/// A `tracing_subscriber::Layer` that turns selected Bevy spans into
/// Micromegas named scopes.
pub struct ScopeBridgeLayer {
    span_kinds: Vec<&'static str>,
}

impl ScopeBridgeLayer {
    /// Bridge schedule runs only.
    pub fn schedules() -> Self {
        Self {
            span_kinds: vec!["schedule"],
        }
    }

    /// Bridge schedule runs and individual system runs.
    pub fn schedules_and_systems() -> Self {
        Self {
            span_kinds: vec!["schedule", "system"],
        }
    }

    pub fn bridges(&self, span_kind: &str) -> bool {
        self.span_kinds.iter().any(|kind| *kind == span_kind)
    }

    /// Scope label for a span, `kind` alone when it carries no name.
    pub fn label(span_kind: &str, name: Option<&str>) -> String {
        match name {
            Some(name) if !name.is_empty() => format!("{}:{}", span_kind, name.trim_matches('"')),
            _ => span_kind.to_string(),
        }
    }
}

impl<S> Layer<S> for ScopeBridgeLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let kind = attrs.metadata().name();
        if !self.bridges(kind) {
            return;
        }

        let mut visitor = NameVisitor::default();
        attrs.record(&mut visitor);
        let interned = intern_string(&Self::label(kind, visitor.name.as_deref()));

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(BridgedSpan { name: interned });
        }
    }

    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let extensions = span.extensions();
            if let Some(data) = extensions.get::<BridgedSpan>() {
                on_begin_named_scope(&BRIDGE_LOCATION, data.name);
            }
        }
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let extensions = span.extensions();
            if let Some(data) = extensions.get::<BridgedSpan>() {
                on_end_named_scope(&BRIDGE_LOCATION, data.name);
            }
        }
    }
}
