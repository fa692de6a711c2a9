//! Generation context passed to every helper.

use serde::Serialize;
use serde_json::Value;
use wpkernel_core::{LogReporter, Reporter};

use super::HelperKind;

/// An event recorded during a run, kept for replay and inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationEvent {
    pub name: String,
    pub helper: Option<String>,
    pub payload: Option<Value>,
}

/// Explicit state of a generation run.
///
/// Holds the reporter, the current stage, the resources registered by
/// fragments and an event log. Contexts are reusable: [`clear`](Self::clear)
/// drops recorded events, [`reset`](Self::reset) also forgets registrations.
pub struct GenerationContext {
    reporter: Box<dyn Reporter>,
    phase: Option<HelperKind>,
    resources: Vec<String>,
    events: Vec<GenerationEvent>,
}

impl GenerationContext {
    pub fn new(reporter: Box<dyn Reporter>) -> Self {
        Self {
            reporter,
            phase: None,
            resources: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    /// Stage currently running, `None` outside a run.
    pub fn phase(&self) -> Option<HelperKind> {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Option<HelperKind>) {
        self.phase = phase;
    }

    /// Register a resource name; repeated names are ignored.
    pub fn register_resource(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.resources.contains(&name) {
            self.resources.push(name);
        }
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    pub fn record(&mut self, event: GenerationEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GenerationEvent] {
        &self.events
    }

    /// Drop recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Drop recorded events and registered resources.
    pub fn reset(&mut self) {
        self.clear();
        self.resources.clear();
        self.phase = None;
    }
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self::new(Box::new(LogReporter::default()))
    }
}

impl std::fmt::Debug for GenerationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationContext")
            .field("phase", &self.phase)
            .field("resources", &self.resources)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
