use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace, warn};

use super::embed::EmbedError;
use super::panel::{Panel, PanelContext, PanelError, PanelView};

/// Shared flag that marks every load requested under one mount as abandoned.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Identifies one load request and the mount it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    generation: u64,
    id: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub sources: Vec<String>,
    cancel: CancelToken,
}

impl LoadRequest {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Applied,
    /// The request belonged to an earlier mount or was cancelled; nothing changed.
    Discarded,
}

pub enum Content {
    Empty,
    Panel(Box<dyn Panel>),
    /// An inline message that replaced the pane (missing tool, failed load).
    Notice(String),
}

/// Read-only snapshot of the content region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentView {
    Empty,
    Panel(PanelView),
    Notice(String),
}

/// The content region a tool renders into.
///
/// Holds at most one panel. Every [`clear`](Container::clear) starts a new generation: load
/// requests issued under an older generation are discarded when they complete, so a slow script
/// can never write into the pane of the tool that replaced its requester.
pub struct Container {
    content: Content,
    generation: u64,
    next_request: u64,
    cancel: CancelToken,
    pending: Vec<LoadRequest>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        Self {
            content: Content::Empty,
            generation: 0,
            next_request: 0,
            cancel: CancelToken::default(),
            pending: Vec::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.content, Content::Empty)
    }

    pub fn view(&self) -> ContentView {
        match &self.content {
            Content::Empty => ContentView::Empty,
            Content::Panel(panel) => ContentView::Panel(panel.view()),
            Content::Notice(message) => ContentView::Notice(message.clone()),
        }
    }

    pub fn panel_view(&self) -> Option<PanelView> {
        match &self.content {
            Content::Panel(panel) => Some(panel.view()),
            _ => None,
        }
    }

    /// Drops the current content and cancels its outstanding loads.
    pub fn clear(&mut self) {
        self.cancel.cancel();
        self.cancel = CancelToken::default();
        self.pending.clear();
        self.content = Content::Empty;
        self.generation += 1;
        trace!(generation = self.generation, "Container cleared.");
    }

    pub fn mount(&mut self, panel: Box<dyn Panel>) {
        debug!(title = panel.title(), "Mounting panel.");
        self.content = Content::Panel(panel);
    }

    pub fn show_notice(&mut self, message: impl Into<String>) {
        self.content = Content::Notice(message.into());
    }

    /// Token cancelled on the next [`clear`](Container::clear); tools hand a clone to their
    /// disposer.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Records a request to load `sources` for the current mount.
    pub fn request_load(&mut self, sources: Vec<String>) -> LoadTicket {
        let ticket = LoadTicket {
            generation: self.generation,
            id: self.next_request,
        };
        self.next_request += 1;
        debug!(?sources, generation = ticket.generation, "Load requested.");
        self.pending.push(LoadRequest {
            ticket,
            sources,
            cancel: self.cancel.clone(),
        });
        ticket
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn take_pending(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Applies the outcome of a load request.
    ///
    /// A failure replaces the pane with `Error: Failed to load script: <src>`; a success
    /// notifies the mounted panel. Stale or cancelled tickets are ignored.
    pub fn resolve(
        &mut self,
        request: &LoadRequest,
        outcome: Result<(), EmbedError>,
    ) -> ResolveOutcome {
        if request.ticket.generation != self.generation || request.is_cancelled() {
            debug!(
                ticket_generation = request.ticket.generation,
                current_generation = self.generation,
                "Discarding stale load completion."
            );
            return ResolveOutcome::Discarded;
        }

        match outcome {
            Err(err) => {
                warn!(error = %err, "External load failed.");
                self.show_notice(format!("Error: {err}"));
            }
            Ok(()) => {
                if let Content::Panel(panel) = &mut self.content {
                    let mut cx = PanelContext::new();
                    panel.sources_loaded(&request.sources, &mut cx);
                    self.enqueue_requested(&mut cx);
                }
            }
        }
        ResolveOutcome::Applied
    }

    /// Forwards an input event to the mounted panel.
    pub fn input(&mut self, field: &str, value: &str) -> Result<(), PanelError> {
        let Content::Panel(panel) = &mut self.content else {
            return Err(PanelError::NoPanel);
        };
        let mut cx = PanelContext::new();
        let result = panel.input(field, value, &mut cx);
        self.enqueue_requested(&mut cx);
        result
    }

    fn enqueue_requested(&mut self, cx: &mut PanelContext) {
        let sources = cx.take_requested();
        if !sources.is_empty() {
            self.request_load(sources);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::panel::{FieldView, ResultCard};

    #[derive(Default)]
    struct Echo {
        value: String,
        loaded: Vec<String>,
    }

    impl Panel for Echo {
        fn title(&self) -> &str {
            "Echo"
        }

        fn view(&self) -> PanelView {
            PanelView {
                title: self.title().to_string(),
                fields: vec![FieldView::text("value", "Value", &self.value)],
                results: vec![ResultCard::new("Loaded", self.loaded.join(","))],
                ..PanelView::default()
            }
        }

        fn input(
            &mut self,
            field: &str,
            value: &str,
            cx: &mut PanelContext,
        ) -> Result<(), PanelError> {
            match field {
                "value" => self.value = value.to_string(),
                "load" => cx.request_sources([value]),
                other => return Err(PanelError::UnknownField(other.to_string())),
            }
            Ok(())
        }

        fn sources_loaded(&mut self, sources: &[String], _cx: &mut PanelContext) {
            self.loaded.extend(sources.iter().cloned());
        }
    }

    fn mounted() -> Container {
        let mut container = Container::new();
        container.mount(Box::new(Echo::default()));
        container
    }

    #[test]
    fn input_without_panel_is_an_error() {
        let mut container = Container::new();
        assert_eq!(container.input("value", "x"), Err(PanelError::NoPanel));
    }

    #[test]
    fn panel_requests_become_pending_loads() {
        let mut container = mounted();
        container.input("load", "lib.js").unwrap();
        let pending = container.take_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].sources, vec!["lib.js"]);

        assert_eq!(container.resolve(&pending[0], Ok(())), ResolveOutcome::Applied);
        let view = container.panel_view().unwrap();
        assert_eq!(view.result("Loaded").unwrap().value, "lib.js");
    }

    #[test]
    fn failed_load_replaces_pane_with_notice() {
        let mut container = mounted();
        let ticket = container.request_load(vec!["x.js".to_string()]);
        let request = container.take_pending().remove(0);
        assert_eq!(request.ticket, ticket);

        let err = EmbedError::Load {
            src: "x.js".to_string(),
            reason: "404".to_string(),
        };
        container.resolve(&request, Err(err));
        assert_eq!(
            container.view(),
            ContentView::Notice("Error: Failed to load script: x.js".to_string())
        );
    }

    #[test]
    fn completion_after_clear_is_discarded() {
        let mut container = mounted();
        container.request_load(vec!["slow.js".to_string()]);
        let request = container.take_pending().remove(0);

        container.clear();
        container.mount(Box::new(Echo::default()));
        let err = EmbedError::Load {
            src: "slow.js".to_string(),
            reason: "timeout".to_string(),
        };
        assert_eq!(container.resolve(&request, Err(err)), ResolveOutcome::Discarded);
        assert!(matches!(container.view(), ContentView::Panel(_)));
    }

    #[test]
    fn cancelled_request_is_discarded_even_in_same_generation() {
        let mut container = mounted();
        let token = container.cancel_token();
        container.request_load(vec!["a.js".to_string()]);
        let request = container.take_pending().remove(0);
        token.cancel();
        assert!(request.is_cancelled());
        assert_eq!(container.resolve(&request, Ok(())), ResolveOutcome::Discarded);
    }

    #[test]
    fn clear_bumps_generation_and_drops_pending() {
        let mut container = mounted();
        container.request_load(vec!["a.js".to_string()]);
        let before = container.generation();
        container.clear();
        assert_eq!(container.generation(), before + 1);
        assert!(!container.has_pending());
        assert!(container.is_empty());
    }
}
