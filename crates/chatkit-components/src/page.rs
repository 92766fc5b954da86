#![forbid(unsafe_code)]

//! Page orchestration.
//!
//! The [`Page`] owns the document, the scheduler, the signal bus, and
//! the controller registry, and keeps them consistent across
//! server-driven fragment replacements: applying a stream message
//! detaches every controller whose root element was removed, attaches
//! controllers for inserted fragments carrying a `data-controller`
//! marker, and then tells surviving controllers which subtrees
//! (re)connected.
//!
//! There is no locking anywhere; correctness relies on controllers
//! recomputing their derived state idempotently on every (re)attach,
//! because attachment order across a multi-fragment response is not
//! guaranteed.

use std::collections::HashMap;

use chatkit_dom::{Document, NodeId, StreamMessage};
use chatkit_runtime::{
    Clipboard, FakeClipboard, FakeFlashEndpoint, FakeHealthProbe, FlashEndpoint, FocusStore,
    FrameId, HealthProbe, MemoryFocusStore, Scheduler, SignalBus, TimerId, WaitId, Wakeup,
};

use crate::alert::Alert;
use crate::app::AppShell;
use crate::chat_edit::ChatEdit;
use crate::chat_list::ChatList;
use crate::clipboard::ClipboardButton;
use crate::context::{Context, Emitted, Env, Outbox, PendingRequest, PostOp};
use crate::controller::{Controller, ControllerId};
use crate::drawer::Drawer;
use crate::dropdown::Dropdown;
use crate::event::UiEvent;
use crate::flash::FlashRelay;
use crate::listeners::Listeners;

struct Slot {
    id: ControllerId,
    root: NodeId,
    ctrl: Box<dyn Controller>,
}

#[derive(Debug, Default, Clone, Copy)]
struct HookFlags {
    default_prevented: bool,
    signal_canceled: bool,
}

/// One live page: document, runtime, services, controllers.
pub struct Page<C = FakeClipboard, F = FakeFlashEndpoint, H = FakeHealthProbe> {
    doc: Document,
    scheduler: Scheduler,
    bus: SignalBus<ControllerId>,
    listeners: Listeners,
    focus_store: Box<dyn FocusStore>,
    clipboard: C,
    flash_endpoint: F,
    health: H,
    env: Env,
    slots: Vec<Option<Slot>>,
    next_controller: u64,
    timer_routes: HashMap<TimerId, ControllerId>,
    frame_routes: HashMap<FrameId, ControllerId>,
    wait_routes: HashMap<WaitId, ControllerId>,
    removal_timers: HashMap<TimerId, NodeId>,
    requests: Vec<PendingRequest>,
}

impl Page {
    /// A page backed by in-memory fakes for every service.
    #[must_use]
    pub fn new(doc: Document, env: Env) -> Self {
        Self::with_services(
            doc,
            env,
            FakeClipboard::new(),
            FakeFlashEndpoint::new(),
            FakeHealthProbe::new(),
        )
    }
}

impl<C: Clipboard, F: FlashEndpoint, H: HealthProbe> Page<C, F, H> {
    pub fn with_services(doc: Document, env: Env, clipboard: C, flash_endpoint: F, health: H) -> Self {
        Self {
            doc,
            scheduler: Scheduler::new(),
            bus: SignalBus::new(),
            listeners: Listeners::new(),
            focus_store: Box::new(MemoryFocusStore::new()),
            clipboard,
            flash_endpoint,
            health,
            env,
            slots: Vec::new(),
            next_controller: 0,
            timer_routes: HashMap::new(),
            frame_routes: HashMap::new(),
            wait_routes: HashMap::new(),
            removal_timers: HashMap::new(),
            requests: Vec::new(),
        }
    }

    /// Swap in a focus store (call before attaching controllers).
    pub fn set_focus_store(&mut self, store: Box<dyn FocusStore>) {
        self.focus_store = store;
    }

    // ─────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    #[must_use]
    pub fn flash_endpoint(&self) -> &F {
        &self.flash_endpoint
    }

    pub fn flash_endpoint_mut(&mut self) -> &mut F {
        &mut self.flash_endpoint
    }

    #[must_use]
    pub fn health(&self) -> &H {
        &self.health
    }

    #[must_use]
    pub fn focus_store(&self) -> &dyn FocusStore {
        self.focus_store.as_ref()
    }

    pub fn focus_store_mut(&mut self) -> &mut dyn FocusStore {
        self.focus_store.as_mut()
    }

    #[must_use]
    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn set_page_path(&mut self, path: &str) {
        self.env.page_path = path.to_string();
    }

    #[must_use]
    pub fn controller_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.count()
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.bus.subscription_count()
    }

    /// Server round trips initiated since the last call.
    pub fn take_requests(&mut self) -> Vec<PendingRequest> {
        std::mem::take(&mut self.requests)
    }

    // ─────────────────────────────────────────────────────────────────
    // Controller lifecycle
    // ─────────────────────────────────────────────────────────────────

    /// Attach a controller for every `data-controller` marker currently
    /// in the document.
    pub fn attach_all(&mut self) {
        let body = self.doc.body();
        let marked: Vec<(NodeId, String)> = self
            .doc
            .descendants(body)
            .into_iter()
            .filter_map(|n| {
                self.doc
                    .data(n, "controller")
                    .map(|name| (n, name.to_string()))
            })
            .collect();
        for (root, name) in marked {
            self.attach_to(root, &name);
        }
    }

    /// Attach a controller by name to a root element.
    pub fn attach_to(&mut self, root: NodeId, name: &str) -> Option<ControllerId> {
        if self.slots.iter().flatten().any(|s| s.root == root) {
            return None;
        }
        let ctrl: Box<dyn Controller> = match name {
            "alert" => Box::new(Alert::new()),
            "app" => Box::new(AppShell::new()),
            "chat-edit" => Box::new(ChatEdit::new()),
            "chat-list" => Box::new(ChatList::new()),
            "clipboard" => Box::new(ClipboardButton::new()),
            "drawer" => Box::new(Drawer::new()),
            "dropdown" => Box::new(Dropdown::new()),
            "flash" => Box::new(FlashRelay::new()),
            other => {
                tracing::warn!(controller = other, "unknown controller marker, skipping");
                return None;
            }
        };
        self.next_controller += 1;
        let id = ControllerId(self.next_controller);
        self.slots.push(Some(Slot { id, root, ctrl }));
        self.run_hook(id, |ctrl, cx| ctrl.attach(cx));
        Some(id)
    }

    /// Detach and drop one controller.
    pub fn detach_controller(&mut self, id: ControllerId) {
        let Some(index) = self
            .slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| s.id == id))
        else {
            return;
        };
        let Some(mut slot) = self.slots[index].take() else {
            return;
        };
        let mut out = Outbox::new();
        {
            let mut cx = self.context(id, slot.root, &mut out);
            slot.ctrl.detach(&mut cx);
        }
        self.slots.retain(Option::is_some);
        self.process(out);
    }

    fn context<'a>(&'a mut self, id: ControllerId, root: NodeId, out: &'a mut Outbox) -> Context<'a> {
        Context {
            controller: id,
            root,
            doc: &mut self.doc,
            scheduler: &mut self.scheduler,
            bus: &mut self.bus,
            listeners: &mut self.listeners,
            focus_store: self.focus_store.as_mut(),
            clipboard: &mut self.clipboard,
            flash_endpoint: &mut self.flash_endpoint,
            health: &mut self.health,
            env: &self.env,
            out,
        }
    }

    fn run_hook(
        &mut self,
        id: ControllerId,
        f: impl FnOnce(&mut dyn Controller, &mut Context),
    ) -> HookFlags {
        let Some(index) = self
            .slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| s.id == id))
        else {
            return HookFlags::default();
        };
        let Some(mut slot) = self.slots[index].take() else {
            return HookFlags::default();
        };
        let mut out = Outbox::new();
        {
            let mut cx = self.context(id, slot.root, &mut out);
            f(slot.ctrl.as_mut(), &mut cx);
        }
        self.slots[index] = Some(slot);
        let flags = HookFlags {
            default_prevented: out.default_prevented,
            signal_canceled: out.signal_canceled,
        };
        self.process(out);
        flags
    }

    // ─────────────────────────────────────────────────────────────────
    // Outbox processing
    // ─────────────────────────────────────────────────────────────────

    fn process(&mut self, out: Outbox) {
        for (timer, owner) in out.timer_routes {
            self.timer_routes.insert(timer, owner);
        }
        for (frame, owner) in out.frame_routes {
            self.frame_routes.insert(frame, owner);
        }
        for (wait, owner) in out.wait_routes {
            self.wait_routes.insert(wait, owner);
        }
        for (node, delay) in out.deferred_removals {
            let timer = self.scheduler.set_timeout(delay);
            self.removal_timers.insert(timer, node);
        }
        self.requests.extend(out.requests);
        for message in out.streams {
            self.apply_stream(&message);
        }
        for emitted in out.signals {
            self.dispatch_signal(emitted);
        }
        for op in out.post {
            self.apply_post_op(op);
        }
    }

    fn apply_post_op(&mut self, op: PostOp) {
        match op {
            PostOp::Focus(node) => self.doc.focus(node),
            PostOp::RemoveAttr(node, name) => self.doc.remove_attr(node, &name),
            PostOp::SetAttr(node, name, value) => self.doc.set_attr(node, &name, &value),
            PostOp::RemoveClass(node, class) => self.doc.remove_class(node, &class),
        }
    }

    fn dispatch_signal(&mut self, emitted: Emitted) {
        let mut recipients: Vec<ControllerId> = Vec::new();
        for token in self.bus.recipients(&self.doc, emitted.origin) {
            if !recipients.contains(&token) {
                recipients.push(token);
            }
        }
        let mut canceled = false;
        for recipient in recipients {
            let signal = emitted.signal.clone();
            let flags = self.run_hook(recipient, |ctrl, cx| ctrl.on_signal(&signal, cx));
            canceled |= flags.signal_canceled;
        }
        if emitted.cancelable && canceled {
            // Observed, intentionally not acted on.
            tracing::debug!(signal = ?emitted.signal, "cancelable signal was canceled");
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // Event, wakeup, and stream routing
    // ─────────────────────────────────────────────────────────────────

    /// Deliver an input event to every controller with a matching
    /// listener, then run the page default unless it was prevented.
    pub fn dispatch(&mut self, event: UiEvent) {
        let targets = self.listeners.matching(&self.doc, &event);
        let mut prevented = false;
        for id in targets {
            let flags = self.run_hook(id, |ctrl, cx| ctrl.on_event(&event, cx));
            prevented |= flags.default_prevented;
        }
        if !prevented
            && let UiEvent::DialogCancel { target } = event
        {
            // Native behavior: the dialog just closes.
            self.doc.remove_attr(target, "open");
        }
        self.prune_dead_controllers();
    }

    /// Move user focus, synthesizing the blur event the previous
    /// element would see. Programmatic focus from inside controllers
    /// goes straight through the document and does not re-enter here.
    pub fn focus_element(&mut self, node: NodeId) {
        let previous = self.doc.active_element();
        if previous == Some(node) {
            return;
        }
        self.doc.focus(node);
        if let Some(previous) = previous {
            self.dispatch(UiEvent::Blur { target: previous });
        }
    }

    /// Destroy every controller whose root element is no longer in the
    /// document. Self-removal (an alert dismissing itself) reaches here
    /// just like server-driven removal does.
    fn prune_dead_controllers(&mut self) {
        let dead: Vec<ControllerId> = self
            .slots
            .iter()
            .flatten()
            .filter(|s| !self.doc.alive(s.root))
            .map(|s| s.id)
            .collect();
        for id in dead {
            self.detach_controller(id);
        }
    }

    fn route_wakeups(&mut self, wakeups: Vec<Wakeup>) {
        for wakeup in wakeups {
            match wakeup {
                Wakeup::Timer(id) => {
                    if let Some(node) = self.removal_timers.remove(&id) {
                        self.doc.remove(node);
                        continue;
                    }
                    if let Some(owner) = self.timer_routes.remove(&id) {
                        self.run_hook(owner, |ctrl, cx| ctrl.on_wakeup(wakeup, cx));
                    }
                }
                Wakeup::Frame(id) => {
                    if let Some(owner) = self.frame_routes.remove(&id) {
                        self.run_hook(owner, |ctrl, cx| ctrl.on_wakeup(wakeup, cx));
                    }
                }
                Wakeup::TransitionsEnded { wait, .. } => {
                    if let Some(owner) = self.wait_routes.remove(&wait) {
                        self.run_hook(owner, |ctrl, cx| ctrl.on_wakeup(wakeup, cx));
                    }
                }
            }
        }
        self.prune_dead_controllers();
    }

    /// Drain ready frames and settled transition waits.
    pub fn tick(&mut self) {
        let wakeups = self.scheduler.tick();
        self.route_wakeups(wakeups);
    }

    /// Move virtual time forward and deliver everything that becomes due.
    pub fn advance(&mut self, by: std::time::Duration) {
        let wakeups = self.scheduler.advance(by);
        self.route_wakeups(wakeups);
    }

    /// Mark one visual transition on a node started / finished.
    pub fn begin_transition(&mut self, node: NodeId) {
        self.scheduler.begin_transition(node);
    }

    pub fn end_transition(&mut self, node: NodeId) {
        self.scheduler.end_transition(node);
    }

    /// Apply a server stream and reconcile controllers against the
    /// replaced fragments.
    pub fn apply_stream(&mut self, message: &StreamMessage) {
        let outcome = message.apply(&mut self.doc);
        self.prune_dead_controllers();

        // Attach controllers carried by inserted fragments.
        let mut fresh: Vec<ControllerId> = Vec::new();
        for root in &outcome.inserted {
            let marked: Vec<(NodeId, String)> = self
                .doc
                .descendants(*root)
                .into_iter()
                .filter_map(|n| {
                    self.doc
                        .data(n, "controller")
                        .map(|name| (n, name.to_string()))
                })
                .collect();
            for (node, name) in marked {
                if let Some(id) = self.attach_to(node, &name) {
                    fresh.push(id);
                }
            }
        }

        // Tell surviving controllers what (re)connected.
        if !outcome.inserted.is_empty() {
            let survivors: Vec<ControllerId> = self
                .slots
                .iter()
                .flatten()
                .map(|s| s.id)
                .filter(|id| !fresh.contains(id))
                .collect();
            for id in survivors {
                let inserted = outcome.inserted.clone();
                self.run_hook(id, |ctrl, cx| ctrl.fragments_connected(&inserted, cx));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chatkit_dom::Fragment;
    use chatkit_runtime::{FakeClipboard, FakeFlashEndpoint, FakeHealthProbe};

    use crate::context::Env;
    use crate::event::{Key, Modifiers, UiEvent};

    fn alert_markup(delay_ms: &str) -> Fragment {
        Fragment::new("div")
            .id("alert-1")
            .controller("alert")
            .data("delay-ms", delay_ms)
            .child(Fragment::new("span").target("message").text("saved"))
            .child(Fragment::new("button").target("closeButton").text("\u{d7}"))
    }

    fn add_csrf_meta(doc: &mut Document) {
        let body = doc.body();
        let meta = doc.create_element("meta");
        doc.set_attr(meta, "name", "csrf-token");
        doc.set_attr(meta, "content", "tok-123");
        doc.append_child(body, meta);
    }

    #[test]
    fn attaches_marked_controllers_and_skips_unknown() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append_fragment(body, &alert_markup("8000"));
        doc.append_fragment(body, &Fragment::new("div").controller("bogus"));

        let mut page = Page::new(doc, Env::default());
        page.attach_all();
        assert_eq!(page.controller_count(), 1);
    }

    #[test]
    fn alert_auto_dismisses_after_delay() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = doc.append_fragment(body, &alert_markup("100"));

        let mut page = Page::new(doc, Env::default());
        page.attach_all();
        assert!(page.doc().alive(root));

        page.advance(Duration::from_millis(99));
        assert!(page.doc().alive(root));

        page.advance(Duration::from_millis(1));
        assert!(!page.doc().alive(root));
        assert_eq!(page.controller_count(), 0);
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn alert_close_button_dismisses_immediately() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = doc.append_fragment(body, &alert_markup("8000"));

        let mut page = Page::new(doc, Env::default());
        page.attach_all();
        let close = page.doc().target(root, "closeButton").unwrap();
        page.dispatch(UiEvent::Click { target: close });

        assert!(!page.doc().alive(root));
        assert_eq!(page.controller_count(), 0);
    }

    #[test]
    fn announcement_outlives_a_dismissed_alert() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = doc.append_fragment(body, &alert_markup("8000"));

        let mut page = Page::new(doc, Env::default());
        page.attach_all();

        let body = page.doc().body();
        let live = page
            .doc()
            .find(body, |el| el.attrs.contains_key("aria-live"))
            .unwrap();
        assert_eq!(page.doc().parent(live), Some(body));
        assert!(!page.doc().contains(root, live));
        assert_eq!(page.doc().text(live), Some("saved"));

        // Closing the banner right away must not swallow the
        // announcement; it lingers until its own timer elapses.
        let close = page.doc().target(root, "closeButton").unwrap();
        page.dispatch(UiEvent::Click { target: close });
        assert!(!page.doc().alive(root));
        assert!(page.doc().alive(live));

        page.advance(Duration::from_millis(999));
        assert!(page.doc().alive(live));
        page.advance(Duration::from_millis(1));
        assert!(!page.doc().alive(live));
    }

    #[test]
    fn invalid_alert_delay_disables_auto_dismiss() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = doc.append_fragment(body, &alert_markup("soon"));

        let mut page = Page::new(doc, Env::default());
        page.attach_all();
        page.advance(Duration::from_secs(60));
        assert!(page.doc().alive(root));
    }

    #[test]
    fn listener_and_subscription_baseline_restored() {
        let mut doc = Document::new();
        let body = doc.body();
        let dropdown = doc.append_fragment(
            body,
            &Fragment::new("div")
                .controller("dropdown")
                .child(Fragment::new("button").target("menuButton").attr("aria-expanded", "false"))
                .child(Fragment::new("ul").target("menu").attr("hidden", "")),
        );

        let mut page = Page::new(doc, Env::default());
        for _ in 0..5 {
            let id = page.attach_to(dropdown, "dropdown").unwrap();
            page.detach_controller(id);
        }
        assert_eq!(page.listener_count(), 0);
        assert_eq!(page.subscription_count(), 0);
    }

    #[test]
    fn copy_success_posts_flash_with_csrf_token() {
        let mut doc = Document::new();
        let body = doc.body();
        add_csrf_meta(&mut doc);
        doc.append_fragment(body, &Fragment::new("div").id("flash_messages"));
        doc.append_fragment(
            body,
            &Fragment::new("div").controller("flash").child(
                Fragment::new("button")
                    .id("copy-1")
                    .controller("clipboard")
                    .data("clipboard-text", "hello"),
            ),
        );

        let mut page = Page::new(doc, Env::default());
        page.attach_all();
        let button = page.doc().element_by_id("copy-1").unwrap();
        page.dispatch(UiEvent::Click { target: button });

        assert_eq!(page.clipboard().written, vec!["hello".to_string()]);
        let requests = &page.flash_endpoint().requests;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "tok-123");
        assert_eq!(requests[0].1.message, "hello - copied to the clipboard");
    }

    #[test]
    fn copy_failure_renders_local_alert_without_posting() {
        let mut doc = Document::new();
        let body = doc.body();
        add_csrf_meta(&mut doc);
        let container = doc.append_fragment(body, &Fragment::new("div").id("flash_messages"));
        doc.append_fragment(
            body,
            &Fragment::new("div").controller("flash").child(
                Fragment::new("button")
                    .id("copy-1")
                    .controller("clipboard")
                    .data("clipboard-text", "hello"),
            ),
        );

        let mut page = Page::with_services(
            doc,
            Env::default(),
            FakeClipboard::denying("no gesture"),
            FakeFlashEndpoint::new(),
            FakeHealthProbe::new(),
        );
        page.attach_all();
        let button = page.doc().element_by_id("copy-1").unwrap();
        page.dispatch(UiEvent::Click { target: button });

        assert!(page.flash_endpoint().requests.is_empty());
        let banner = page.doc().first_child(container).unwrap();
        let text = page.doc().deep_text(banner);
        assert!(text.contains("Failed to copy \"hello\""), "{text}");
        // The fallback banner is a live alert controller.
        assert!(page
            .doc()
            .data(banner, "controller")
            .is_some_and(|c| c == "alert"));
    }

    #[test]
    fn missing_csrf_token_falls_back_locally() {
        let mut doc = Document::new();
        let body = doc.body();
        let container = doc.append_fragment(body, &Fragment::new("div").id("flash_messages"));
        doc.append_fragment(
            body,
            &Fragment::new("div").controller("flash").child(
                Fragment::new("button")
                    .id("copy-1")
                    .controller("clipboard")
                    .data("clipboard-text", "hello"),
            ),
        );

        let mut page = Page::new(doc, Env::default());
        page.attach_all();
        let button = page.doc().element_by_id("copy-1").unwrap();
        page.dispatch(UiEvent::Click { target: button });

        assert!(page.flash_endpoint().requests.is_empty());
        let banner = page.doc().first_child(container).unwrap();
        assert!(page.doc().deep_text(banner).contains("CSRF token missing"));
    }

    #[test]
    fn dialog_cancel_default_closes_unmanaged_dialog() {
        let mut doc = Document::new();
        let body = doc.body();
        let dialog = doc.append_fragment(body, &Fragment::new("dialog").attr("open", ""));

        let mut page = Page::new(doc, Env::default());
        page.dispatch(UiEvent::DialogCancel { target: dialog });
        assert!(page.doc().attr(dialog, "open").is_none());
    }

    #[test]
    fn dropdown_arrows_wrap_and_escape_restores_button_focus() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = doc.append_fragment(
            body,
            &Fragment::new("div")
                .controller("dropdown")
                .child(
                    Fragment::new("button")
                        .id("menu-btn")
                        .target("menuButton")
                        .attr("aria-expanded", "false"),
                )
                .child(
                    Fragment::new("ul")
                        .target("menu")
                        .attr("hidden", "")
                        .child(Fragment::new("a").target("menuItem").text("one"))
                        .child(Fragment::new("a").target("menuItem").text("two")),
                ),
        );

        let mut page = Page::new(doc, Env::default());
        page.attach_all();
        let button = page.doc().element_by_id("menu-btn").unwrap();
        let items = page.doc().targets(root, "menuItem");

        page.dispatch(UiEvent::Click { target: button });
        assert_eq!(page.doc().active_element(), Some(items[0]));
        let menu = page.doc().target(root, "menu").unwrap();
        assert!(page.doc().attr(menu, "hidden").is_none());

        let down = UiEvent::KeyDown {
            key: Key::ArrowDown,
            modifiers: Modifiers::NONE,
            target: items[0],
        };
        page.dispatch(down);
        assert_eq!(page.doc().active_element(), Some(items[1]));
        page.dispatch(UiEvent::KeyDown {
            key: Key::ArrowDown,
            modifiers: Modifiers::NONE,
            target: items[1],
        });
        assert_eq!(page.doc().active_element(), Some(items[0]));

        page.dispatch(UiEvent::KeyDown {
            key: Key::Escape,
            modifiers: Modifiers::NONE,
            target: items[0],
        });
        assert_eq!(page.doc().active_element(), Some(button));
        assert_eq!(page.doc().attr(button, "aria-expanded"), Some("false"));
    }

    #[test]
    fn outside_click_closes_open_dropdown() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append_fragment(
            body,
            &Fragment::new("div")
                .controller("dropdown")
                .child(
                    Fragment::new("button")
                        .id("menu-btn")
                        .target("menuButton")
                        .attr("aria-expanded", "false"),
                )
                .child(
                    Fragment::new("ul")
                        .target("menu")
                        .attr("hidden", "")
                        .child(Fragment::new("a").target("menuItem")),
                ),
        );
        let elsewhere = doc.append_fragment(body, &Fragment::new("p"));

        let mut page = Page::new(doc, Env::default());
        page.attach_all();
        let button = page.doc().element_by_id("menu-btn").unwrap();
        page.dispatch(UiEvent::Click { target: button });
        assert_eq!(page.doc().attr(button, "aria-expanded"), Some("true"));

        page.dispatch(UiEvent::Click { target: elsewhere });
        assert_eq!(page.doc().attr(button, "aria-expanded"), Some("false"));
    }

    #[test]
    fn stream_replace_swaps_controller_instances() {
        let mut doc = Document::new();
        let body = doc.body();
        let host = doc.append_fragment(body, &Fragment::new("div").id("host"));
        let old = doc.append_fragment(host, &alert_markup("8000"));

        let mut page = Page::new(doc, Env::default());
        page.attach_all();
        assert_eq!(page.controller_count(), 1);

        let replacement = StreamMessage::new().replace("alert-1", alert_markup("8000"));
        page.apply_stream(&replacement);

        assert!(!page.doc().alive(old));
        assert_eq!(page.controller_count(), 1);
        // The old instance released its listeners on detach.
        assert_eq!(page.listener_count(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn edit_form_page(changed: bool) -> (Page, NodeId, NodeId) {
            let mut doc = Document::new();
            let body = doc.body();
            let form = doc.append_fragment(
                body,
                &Fragment::new("form")
                    .controller("chat-edit")
                    .data("current-value", "Old name")
                    .child(Fragment::new("input").target("chatNameInput"))
                    .child(Fragment::new("button").target("submitEditFormButton"))
                    .child(Fragment::new("button").target("cancelEditButton")),
            );
            let input = doc.target(form, "chatNameInput").unwrap();
            doc.set_value(input, if changed { "New name" } else { "Old name" });
            let mut page = Page::new(doc, Env::default());
            page.attach_all();
            (page, form, input)
        }

        proptest! {
            /// However the user mashes terminal gestures, an edit
            /// session ends with exactly one server request.
            #[test]
            fn rename_session_settles_exactly_once(
                gestures in prop::collection::vec(0..5usize, 1..12),
                changed in any::<bool>(),
            ) {
                let (mut page, form, input) = edit_form_page(changed);
                let save = page.doc().target(form, "submitEditFormButton").unwrap();

                for gesture in gestures {
                    let event = match gesture {
                        0 => UiEvent::KeyDown {
                            key: Key::Enter,
                            modifiers: Modifiers::NONE,
                            target: input,
                        },
                        1 => UiEvent::KeyDown {
                            key: Key::Escape,
                            modifiers: Modifiers::NONE,
                            target: input,
                        },
                        2 => UiEvent::KeyDown {
                            key: Key::Tab,
                            modifiers: Modifiers::SHIFT,
                            target: input,
                        },
                        3 => UiEvent::Blur { target: input },
                        _ => UiEvent::Click { target: save },
                    };
                    page.dispatch(event);
                }

                prop_assert_eq!(page.take_requests().len(), 1);
            }
        }
    }
}
