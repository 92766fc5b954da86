#![forbid(unsafe_code)]

//! Conditional diagnostic logging.
//!
//! Controllers log through this capability instead of a shared base
//! type: a controller opts in with a debug flag, and logging is
//! suppressed entirely when the page's `environment` meta entry says
//! `production`. Absence of the meta entry counts as non-production
//! (a bare test document should log).

use chatkit_dom::Document;

#[derive(Debug, Clone, Copy)]
pub struct Diagnostics {
    debug: bool,
}

impl Diagnostics {
    #[must_use]
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    #[must_use]
    pub fn enabled(&self, doc: &Document) -> bool {
        self.debug && !is_production(doc)
    }

    /// Announce a controller connecting, the way every controller does.
    pub fn connected(&self, name: &str, doc: &Document) {
        if self.enabled(doc) {
            tracing::debug!(controller = name, "connected");
        }
    }
}

fn is_production(doc: &Document) -> bool {
    doc.meta_content("environment")
        .is_some_and(|env| env == "production")
}
