//! Fan-out handler

use crate::core::handler::guarded;
use crate::core::{Handler, LogEntry, Result};
use std::sync::Arc;

/// Delivers every entry to each member handler in order
///
/// A failing or panicking member does not stop the others; the last error
/// seen is returned once all members have run.
#[derive(Default)]
pub struct MultiHandler {
    handlers: Vec<Arc<dyn Handler>>,
}

impl MultiHandler {
    pub fn new(handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self { handlers }
    }

    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn for_each<F>(&self, mut op: F) -> Result<()>
    where
        F: FnMut(&dyn Handler) -> Result<()>,
    {
        let mut last_error = None;
        for handler in &self.handlers {
            if let Err(e) = guarded(handler.as_ref(), &mut op) {
                last_error = Some(e);
            }
        }
        match last_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Handler for MultiHandler {
    fn handle(&self, entry: &LogEntry) -> Result<()> {
        self.for_each(|handler| handler.handle(entry))
    }

    fn close(&self) -> Result<()> {
        self.for_each(|handler| handler.close())
    }

    fn name(&self) -> &str {
        "multi"
    }
}
