//! Shared application state handed to the WebSocket handlers.

use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::realtime::Hub;

#[derive(Clone)]
pub struct AppState {
    hub: Arc<Hub>,
    dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new() -> Self {
        let hub = Arc::new(Hub::new());
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&hub)));
        Self { hub, dispatcher }
    }

    pub fn hub(&self) -> Arc<Hub> {
        Arc::clone(&self.hub)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
