use std::sync::Arc;

use crate::config::Cli;
use crate::linker::ReferenceScanner;
use crate::store::{PostgrestStore, Store};
use crate::Result;

/// Built once at startup and shared read-only by every request.
pub struct AppState {
    store: Option<Arc<dyn Store>>,
    scanner: ReferenceScanner,
}

impl AppState {
    pub fn new(store: Option<Arc<dyn Store>>, scanner: ReferenceScanner) -> Self {
        Self { store, scanner }
    }

    /// Leaves the store unset when credentials are missing; requests then get a 500.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let store = match cli.store_credentials() {
            Some((url, key)) => {
                let store = PostgrestStore::new(url, key, cli.store_timeout())?;
                Some(Arc::new(store) as Arc<dyn Store>)
            }
            None => None,
        };
        let scanner = ReferenceScanner::new(cli.reference_tag.as_deref())?;

        Ok(Self::new(store, scanner))
    }

    pub fn store(&self) -> Option<&dyn Store> {
        self.store.as_deref()
    }

    pub fn scanner(&self) -> &ReferenceScanner {
        &self.scanner
    }
}
