//! Free-text search resolution.

use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{AddressId, BlockHash, Txid},
    protocol::{RequestDescriptor, RequestId, RequestKind},
};
use tracing::debug;

use crate::transport::Transport;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Path of the page the query names, or `None` when nothing matched.
    async fn search(&self, query: &str) -> Option<String>;
}

/// Resolves queries by probing the API: heights directly, 64-hex strings as
/// a transaction and then a block, anything else as an address.
#[derive(Clone)]
pub struct TransportSearch {
    transport: Arc<dyn Transport>,
}

impl TransportSearch {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn exists(&self, kind: RequestKind) -> bool {
        let request = RequestDescriptor::new(RequestId(0), kind, 0);
        match self.transport.fetch(&request).await {
            Ok(_) => true,
            Err(failure) => {
                debug!(path = %request.path(), message = %failure.display_message(), "search probe missed");
                false
            }
        }
    }
}

fn is_hash(query: &str) -> bool {
    query.len() == 64 && query.chars().all(|c| c.is_ascii_hexdigit())
}

#[async_trait]
impl SearchProvider for TransportSearch {
    async fn search(&self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        if query.chars().all(|c| c.is_ascii_digit()) {
            return Some(format!("/block-height/{query}"));
        }
        if is_hash(query) {
            let txid = Txid::from(query);
            if self.exists(RequestKind::Tx { txid }).await {
                return Some(format!("/tx/{query}"));
            }
            let hash = BlockHash::from(query);
            if self.exists(RequestKind::Block { hash }).await {
                return Some(format!("/block/{query}"));
            }
            return None;
        }
        let addr = AddressId::from(query);
        self.exists(RequestKind::Address { addr })
            .await
            .then(|| format!("/address/{query}"))
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
