//! Request/response correlation and the in-flight loading counter.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use shared::{
    domain::{AddressInfo, Block, BlockHash, BlockStatus, Outspend, Transaction, Txid},
    protocol::{Category, RequestDescriptor, RequestId, RequestKind, ResponseEnvelope},
};
use tracing::{debug, warn};

use crate::error::DecodeError;

/// Decoded response body, one variant per request category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    TipHeight(u64),
    Blocks(Vec<Block>),
    Block(Block),
    BlockStatus(BlockStatus),
    BlockTxs(Vec<Transaction>),
    Tx(Transaction),
    TxSpends { txid: Txid, outspends: Vec<Outspend> },
    Address(AddressInfo),
    AddrTxs(Vec<Transaction>),
    AddrTxsChain(Vec<Transaction>),
    Height(BlockHash),
}

impl Reply {
    pub fn decode(kind: &RequestKind, body: &str) -> Result<Self, DecodeError> {
        let category = kind.category();
        let reply = match kind {
            RequestKind::TipHeight => {
                let height = body.trim().parse().map_err(|_| DecodeError::Text {
                    category,
                    reason: format!("expected a block height, got `{}`", body.trim()),
                })?;
                Reply::TipHeight(height)
            }
            RequestKind::Height { .. } => {
                let hash = body.trim();
                if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(DecodeError::Text {
                        category,
                        reason: format!("expected a block hash, got `{hash}`"),
                    });
                }
                Reply::Height(BlockHash::from(hash))
            }
            RequestKind::Blocks { .. } => Reply::Blocks(json(category, body)?),
            RequestKind::Block { .. } => Reply::Block(json(category, body)?),
            RequestKind::BlockStatus { .. } => Reply::BlockStatus(json(category, body)?),
            RequestKind::BlockTxs { .. } => Reply::BlockTxs(json(category, body)?),
            RequestKind::Tx { .. } => Reply::Tx(json(category, body)?),
            RequestKind::TxSpends { txid } => Reply::TxSpends {
                txid: txid.clone(),
                outspends: json(category, body)?,
            },
            RequestKind::Address { .. } => Reply::Address(json(category, body)?),
            RequestKind::AddrTxs { .. } => Reply::AddrTxs(json(category, body)?),
            RequestKind::AddrTxsChain { .. } => Reply::AddrTxsChain(json(category, body)?),
        };
        Ok(reply)
    }
}

fn json<T: DeserializeOwned>(category: Category, body: &str) -> Result<T, DecodeError> {
    serde_json::from_str(body).map_err(|source| DecodeError::Json { category, source })
}

/// Number of foreground operations in flight. Only moves by one step at a
/// time and never drops below zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadingCounter {
    count: u32,
}

impl LoadingCounter {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn begin(&mut self) {
        self.count += 1;
    }

    pub fn settle(&mut self) {
        if self.count == 0 {
            warn!("loading counter settle without a matching begin");
            return;
        }
        self.count -= 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Background,
    IgnoredError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Success {
        request: RequestDescriptor,
        reply: Reply,
    },
    /// A foreground failure for the error channel.
    Failure {
        request: RequestDescriptor,
        message: String,
    },
    /// A failure that must not be surfaced.
    Dropped {
        request: RequestDescriptor,
        reason: DropReason,
    },
    /// Not in flight: never dispatched, or already settled.
    Unknown(RequestId),
}

#[derive(Debug, Default)]
pub struct Correlator {
    next_id: u64,
    in_flight: HashMap<RequestId, RequestDescriptor>,
    pending_searches: u32,
    loading: LoadingCounter,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags a request for dispatch. Each returned descriptor must be handed to
    /// the transport exactly once.
    pub fn dispatch(&mut self, kind: RequestKind, nav_epoch: u64) -> RequestDescriptor {
        self.next_id += 1;
        let descriptor = RequestDescriptor::new(RequestId(self.next_id), kind, nav_epoch);
        if !descriptor.background {
            self.loading.begin();
        }
        debug!(
            request_id = descriptor.id.0,
            category = %descriptor.category(),
            path = %descriptor.path(),
            nav_epoch,
            loading = self.loading.count(),
            "dispatching request"
        );
        self.in_flight.insert(descriptor.id, descriptor.clone());
        descriptor
    }

    pub fn settle(&mut self, envelope: ResponseEnvelope) -> Settlement {
        let Some(request) = self.in_flight.remove(&envelope.request.id) else {
            warn!(
                request_id = envelope.request.id.0,
                category = %envelope.category(),
                "response for a request that is not in flight"
            );
            return Settlement::Unknown(envelope.request.id);
        };
        if !request.background {
            self.loading.settle();
        }

        let decoded = match envelope.outcome {
            Ok(body) => Reply::decode(&request.kind, &body).map_err(|err| err.to_string()),
            Err(failure) => Err(failure.display_message()),
        };

        match decoded {
            Ok(reply) => Settlement::Success { request, reply },
            Err(message) if request.background => {
                debug!(category = %request.category(), %message, "dropping background failure");
                Settlement::Dropped {
                    request,
                    reason: DropReason::Background,
                }
            }
            Err(message) if request.ignore_errors => {
                debug!(category = %request.category(), %message, "dropping ignored failure");
                Settlement::Dropped {
                    request,
                    reason: DropReason::IgnoredError,
                }
            }
            Err(message) => {
                warn!(category = %request.category(), %message, "request failed");
                Settlement::Failure { request, message }
            }
        }
    }

    /// A free-text search was handed to the search provider.
    pub fn begin_search(&mut self) {
        self.pending_searches += 1;
        self.loading.begin();
    }

    /// The search provider answered.
    pub fn end_search(&mut self) {
        if self.pending_searches == 0 {
            warn!("search result without a pending search");
            return;
        }
        self.pending_searches -= 1;
        self.loading.settle();
    }

    pub fn loading(&self) -> u32 {
        self.loading.count()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// Envelopes of `category`, or all envelopes when no category is given.
///
/// [`Correlator::settle`] routes one envelope at a time; these helpers are for
/// hosts that keep a log of envelopes and filter it afterwards.
pub fn select<'a, I>(envelopes: I, category: Option<Category>) -> impl Iterator<Item = &'a ResponseEnvelope>
where
    I: IntoIterator<Item = &'a ResponseEnvelope>,
{
    envelopes
        .into_iter()
        .filter(move |envelope| category.map_or(true, |category| envelope.category() == category))
}

/// Failure messages that belong on the error channel.
pub fn error_messages<'a, I>(envelopes: I) -> impl Iterator<Item = String> + 'a
where
    I: IntoIterator<Item = &'a ResponseEnvelope>,
    I::IntoIter: 'a,
{
    envelopes.into_iter().filter_map(|envelope| {
        let request = &envelope.request;
        if request.background || request.ignore_errors {
            return None;
        }
        envelope
            .outcome
            .as_ref()
            .err()
            .map(|failure| failure.display_message())
    })
}

#[cfg(test)]
#[path = "tests/correlator_tests.rs"]
mod tests;
