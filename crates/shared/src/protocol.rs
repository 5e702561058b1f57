use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{AddressId, BlockHash, Txid},
    error::FetchFailure,
};

/// Correlation tag shared by a request and the responses it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    TipHeight,
    Blocks,
    Block,
    BlockStat,
    BlockTxs,
    Tx,
    TxSpends,
    Address,
    AddrTxs,
    AddrTxsChain,
    Height,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::TipHeight => "tip-height",
            Category::Blocks => "blocks",
            Category::Block => "block",
            Category::BlockStat => "block-stat",
            Category::BlockTxs => "block-txs",
            Category::Tx => "tx",
            Category::TxSpends => "tx-spends",
            Category::Address => "address",
            Category::AddrTxs => "addr-txs",
            Category::AddrTxsChain => "addr-txs-chain",
            Category::Height => "height",
        }
    }

    /// Categories whose replies only make sense for the page that issued them.
    pub fn is_page_scoped(self) -> bool {
        !matches!(self, Category::TipHeight)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
        }
    }
}

/// Outgoing request, one variant per category with its correlation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", content = "metadata", rename_all = "kebab-case")]
pub enum RequestKind {
    TipHeight,
    Blocks {
        start_height: Option<u64>,
    },
    Block {
        hash: BlockHash,
    },
    #[serde(rename = "block-stat")]
    BlockStatus {
        hash: BlockHash,
    },
    BlockTxs {
        hash: BlockHash,
        start_index: Option<u64>,
    },
    Tx {
        txid: Txid,
    },
    TxSpends {
        txid: Txid,
    },
    Address {
        addr: AddressId,
    },
    AddrTxs {
        addr: AddressId,
    },
    AddrTxsChain {
        addr: AddressId,
        last_txid: Txid,
    },
    Height {
        height: u64,
    },
}

impl RequestKind {
    pub fn category(&self) -> Category {
        match self {
            RequestKind::TipHeight => Category::TipHeight,
            RequestKind::Blocks { .. } => Category::Blocks,
            RequestKind::Block { .. } => Category::Block,
            RequestKind::BlockStatus { .. } => Category::BlockStat,
            RequestKind::BlockTxs { .. } => Category::BlockTxs,
            RequestKind::Tx { .. } => Category::Tx,
            RequestKind::TxSpends { .. } => Category::TxSpends,
            RequestKind::Address { .. } => Category::Address,
            RequestKind::AddrTxs { .. } => Category::AddrTxs,
            RequestKind::AddrTxsChain { .. } => Category::AddrTxsChain,
            RequestKind::Height { .. } => Category::Height,
        }
    }

    pub fn method(&self) -> Method {
        Method::Get
    }

    pub fn path(&self) -> String {
        match self {
            RequestKind::TipHeight => "/blocks/tip/height".to_string(),
            RequestKind::Blocks { start_height } => match start_height {
                Some(height) => format!("/blocks/{height}"),
                None => "/blocks/".to_string(),
            },
            RequestKind::Block { hash } => format!("/block/{hash}"),
            RequestKind::BlockStatus { hash } => format!("/block/{hash}/status"),
            RequestKind::BlockTxs { hash, start_index } => match start_index {
                Some(index) => format!("/block/{hash}/txs/{index}"),
                None => format!("/block/{hash}/txs"),
            },
            RequestKind::Tx { txid } => format!("/tx/{txid}"),
            RequestKind::TxSpends { txid } => format!("/tx/{txid}/outspends"),
            RequestKind::Address { addr } => format!("/address/{addr}"),
            RequestKind::AddrTxs { addr } => format!("/address/{addr}/txs"),
            RequestKind::AddrTxsChain { addr, last_txid } => {
                format!("/address/{addr}/txs/chain/{last_txid}")
            }
            RequestKind::Height { height } => format!("/block-height/{height}"),
        }
    }

    /// Background requests never surface errors and never count as loading.
    pub fn is_background(&self) -> bool {
        matches!(self, RequestKind::TipHeight)
    }

    pub fn ignores_errors(&self) -> bool {
        matches!(self, RequestKind::AddrTxs { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub id: RequestId,
    pub kind: RequestKind,
    /// Navigation generation this request was issued under.
    pub nav_epoch: u64,
    pub background: bool,
    pub ignore_errors: bool,
}

impl RequestDescriptor {
    pub fn new(id: RequestId, kind: RequestKind, nav_epoch: u64) -> Self {
        let background = kind.is_background();
        let ignore_errors = kind.ignores_errors();
        Self {
            id,
            kind,
            nav_epoch,
            background,
            ignore_errors,
        }
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn method(&self) -> Method {
        self.kind.method()
    }

    pub fn path(&self) -> String {
        self.kind.path()
    }
}

/// Inbound response, echoing the descriptor that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub request: RequestDescriptor,
    pub outcome: Result<String, FetchFailure>,
}

impl ResponseEnvelope {
    pub fn success(request: RequestDescriptor, body: impl Into<String>) -> Self {
        Self {
            request,
            outcome: Ok(body.into()),
        }
    }

    pub fn failure(request: RequestDescriptor, failure: FetchFailure) -> Self {
        Self {
            request,
            outcome: Err(failure),
        }
    }

    pub fn category(&self) -> Category {
        self.request.category()
    }

    pub fn ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    /// History entry key assigned by the router.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Location {
    /// Splits `path?query` into a location without a history key.
    pub fn parse(href: &str) -> Self {
        let (pathname, raw_query) = match href.split_once('?') {
            Some((path, query)) => (path, query),
            None => (href, ""),
        };
        let query = url::form_urlencoded::parse(raw_query.as_bytes())
            .into_owned()
            .collect();
        Self {
            pathname: if pathname.is_empty() {
                "/".to_string()
            } else {
                pathname.to_string()
            },
            query,
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// `?expand` is set and not explicitly switched off.
    pub fn expand_flag(&self) -> bool {
        self.query
            .get("expand")
            .is_some_and(|value| !matches!(value.as_str(), "0" | "false"))
    }

    pub fn query_string(&self) -> String {
        query_string(&self.query)
    }

    pub fn href(&self) -> String {
        format!("{}{}", self.pathname, self.query_string())
    }
}

pub fn query_string(query: &BTreeMap<String, String>) -> String {
    if query.is_empty() {
        return String::new();
    }
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter())
        .finish();
    format!("?{encoded}")
}

/// Copy of `query` with the expand flag set or removed.
pub fn with_expand(query: &BTreeMap<String, String>, expand: bool) -> BTreeMap<String, String> {
    let mut query = query.clone();
    if expand {
        query.insert("expand".to_string(), "1".to_string());
    } else {
        query.remove("expand");
    }
    query
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavMode {
    Push,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavCommand {
    pub mode: NavMode,
    pub pathname: String,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    /// Update the address without producing a navigation event.
    #[serde(default)]
    pub suppress_side_effects: bool,
}

impl NavCommand {
    pub fn push(href: &str) -> Self {
        Self::from_href(NavMode::Push, href)
    }

    pub fn replace(href: &str) -> Self {
        Self::from_href(NavMode::Replace, href)
    }

    fn from_href(mode: NavMode, href: &str) -> Self {
        let location = Location::parse(href);
        Self {
            mode,
            pathname: location.pathname,
            query: location.query,
            suppress_side_effects: false,
        }
    }

    pub fn href(&self) -> String {
        format!("{}{}", self.pathname, query_string(&self.query))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefKey {
    Lang,
    Theme,
}

impl PrefKey {
    pub fn as_str(self) -> &'static str {
        match self {
            PrefKey::Lang => "lang",
            PrefKey::Theme => "theme",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageWrite {
    pub key: PrefKey,
    pub value: String,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
