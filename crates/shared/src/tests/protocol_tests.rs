use serde_json::json;

use super::*;
use crate::error::FailureCode;

#[test]
fn request_kinds_carry_typed_metadata_on_the_wire() {
    let kind = RequestKind::AddrTxsChain {
        addr: AddressId::from("bc1qxyz"),
        last_txid: Txid::from("aa"),
    };
    assert_eq!(
        serde_json::to_value(&kind).expect("encode"),
        json!({
            "category": "addr-txs-chain",
            "metadata": { "addr": "bc1qxyz", "last_txid": "aa" }
        })
    );
    assert_eq!(
        serde_json::to_value(RequestKind::TipHeight).expect("encode"),
        json!({ "category": "tip-height" })
    );
}

#[test]
fn descriptor_flags_follow_the_kind() {
    let tip = RequestDescriptor::new(RequestId(1), RequestKind::TipHeight, 3);
    assert!(tip.background);
    assert!(!tip.category().is_page_scoped());

    let addr_txs = RequestDescriptor::new(
        RequestId(2),
        RequestKind::AddrTxs {
            addr: AddressId::from("bc1qxyz"),
        },
        3,
    );
    assert!(!addr_txs.background);
    assert!(addr_txs.ignore_errors);
    assert_eq!(addr_txs.method().as_str(), "GET");
    assert_eq!(addr_txs.category().to_string(), "addr-txs");
}

#[test]
fn block_pages_use_optional_cursors_in_the_path() {
    let hash = BlockHash::from("00ab");
    assert_eq!(
        RequestKind::BlockTxs {
            hash: hash.clone(),
            start_index: Some(25),
        }
        .path(),
        "/block/00ab/txs/25"
    );
    assert_eq!(
        RequestKind::Blocks {
            start_height: Some(10)
        }
        .path(),
        "/blocks/10"
    );
    assert_eq!(RequestKind::BlockStatus { hash }.path(), "/block/00ab/status");
}

#[test]
fn location_parses_and_rebuilds_queries() {
    let location = Location::parse("/tx/aa?expand=1&b=x%20y");
    assert_eq!(location.pathname, "/tx/aa");
    assert!(location.expand_flag());
    assert_eq!(location.query.get("b").map(String::as_str), Some("x y"));
    assert_eq!(location.href(), "/tx/aa?b=x+y&expand=1");

    assert_eq!(Location::parse("").pathname, "/");
    assert!(!Location::parse("/tx/aa?expand=false").expand_flag());
}

#[test]
fn expand_is_added_and_removed_without_touching_other_keys() {
    let location = Location::parse("/block/00?foo=bar");
    let expanded = with_expand(&location.query, true);
    assert_eq!(query_string(&expanded), "?expand=1&foo=bar");
    assert_eq!(query_string(&with_expand(&expanded, false)), "?foo=bar");
    assert_eq!(query_string(&BTreeMap::new()), "");
}

#[test]
fn nav_commands_split_the_href() {
    let command = NavCommand::push("/search?q=abc");
    assert_eq!(command.mode, NavMode::Push);
    assert_eq!(command.pathname, "/search");
    assert_eq!(command.href(), "/search?q=abc");
    assert!(!command.suppress_side_effects);
}

#[test]
fn failures_render_status_and_message() {
    assert_eq!(
        FetchFailure::http(404, "Transaction not found").to_string(),
        "HTTP 404: Transaction not found"
    );
    assert_eq!(FetchFailure::http(502, "  ").display_message(), "HTTP 502");
    assert_eq!(FetchFailure::http(429, "slow down").code, FailureCode::RateLimited);
    assert_eq!(
        FetchFailure::new(FailureCode::Network, "connection reset").to_string(),
        "connection reset"
    );
}

#[test]
fn failures_box_as_std_errors() {
    let boxed: Box<dyn std::error::Error + Send + Sync> =
        Box::new(FetchFailure::http(500, "upstream down"));
    assert_eq!(boxed.to_string(), "HTTP 500: upstream down");
    assert!(boxed.source().is_none());
}
