//! Resolution of locations against the explorer's declared path patterns.

use crate::{
    domain::{AddressId, BlockHash, Txid},
    protocol::Location,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`, optionally starting the block list at `?start=`.
    Home { start_height: Option<u64> },
    /// `/block/:hash`
    Block { hash: BlockHash },
    /// `/block-height/:height`
    BlockHeight { height: u64 },
    /// `/address/:addr`
    Address { addr: AddressId },
    /// `/tx/:txid`
    Tx { txid: Txid },
    /// `/:q`, or `/search?q=`
    Search { query: String },
    NotFound,
}

impl Route {
    pub fn resolve(location: &Location) -> Self {
        let trimmed = location.pathname.trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .split('/')
            .skip(1)
            .collect();

        match segments.as_slice() {
            [] => Route::Home {
                start_height: location
                    .query
                    .get("start")
                    .and_then(|raw| raw.parse().ok()),
            },
            ["block", hash] if !hash.is_empty() => Route::Block {
                hash: BlockHash::from(*hash),
            },
            ["block-height", height] => match height.parse() {
                Ok(height) => Route::BlockHeight { height },
                Err(_) => Route::NotFound,
            },
            ["address", addr] if !addr.is_empty() => Route::Address {
                addr: AddressId::from(*addr),
            },
            ["tx", txid] if !txid.is_empty() => Route::Tx {
                txid: Txid::from(*txid),
            },
            [q] if is_search_term(q) => {
                let query = if *q == "search" {
                    location.query.get("q").map(|q| q.trim().to_string())
                } else {
                    Some(q.to_string())
                };
                match query {
                    Some(query) if !query.is_empty() => Route::Search { query },
                    _ => Route::NotFound,
                }
            }
            _ => Route::NotFound,
        }
    }

    /// Whether this route's page loads an entity that shows the chain tip.
    pub fn refreshes_tip(&self) -> bool {
        matches!(
            self,
            Route::Block { .. } | Route::Tx { .. } | Route::Address { .. }
        )
    }
}

fn is_search_term(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(href: &str) -> Route {
        Route::resolve(&Location::parse(href))
    }

    #[test]
    fn resolves_home_with_and_without_start() {
        assert_eq!(resolve("/"), Route::Home { start_height: None });
        assert_eq!(
            resolve("/?start=120"),
            Route::Home {
                start_height: Some(120)
            }
        );
    }

    #[test]
    fn resolves_entity_pages() {
        assert_eq!(
            resolve("/block/00ab"),
            Route::Block {
                hash: BlockHash::from("00ab")
            }
        );
        assert_eq!(
            resolve("/tx/ff01/"),
            Route::Tx {
                txid: Txid::from("ff01")
            }
        );
        assert_eq!(
            resolve("/address/bc1qxyz"),
            Route::Address {
                addr: AddressId::from("bc1qxyz")
            }
        );
        assert_eq!(resolve("/block-height/7"), Route::BlockHeight { height: 7 });
    }

    #[test]
    fn bare_segment_and_search_page_become_queries() {
        assert_eq!(
            resolve("/deadbeef"),
            Route::Search {
                query: "deadbeef".to_string()
            }
        );
        assert_eq!(
            resolve("/search?q=%20800000%20"),
            Route::Search {
                query: "800000".to_string()
            }
        );
    }

    #[test]
    fn malformed_paths_are_not_found() {
        assert_eq!(resolve("/block-height/abc"), Route::NotFound);
        assert_eq!(resolve("/search"), Route::NotFound);
        assert_eq!(resolve("/a/b/c"), Route::NotFound);
        assert_eq!(resolve("/not-alnum"), Route::NotFound);
    }
}
