//! Next-page cursors for the three paginated lists. `None` means the list is
//! exhausted.

use shared::domain::{AddressInfo, Block, Transaction, Txid};

/// Height to request the next block page from.
pub fn next_blocks_cursor(blocks: Option<&[Block]>) -> Option<u64> {
    let last = blocks?.last()?;
    (last.height > 0).then(|| last.height - 1)
}

/// Start index of the next page of a block's transactions.
pub fn next_block_txs_cursor(block: Option<&Block>, txs: Option<&[Transaction]>) -> Option<u64> {
    let (block, txs) = (block?, txs?);
    let loaded = txs.len() as u64;
    (block.tx_count > loaded).then_some(loaded)
}

/// Last loaded txid, used to fetch the next chain page of an address.
///
/// Addresses without confirmed transactions only have a mempool page.
pub fn next_address_txs_cursor(
    addr: Option<&AddressInfo>,
    txs: Option<&[Transaction]>,
) -> Option<Txid> {
    let (addr, txs) = (addr?, txs?);
    let last = txs.last()?;
    let confirmed = addr.confirmed_count();
    let total = confirmed + addr.unconfirmed_count();
    (confirmed > 0 && total > txs.len() as u64).then(|| last.txid.clone())
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
