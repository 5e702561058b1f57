use std::fmt::Write as _;

use client_core::{effects::AdvisorySink, Renderer, Snapshot, View};

/// Plain-text page summary. Pages still loading render nothing.
pub struct TextRenderer;

/// The whole snapshot as pretty JSON, once loading has settled.
pub struct JsonRenderer;

fn settled(snapshot: &Snapshot) -> bool {
    snapshot.view != View::Loading && snapshot.loading == 0
}

impl Renderer for TextRenderer {
    type Tree = String;

    fn render(&self, snapshot: &Snapshot) -> Option<String> {
        settled(snapshot).then(|| render_text(snapshot))
    }
}

impl Renderer for JsonRenderer {
    type Tree = String;

    fn render(&self, snapshot: &Snapshot) -> Option<String> {
        if !settled(snapshot) {
            return None;
        }
        serde_json::to_string_pretty(snapshot).ok()
    }
}

pub struct StderrAdvisory;

impl AdvisorySink for StderrAdvisory {
    fn show(&self, message: &str) {
        eprintln!("{message}");
    }
}

pub fn render_text(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    if let Some(title) = &snapshot.title {
        let _ = writeln!(out, "{title}");
    }
    if let Some(tip) = snapshot.tip_height {
        let _ = writeln!(out, "tip height: {tip}");
    }

    match snapshot.view {
        View::Home => {
            let _ = writeln!(out, "Latest blocks");
            for block in snapshot.blocks.iter().flatten() {
                let _ = writeln!(
                    out,
                    "  #{:<8} {}  {} txs",
                    block.height, block.id, block.tx_count
                );
            }
            if let Some(next) = snapshot.next_more_blocks {
                let _ = writeln!(out, "  more: /?start={next}");
            }
        }
        View::Block => {
            if let Some(block) = &snapshot.block {
                let _ = writeln!(out, "height:  {}", block.height);
                if let Some(time) = block.time() {
                    let _ = writeln!(out, "time:    {time}");
                }
                let _ = writeln!(out, "txs:     {}", block.tx_count);
            }
            if let Some(status) = &snapshot.block_status {
                let _ = writeln!(out, "in best chain: {}", status.in_best_chain);
            }
            for tx in snapshot.block_txs.iter().flatten() {
                let _ = writeln!(out, "  {}", tx.txid);
            }
            if let Some(next) = snapshot.next_more_block_txs {
                let _ = writeln!(out, "  more from index {next}");
            }
        }
        View::Tx => {
            if let Some(tx) = &snapshot.tx {
                let status = match tx.status.block_height {
                    Some(height) if tx.status.confirmed => format!("confirmed in block {height}"),
                    _ => "unconfirmed".to_string(),
                };
                let _ = writeln!(out, "status:  {status}");
                let _ = writeln!(out, "inputs:  {}", tx.vin.len());
                let _ = writeln!(out, "outputs: {}", tx.vout.len());
                let _ = writeln!(out, "fee:     {} sat", tx.fee);
                if let Some(spends) = snapshot.spends.get(&tx.txid) {
                    let spent = spends.iter().filter(|spend| spend.spent).count();
                    let _ = writeln!(out, "spent outputs: {spent}/{}", spends.len());
                }
            }
        }
        View::Addr => {
            if let Some(addr) = &snapshot.addr {
                let _ = writeln!(out, "confirmed txs:   {}", addr.confirmed_count());
                let _ = writeln!(out, "unconfirmed txs: {}", addr.unconfirmed_count());
            }
            for tx in snapshot.addr_txs.iter().flatten() {
                let _ = writeln!(out, "  {}", tx.txid);
            }
            if let Some(last) = &snapshot.next_more_addr_txs {
                let _ = writeln!(out, "  more after {last}");
            }
        }
        View::Error => {
            let message = snapshot.error.as_deref().unwrap_or("unknown error");
            let _ = writeln!(out, "error: {message}");
        }
        View::NotFound => {
            let _ = writeln!(out, "not found: {}", snapshot.page.href());
        }
        View::Loading => {
            let _ = writeln!(out, "loading...");
        }
    }
    out
}
