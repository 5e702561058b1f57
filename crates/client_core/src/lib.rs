//! Client-side state synchronisation for the block explorer.
//!
//! [`ExplorerCore`] is a synchronous state machine: navigation, clicks,
//! responses, preference loads, search results and timer ticks go in, and
//! [`Effects`] (a full [`Snapshot`], requests to dispatch, history commands,
//! storage writes) come out. [`ExplorerRuntime`] hosts it on tokio and wires
//! the effects to a [`Transport`], a [`Router`] and a [`PreferenceStore`].

pub mod accumulator;
pub mod combinator;
pub mod config;
pub mod correlator;
pub mod effects;
pub mod error;
pub mod explorer;
pub mod l10n;
pub mod pagination;
pub mod preferences;
pub mod refresh;
pub mod router;
pub mod runtime;
pub mod search;
pub mod toggle;
pub mod transport;
pub mod view;

pub use combinator::{Combinator, Input};
pub use correlator::{error_messages, select, Correlator, Reply, Settlement};
pub use effects::{EffectDispatcher, Effects, Renderer, SnapshotRenderer};
pub use error::{CombinatorError, DecodeError, PreferenceError, TransportError};
pub use explorer::{ClickAction, CoreOptions, Event, EventKind, ExplorerCore, Snapshot};
pub use preferences::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use router::{HistoryRouter, Router};
pub use runtime::{Collaborators, ExplorerRuntime, RuntimeHandle};
pub use search::{SearchProvider, TransportSearch};
pub use transport::{HttpTransport, Transport};
pub use view::View;
