//! Async client for the two Home Assistant API surfaces tidyhaus needs.
//!
//! - **[`RestClient`]** — Bearer-token REST client for entity states and
//!   the persisted scene/script/automation configurations.
//! - **[`RegistryClient`]** — WebSocket command client for the area,
//!   device, and entity registries (list + update commands correlated by
//!   message id).
//!
//! Both clients return raw wire payloads ([`models`]); `tidyhaus-core`
//! converts them into its domain model. Nothing in this crate knows about
//! renaming semantics.

pub mod error;
pub mod models;
pub mod registry;
pub mod rest;
pub mod transport;

pub use error::Error;
pub use models::{RawArea, RawDevice, RawEntityEntry, RawState};
pub use registry::{EntityUpdate, RegistryClient};
pub use rest::RestClient;
pub use transport::{TlsMode, TransportConfig};
