// Library root
// -----------
// This crate exposes the library surface used by the interactive CLI.
// The binary (`main.rs`) wires these modules together.
//
// Module responsibilities:
// - `api`: OAuth client-credentials token exchange and the authenticated
//   content-creation call against the content management API.
// - `store`: the list of named connection profiles persisted as JSON.
// - `config`: where the profile list lives on disk.
// - `logging`: tracing subscriber setup.
// - `ui`: terminal menus that drive `api` and `store`.
//
// `api` and `store` do not know about each other; only `ui` combines them.
pub mod api;
pub mod config;
pub mod logging;
pub mod store;
pub mod ui;

pub use api::{AccessToken, ClientError, ContentClient};
pub use store::{ConnectionProfile, ConnectionStore, ProfileError, StoreError};
