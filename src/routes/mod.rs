//! HTTP route handlers outside the dispatch core.

pub mod assets;

pub use assets::{csrf_token, handle_asset, AssetKind, AssetSource};
