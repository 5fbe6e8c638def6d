//! Storage engine for `lclip`, a labeled clipboard.
//!
//! Values are arbitrary bytes filed under text labels and persisted as one
//! JSON object in a single file (by default `~/.lclip.json`). Each process
//! opens the store, applies its changes in memory and closes it to commit:
//!
//! ```no_run
//! use lclip_core::LabelStore;
//!
//! # fn main() -> Result<(), lclip_core::CoreError> {
//! let mut store = LabelStore::open(lclip_core::default_path()?)?;
//! store.set("greeting", "hello");
//! assert_eq!(store.get("greeting"), b"hello");
//! store.close()?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
mod lock;
pub mod paths;
pub mod store;

pub use error::CoreError;
pub use paths::default_path;
pub use store::LabelStore;
