//! Drum View Layer
//!
//! Ordered live lists mirrored onto a rendered element tree.
//!
//! - **list**: [`OrderedList`], the sorted, token-keyed collection
//! - **mount**: [`Mount`], the container a list renders into
//! - **dom**: headless element tree and [`DomMount`](dom::DomMount)
//! - **error**: error types
//!
//! # Example
//!
//! ```
//! use drum::view::dom::{p, DomMount};
//! use drum::view::{OrderedList, Record, RenderError};
//!
//! struct Wallet {
//!     token: String,
//!     balance: u64,
//! }
//!
//! impl Record for Wallet {
//!     fn token(&self) -> &str {
//!         &self.token
//!     }
//! }
//!
//! let mut wallets = OrderedList::new(
//!     DomMount::new("wallets"),
//!     |w: &Wallet| Ok::<_, RenderError>(p().text(w.balance.to_string())),
//!     |a: &Wallet, b: &Wallet| a.balance < b.balance,
//! );
//!
//! wallets.insert(Wallet { token: "A".into(), balance: 10 }).unwrap();
//! wallets.insert(Wallet { token: "B".into(), balance: 5 }).unwrap();
//! assert_eq!(wallets.tokens(), vec!["B", "A"]);
//! assert_eq!(wallets.mount().keys(), vec!["wallets-B", "wallets-A"]);
//! ```

pub mod dom;
mod error;
mod list;
mod mount;

pub use error::{RenderError, ViewError, ViewResult};
pub use list::{OrderedList, PrecedesFn, Record, RenderFn};
pub use mount::{Mount, MountError};
