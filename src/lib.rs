//! # Drum
//!
//! Client-side views for the drum social feed.
//!
//! ## Features
//!
//! - **Ordered live lists**: sorted, token-keyed collections mirrored 1:1 onto a rendered tree
//! - **Headless element tree**: renderers build elements, mounts track them by handle
//! - **Feed dispatch**: server events routed to wallets, stages, moderation queue, engagements and posts
//! - **Fault isolation**: a bad event is logged and dropped, never corrupts a view
//!
//! ## Modules
//!
//! - [`view`]: ordered list, mount abstraction, element tree
//! - [`feed`]: event sources, messages, renderers, dispatcher, session
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust
//! use drum::config::Config;
//! use drum::feed::{Dispatcher, FeedMessage, Region, Wallet};
//!
//! let mut dispatcher = Dispatcher::new(&Config::default());
//!
//! dispatcher
//!     .dispatch(FeedMessage::NewWalletBalance(Wallet::new("0xab", 10)))
//!     .unwrap();
//! dispatcher
//!     .handle_text(r#"{"action":"NewWalletBalance","token":"0xcd","balance":"20,934"}"#)
//!     .unwrap();
//!
//! assert_eq!(dispatcher.region_tokens(Region::Wallets), vec!["0xcd", "0xab"]);
//! ```

pub mod config;
pub mod feed;
pub mod logging;
pub mod view;

pub use config::{Config, ConfigError, FeedConfig, LoggingConfig, SortOrder, ViewsConfig};

pub use feed::{
    ChannelSource, DispatchError, DispatchStats, Dispatcher, EventSource, FeedMessage, Frame,
    LineSource, Region, Session, SessionStats,
};

pub use view::{Mount, OrderedList, Record, RenderError, ViewError, ViewResult};
