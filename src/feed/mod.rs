//! Drum Feed
//!
//! Turns server events into view changes.
//!
//! ## Architecture
//!
//! - **Source**: yields lifecycle and text frames ([`EventSource`])
//! - **Messages**: decoded events, tagged by `action` ([`FeedMessage`])
//! - **Dispatcher**: owns every region's list and applies events ([`Dispatcher`])
//! - **Session**: drives a source into a dispatcher ([`Session`])
//!
//! ```text
//! EventSource → Frame → Dispatcher → FeedMessage → OrderedList::{insert, update, remove}
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use drum::config::Config;
//! use drum::feed::{Dispatcher, LineSource, Session};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let mut dispatcher = Dispatcher::new(&config);
//!     let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//!     let mut source = LineSource::new(stdin, config.feed.max_frame_bytes);
//!
//!     let stats = Session::new().run(&mut source, &mut dispatcher).await;
//!     println!("applied {} events", stats.applied);
//! }
//! ```

mod dispatch;
mod messages;
pub mod renderers;
mod session;
mod source;
mod types;

pub use dispatch::{DispatchError, DispatchStats, Dispatcher, DomList, Region};
pub use messages::FeedMessage;
pub use session::{Session, SessionStats};
pub use source::{ChannelSource, EventSource, Frame, LineSource};
pub use types::{parse_balance, Engagement, Post, Stage, Wallet};
