//! Event dispatch
//!
//! The [`Dispatcher`] is the application context: it owns one ordered list
//! per UI region and applies decoded feed events to them.
//!
//! A bad event (undecodable frame, unknown token, failed render) is logged
//! and dropped; the next event is processed as usual.

use std::fmt;

use thiserror::Error;

use crate::config::{Config, SortOrder};
use crate::view::dom::DomMount;
use crate::view::{OrderedList, Record, ViewError};

use super::messages::FeedMessage;
use super::renderers;
use super::source::Frame;
use super::types::{Engagement, Post, Stage, Wallet};

/// Ordered list rendered into a headless mount
pub type DomList<R> = OrderedList<R, DomMount>;

/// UI regions driven by the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Wallets,
    Stages,
    Moderations,
    Engagements,
    Posts,
}

impl Region {
    pub fn all() -> &'static [Region] {
        &[
            Region::Wallets,
            Region::Stages,
            Region::Moderations,
            Region::Engagements,
            Region::Posts,
        ]
    }

    /// Id of the mount element for this region
    pub fn mount_id(&self) -> &'static str {
        match self {
            Region::Wallets => "wallets",
            Region::Stages => "mystages",
            Region::Moderations => "mymoderation",
            Region::Engagements => "myengagements",
            Region::Posts => "posts",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mount_id())
    }
}

/// Errors from applying a single event
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Frame text is not a known feed message
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A region rejected the change
    #[error("{region}: {source}")]
    View {
        region: Region,
        #[source]
        source: ViewError,
    },

    /// The event names a token no region knows
    #[error("Unknown token: {0}")]
    UnknownToken(String),
}

/// Counters kept by the dispatcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Events applied to the views
    pub applied: u64,
    /// Events logged and dropped
    pub dropped: u64,
    /// Times the views were emptied on disconnect
    pub resets: u64,
}

/// Application context owning every region
pub struct Dispatcher {
    wallets: DomList<Wallet>,
    stages: DomList<Stage>,
    moderations: DomList<Stage>,
    engagements: DomList<Engagement>,
    posts: DomList<Post>,
    /// Stage whose posts fill the main view
    open_stage: Option<String>,
    reset_on_disconnect: bool,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(config: &Config) -> Self {
        let wallet_order = config.views.wallet_order;

        Self {
            wallets: OrderedList::new(
                DomMount::new(Region::Wallets.mount_id()),
                renderers::wallet,
                move |a: &Wallet, b: &Wallet| match wallet_order {
                    SortOrder::Ascending => a.balance < b.balance,
                    SortOrder::Descending => a.balance > b.balance,
                },
            ),
            stages: OrderedList::new(
                DomMount::new(Region::Stages.mount_id()),
                renderers::stage,
                by_caption,
            ),
            moderations: OrderedList::new(
                DomMount::new(Region::Moderations.mount_id()),
                renderers::stage,
                by_caption,
            ),
            engagements: OrderedList::new(
                DomMount::new(Region::Engagements.mount_id()),
                renderers::engagement,
                |a: &Engagement, b: &Engagement| a.name < b.name,
            ),
            // Posts keep arrival order
            posts: OrderedList::new(
                DomMount::new(Region::Posts.mount_id()),
                renderers::post,
                |_: &Post, _: &Post| false,
            ),
            open_stage: config.views.open_stage.clone(),
            reset_on_disconnect: config.feed.reset_on_disconnect,
            stats: DispatchStats::default(),
        }
    }

    /// Handle one frame from the event source
    ///
    /// Never fails: errors are logged and the event is dropped.
    pub fn handle_frame(&mut self, frame: Frame) {
        match frame {
            Frame::Open => {
                tracing::info!("Feed connected");
            }
            Frame::Text(text) => match self.handle_text(&text) {
                Ok(()) => self.stats.applied += 1,
                Err(e) => {
                    self.stats.dropped += 1;
                    tracing::warn!(error = %e, "Dropping feed event");
                }
            },
            Frame::Closed { reason } => {
                tracing::info!(reason = %reason, "Feed closed");
                self.disconnected();
            }
            Frame::Error(error) => {
                tracing::warn!(error = %error, "Feed error");
                self.disconnected();
            }
        }
    }

    /// Decode and apply a text frame
    pub fn handle_text(&mut self, text: &str) -> Result<(), DispatchError> {
        let message = FeedMessage::decode(text)?;
        self.dispatch(message)
    }

    /// Apply a decoded event to the regions it concerns
    pub fn dispatch(&mut self, message: FeedMessage) -> Result<(), DispatchError> {
        tracing::debug!(action = message.action(), "Dispatching feed event");

        match message {
            FeedMessage::NewWalletBalance(wallet) => {
                upsert(&mut self.wallets, Region::Wallets, wallet)
            }
            FeedMessage::WalletRemoved { token } => self
                .wallets
                .remove(&token)
                .map(|_| ())
                .map_err(|source| DispatchError::View {
                    region: Region::Wallets,
                    source,
                }),
            FeedMessage::NewStage(stage) => {
                let moderated = if stage.moderation {
                    let mut counted = stage.clone();
                    if let Some(known) = self.moderations.has(&stage.token) {
                        counted.count = counted.count.max(known.count);
                    }
                    upsert(&mut self.moderations, Region::Moderations, counted)
                } else {
                    Ok(())
                };
                let listed = upsert(&mut self.stages, Region::Stages, stage);
                moderated.and(listed)
            }
            FeedMessage::StageEngaged(mut engagement) => {
                // Counters are kept on the client; a re-announce must not zero them
                if let Some(known) = self.engagements.has(&engagement.token) {
                    engagement.count = engagement.count.max(known.count);
                }
                upsert(&mut self.engagements, Region::Engagements, engagement)
            }
            FeedMessage::NewStagePost { stage, post } => {
                let moderated = bump(&mut self.moderations, Region::Moderations, &stage, |s| {
                    s.count += 1
                });
                let posted = if self.open_stage.as_deref() == Some(stage.as_str()) {
                    upsert(&mut self.posts, Region::Posts, post)
                } else {
                    Ok(())
                };
                let engaged = bump(&mut self.engagements, Region::Engagements, &stage, |e| {
                    e.count += 1
                });
                moderated.and(posted).and(engaged)
            }
            FeedMessage::StageClosed { token } => self.close_stage(&token),
            FeedMessage::OpenStage { token } => {
                self.posts.reset();
                tracing::info!(stage = %token, "Opened stage");
                self.open_stage = Some(token);
                Ok(())
            }
        }
    }

    /// Empty every region
    pub fn reset(&mut self) {
        self.wallets.reset();
        self.stages.reset();
        self.moderations.reset();
        self.engagements.reset();
        self.posts.reset();
    }

    /// Serialize one region's mount to HTML
    pub fn region_html(&self, region: Region) -> String {
        match region {
            Region::Wallets => self.wallets.mount().to_html(),
            Region::Stages => self.stages.mount().to_html(),
            Region::Moderations => self.moderations.mount().to_html(),
            Region::Engagements => self.engagements.mount().to_html(),
            Region::Posts => self.posts.mount().to_html(),
        }
    }

    /// Tokens of one region, in display order
    pub fn region_tokens(&self, region: Region) -> Vec<&str> {
        match region {
            Region::Wallets => self.wallets.tokens(),
            Region::Stages => self.stages.tokens(),
            Region::Moderations => self.moderations.tokens(),
            Region::Engagements => self.engagements.tokens(),
            Region::Posts => self.posts.tokens(),
        }
    }

    pub fn wallets(&self) -> &DomList<Wallet> {
        &self.wallets
    }

    pub fn stages(&self) -> &DomList<Stage> {
        &self.stages
    }

    pub fn moderations(&self) -> &DomList<Stage> {
        &self.moderations
    }

    pub fn engagements(&self) -> &DomList<Engagement> {
        &self.engagements
    }

    pub fn posts(&self) -> &DomList<Post> {
        &self.posts
    }

    pub fn open_stage(&self) -> Option<&str> {
        self.open_stage.as_deref()
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    fn close_stage(&mut self, token: &str) -> Result<(), DispatchError> {
        let mut found = false;
        let mut first_error = None;

        let results = [
            remove_if_present(&mut self.stages, Region::Stages, token),
            remove_if_present(&mut self.moderations, Region::Moderations, token),
            remove_if_present(&mut self.engagements, Region::Engagements, token),
        ];
        for result in results {
            match result {
                Ok(removed) => found |= removed,
                Err(e) => {
                    found = true;
                    first_error.get_or_insert(e);
                }
            }
        }

        if self.open_stage.as_deref() == Some(token) {
            self.posts.reset();
            self.open_stage = None;
            found = true;
        }

        match first_error {
            Some(e) => Err(e),
            None if found => Ok(()),
            None => Err(DispatchError::UnknownToken(token.to_string())),
        }
    }

    fn disconnected(&mut self) {
        if self.reset_on_disconnect {
            self.reset();
            self.stats.resets += 1;
            tracing::debug!("Views reset after disconnect");
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("wallets", &self.wallets.len())
            .field("stages", &self.stages.len())
            .field("moderations", &self.moderations.len())
            .field("engagements", &self.engagements.len())
            .field("posts", &self.posts.len())
            .field("open_stage", &self.open_stage)
            .field("stats", &self.stats)
            .finish()
    }
}

fn by_caption(a: &Stage, b: &Stage) -> bool {
    a.caption < b.caption
}

/// Update when the token is present, insert otherwise
fn upsert<R: Record>(
    list: &mut DomList<R>,
    region: Region,
    record: R,
) -> Result<(), DispatchError> {
    let result = if list.has(record.token()).is_some() {
        list.update(record)
    } else {
        list.insert(record)
    };
    result.map_err(|source| DispatchError::View { region, source })
}

/// Modify a copy of the stored record and write it back; no-op when absent
fn bump<R: Record + Clone>(
    list: &mut DomList<R>,
    region: Region,
    token: &str,
    change: impl FnOnce(&mut R),
) -> Result<(), DispatchError> {
    let Some(existing) = list.has(token) else {
        return Ok(());
    };
    let mut next = existing.clone();
    change(&mut next);
    list.update(next)
        .map_err(|source| DispatchError::View { region, source })
}

fn remove_if_present<R: Record>(
    list: &mut DomList<R>,
    region: Region,
    token: &str,
) -> Result<bool, DispatchError> {
    if list.has(token).is_none() {
        return Ok(false);
    }
    list.remove(token)
        .map(|_| true)
        .map_err(|source| DispatchError::View { region, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(&Config::default())
    }

    fn text(json: &str) -> Frame {
        Frame::Text(json.to_string())
    }

    #[test]
    fn test_wallet_balance_upserts() {
        let mut d = dispatcher();
        d.handle_frame(text(r#"{"action":"NewWalletBalance","token":"A","balance":10}"#));
        d.handle_frame(text(r#"{"action":"NewWalletBalance","token":"B","balance":"5"}"#));
        assert_eq!(d.region_tokens(Region::Wallets), vec!["A", "B"]);

        d.handle_frame(text(r#"{"action":"NewWalletBalance","token":"B","balance":"20,000"}"#));
        assert_eq!(d.region_tokens(Region::Wallets), vec!["B", "A"]);
        assert_eq!(d.wallets().len(), 2);
        assert_eq!(d.wallets().has("B").map(|w| w.balance), Some(20000));
        assert_eq!(d.stats().applied, 3);
    }

    #[test]
    fn test_ascending_wallets() {
        let mut config = Config::default();
        config.views.wallet_order = SortOrder::Ascending;
        let mut d = Dispatcher::new(&config);

        d.dispatch(FeedMessage::NewWalletBalance(Wallet::new("A", 10)))
            .unwrap();
        d.dispatch(FeedMessage::NewWalletBalance(Wallet::new("B", 5)))
            .unwrap();
        assert_eq!(d.region_tokens(Region::Wallets), vec!["B", "A"]);
    }

    #[test]
    fn test_bad_frames_dropped() {
        let mut d = dispatcher();
        d.handle_frame(text("not json"));
        d.handle_frame(text(r#"{"action":"createNewWallet"}"#));
        d.handle_frame(text(r#"{"action":"WalletRemoved","token":"nope"}"#));
        d.handle_frame(text(r#"{"action":"NewWalletBalance","token":"A","balance":1}"#));

        assert_eq!(d.stats().dropped, 3);
        assert_eq!(d.stats().applied, 1);
        assert_eq!(d.region_tokens(Region::Wallets), vec!["A"]);
    }

    #[test]
    fn test_remove_unknown_wallet_is_reported() {
        let mut d = dispatcher();
        let err = d
            .dispatch(FeedMessage::WalletRemoved {
                token: "Z".to_string(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::View {
                region: Region::Wallets,
                source: ViewError::UnknownToken(_)
            }
        ));
    }

    #[test]
    fn test_new_stage_with_moderation_flag() {
        let mut d = dispatcher();
        d.dispatch(FeedMessage::NewStage(Stage::new("s2", "Zeta")))
            .unwrap();
        d.dispatch(FeedMessage::NewStage(Stage::new("s1", "Alpha").moderated()))
            .unwrap();

        assert_eq!(d.region_tokens(Region::Stages), vec!["s1", "s2"]);
        assert_eq!(d.region_tokens(Region::Moderations), vec!["s1"]);

        // Renamed stage moves
        d.dispatch(FeedMessage::NewStage(Stage::new("s1", "Omega").moderated()))
            .unwrap();
        assert_eq!(d.region_tokens(Region::Stages), vec!["s1", "s2"]);
        d.dispatch(FeedMessage::NewStage(Stage::new("s1", "Zz")))
            .unwrap();
        assert_eq!(d.region_tokens(Region::Stages), vec!["s2", "s1"]);
    }

    #[test]
    fn test_stage_post_counts_and_main_view() {
        let mut d = dispatcher();
        d.dispatch(FeedMessage::NewStage(Stage::new("aereum", "Aereum").moderated()))
            .unwrap();
        d.dispatch(FeedMessage::StageEngaged(Engagement::new("aereum", "Aereum")))
            .unwrap();

        // Not the open stage: only counters move
        d.dispatch(FeedMessage::NewStagePost {
            stage: "aereum".to_string(),
            post: Post::new("p1", "Ruben", "Minha primeira mensagem."),
        })
        .unwrap();
        assert!(d.posts().is_empty());

        d.dispatch(FeedMessage::OpenStage {
            token: "aereum".to_string(),
        })
        .unwrap();
        d.dispatch(FeedMessage::NewStagePost {
            stage: "aereum".to_string(),
            post: Post::new("p2", "Larissa", "Minha primeira resposta."),
        })
        .unwrap();
        d.dispatch(FeedMessage::NewStagePost {
            stage: "aereum".to_string(),
            post: Post::new("p3", "Ruben", "Ok"),
        })
        .unwrap();

        assert_eq!(d.region_tokens(Region::Posts), vec!["p2", "p3"]);
        assert_eq!(d.moderations().has("aereum").map(|s| s.count), Some(3));
        assert_eq!(d.engagements().has("aereum").map(|e| e.count), Some(3));
        // The plain stage list is not a counter
        assert_eq!(d.stages().has("aereum").map(|s| s.count), Some(0));

        // Re-sent post is replaced, not duplicated
        d.dispatch(FeedMessage::NewStagePost {
            stage: "aereum".to_string(),
            post: Post::new("p2", "Larissa", "edited"),
        })
        .unwrap();
        assert_eq!(d.region_tokens(Region::Posts), vec!["p2", "p3"]);
        assert!(d.region_html(Region::Posts).contains("edited"));
    }

    #[test]
    fn test_reannounce_keeps_counters() {
        let mut d = dispatcher();
        d.dispatch(FeedMessage::NewStage(Stage::new("aereum", "Aereum").moderated()))
            .unwrap();
        d.dispatch(FeedMessage::StageEngaged(Engagement::new("aereum", "Aereum")))
            .unwrap();
        for token in ["p1", "p2"] {
            d.dispatch(FeedMessage::NewStagePost {
                stage: "aereum".to_string(),
                post: Post::new(token, "Ruben", "Oi"),
            })
            .unwrap();
        }

        d.handle_frame(text(
            r#"{"action":"NewStage","token":"aereum","caption":"Aereum 2","moderation":true}"#,
        ));
        d.handle_frame(text(
            r#"{"action":"StageEngaged","token":"aereum","name":"Aereum 2"}"#,
        ));

        let moderated = d.moderations().has("aereum").unwrap();
        assert_eq!(moderated.caption, "Aereum 2");
        assert_eq!(moderated.count, 2);
        let engaged = d.engagements().has("aereum").unwrap();
        assert_eq!(engaged.name, "Aereum 2");
        assert_eq!(engaged.count, 2);
    }

    #[test]
    fn test_post_on_unknown_stage_is_ignored() {
        let mut d = dispatcher();
        d.dispatch(FeedMessage::NewStagePost {
            stage: "elsewhere".to_string(),
            post: Post::new("p1", "Ruben", "hi"),
        })
        .unwrap();
        assert!(d.posts().is_empty());
    }

    #[test]
    fn test_stage_closed() {
        let mut config = Config::default();
        config.views.open_stage = Some("s1".to_string());
        let mut d = Dispatcher::new(&config);

        d.dispatch(FeedMessage::NewStage(Stage::new("s1", "One").moderated()))
            .unwrap();
        d.dispatch(FeedMessage::StageEngaged(Engagement::new("s1", "One")))
            .unwrap();
        d.dispatch(FeedMessage::NewStagePost {
            stage: "s1".to_string(),
            post: Post::new("p1", "Ruben", "hi"),
        })
        .unwrap();

        d.dispatch(FeedMessage::StageClosed {
            token: "s1".to_string(),
        })
        .unwrap();

        for region in Region::all() {
            assert!(d.region_tokens(*region).is_empty(), "{} not empty", region);
        }
        assert_eq!(d.open_stage(), None);

        let err = d
            .dispatch(FeedMessage::StageClosed {
                token: "s1".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownToken(t) if t == "s1"));
    }

    #[test]
    fn test_render_failure_isolated() {
        let mut d = dispatcher();
        d.dispatch(FeedMessage::StageEngaged(Engagement::new("s1", "One")))
            .unwrap();

        // Empty caption fails to render in both stage regions
        let err = d
            .dispatch(FeedMessage::NewStage(Stage::new("s1", "").moderated()))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::View {
                region: Region::Moderations,
                source: ViewError::Render { .. }
            }
        ));
        assert!(d.stages().is_empty());
        assert_eq!(d.region_tokens(Region::Engagements), vec!["s1"]);
    }

    #[test]
    fn test_disconnect_resets_views() {
        let mut d = dispatcher();
        d.handle_frame(Frame::Open);
        d.handle_frame(text(r#"{"action":"NewWalletBalance","token":"A","balance":1}"#));
        d.handle_frame(Frame::Error("connection reset".to_string()));

        assert!(d.wallets().is_empty());
        assert_eq!(d.stats().resets, 1);
        assert_eq!(d.region_html(Region::Wallets), r#"<div id="wallets"></div>"#);
    }

    #[test]
    fn test_disconnect_keeps_views_when_disabled() {
        let mut config = Config::default();
        config.feed.reset_on_disconnect = false;
        let mut d = Dispatcher::new(&config);

        d.handle_frame(text(r#"{"action":"NewWalletBalance","token":"A","balance":1}"#));
        d.handle_frame(Frame::Closed {
            reason: "bye".to_string(),
        });

        assert_eq!(d.region_tokens(Region::Wallets), vec!["A"]);
        assert_eq!(d.stats().resets, 0);
    }
}
