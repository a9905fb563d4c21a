//! Feed session
//!
//! Pulls frames from an [`EventSource`] one at a time and hands each to the
//! [`Dispatcher`]. A frame is fully applied before the next one is read.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::dispatch::Dispatcher;
use super::source::{EventSource, Frame};

/// Summary of a finished session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Frames read from the source
    pub frames: u64,
    /// Events applied to the views
    pub applied: u64,
    /// Events logged and dropped
    pub dropped: u64,
    /// Closed or failed connections seen
    pub disconnects: u64,
}

/// One run of an event source into a dispatcher
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Drive `source` until it is exhausted
    pub async fn run<S>(&self, source: &mut S, dispatcher: &mut Dispatcher) -> SessionStats
    where
        S: EventSource + ?Sized,
    {
        let before = dispatcher.stats();
        let mut frames = 0;
        let mut disconnects = 0;

        tracing::info!(session_id = %self.id, "Session started");

        while let Some(frame) = source.next_frame().await {
            frames += 1;
            if matches!(frame, Frame::Closed { .. } | Frame::Error(_)) {
                disconnects += 1;
            }
            dispatcher.handle_frame(frame);
        }

        let after = dispatcher.stats();
        let stats = SessionStats {
            session_id: self.id.to_string(),
            started_at: self.started_at,
            ended_at: Utc::now(),
            frames,
            applied: after.applied - before.applied,
            dropped: after.dropped - before.dropped,
            disconnects,
        };

        tracing::info!(
            session_id = %self.id,
            frames = stats.frames,
            applied = stats.applied,
            dropped = stats.dropped,
            "Session finished"
        );

        stats
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::feed::dispatch::Region;
    use crate::feed::source::{ChannelSource, LineSource};

    #[tokio::test]
    async fn test_replay_from_lines() {
        let input = concat!(
            r#"{"action":"NewWalletBalance","token":"A","balance":10}"#,
            "\n",
            "garbage\n",
            r#"{"action":"NewWalletBalance","token":"B","balance":"30"}"#,
            "\n",
            r#"{"action":"NewWalletBalance","token":"A","balance":40}"#,
            "\n",
        );

        let mut config = Config::default();
        config.feed.reset_on_disconnect = false;
        let mut dispatcher = Dispatcher::new(&config);
        let mut source = LineSource::new(input.as_bytes(), config.feed.max_frame_bytes);

        let stats = Session::new().run(&mut source, &mut dispatcher).await;

        assert_eq!(stats.frames, 6);
        assert_eq!(stats.applied, 3);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.disconnects, 1);
        assert_eq!(dispatcher.region_tokens(Region::Wallets), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_end_session() {
        let mut input = br#"{"action":"NewWalletBalance","token":"A","balance":10}"#.to_vec();
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(br#"{"action":"NewWalletBalance","token":"B","balance":30}"#);
        input.push(b'\n');

        let config = Config::default();
        let mut dispatcher = Dispatcher::new(&config);
        let mut source = LineSource::new(&input[..], config.feed.max_frame_bytes);

        let stats = Session::new().run(&mut source, &mut dispatcher).await;

        // Open, A, B, Closed
        assert_eq!(stats.frames, 4);
        assert_eq!(stats.applied, 2);
        assert_eq!(stats.disconnects, 1);
        assert_eq!(dispatcher.stats().resets, 1);
    }

    #[tokio::test]
    async fn test_channel_session_resets_on_close() {
        let mut dispatcher = Dispatcher::new(&Config::default());
        let (tx, mut source) = ChannelSource::channel();

        tx.send(Frame::Open).unwrap();
        tx.send(Frame::Text(
            r#"{"action":"NewStage","token":"s1","caption":"One"}"#.to_string(),
        ))
        .unwrap();
        tx.send(Frame::Closed {
            reason: "server going away".to_string(),
        })
        .unwrap();
        drop(tx);

        let session = Session::new();
        let stats = session.run(&mut source, &mut dispatcher).await;

        assert_eq!(stats.session_id, session.id().to_string());
        assert_eq!(stats.applied, 1);
        assert!(dispatcher.stages().is_empty());
        assert!(stats.ended_at >= stats.started_at);
    }
}
