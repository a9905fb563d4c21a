//! Event sources
//!
//! An event source yields the frames of one feed connection: `Open`, then
//! any number of `Text` frames, then `Closed` or `Error`. `None` means the
//! source has nothing more to give.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

/// One frame from a feed connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Connection established
    Open,
    /// A text message carrying one JSON event
    Text(String),
    /// Connection closed normally
    Closed { reason: String },
    /// Connection failed
    Error(String),
}

/// Source of feed frames
#[async_trait]
pub trait EventSource: Send {
    async fn next_frame(&mut self) -> Option<Frame>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    Pending,
    Streaming,
    Done,
}

/// Newline-delimited JSON feed over any async reader
///
/// Blank lines are skipped. Lines longer than `max_frame_bytes` or not
/// valid UTF-8 are skipped with a warning; only a failing reader ends the
/// stream early.
pub struct LineSource<R> {
    reader: R,
    state: LineState,
    max_frame_bytes: usize,
    /// Holds at most `max_frame_bytes + 1` bytes of the current line
    line: Vec<u8>,
}

impl<R> LineSource<R> {
    pub fn new(reader: R, max_frame_bytes: usize) -> Self {
        Self {
            reader,
            state: LineState::Pending,
            max_frame_bytes,
            line: Vec::new(),
        }
    }
}

impl<R> LineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Consume one line from the reader, buffering no more than one byte
    /// past the frame limit
    ///
    /// Returns the number of bytes consumed, newline included; 0 at EOF.
    async fn read_frame(&mut self) -> std::io::Result<usize> {
        self.line.clear();
        let limit = self.max_frame_bytes.saturating_add(1);
        let mut consumed = 0;

        loop {
            let (used, newline) = {
                let available = self.reader.fill_buf().await?;
                if available.is_empty() {
                    return Ok(consumed);
                }
                let (chunk, newline) = match available.iter().position(|&b| b == b'\n') {
                    Some(i) => (&available[..=i], true),
                    None => (available, false),
                };
                let room = limit.saturating_sub(self.line.len());
                self.line
                    .extend_from_slice(&chunk[..chunk.len().min(room)]);
                (chunk.len(), newline)
            };
            self.reader.consume(used);
            consumed += used;
            if newline {
                return Ok(consumed);
            }
        }
    }
}

#[async_trait]
impl<R> EventSource for LineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_frame(&mut self) -> Option<Frame> {
        match self.state {
            LineState::Done => return None,
            LineState::Pending => {
                self.state = LineState::Streaming;
                return Some(Frame::Open);
            }
            LineState::Streaming => {}
        }

        loop {
            match self.read_frame().await {
                Ok(0) => {
                    self.state = LineState::Done;
                    return Some(Frame::Closed {
                        reason: "end of stream".to_string(),
                    });
                }
                Ok(len) => {
                    if self.line.len() > self.max_frame_bytes {
                        tracing::warn!(
                            bytes = len,
                            limit = self.max_frame_bytes,
                            "Skipping oversized frame"
                        );
                        continue;
                    }
                    let text = match std::str::from_utf8(&self.line) {
                        Ok(text) => text.trim(),
                        Err(e) => {
                            tracing::warn!(error = %e, bytes = len, "Skipping non-UTF-8 frame");
                            continue;
                        }
                    };
                    if text.is_empty() {
                        continue;
                    }
                    return Some(Frame::Text(text.to_string()));
                }
                Err(e) => {
                    self.state = LineState::Done;
                    return Some(Frame::Error(e.to_string()));
                }
            }
        }
    }
}

/// Frames pushed from elsewhere in the process
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<Frame>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::UnboundedReceiver<Frame>) -> Self {
        Self { rx }
    }

    /// Create a connected sender/source pair
    pub fn channel() -> (mpsc::UnboundedSender<Frame>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl EventSource for ChannelSource {
    async fn next_frame(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }
}
