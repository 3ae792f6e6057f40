use std::future;
use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use hubwire_api::decode_frame;
use time::OffsetDateTime;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::client::HubClient;
use crate::render;

/// Derives the event stream URL from a hub host and path.
pub fn events_url(host: &str, path: &str) -> String {
    let host = host.trim_end_matches('/');
    let host = host
        .strip_prefix("http://")
        .map(|rest| format!("ws://{}", rest))
        .or_else(|| host.strip_prefix("https://").map(|rest| format!("wss://{}", rest)))
        .unwrap_or_else(|| {
            if host.starts_with("ws://") || host.starts_with("wss://") {
                host.to_string()
            } else {
                format!("ws://{}", host)
            }
        });
    format!("{}{}", host, path)
}

/// Derives the HTTP base of the hub serving `url`, so `--seed` reaches the
/// same hub as the stream.
pub fn seed_base_url(url: &str, events_path: &str) -> String {
    let base = url
        .strip_prefix("ws://")
        .map(|rest| format!("http://{}", rest))
        .or_else(|| url.strip_prefix("wss://").map(|rest| format!("https://{}", rest)))
        .unwrap_or_else(|| url.to_string());
    base.strip_suffix(events_path)
        .unwrap_or(&base)
        .trim_end_matches('/')
        .to_string()
}

/// Pause between connecting and seeding, giving the hub time to subscribe
/// the new stream before the seed events are published.
pub const SEED_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub url: String,
    /// `None` listens until the hub closes the stream.
    pub duration: Option<Duration>,
    pub send: Option<String>,
    pub head: bool,
    pub decode: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub msgs: u64,
    pub bytes: u64,
    pub text: u64,
    pub decode_errors: u64,
}

impl StreamStats {
    pub fn summary(&self) -> String {
        format!(
            "ws close: msgs={} bytes={} text={} decode_errors={}",
            self.msgs, self.bytes, self.text, self.decode_errors
        )
    }
}

/// Accounts one binary frame and returns the line to print, if any.
pub fn binary_frame(
    frame: &[u8],
    options: &MonitorOptions,
    stats: &mut StreamStats,
    received: OffsetDateTime,
) -> Result<Option<String>> {
    stats.msgs += 1;
    stats.bytes += frame.len() as u64;

    if !options.decode {
        return Ok((!options.quiet).then(|| render::frame_line(frame, options.head)));
    }

    let line = match decode_frame(frame) {
        Ok(event) => render::event_line(&event, received, frame.len())?,
        Err(failure) => {
            stats.decode_errors += 1;
            tracing::debug!("Dropped frame: {}", failure);
            render::failure_line(&failure)
        }
    };
    Ok((!options.quiet).then_some(line))
}

/// Text frames are counted but never decoded. Only their length is printed.
pub fn text_frame(text: &str, options: &MonitorOptions, stats: &mut StreamStats) -> Option<String> {
    stats.text += 1;
    (!options.quiet).then(|| format!("text: {}", text.len()))
}

async fn deadline(duration: Option<Duration>) {
    match duration {
        Some(duration) => tokio::time::sleep(duration).await,
        None => future::pending().await,
    }
}

/// Reads the event stream until the deadline or until the hub closes it,
/// writing one line per frame and a summary line at the end.
pub async fn monitor<W: Write>(
    options: &MonitorOptions,
    seed_with: Option<&HubClient>,
    out: &mut W,
) -> Result<StreamStats> {
    let (socket, _) = connect_async(options.url.as_str())
        .await
        .with_context(|| format!("Failed to connect to {}", options.url))?;
    tracing::info!("Connected to {}", options.url);
    writeln!(out, "ws open: {}", options.url)?;

    let (mut write, mut read) = socket.split();
    let mut stats = StreamStats::default();

    if let Some(text) = &options.send {
        write
            .send(Message::Text(text.clone()))
            .await
            .context("Failed to send text frame")?;
    }

    if let Some(client) = seed_with {
        tokio::time::sleep(SEED_DELAY).await;
        match client.seed().await {
            Ok(reply) if !options.quiet => writeln!(out, "seed ok: {}", reply.trim())?,
            Ok(_) => {}
            Err(e) => tracing::warn!("seed failed at {}: {:#}", client.base_url(), e),
        }
    }

    let deadline = deadline(options.duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                tracing::debug!("Monitor duration elapsed");
                break;
            }
            incoming = read.next() => match incoming {
                Some(Ok(Message::Binary(frame))) => {
                    let line = binary_frame(&frame, options, &mut stats, OffsetDateTime::now_utc())?;
                    if let Some(line) = line {
                        writeln!(out, "{}", line)?;
                    }
                }
                Some(Ok(Message::Text(text))) => {
                    if let Some(line) = text_frame(&text, options, &mut stats) {
                        writeln!(out, "{}", line)?;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!("Hub closed the stream: {:?}", frame);
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("WebSocket receive failed"),
                None => break,
            },
        }
    }

    if let Err(e) = write.send(Message::Close(None)).await {
        tracing::debug!("Close frame not sent: {}", e);
    }
    writeln!(out, "{}", stats.summary())?;

    Ok(stats)
}
