//! Fixture builders and wait helpers.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tokio::sync::broadcast;

use batchflow::{
    BatchDriver, BatchEvent, BatchEventKind, BatchHandle, BatchSnapshot, ExecutionEngine,
    FileTask, ManualClock,
};

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// A file bound to the image slot.
pub fn photo(name: &str) -> FileTask {
    FileTask::matched(format!("/photos/{}", name), name, "image/jpeg", "image", "12")
}

/// A file no slot accepts.
pub fn unmatched(name: &str) -> FileTask {
    FileTask::unmatched(format!("/photos/{}", name), name, "text/plain")
}

pub fn manual_clock() -> Arc<ManualClock> {
    let t0 = Utc
        .with_ymd_and_hms(2026, 1, 15, 10, 30, 0)
        .single()
        .expect("valid timestamp");
    Arc::new(ManualClock::new(t0))
}

pub fn spawn_driver(engine: Arc<dyn ExecutionEngine>, clock: Arc<ManualClock>) -> BatchHandle {
    BatchDriver::new(engine).with_clock(clock).spawn()
}

/// Waits until the published snapshot satisfies `pred`.
pub async fn wait_until<F>(handle: &BatchHandle, mut pred: F) -> BatchSnapshot
where
    F: FnMut(&BatchSnapshot) -> bool,
{
    let mut rx = handle.watch();
    let snapshot = tokio::time::timeout(WAIT_TIMEOUT, rx.wait_for(|s| pred(s)))
        .await
        .expect("timed out waiting for batch state")
        .expect("driver closed");
    snapshot.clone()
}

/// Receives events until one satisfies `pred`, returning everything seen.
pub async fn collect_events_until<F>(
    rx: &mut broadcast::Receiver<BatchEvent>,
    mut pred: F,
) -> Vec<BatchEvent>
where
    F: FnMut(&BatchEventKind) -> bool,
{
    let mut seen = Vec::new();
    loop {
        let event = tokio::time::timeout(WAIT_TIMEOUT, rx.recv())
            .await
            .expect("timed out waiting for batch event")
            .expect("event channel closed");
        let done = pred(&event.kind);
        seen.push(event);
        if done {
            return seen;
        }
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
