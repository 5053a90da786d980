//! Bounded pool of concurrently playing sounds.
//!
//! Sound playback belongs to the host; this module only decides whether a
//! requested sound may start now, waits in the queue, or is dropped. A
//! started sound occupies a slot until its declared (or estimated) lifetime
//! elapses. There is no completion callback, so the active count can lag the
//! real mixer slightly in either direction.

use std::collections::VecDeque;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schedule::Scheduler;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioPoolConfig {
    pub max_concurrent: usize,
    pub max_queue: usize,
    pub drain_interval_ms: u64,
    /// Lifetime assumed for sounds that do not declare one.
    pub default_lifetime_ms: u64,
}

impl Default for AudioPoolConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 16,
            max_queue: 32,
            drain_interval_ms: 100,
            default_lifetime_ms: 1_500,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoundRequest {
    pub uri: String,
    pub position: Option<Vec3>,
    pub volume: f32,
    pub lifetime_ms: Option<u64>,
    /// Priority sounds skip the queue and ignore the cap.
    pub priority: bool,
}

impl SoundRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            position: None,
            volume: 1.0,
            lifetime_ms: None,
            priority: false,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn lifetime_ms(mut self, lifetime_ms: u64) -> Self {
        self.lifetime_ms = Some(lifetime_ms);
        self
    }

    pub fn priority(mut self) -> Self {
        self.priority = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayDecision {
    Started,
    Queued,
    Dropped,
}

/// Gameplay code asks for a sound with this message.
#[derive(Message, Debug, Clone)]
pub struct PlaySound(pub SoundRequest);

/// A sound that got a slot. The host's audio layer plays it.
#[derive(Message, Debug, Clone)]
pub struct SoundStarted(pub SoundRequest);

#[derive(Resource, Debug)]
pub struct AudioPool {
    config: AudioPoolConfig,
    active: usize,
    releases: Scheduler<()>,
    queue: VecDeque<SoundRequest>,
    started: Vec<SoundRequest>,
    since_drain: Duration,
    dropped: u64,
}

impl AudioPool {
    pub fn new(config: AudioPoolConfig) -> Self {
        Self {
            config,
            active: 0,
            releases: Scheduler::new(),
            queue: VecDeque::new(),
            started: Vec::new(),
            since_drain: Duration::ZERO,
            dropped: 0,
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn request(&mut self, request: SoundRequest) -> PlayDecision {
        if request.priority || self.active < self.config.max_concurrent {
            self.start(request);
            return PlayDecision::Started;
        }

        if self.queue.len() < self.config.max_queue {
            self.queue.push_back(request);
            return PlayDecision::Queued;
        }

        self.dropped += 1;
        debug!(
            "audio_pool{{drop uri={} active={} queued={}}}",
            request.uri,
            self.active,
            self.queue.len()
        );
        PlayDecision::Dropped
    }

    fn start(&mut self, request: SoundRequest) {
        let lifetime = request.lifetime_ms.unwrap_or(self.config.default_lifetime_ms);
        self.active += 1;
        self.releases.schedule(Duration::from_millis(lifetime), ());
        self.started.push(request);
    }

    /// Releases slots whose lifetime elapsed and, on every drain interval,
    /// starts queued sounds in FIFO order while capacity remains.
    pub fn advance(&mut self, dt: Duration) {
        self.releases.advance(dt);
        while self.releases.pop_due().is_some() {
            self.active = self.active.saturating_sub(1);
        }

        self.since_drain += dt;
        let interval = Duration::from_millis(self.config.drain_interval_ms);
        if self.since_drain < interval {
            return;
        }
        self.since_drain = Duration::ZERO;

        while self.active < self.config.max_concurrent {
            let Some(request) = self.queue.pop_front() else {
                break;
            };
            self.start(request);
        }
    }

    /// Sounds started since the last call, in start order.
    pub fn take_started(&mut self) -> Vec<SoundRequest> {
        std::mem::take(&mut self.started)
    }

    /// Forgets queued sounds and pending releases. Used when a game ends.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.releases.clear();
        self.active = 0;
        self.since_drain = Duration::ZERO;
    }
}

pub fn audio_pool_system(
    time: Res<Time>,
    mut pool: ResMut<AudioPool>,
    mut requests: MessageReader<PlaySound>,
    mut started: MessageWriter<SoundStarted>,
) {
    for PlaySound(request) in requests.read() {
        pool.request(request.clone());
    }
    pool.advance(time.delta());

    for request in pool.take_started() {
        started.write(SoundStarted(request));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(max_concurrent: usize, max_queue: usize) -> AudioPool {
        AudioPool::new(AudioPoolConfig {
            max_concurrent,
            max_queue,
            drain_interval_ms: 100,
            default_lifetime_ms: 1_000,
        })
    }

    fn uris(requests: Vec<SoundRequest>) -> Vec<String> {
        requests.into_iter().map(|r| r.uri).collect()
    }

    #[test]
    fn active_count_never_exceeds_cap_without_priority() {
        let mut pool = pool(2, 10);
        for i in 0..6 {
            pool.request(SoundRequest::new(format!("s{i}")));
            assert!(pool.active() <= 2);
        }
        assert_eq!(pool.queued(), 4);

        for _ in 0..50 {
            pool.advance(Duration::from_millis(100));
            assert!(pool.active() <= 2);
        }
        assert_eq!(pool.queued(), 0);
    }

    #[test]
    fn queued_sounds_start_in_fifo_order_once_capacity_frees() {
        let mut pool = pool(1, 10);
        assert_eq!(pool.request(SoundRequest::new("a")), PlayDecision::Started);
        assert_eq!(pool.request(SoundRequest::new("b")), PlayDecision::Queued);
        assert_eq!(pool.request(SoundRequest::new("c")), PlayDecision::Queued);
        assert_eq!(uris(pool.take_started()), vec!["a"]);

        pool.advance(Duration::from_millis(500));
        assert!(pool.take_started().is_empty());

        pool.advance(Duration::from_millis(500));
        assert_eq!(uris(pool.take_started()), vec!["b"]);

        pool.advance(Duration::from_millis(1_000));
        assert_eq!(uris(pool.take_started()), vec!["c"]);
    }

    #[test]
    fn priority_bypasses_queue_and_cap() {
        let mut pool = pool(1, 10);
        pool.request(SoundRequest::new("a"));
        pool.request(SoundRequest::new("b"));
        assert_eq!(
            pool.request(SoundRequest::new("alarm").priority()),
            PlayDecision::Started
        );
        assert_eq!(pool.active(), 2);
        assert_eq!(pool.queued(), 1);
    }

    #[test]
    fn overflow_is_dropped_and_counted() {
        let mut pool = pool(1, 1);
        pool.request(SoundRequest::new("a"));
        pool.request(SoundRequest::new("b"));
        assert_eq!(pool.request(SoundRequest::new("c")), PlayDecision::Dropped);
        assert_eq!(pool.dropped(), 1);
    }

    #[test]
    fn declared_lifetime_controls_release() {
        let mut pool = pool(1, 10);
        pool.request(SoundRequest::new("short").lifetime_ms(200));
        pool.request(SoundRequest::new("next"));
        pool.take_started();

        pool.advance(Duration::from_millis(200));
        assert_eq!(uris(pool.take_started()), vec!["next"]);
    }
}
