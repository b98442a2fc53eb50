//! Shared libcurl transport.
//!
//! Owns the transport configuration and a small pool of idle `Easy` handles.
//! libcurl keeps its connection cache per handle, so handing the same handle
//! back out lets consecutive calls to one host reuse the connection.

use crate::config::TransportConfig;
use curl::easy::Easy;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

/// Cheap to clone; clones share the handle pool.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<Inner>,
}

struct Inner {
    config: TransportConfig,
    idle: Mutex<Vec<Easy>>,
}

impl Transport {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                idle: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.inner.config
    }

    /// Take an idle handle (or a new one), reset and configured for one call.
    /// The handle goes back to the pool when the guard drops.
    pub(crate) fn checkout(&self) -> Result<PooledEasy<'_>, curl::Error> {
        let reused = self.lock_idle().pop();
        let mut easy = match reused {
            Some(mut easy) => {
                easy.reset();
                easy
            }
            None => Easy::new(),
        };
        self.configure(&mut easy)?;
        Ok(PooledEasy {
            easy: Some(easy),
            transport: self,
        })
    }

    fn configure(&self, easy: &mut Easy) -> Result<(), curl::Error> {
        let cfg = &self.inner.config;
        easy.connect_timeout(cfg.connect_timeout())?;
        if let Some(timeout) = cfg.timeout() {
            easy.timeout(timeout)?;
        }
        if let Some(limit) = cfg.low_speed_limit_bytes {
            easy.low_speed_limit(limit)?;
            easy.low_speed_time(cfg.low_speed_time())?;
        }
        easy.follow_location(cfg.follow_redirects)?;
        if cfg.follow_redirects {
            easy.max_redirections(cfg.max_redirections)?;
        }
        easy.useragent(&cfg.user_agent)?;
        Ok(())
    }

    fn checkin(&self, easy: Easy) {
        let mut idle = self.lock_idle();
        if idle.len() < self.inner.config.max_idle_handles {
            idle.push(easy);
        }
    }

    fn lock_idle(&self) -> std::sync::MutexGuard<'_, Vec<Easy>> {
        // The pool holds plain handles; a panic elsewhere cannot leave it inconsistent.
        self.inner
            .idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Returns its handle to the transport pool on drop, on every exit path.
pub(crate) struct PooledEasy<'a> {
    easy: Option<Easy>,
    transport: &'a Transport,
}

impl Deref for PooledEasy<'_> {
    type Target = Easy;

    fn deref(&self) -> &Easy {
        self.easy.as_ref().expect("handle present until drop")
    }
}

impl DerefMut for PooledEasy<'_> {
    fn deref_mut(&mut self) -> &mut Easy {
        self.easy.as_mut().expect("handle present until drop")
    }
}

impl Drop for PooledEasy<'_> {
    fn drop(&mut self) {
        if let Some(easy) = self.easy.take() {
            self.transport.checkin(easy);
        }
    }
}
