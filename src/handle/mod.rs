//! # Reconnectable Handles
//!
//! Some pin values stand for live external resources: a database
//! connection, a spreadsheet workbook. Their live state can't be persisted
//! or shared freely, so a [`Handle`] pairs a serializable *descriptor* with
//! an optional live resource that is rebuilt from the descriptor on demand.
//!
//! ```text
//! Handle<R>
//! ├── descriptor: R::Descriptor          persisted, compared, cloned
//! └── live: Arc<Mutex<Option<Live<R>>>>  shared by clones of the handle
//!           └── Live { handle: R, owner: ThreadId }
//! ```
//!
//! ## Resolution
//!
//! [`Handle::resolve`] returns the live resource, reconnecting first when
//!
//! | Live state                     | Action                         | Log     |
//! |--------------------------------|--------------------------------|---------|
//! | absent (decoded, disconnected) | reconnect                      | `debug` |
//! | owned by another thread        | drop, reconnect on this thread | `warn`  |
//! | fails `is_usable()`            | drop, reconnect                | `warn`  |
//! | usable, owned by this thread   | reuse                          |         |
//!
//! Reconnection failure is returned as an error; the handle is left without
//! a live resource and the next `resolve` tries again.
//!
//! Handles are never pooled and never retried beyond that single attempt.

mod connection;
mod workbook;

pub use connection::{query_database, ConnectionUrl, DbConnection, DbHandle, SqliteTarget};
pub use workbook::WorkbookRef;

use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use eyre::{eyre, Result};
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{debug, warn};

/// A live resource that can be rebuilt from a descriptor.
pub trait Reconnect: Sized {
    type Descriptor: Clone + PartialEq + fmt::Debug + fmt::Display;

    fn reconnect(descriptor: &Self::Descriptor) -> Result<Self>;

    /// Cheap liveness probe.
    fn is_usable(&self) -> bool;
}

struct Live<R> {
    handle: R,
    owner: ThreadId,
}

pub struct Handle<R: Reconnect> {
    descriptor: R::Descriptor,
    live: Arc<Mutex<Option<Live<R>>>>,
}

impl<R: Reconnect> Handle<R> {
    /// Connects now and keeps the live resource, owned by this thread.
    pub fn connect(descriptor: R::Descriptor) -> Result<Self> {
        let handle = R::reconnect(&descriptor)?;
        Ok(Self {
            descriptor,
            live: Arc::new(Mutex::new(Some(Live {
                handle,
                owner: thread::current().id(),
            }))),
        })
    }

    /// A handle with no live resource; the first `resolve` connects.
    pub fn detached(descriptor: R::Descriptor) -> Self {
        Self {
            descriptor,
            live: Arc::new(Mutex::new(None)),
        }
    }

    pub fn descriptor(&self) -> &R::Descriptor {
        &self.descriptor
    }

    pub fn is_live(&self) -> bool {
        self.live.lock().is_some()
    }

    /// Drops the live resource, keeping the descriptor.
    pub fn disconnect(&self) {
        self.live.lock().take();
    }

    pub fn resolve(&self) -> Result<MappedMutexGuard<'_, R>> {
        let mut live = self.live.lock();
        let current = thread::current().id();

        let reusable = match live.as_ref() {
            None => {
                debug!(descriptor = %self.descriptor, "connecting detached handle");
                false
            }
            Some(l) if l.owner != current => {
                warn!(
                    descriptor = %self.descriptor,
                    "handle used from a different thread, reconnecting"
                );
                false
            }
            Some(l) if !l.handle.is_usable() => {
                warn!(descriptor = %self.descriptor, "stale handle, reconnecting");
                false
            }
            Some(_) => true,
        };

        if !reusable {
            live.take();
            let handle = R::reconnect(&self.descriptor)?;
            *live = Some(Live {
                handle,
                owner: current,
            });
        }

        MutexGuard::try_map(live, |l| l.as_mut().map(|l| &mut l.handle))
            .map_err(|_| eyre!("handle {} has no live resource", self.descriptor))
    }
}

impl<R: Reconnect> Clone for Handle<R> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            live: Arc::clone(&self.live),
        }
    }
}

impl<R: Reconnect> PartialEq for Handle<R> {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor
    }
}

impl<R: Reconnect> fmt::Debug for Handle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("descriptor", &self.descriptor)
            .field("live", &self.is_live())
            .finish()
    }
}
