//! A reader/writer lock that lets a held guard change kind in place. The
//! engine uses this to inspect a player's state, decide whether it needs a
//! move, and then commit one without ever releasing the lock in between -
//! which neither `std::sync::RwLock` nor a plain `Mutex` can express.
//!
//! Writers are never starved: a reader blocks while any writer is
//! waiting, even if the data is currently only read-locked.

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex};

struct RawState {
    readers: u32,
    writer: bool,
    waiting_writers: u32,
}

/// A reader/writer lock around `T` supporting read<->write promotion.
pub struct RwLock<T> {
    state: Mutex<RawState>,
    readable: Condvar,
    writable: Condvar,
    data: UnsafeCell<T>,
}

unsafe impl<T: Send> Send for RwLock<T> {}
unsafe impl<T: Send> Sync for RwLock<T> {}

impl<T> RwLock<T> {
    pub fn new(value: T) -> Self {
        RwLock {
            state: Mutex::new(RawState { readers: 0, writer: false, waiting_writers: 0 }),
            readable: Condvar::new(),
            writable: Condvar::new(),
            data: UnsafeCell::new(value),
        }
    }

    /// Blocks until a read lock is granted.
    pub fn read(&self) -> ReadGuard<'_, T> {
        let mut s = self.state.lock().unwrap();
        while s.writer || s.waiting_writers > 0 {
            s = self.readable.wait(s).unwrap();
        }
        s.readers += 1;
        ReadGuard { lock: self }
    }

    /// Blocks until a write lock is granted.
    pub fn write(&self) -> WriteGuard<'_, T> {
        let mut s = self.state.lock().unwrap();
        s.waiting_writers += 1;
        while s.writer || s.readers > 0 {
            s = self.writable.wait(s).unwrap();
        }
        s.waiting_writers -= 1;
        s.writer = true;
        WriteGuard { lock: self }
    }

    fn release_read(&self) {
        let mut s = self.state.lock().unwrap();
        s.readers -= 1;
        if s.readers == 0 {
            self.writable.notify_one();
        }
    }

    fn release_write(&self) {
        let mut s = self.state.lock().unwrap();
        s.writer = false;
        self.readable.notify_all();
        self.writable.notify_one();
    }

    fn do_promote(&self) {
        let mut s = self.state.lock().unwrap();
        s.readers -= 1;
        s.waiting_writers += 1;
        while s.writer || s.readers > 0 {
            s = self.writable.wait(s).unwrap();
        }
        s.waiting_writers -= 1;
        s.writer = true;
    }

    fn do_demote(&self) {
        let mut s = self.state.lock().unwrap();
        s.writer = false;
        s.readers += 1;
        self.readable.notify_all();
    }
}

/// A held read lock. Dropping it releases the lock; [`ReadGuard::promote`]
/// upgrades it to a [`WriteGuard`] instead.
pub struct ReadGuard<'a, T> {
    lock: &'a RwLock<T>,
}

impl<'a, T> ReadGuard<'a, T> {
    /// Upgrades this read lock to a write lock, blocking until any other
    /// concurrent readers release. The caller must not rely on the data
    /// being unchanged across the upgrade.
    pub fn promote(self) -> WriteGuard<'a, T> {
        let lock = self.lock;
        std::mem::forget(self);
        lock.do_promote();
        WriteGuard { lock }
    }
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

/// A held write lock. Dropping it releases the lock; [`WriteGuard::demote`]
/// downgrades it to a [`ReadGuard`] instead.
pub struct WriteGuard<'a, T> {
    lock: &'a RwLock<T>,
}

impl<'a, T> WriteGuard<'a, T> {
    /// Downgrades this write lock to a read lock without ever releasing
    /// it, so no other writer can interleave.
    pub fn demote(self) -> ReadGuard<'a, T> {
        let lock = self.lock;
        std::mem::forget(self);
        lock.do_demote();
        ReadGuard { lock }
    }
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn read_then_write_never_interleaves() {
        let lock = Arc::new(RwLock::new(0u32));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let lock = Arc::clone(&lock);
            handles.push(thread::spawn(move || {
                let mut w = lock.write();
                *w += 1;
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*lock.read(), 8);
    }

    #[test]
    fn promote_preserves_exclusivity() {
        let lock = RwLock::new(vec![1, 2, 3]);
        let r = lock.read();
        assert_eq!(r.len(), 3);
        let mut w = r.promote();
        w.push(4);
        assert_eq!(w.len(), 4);
        let r2 = w.demote();
        assert_eq!(*r2, vec![1, 2, 3, 4]);
    }
}
