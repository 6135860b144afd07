//! Pull-based access to a push sequence.
//!
//! [`BlockingIter`] subscribes when it is created and buffers whatever the
//! sequence pushes; `next` blocks the calling thread until a notification is
//! buffered. The producer must therefore run somewhere else (a pool worker,
//! another thread) or finish synchronously during subscription. Pulling from
//! a sequence whose producer is driven by the blocked thread itself, such as
//! a virtual-time scheduler that nobody advances, never returns.

use crate::error::{Error, ErrorKind, Fault};
use crate::observable::Seq;
use crate::observer::{BoxObserver, Observer, Sink};
use crate::types::Notification;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

struct Mailbox<T> {
    items: VecDeque<Notification<T>>,
    /// No further notification will be buffered.
    closed: bool,
}

struct Channel<T> {
    mailbox: Mutex<Mailbox<T>>,
    ready: Condvar,
}

impl<T> Channel<T> {
    fn push(&self, notification: Notification<T>, close: bool) {
        let mut mailbox = self.mailbox.lock();
        if mailbox.closed {
            return;
        }
        mailbox.items.push_back(notification);
        mailbox.closed = close;
        drop(mailbox);
        self.ready.notify_all();
    }

    fn close(&self) {
        self.mailbox.lock().closed = true;
        self.ready.notify_all();
    }
}

struct ChannelObserver<T> {
    channel: Arc<Channel<T>>,
    sink: Weak<Sink<T>>,
    remaining: Option<usize>,
}

impl<T: Send + 'static> Observer<T> for ChannelObserver<T> {
    fn on_next(&mut self, value: T) {
        let Some(remaining) = self.remaining.as_mut() else {
            self.channel.push(Notification::Next(value), false);
            return;
        };
        if *remaining == 0 {
            return;
        }
        *remaining -= 1;
        let last = *remaining == 0;
        self.channel.push(Notification::Next(value), last);
        if last {
            if let Some(sink) = self.sink.upgrade() {
                sink.dispose();
            }
        }
    }

    fn on_error(&mut self, fault: Fault) {
        self.channel.push(Notification::Error(fault), true);
    }

    fn on_completed(&mut self) {
        self.channel.push(Notification::Completed, true);
    }
}

/// A blocking iterator over a sequence.
///
/// Yields `Ok(value)` for every value and `Err(fault)` once if the sequence
/// fails, then `None`. Dropping the iterator disposes the subscription.
///
/// ```
/// use pushflow::bridge::BlockingIter;
/// use pushflow::Seq;
///
/// let values: Result<Vec<i64>, _> = BlockingIter::new(&Seq::range(1, 3)).collect();
/// assert_eq!(values.unwrap(), vec![1, 2, 3]);
/// ```
pub struct BlockingIter<T: Send + 'static> {
    channel: Arc<Channel<T>>,
    sink: Arc<Sink<T>>,
    finished: bool,
}

impl<T: Send + 'static> BlockingIter<T> {
    /// Subscribes to `seq`.
    #[must_use]
    pub fn new(seq: &Seq<T>) -> Self {
        Self::subscribe(seq, None)
    }

    /// Subscribes to `seq` and disposes the subscription after `limit`
    /// values.
    ///
    /// The iterator ends after the last accepted value, as if the sequence
    /// had completed there.
    #[must_use]
    pub fn with_limit(seq: &Seq<T>, limit: usize) -> Self {
        Self::subscribe(seq, Some(limit))
    }

    fn subscribe(seq: &Seq<T>, limit: Option<usize>) -> Self {
        let channel = Arc::new(Channel {
            mailbox: Mutex::new(Mailbox {
                items: VecDeque::new(),
                closed: false,
            }),
            ready: Condvar::new(),
        });
        if limit == Some(0) {
            channel.close();
        }
        let observer_channel = Arc::clone(&channel);
        let sink = Sink::new_cyclic(move |sink| -> BoxObserver<T> {
            Box::new(ChannelObserver {
                channel: observer_channel,
                sink,
                remaining: limit,
            })
        });
        if limit != Some(0) {
            let upstream = seq.producer().subscribe_core(Arc::clone(&sink));
            sink.attach(upstream);
        }
        Self {
            channel,
            sink,
            finished: false,
        }
    }

    /// Like `next`, but gives up after `timeout`.
    ///
    /// A `None` with [`BlockingIter::is_finished`] still false means the
    /// timeout elapsed first.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<Result<T, Fault>> {
        if self.finished {
            return None;
        }
        let deadline = Instant::now() + timeout;
        let notification = {
            let mut mailbox = self.channel.mailbox.lock();
            loop {
                if let Some(notification) = mailbox.items.pop_front() {
                    break Some(notification);
                }
                if mailbox.closed {
                    break None;
                }
                if self.channel.ready.wait_until(&mut mailbox, deadline).timed_out() {
                    return None;
                }
            }
        };
        self.settle(notification)
    }

    /// Returns true once the iterator has yielded its last item.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn settle(&mut self, notification: Option<Notification<T>>) -> Option<Result<T, Fault>> {
        match notification {
            Some(Notification::Next(value)) => Some(Ok(value)),
            Some(Notification::Error(fault)) => {
                self.finished = true;
                Some(Err(fault))
            }
            Some(Notification::Completed) | None => {
                self.finished = true;
                None
            }
        }
    }
}

impl<T: Send + 'static> Iterator for BlockingIter<T> {
    type Item = Result<T, Fault>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let notification = {
            let mut mailbox = self.channel.mailbox.lock();
            loop {
                if let Some(notification) = mailbox.items.pop_front() {
                    break Some(notification);
                }
                if mailbox.closed {
                    break None;
                }
                self.channel.ready.wait(&mut mailbox);
            }
        };
        self.settle(notification)
    }
}

impl<T: Send + 'static> Drop for BlockingIter<T> {
    fn drop(&mut self) {
        self.sink.dispose();
    }
}

impl<T: Send + 'static> Seq<T> {
    /// Returns a [`BlockingIter`] over this sequence.
    #[must_use]
    pub fn blocking_iter(&self) -> BlockingIter<T> {
        BlockingIter::new(self)
    }
}

fn empty_fault() -> Fault {
    Fault::from(Error::new(ErrorKind::SequenceEmpty).with_message("sequence contains no elements"))
}

/// Blocks until the first value and disposes the subscription.
///
/// Fails with the sequence's fault, or with `SequenceEmpty` if it completes
/// without a value.
pub fn first<T: Send + 'static>(seq: &Seq<T>) -> Result<T, Fault> {
    BlockingIter::with_limit(seq, 1)
        .next()
        .unwrap_or_else(|| Err(empty_fault()))
}

/// Blocks until the sequence completes and returns its last value.
pub fn last<T: Send + 'static>(seq: &Seq<T>) -> Result<T, Fault> {
    let mut last = None;
    for item in BlockingIter::new(seq) {
        last = Some(item?);
    }
    last.ok_or_else(empty_fault)
}

/// Blocks until the sequence proves to hold exactly one value.
///
/// Fails with `SequenceNotSingle` as soon as a second value arrives.
pub fn single<T: Send + 'static>(seq: &Seq<T>) -> Result<T, Fault> {
    let mut iter = BlockingIter::with_limit(seq, 2);
    let value = match iter.next() {
        Some(item) => item?,
        None => return Err(empty_fault()),
    };
    match iter.next() {
        None => Ok(value),
        Some(Err(fault)) => Err(fault),
        Some(Ok(_)) => Err(Fault::from(
            Error::new(ErrorKind::SequenceNotSingle)
                .with_message("sequence contains more than one element"),
        )),
    }
}
