// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Bounded job queue and the persistent pool of pass-decoding workers.

use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvError, SyncSender, TryRecvError, TrySendError};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};
use crate::frame::{BlockScratch, FrameCodec, NUM_PASSES};
use crate::util::tracing_wrappers::*;

/// Jobs that can be waiting in a [`WorkerPool`] before `dispatch` blocks.
pub const QUEUE_CAPACITY: usize = 10;

#[derive(Debug, PartialEq, Eq)]
pub enum TryPush<T> {
    Pushed,
    /// The queue is full; the item is handed back untouched.
    WouldBlock(T),
    Closed(T),
}

#[derive(Debug, PartialEq, Eq)]
pub enum TryPop<T> {
    Popped(T),
    WouldBlock,
    Closed,
}

/// Bounded multi-producer multi-consumer FIFO.
///
/// `push` blocks while the queue holds `capacity` items and `pop` blocks while it is
/// empty. After [`JobQueue::close`], pushes fail and pops drain what is left before
/// failing.
#[derive(Debug)]
pub struct JobQueue<T> {
    sender: Mutex<Option<SyncSender<T>>>,
    receiver: Mutex<Receiver<T>>,
}

impl<T> JobQueue<T> {
    pub fn new(capacity: usize) -> JobQueue<T> {
        let (sender, receiver) = mpsc::sync_channel(capacity);
        JobQueue {
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(receiver),
        }
    }

    fn sender(&self) -> Option<SyncSender<T>> {
        self.sender.lock().ok()?.clone()
    }

    pub fn push(&self, item: T) -> Result<()> {
        let sender = self.sender().ok_or(Error::WorkerPoolClosed)?;
        sender.send(item).map_err(|_| Error::WorkerPoolClosed)
    }

    pub fn try_push(&self, item: T) -> TryPush<T> {
        let Some(sender) = self.sender() else {
            return TryPush::Closed(item);
        };
        match sender.try_send(item) {
            Ok(()) => TryPush::Pushed,
            Err(TrySendError::Full(item)) => TryPush::WouldBlock(item),
            Err(TrySendError::Disconnected(item)) => TryPush::Closed(item),
        }
    }

    pub fn pop(&self) -> Result<T> {
        let receiver = self.receiver.lock().map_err(|_| Error::WorkerPoolClosed)?;
        receiver.recv().map_err(|RecvError| Error::WorkerPoolClosed)
    }

    /// Never blocks: a queue whose receiving end is held by a consumer waiting in
    /// [`JobQueue::pop`] is reported as [`TryPop::WouldBlock`].
    pub fn try_pop(&self) -> TryPop<T> {
        let receiver = match self.receiver.try_lock() {
            Ok(receiver) => receiver,
            Err(TryLockError::WouldBlock) => return TryPop::WouldBlock,
            Err(TryLockError::Poisoned(_)) => return TryPop::Closed,
        };
        match receiver.try_recv() {
            Ok(item) => TryPop::Popped(item),
            Err(TryRecvError::Empty) => TryPop::WouldBlock,
            Err(TryRecvError::Disconnected) => TryPop::Closed,
        }
    }

    /// Stops accepting items and wakes consumers once the queue is drained.
    pub fn close(&self) {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
    }
}

/// Decoding of one pass, together with the channel its result goes back on.
struct DecodeJob {
    pass: usize,
    stream: Arc<[u8]>,
    bits: Range<usize>,
    completed: SyncSender<Completion>,
}

struct Completion {
    pass: usize,
    result: Result<Vec<u8>>,
}

/// Fixed set of threads that decode passes for one [`FrameCodec`].
///
/// Every `dispatch` call gets its own completion channel, so concurrent callers
/// sharing the pool never see each other's results.
pub struct WorkerPool {
    jobs: Arc<JobQueue<DecodeJob>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(num_threads: usize, codec: Arc<FrameCodec>) -> Result<WorkerPool> {
        let jobs = Arc::new(JobQueue::new(QUEUE_CAPACITY));
        let mut pool = WorkerPool {
            jobs,
            workers: Vec::with_capacity(num_threads),
        };
        for index in 0..num_threads {
            let jobs = pool.jobs.clone();
            let codec = codec.clone();
            let handle = thread::Builder::new()
                .name(format!("jpeg422-decode-{index}"))
                .spawn(move || worker_loop(&jobs, &codec))
                // Dropping `pool` on this path shuts down the workers already started.
                .map_err(Error::ThreadSpawn)?;
            pool.workers.push(handle);
        }
        debug!(num_threads, "started decode workers");
        Ok(pool)
    }

    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }

    /// Decodes every pass of `stream` on the workers and returns the pass-local
    /// rasters in pass order. Fails with the first error any pass reported.
    pub fn dispatch(
        &self,
        stream: Arc<[u8]>,
        ranges: [Range<usize>; NUM_PASSES],
    ) -> Result<Vec<Vec<u8>>> {
        let (completed, results) = mpsc::sync_channel(NUM_PASSES);
        for (pass, bits) in ranges.into_iter().enumerate() {
            self.jobs.push(DecodeJob {
                pass,
                stream: stream.clone(),
                bits,
                completed: completed.clone(),
            })?;
        }
        drop(completed);

        let mut planes: [Option<Vec<u8>>; NUM_PASSES] = Default::default();
        let mut first_error = None;
        for _ in 0..NUM_PASSES {
            let Completion { pass, result } =
                results.recv().map_err(|_| Error::WorkerPoolClosed)?;
            match result {
                Ok(samples) => planes[pass] = Some(samples),
                Err(err) => {
                    debug!(pass, %err, "pass failed");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }
        planes
            .into_iter()
            .map(|plane| plane.ok_or(Error::WorkerPoolClosed))
            .collect()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.jobs.close();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("decode worker panicked");
            }
        }
        debug!("stopped decode workers");
    }
}

fn worker_loop(jobs: &JobQueue<DecodeJob>, codec: &FrameCodec) {
    let mut scratch = BlockScratch::default();
    while let Ok(job) = jobs.pop() {
        // A panic is reported to the caller as an error; the worker keeps serving.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let geometry = &codec.layout().passes[job.pass];
            codec.decode_pass(geometry, &job.stream, job.bits.clone(), &mut scratch)
        }))
        .unwrap_or_else(|_| {
            warn!(pass = job.pass, "decode worker panicked");
            scratch = BlockScratch::default();
            Err(Error::WorkerPanicked(job.pass))
        });
        let completion = Completion {
            pass: job.pass,
            result,
        };
        if job.completed.send(completion).is_err() {
            trace!(pass = job.pass, "caller went away before the pass finished");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::CodecOptions;
    use crate::frame::{FrameHeader, FrameLayout};
    use std::time::Duration;
    use test_log::test;

    #[test]
    fn fifo_order() -> Result<()> {
        let queue = JobQueue::new(4);
        for i in 0..4 {
            queue.push(i)?;
        }
        for i in 0..4 {
            assert_eq!(queue.pop()?, i);
        }
        Ok(())
    }

    #[test]
    fn try_variants_report_would_block() -> Result<()> {
        let queue = JobQueue::new(2);
        assert_eq!(queue.try_pop(), TryPop::WouldBlock);
        assert_eq!(queue.try_push(1), TryPush::Pushed);
        assert_eq!(queue.try_push(2), TryPush::Pushed);
        assert_eq!(queue.try_push(3), TryPush::WouldBlock(3));
        assert_eq!(queue.try_pop(), TryPop::Popped(1));
        assert_eq!(queue.try_push(3), TryPush::Pushed);
        assert_eq!(queue.pop()?, 2);
        assert_eq!(queue.pop()?, 3);
        assert_eq!(queue.try_pop(), TryPop::WouldBlock);
        Ok(())
    }

    #[test]
    fn push_blocks_until_a_pop() -> Result<()> {
        let queue = Arc::new(JobQueue::new(1));
        queue.push(0)?;
        let producer = {
            let queue = queue.clone();
            thread::spawn(move || queue.push(1))
        };
        thread::sleep(Duration::from_millis(20));
        assert!(!producer.is_finished());
        assert_eq!(queue.pop()?, 0);
        producer.join().unwrap()?;
        assert_eq!(queue.pop()?, 1);
        Ok(())
    }

    #[test]
    fn pop_blocks_until_a_push() -> Result<()> {
        let queue = Arc::new(JobQueue::<u32>::new(1));
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.pop())
        };
        thread::sleep(Duration::from_millis(20));
        assert!(!consumer.is_finished());
        queue.push(7)?;
        assert_eq!(consumer.join().unwrap()?, 7);
        Ok(())
    }

    #[test]
    fn try_pop_does_not_wait_behind_a_blocked_consumer() -> Result<()> {
        let queue = Arc::new(JobQueue::<u32>::new(2));
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.pop())
        };
        thread::sleep(Duration::from_millis(20));
        assert!(!consumer.is_finished());
        let (sender, receiver) = mpsc::channel();
        let observer = {
            let queue = queue.clone();
            thread::spawn(move || sender.send(queue.try_pop()))
        };
        let result = receiver.recv_timeout(Duration::from_millis(500));
        assert_eq!(result, Ok(TryPop::WouldBlock));
        queue.push(5)?;
        assert_eq!(consumer.join().unwrap()?, 5);
        observer.join().unwrap().unwrap();
        Ok(())
    }

    #[test]
    fn close_drains_then_fails() {
        let queue = JobQueue::new(3);
        assert_eq!(queue.try_push('a'), TryPush::Pushed);
        queue.close();
        assert_eq!(queue.try_push('b'), TryPush::Closed('b'));
        assert!(matches!(queue.push('c'), Err(Error::WorkerPoolClosed)));
        assert_eq!(queue.try_pop(), TryPop::Popped('a'));
        assert_eq!(queue.try_pop(), TryPop::Closed);
        assert!(matches!(queue.pop(), Err(Error::WorkerPoolClosed)));
    }

    #[test]
    fn close_wakes_blocked_consumers() {
        let queue = Arc::new(JobQueue::<u8>::new(2));
        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || queue.pop())
            })
            .collect();
        thread::sleep(Duration::from_millis(20));
        queue.close();
        for consumer in consumers {
            assert!(consumer.join().unwrap().is_err());
        }
    }

    fn encoded_frame(codec: &FrameCodec) -> Result<Vec<u8>> {
        let plane: Vec<u8> = (0..codec.layout().plane_len())
            .map(|i| (i % 251) as u8)
            .collect();
        codec.encode_frame(&plane, false)
    }

    #[test]
    fn pool_matches_single_threaded_decode() -> Result<()> {
        let codec = Arc::new(FrameCodec::new(
            FrameLayout::new(32, 16)?,
            &CodecOptions::default(),
        )?);
        let stream = encoded_frame(&codec)?;
        let header = FrameHeader::read(&stream)?;
        let pool = WorkerPool::new(3, codec.clone())?;
        let planes = pool.dispatch(stream.as_slice().into(), header.pass_ranges())?;
        let mut scratch = BlockScratch::default();
        for ((plane, geometry), bits) in planes
            .iter()
            .zip(codec.layout().passes.iter())
            .zip(header.pass_ranges())
        {
            assert_eq!(*plane, codec.decode_pass(geometry, &stream, bits, &mut scratch)?);
        }
        Ok(())
    }

    #[test]
    fn pool_reports_pass_errors() -> Result<()> {
        let codec = Arc::new(FrameCodec::new(
            FrameLayout::new(16, 8)?,
            &CodecOptions::default(),
        )?);
        let stream = encoded_frame(&codec)?;
        let mut ranges = FrameHeader::read(&stream)?.pass_ranges();
        ranges[2].end -= 1;
        let pool = WorkerPool::new(2, codec)?;
        let result = pool.dispatch(stream.into(), ranges);
        assert!(result.is_err_and(|e| e.is_corrupt_stream()));
        Ok(())
    }

    #[test]
    fn pool_serves_concurrent_callers() -> Result<()> {
        let codec = Arc::new(FrameCodec::new(
            FrameLayout::new(64, 16)?,
            &CodecOptions::default(),
        )?);
        let stream: Arc<[u8]> = encoded_frame(&codec)?.into();
        let ranges = FrameHeader::read(&stream)?.pass_ranges();
        let pool = Arc::new(WorkerPool::new(4, codec)?);
        let expected = pool.dispatch(stream.clone(), ranges.clone())?;
        let callers: Vec<_> = (0..4)
            .map(|_| {
                let (pool, stream, ranges) = (pool.clone(), stream.clone(), ranges.clone());
                thread::spawn(move || pool.dispatch(stream, ranges))
            })
            .collect();
        for caller in callers {
            assert_eq!(caller.join().unwrap()?, expected);
        }
        Ok(())
    }

    #[test]
    fn worker_survives_a_panicking_job() -> Result<()> {
        let codec = Arc::new(FrameCodec::new(
            FrameLayout::new(16, 8)?,
            &CodecOptions::default(),
        )?);
        let stream: Arc<[u8]> = encoded_frame(&codec)?.into();
        let pool = WorkerPool::new(1, codec.clone())?;
        let (completed, results) = mpsc::sync_channel(1);
        // There is no pass 7, so decoding it panics inside the worker.
        pool.jobs.push(DecodeJob {
            pass: 7,
            stream: stream.clone(),
            bits: 0..0,
            completed,
        })?;
        let completion = results.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(completion.pass, 7);
        assert!(matches!(completion.result, Err(Error::WorkerPanicked(7))));

        let ranges = FrameHeader::read(&stream)?.pass_ranges();
        assert_eq!(pool.dispatch(stream, ranges)?.len(), NUM_PASSES);
        Ok(())
    }

    #[test]
    fn drop_joins_idle_workers() -> Result<()> {
        let codec = Arc::new(FrameCodec::new(
            FrameLayout::new(16, 8)?,
            &CodecOptions::default(),
        )?);
        let pool = WorkerPool::new(4, codec.clone())?;
        assert_eq!(pool.num_threads(), 4);
        drop(pool);
        // Workers held the only other references to the codec.
        assert_eq!(Arc::strong_count(&codec), 1);
        Ok(())
    }
}
