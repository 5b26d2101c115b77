// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The two-buffered frame queue between the logic and render threads.
//!
//! The logic side accumulates messages in a local back buffer and hands the
//! whole batch over at its frame boundary, followed by that frame's
//! instruction stream. Both travel over `flume` channels tagged with the same
//! frame number, so the render side never replays instructions whose
//! messages it has not applied yet.

use crate::instruction::{Instruction, InstructionStream};
use crate::message::{MessageBatch, RenderMessage};
use std::collections::VecDeque;
use thiserror::Error;

/// The render side hung up.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("render thread is no longer receiving frames")]
pub struct FrameQueueClosed;

/// Creates a connected sender/receiver pair.
pub fn frame_channel() -> (FrameSender, FrameReceiver) {
    let (batch_tx, batch_rx) = flume::unbounded();
    let (stream_tx, stream_rx) = flume::unbounded();
    let sender = FrameSender {
        batches: batch_tx,
        streams: stream_tx,
        back: Vec::new(),
        next_frame: 1,
    };
    let receiver = FrameReceiver {
        batches: batch_rx,
        streams: stream_rx,
        waiting: VecDeque::new(),
        last_applied: 0,
        max_pending: 4,
    };
    (sender, receiver)
}

/// Logic-thread end of the frame queue.
#[derive(Debug)]
pub struct FrameSender {
    batches: flume::Sender<MessageBatch>,
    streams: flume::Sender<InstructionStream>,
    back: Vec<RenderMessage>,
    next_frame: u64,
}

impl FrameSender {
    /// Queues a message for the current frame.
    pub fn push(&mut self, message: RenderMessage) {
        self.back.push(message);
    }

    /// Queues several messages for the current frame.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = RenderMessage>) {
        self.back.extend(messages);
    }

    /// Number of messages waiting for the next frame boundary.
    pub fn pending(&self) -> usize {
        self.back.len()
    }

    /// The number the next submitted frame will carry.
    pub fn next_frame(&self) -> u64 {
        self.next_frame
    }

    /// Submits the accumulated messages together with this frame's
    /// instructions.
    ///
    /// ## Returns
    /// The number of the submitted frame.
    pub fn end_frame(&mut self, instructions: Vec<Instruction>) -> Result<u64, FrameQueueClosed> {
        let frame = self.submit_batch()?;
        self.streams
            .send(InstructionStream::new(frame, instructions))
            .map_err(|_| FrameQueueClosed)?;
        Ok(frame)
    }

    /// Submits the accumulated messages and keeps the render thread on its
    /// current instruction stream.
    pub fn submit_messages(&mut self) -> Result<u64, FrameQueueClosed> {
        self.submit_batch()
    }

    fn submit_batch(&mut self) -> Result<u64, FrameQueueClosed> {
        let frame = self.next_frame;
        let batch = MessageBatch {
            frame,
            messages: std::mem::take(&mut self.back),
        };
        log::trace!(
            "[FrameSender] Submitting frame {} with {} messages",
            frame,
            batch.messages.len()
        );
        self.batches.send(batch).map_err(|_| FrameQueueClosed)?;
        self.next_frame += 1;
        Ok(frame)
    }
}

/// Render-thread end of the frame queue.
#[derive(Debug)]
pub struct FrameReceiver {
    batches: flume::Receiver<MessageBatch>,
    streams: flume::Receiver<InstructionStream>,
    waiting: VecDeque<InstructionStream>,
    last_applied: u64,
    max_pending: usize,
}

impl FrameReceiver {
    /// Limits how many streams may wait for their message batch.
    pub fn set_max_pending(&mut self, max_pending: usize) {
        self.max_pending = max_pending.max(1);
    }

    /// Frame number of the newest drained batch.
    pub fn last_applied_frame(&self) -> u64 {
        self.last_applied
    }

    /// Returns `true` once the logic side is gone and nothing is left to read.
    pub fn is_disconnected(&self) -> bool {
        self.batches.is_disconnected() && self.batches.is_empty()
    }

    /// Takes every submitted batch, oldest first.
    pub fn drain(&mut self) -> Vec<MessageBatch> {
        let batches: Vec<MessageBatch> = self.batches.try_iter().collect();
        if let Some(last) = batches.last() {
            self.last_applied = last.frame;
        }
        batches
    }

    /// Returns the newest stream whose messages have been drained, if one
    /// arrived since the last call. Older ready streams are superseded.
    pub fn take_stream(&mut self) -> Option<InstructionStream> {
        self.waiting.extend(self.streams.try_iter());

        let mut ready = None;
        while self
            .waiting
            .front()
            .is_some_and(|s| s.frame() <= self.last_applied)
        {
            ready = self.waiting.pop_front();
        }

        while self.waiting.len() > self.max_pending {
            if let Some(stale) = self.waiting.pop_front() {
                log::warn!(
                    "[FrameReceiver] Discarding instruction stream of frame {}",
                    stale.frame()
                );
            }
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::Rect;

    fn one_instruction() -> Vec<Instruction> {
        vec![Instruction::new(Rect::from_size(10, 10))]
    }

    #[test]
    fn messages_stay_local_until_the_frame_ends() {
        let (mut sender, mut receiver) = frame_channel();
        sender.push(RenderMessage::SetFrameDeltaTime(0.5));
        assert!(receiver.drain().is_empty());

        assert_eq!(sender.end_frame(Vec::new()), Ok(1));
        let batches = receiver.drain();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].frame, 1);
        assert_eq!(batches[0].messages.len(), 1);
        assert_eq!(sender.pending(), 0);
    }

    #[test]
    fn newest_ready_stream_supersedes_older_ones() {
        let (mut sender, mut receiver) = frame_channel();
        sender.end_frame(Vec::new()).unwrap();
        sender.end_frame(one_instruction()).unwrap();

        assert_eq!(receiver.drain().len(), 2);
        let stream = receiver.take_stream().unwrap();
        assert_eq!(stream.frame(), 2);
        assert_eq!(stream.len(), 1);
        assert!(receiver.take_stream().is_none());
    }

    #[test]
    fn stream_waits_for_its_batch() {
        let (mut sender, mut receiver) = frame_channel();
        sender.end_frame(one_instruction()).unwrap();
        receiver.drain();
        sender.end_frame(Vec::new()).unwrap();

        assert_eq!(receiver.take_stream().map(|s| s.frame()), Some(1));
        assert!(receiver.take_stream().is_none());

        receiver.drain();
        assert_eq!(receiver.take_stream().map(|s| s.frame()), Some(2));
    }

    #[test]
    fn message_only_frames_keep_the_current_stream() {
        let (mut sender, mut receiver) = frame_channel();
        sender.push(RenderMessage::SetFrameDeltaTime(0.1));
        assert_eq!(sender.submit_messages(), Ok(1));

        receiver.drain();
        assert_eq!(receiver.last_applied_frame(), 1);
        assert!(receiver.take_stream().is_none());
        assert_eq!(sender.next_frame(), 2);
    }

    #[test]
    fn closed_receiver_is_reported() {
        let (mut sender, receiver) = frame_channel();
        drop(receiver);
        assert_eq!(sender.end_frame(Vec::new()), Err(FrameQueueClosed));
    }
}
