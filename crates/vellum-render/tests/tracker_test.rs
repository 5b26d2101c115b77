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

mod common;

use common::*;
use vellum_core::{ResourceId, TrackerId};
use vellum_infra::{FenceMode, HeadlessContext};
use vellum_render::{
    CompletionStatus, PostProcessEvent, RenderConfig, RenderMessage, RenderTracker, TrackerMode,
    TrackerState,
};

fn tracked_frame(h: &mut Harness, tracker: u64) {
    h.sender.end_frame(vec![draw(&[1]).with_tracker(TrackerId(tracker))]).unwrap();
}

fn setup(h: &mut Harness, mode: TrackerMode) {
    h.sender.push(RenderMessage::SetDefaultShader(flat_shader()));
    h.sender.extend(drawable(1, 1, 1));
    h.sender.push(RenderMessage::AddRenderTracker(RenderTracker::new(
        TrackerId(1),
        ResourceId(100),
        mode,
    )));
}

#[test]
fn one_shot_tracker_reports_exactly_once() {
    let mut h = Harness::new();
    setup(&mut h, TrackerMode::OneShot);
    tracked_frame(&mut h, 1);

    h.manager.render();
    assert!(h.events.try_recv().is_err());

    h.manager.render();
    assert_eq!(
        h.events.try_recv(),
        Ok(PostProcessEvent {
            resource: ResourceId(100),
            status: CompletionStatus::Completed
        })
    );

    h.manager.render();
    h.manager.render();
    assert!(h.events.try_recv().is_err());
    assert_eq!(h.manager.registry().tracker_count(), 0);
    assert_eq!(h.context.live_fences(), 0);
}

#[test]
fn retired_one_shot_tracker_can_still_be_removed() {
    let mut h = Harness::new();
    setup(&mut h, TrackerMode::OneShot);
    tracked_frame(&mut h, 1);
    h.manager.render();
    h.manager.render();
    assert_eq!(h.events.len(), 1);

    h.sender.push(RenderMessage::RemoveRenderTracker(TrackerId(1)));
    h.frame(Vec::new());
    assert_eq!(h.manager.registry().tracker_count(), 0);
}

#[test]
fn retired_one_shot_trackers_leave_nothing_behind() {
    let mut h = Harness::new();
    h.sender.push(RenderMessage::SetDefaultShader(flat_shader()));
    h.sender.extend(drawable(1, 1, 1));
    for id in 1..=200 {
        h.sender.push(RenderMessage::AddRenderTracker(RenderTracker::new(
            TrackerId(id),
            ResourceId(1000 + id),
            TrackerMode::OneShot,
        )));
        h.frame(vec![draw(&[1]).with_tracker(TrackerId(id))]);
    }
    h.manager.render();

    assert_eq!(h.events.len(), 200);
    assert_eq!(h.manager.registry().tracker_count(), 0);
    assert!(!format!("{:?}", h.manager.registry()).contains("TrackerId"));
}

#[test]
fn repeating_tracker_reports_every_time_it_is_rearmed() {
    let mut h = Harness::new();
    setup(&mut h, TrackerMode::Repeating);
    tracked_frame(&mut h, 1);

    for _ in 0..4 {
        h.manager.render();
    }

    assert_eq!(h.events.len(), 3);
    assert_eq!(h.manager.last_stats().tracker_events, 1);
    let tracker = h.manager.registry().tracker(TrackerId(1)).unwrap();
    assert_eq!(tracker.state(), TrackerState::Pending);
}

#[test]
fn manual_fence_holds_the_event_until_signaled() {
    let context = HeadlessContext::new().with_fence_mode(FenceMode::Manual);
    let mut h = Harness::with(context, RenderConfig::default());
    setup(&mut h, TrackerMode::OneShot);
    tracked_frame(&mut h, 1);

    h.manager.render();
    h.manager.render();
    assert!(h.events.is_empty());

    h.context.signal_all_fences();
    h.manager.render();
    assert_eq!(h.events.len(), 1);
}

#[test]
fn fence_lost_with_the_context_is_reported_as_failed() {
    let context = HeadlessContext::new().with_fence_mode(FenceMode::Manual);
    let mut h = Harness::with(context, RenderConfig::default());
    setup(&mut h, TrackerMode::OneShot);
    tracked_frame(&mut h, 1);
    h.manager.render();

    h.manager.context_destroyed();
    h.context.reset();
    h.manager.render();
    assert!(h.events.is_empty());

    h.manager.context_created();
    h.manager.render();
    assert_eq!(
        h.events.try_recv().map(|e| e.status),
        Ok(CompletionStatus::Failed)
    );
    assert_eq!(h.context.invalid_handle_uses(), 0);
}

#[test]
fn full_bounded_queue_drops_and_counts() {
    let config = RenderConfig {
        post_process_capacity: Some(1),
        ..Default::default()
    };
    let mut h = Harness::with(HeadlessContext::new(), config);
    setup(&mut h, TrackerMode::OneShot);
    h.sender.push(RenderMessage::AddRenderTracker(RenderTracker::new(
        TrackerId(2),
        ResourceId(200),
        TrackerMode::OneShot,
    )));
    let instruction = draw(&[1]).with_tracker(TrackerId(1));
    let second = draw(&[1]).with_tracker(TrackerId(2));
    h.sender.end_frame(vec![instruction, second]).unwrap();

    h.manager.render();
    h.manager.render();

    assert_eq!(h.events.len(), 1);
    assert_eq!(h.manager.dispatcher().dropped(), 1);
}

#[test]
fn zero_capacity_queue_still_reports_completion() {
    let config = RenderConfig {
        post_process_capacity: Some(0),
        ..Default::default()
    };
    let mut h = Harness::with(HeadlessContext::new(), config);
    setup(&mut h, TrackerMode::OneShot);
    tracked_frame(&mut h, 1);

    h.manager.render();
    h.manager.render();

    assert_eq!(h.events.try_recv().map(|e| e.resource), Ok(ResourceId(100)));
    assert_eq!(h.manager.dispatcher().dropped(), 0);
}

#[test]
fn external_producers_share_the_dispatcher() {
    let h = Harness::new();
    assert!(h
        .manager
        .dispatch_post_process(PostProcessEvent::completed(ResourceId(5))));
    assert_eq!(h.events.try_recv().map(|e| e.resource), Ok(ResourceId(5)));
}
