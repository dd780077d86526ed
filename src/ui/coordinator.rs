// Copyright 2025 Chris Custine
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

//! Glue between overlay lifecycle events and the floating controls.

use std::time::{Duration, Instant};

use log::debug;
use overlay_kit::{OverlayEvent, INFORMAL_NUCLEUS};

use super::{Attachment, LayersControl, LegendSet, OpacityControl, Sidebar};

/// Owns the UI pieces whose state depends on which overlays exist and are shown.
#[derive(Debug)]
pub struct UiCoordinator {
    pub legends: LegendSet,
    pub layers_control: LayersControl,
    pub opacity_control: OpacityControl,
    pub sidebar: Sidebar,
}

impl UiCoordinator {
    pub fn new(now: Instant, opacity_control_delay: Duration) -> Self {
        Self {
            legends: LegendSet::default(),
            layers_control: LayersControl::default(),
            opacity_control: OpacityControl::new(now, opacity_control_delay),
            sidebar: Sidebar::default(),
        }
    }

    /// An overlay was registered: list it and retry the slider next frame.
    pub fn on_registered(&mut self, label: &str) {
        self.layers_control.add_overlay(label);
        self.opacity_control.schedule_deferred();
    }

    pub fn on_overlay_event(&mut self, event: &OverlayEvent) {
        if self.legends.handle(event) {
            debug!("Legend visibility changed: {event:?}");
        }
    }

    /// Run any due opacity control attempt against the current layers control.
    pub fn reconcile_opacity_control(&mut self, now: Instant) -> Attachment {
        let anchor_listed = self.layers_control.lists(INFORMAL_NUCLEUS);
        self.opacity_control.poll(now, anchor_listed)
    }
}

#[cfg(test)]
mod tests {
    use overlay_kit::style::rules::GEOLOGY;

    use super::*;

    #[test]
    fn test_registration_schedules_deferred_attach() {
        let start = Instant::now();
        let mut coordinator = UiCoordinator::new(start, Duration::from_secs(60));

        coordinator.on_registered("APP");
        assert_eq!(coordinator.reconcile_opacity_control(start), Attachment::Absent);

        coordinator.on_registered(INFORMAL_NUCLEUS);
        assert_eq!(coordinator.reconcile_opacity_control(start), Attachment::Attached);
        assert_eq!(coordinator.opacity_control.attempts(), 2);
    }

    #[test]
    fn test_overlay_events_drive_legends() {
        let mut coordinator = UiCoordinator::new(Instant::now(), Duration::ZERO);
        coordinator.on_overlay_event(&OverlayEvent::Shown(GEOLOGY.to_string()));
        assert!(coordinator.legends.is_visible(GEOLOGY));
        coordinator.on_overlay_event(&OverlayEvent::Hidden(GEOLOGY.to_string()));
        assert!(!coordinator.legends.is_visible(GEOLOGY));
    }
}
