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

//! Opacity slider for the informal urban nucleus overlay.
//!
//! The slider lives inside the layers control, directly under the overlay's
//! entry, so it can only be attached once that entry exists. Attachment is
//! retried on a timer and after each overlay registration until it succeeds
//! once; after that every attempt is a no-op.

use std::time::{Duration, Instant};

use eframe::egui;
use log::{debug, info};

/// Current opacity of the designated overlay, always within [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpacityState(f32);

impl OpacityState {
    pub const STEP: f32 = 0.1;

    pub fn new(value: f32) -> Self {
        let mut state = Self(0.0);
        state.set(value);
        state
    }

    pub fn get(self) -> f32 {
        self.0
    }

    pub fn set(&mut self, value: f32) {
        self.0 = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
    }

    /// Slider caption, one decimal place
    pub fn label(self) -> String {
        format!("Opacidade NUI: {:.1}", self.0)
    }
}

impl Default for OpacityState {
    fn default() -> Self {
        Self(0.6)
    }
}

/// Whether the slider has been placed in the layers control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Absent,
    Attached,
}

/// Reconciles the slider against the layers control.
#[derive(Debug)]
pub struct OpacityControl {
    attachment: Attachment,
    /// One-shot timed attempt shortly after startup
    initial_attempt_at: Option<Instant>,
    /// Attempt requested for the next frame after a registration
    deferred: bool,
    attempts: u32,
}

impl OpacityControl {
    pub fn new(now: Instant, initial_delay: Duration) -> Self {
        Self {
            attachment: Attachment::Absent,
            initial_attempt_at: Some(now + initial_delay),
            deferred: false,
            attempts: 0,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attachment == Attachment::Attached
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Ask for one more attempt on the next frame.
    pub fn schedule_deferred(&mut self) {
        self.deferred = true;
    }

    /// Time until the next attempt is due, or `None` when nothing is pending.
    /// A deferred attempt is due on the next frame.
    pub fn next_attempt_in(&self, now: Instant) -> Option<Duration> {
        if self.deferred {
            return Some(Duration::ZERO);
        }
        self.initial_attempt_at
            .map(|at| at.saturating_duration_since(now))
    }

    /// Run whichever attempts are due. `anchor_listed` reports whether the
    /// layers control currently lists the designated overlay.
    pub fn poll(&mut self, now: Instant, anchor_listed: bool) -> Attachment {
        let timed = self.initial_attempt_at.is_some_and(|at| now >= at);
        if timed {
            self.initial_attempt_at = None;
        }
        let deferred = std::mem::take(&mut self.deferred);

        if timed || deferred {
            self.reconcile(anchor_listed)
        } else {
            self.attachment
        }
    }

    /// Single reconciliation attempt. Idempotent once attached.
    pub fn reconcile(&mut self, anchor_listed: bool) -> Attachment {
        self.attempts += 1;
        match self.attachment {
            Attachment::Attached => {}
            Attachment::Absent if anchor_listed => {
                info!("Opacity control attached after {} attempt(s)", self.attempts());
                self.attachment = Attachment::Attached;
            }
            Attachment::Absent => {
                debug!("Opacity control anchor not listed yet (attempt {})", self.attempts());
            }
        }
        self.attachment
    }
}

/// Draw the slider and caption. Returns the new value when the user moved it.
pub fn show_slider(ui: &mut egui::Ui, opacity: OpacityState) -> Option<f32> {
    let mut value = opacity.get();

    ui.indent("nui_opacity", |ui| {
        ui.label(egui::RichText::new(opacity.label()).size(11.0));
        let response = ui.add(
            egui::Slider::new(&mut value, 0.0..=1.0)
                .step_by(f64::from(OpacityState::STEP))
                .show_value(false),
        );
        response.changed().then_some(value)
    })
    .inner
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[test]
    fn test_opacity_state_clamps_and_formats() {
        let mut opacity = OpacityState::default();
        assert_eq!(opacity.label(), "Opacidade NUI: 0.6");

        opacity.set(0.3);
        assert!((opacity.get() - 0.3).abs() < f32::EPSILON);
        assert_eq!(opacity.label(), "Opacidade NUI: 0.3");

        opacity.set(1.7);
        assert!((opacity.get() - 1.0).abs() < f32::EPSILON);
        opacity.set(f32::NAN);
        assert!(opacity.get().abs() < f32::EPSILON);
        assert_eq!(OpacityState::new(-2.0).label(), "Opacidade NUI: 0.0");
    }

    #[test]
    fn test_no_attempt_before_anything_is_due() {
        let start = Instant::now();
        let mut control = OpacityControl::new(start, DELAY);
        assert_eq!(control.poll(start, true), Attachment::Absent);
        assert_eq!(control.attempts(), 0);
        assert_eq!(control.next_attempt_in(start), Some(DELAY));
    }

    #[test]
    fn test_timed_attempt_before_anchor_is_a_silent_noop() {
        let start = Instant::now();
        let mut control = OpacityControl::new(start, DELAY);

        assert_eq!(control.poll(start + DELAY, false), Attachment::Absent);
        assert_eq!(control.attempts(), 1);
        assert_eq!(control.next_attempt_in(start + DELAY), None);

        // Later registration makes the anchor appear and the deferred attempt attaches.
        control.schedule_deferred();
        assert_eq!(control.next_attempt_in(start + DELAY), Some(Duration::ZERO));
        assert_eq!(control.poll(start + DELAY * 2, true), Attachment::Attached);
        assert_eq!(control.attempts(), 2);
    }

    #[test]
    fn test_attached_is_terminal_and_idempotent() {
        let start = Instant::now();
        let mut control = OpacityControl::new(start, DELAY);
        control.schedule_deferred();
        assert_eq!(control.poll(start, true), Attachment::Attached);

        for _ in 0..5 {
            control.schedule_deferred();
            assert_eq!(control.poll(start + DELAY, false), Attachment::Attached);
        }
        assert!(control.is_attached());
    }

    #[test]
    fn test_deferred_attempt_runs_once_per_request() {
        let start = Instant::now();
        let mut control = OpacityControl::new(start, Duration::from_secs(60));
        control.schedule_deferred();
        control.schedule_deferred();
        control.poll(start, false);
        control.poll(start, false);
        assert_eq!(control.attempts(), 1);
    }
}
