//! Dial gesture state machine.
//!
//! A drag around the dial maps the pointer angle onto a fraction of the
//! daily goal, snapped to the active unit's increment. While dragging only
//! events are produced; the record is written once, on release.
//!
//! ```text
//!   Idle --pointer_down--> Dragging --pointer_up--> Idle (commit)
//!                             |
//!                             +------cancel-------> Idle (no change)
//! ```

use crate::controller::{progress_ratio, IntakeController};
use crate::store::RecordStore;
use crate::units::increment_step;
use crate::Haptic;

/// Hard ceiling applied when the dial commits a value, in cups
pub const DIAL_MAX_CUPS: f64 = 16.0;

const SNAP_TOLERANCE: f64 = 1e-9;

/// A pointer position in screen coordinates (y grows downward)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point on a circle around `center`, `degrees` clockwise from 12 o'clock
    pub fn on_circle(center: Point, radius: f64, degrees: f64) -> Self {
        let radians = degrees.to_radians();
        Self {
            x: center.x + radius * radians.sin(),
            y: center.y - radius * radians.cos(),
        }
    }
}

/// Angle of `point` around `center` in [0, 360), clockwise from the top.
///
/// The top of the dial is 0, never 360. A point exactly on the centre
/// also maps to 0.
pub fn dial_angle(center: Point, point: Point) -> f64 {
    let dx = point.x - center.x;
    let up = center.y - point.y;
    let degrees = dx.atan2(up).to_degrees().rem_euclid(360.0);
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

/// Snap a raw dial fraction to the nearest increment of the goal
pub fn snap(raw_progress: f64, goal_cups: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return raw_progress * goal_cups;
    }
    (raw_progress * goal_cups / step).round() * step
}

/// Events produced by the dial for its owner
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DialEvent {
    /// The live value moved to a new increment
    Snapped { cups: f64 },
    /// The live value reached the goal from below
    GoalCrossed,
    /// The drag ended and this absolute amount was written
    Committed { cups: f64 },
}

impl DialEvent {
    /// Haptic feedback the owner should play for this event
    pub fn haptic(&self) -> Option<Haptic> {
        match self {
            DialEvent::Snapped { .. } => Some(Haptic::SnapTick),
            DialEvent::GoalCrossed => Some(Haptic::Success),
            DialEvent::Committed { .. } => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Drag {
    baseline_cups: f64,
    goal_cups: f64,
    step: f64,
    last_snapped: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DialState {
    Idle,
    Dragging(Drag),
}

/// Per-interaction dial input handler
#[derive(Clone, Debug)]
pub struct DialInputController {
    center: Point,
    state: DialState,
}

impl DialInputController {
    pub fn new(center: Point) -> Self {
        Self {
            center,
            state: DialState::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DialState::Dragging(_))
    }

    /// Value to display while dragging, in cups
    pub fn live_value_cups(&self) -> Option<f64> {
        match self.state {
            DialState::Dragging(drag) => Some(drag.last_snapped),
            DialState::Idle => None,
        }
    }

    /// Amount the record held when the drag started
    pub fn baseline_cups(&self) -> Option<f64> {
        match self.state {
            DialState::Dragging(drag) => Some(drag.baseline_cups),
            DialState::Idle => None,
        }
    }

    /// Start a drag. The first sample is processed like a move.
    pub fn pointer_down<S: RecordStore>(
        &mut self,
        controller: &mut IntakeController<S>,
        point: Point,
    ) -> Vec<DialEvent> {
        if let DialState::Idle = self.state {
            let baseline = controller.amount_cups();
            controller.prepare_haptics();
            self.state = DialState::Dragging(Drag {
                baseline_cups: baseline,
                goal_cups: controller.daily_goal_cups(),
                step: increment_step(controller.unit()),
                last_snapped: baseline,
            });
            tracing::debug!("Dial drag started at {} cups", baseline);
        }
        self.pointer_moved(point)
    }

    /// Feed one pointer sample. Ignored unless dragging.
    pub fn pointer_moved(&mut self, point: Point) -> Vec<DialEvent> {
        let DialState::Dragging(drag) = &mut self.state else {
            return Vec::new();
        };

        let angle = dial_angle(self.center, point);
        let live = snap(angle / 360.0, drag.goal_cups, drag.step);

        let mut events = Vec::new();
        if (live - drag.last_snapped).abs() > SNAP_TOLERANCE {
            let before = progress_ratio(drag.last_snapped, drag.goal_cups);
            let after = progress_ratio(live, drag.goal_cups);
            drag.last_snapped = live;
            events.push(DialEvent::Snapped { cups: live });

            if before < 1.0 && after >= 1.0 {
                events.push(DialEvent::GoalCrossed);
            }
        }
        events
    }

    /// End the drag and write the clamped live value as today's amount
    pub fn pointer_up<S: RecordStore>(
        &mut self,
        controller: &mut IntakeController<S>,
    ) -> Option<DialEvent> {
        let DialState::Dragging(drag) = std::mem::replace(&mut self.state, DialState::Idle) else {
            return None;
        };

        let final_cups = drag.last_snapped.clamp(0.0, DIAL_MAX_CUPS);
        tracing::debug!(
            "Dial drag committed {} cups (baseline {})",
            final_cups,
            drag.baseline_cups
        );
        controller.set_amount(final_cups);
        Some(DialEvent::Committed { cups: final_cups })
    }

    /// Abandon the drag without touching the record
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            tracing::debug!("Dial drag abandoned");
        }
        self.state = DialState::Idle;
    }

    /// Accessibility increment: one unit step up, capped at the dial maximum
    pub fn increment<S: RecordStore>(&self, controller: &mut IntakeController<S>) {
        let step = increment_step(controller.unit());
        nudge(controller, step);
    }

    /// Accessibility decrement: one unit step down, floored at zero
    pub fn decrement<S: RecordStore>(&self, controller: &mut IntakeController<S>) {
        let step = increment_step(controller.unit());
        nudge(controller, -step);
    }
}

fn nudge<S: RecordStore>(controller: &mut IntakeController<S>, delta: f64) {
    let target = (controller.amount_cups() + delta).clamp(0.0, DIAL_MAX_CUPS);
    controller.set_amount(target);
}
