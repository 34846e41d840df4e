//! Viewport-visibility capability consumed by viewport-triggered reveals.
//!
//! The engine never measures anything itself. A host reports how much of
//! each watched element is on screen and the watcher turns that into
//! enter/leave transitions against the per-element threshold.

use std::collections::HashMap;

use bevy::math::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intersection {
    pub id: WatchId,
    pub visible: bool,
}

pub trait ViewportWatcher {
    /// Starts watching `id`. Visibility is considered `false` until reported.
    fn observe(&mut self, id: WatchId, threshold: f32);
    /// Stops watching `id` and drops any undelivered change for it.
    fn unobserve(&mut self, id: WatchId);
    /// Drains visibility transitions since the last poll, in report order.
    fn poll(&mut self) -> Vec<Intersection>;
}

struct Watched {
    threshold: f32,
    visible: bool,
}

/// Threshold-crossing watcher fed with area ratios. The Bevy host feeds it
/// from the camera rectangle every frame; tests feed it by hand.
#[derive(Default)]
pub struct IntersectionTracker {
    watched: HashMap<WatchId, Watched>,
    changes: Vec<Intersection>,
}

impl IntersectionTracker {
    pub fn is_observing(&self, id: WatchId) -> bool {
        self.watched.contains_key(&id)
    }

    pub fn observed_len(&self) -> usize {
        self.watched.len()
    }

    /// Records the visible fraction of `id`'s area. Unwatched ids are ignored.
    pub fn report(&mut self, id: WatchId, ratio: f32) {
        let Some(watched) = self.watched.get_mut(&id) else { return };
        let visible = ratio > 0.0 && ratio >= watched.threshold;
        if visible != watched.visible {
            watched.visible = visible;
            self.changes.push(Intersection { id, visible });
        }
    }
}

impl ViewportWatcher for IntersectionTracker {
    fn observe(&mut self, id: WatchId, threshold: f32) {
        self.watched.insert(id, Watched { threshold, visible: false });
    }

    fn unobserve(&mut self, id: WatchId) {
        self.watched.remove(&id);
        self.changes.retain(|c| c.id != id);
    }

    fn poll(&mut self) -> Vec<Intersection> {
        std::mem::take(&mut self.changes)
    }
}

/// Fraction of `element`'s area inside `viewport`. Degenerate (zero-area)
/// elements count as fully visible when their center is on screen.
pub fn intersection_ratio(element: Rect, viewport: Rect) -> f32 {
    let area = element.width() * element.height();
    if area <= f32::EPSILON {
        return if viewport.contains(element.center()) { 1.0 } else { 0.0 };
    }
    let overlap = element.intersect(viewport);
    if overlap.is_empty() {
        return 0.0;
    }
    (overlap.width() * overlap.height() / area).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    #[test]
    fn reports_only_threshold_crossings() {
        let mut tracker = IntersectionTracker::default();
        let id = WatchId(7);
        tracker.observe(id, 0.3);

        tracker.report(id, 0.1);
        assert!(tracker.poll().is_empty());

        tracker.report(id, 0.3);
        tracker.report(id, 0.9);
        assert_eq!(tracker.poll(), vec![Intersection { id, visible: true }]);

        tracker.report(id, 0.0);
        assert_eq!(tracker.poll(), vec![Intersection { id, visible: false }]);
    }

    #[test]
    fn unobserve_drops_pending_changes() {
        let mut tracker = IntersectionTracker::default();
        let id = WatchId(1);
        tracker.observe(id, 0.1);
        tracker.report(id, 1.0);
        tracker.unobserve(id);

        assert!(tracker.poll().is_empty());
        assert!(!tracker.is_observing(id));
        tracker.report(id, 1.0);
        assert!(tracker.poll().is_empty());
    }

    #[test]
    fn ratio_of_partial_overlap() {
        let viewport = Rect::from_center_size(Vec2::ZERO, Vec2::new(100.0, 100.0));
        let half_out = Rect::new(40.0, -10.0, 60.0, 10.0);
        let outside = Rect::new(200.0, 200.0, 210.0, 210.0);

        assert!((intersection_ratio(half_out, viewport) - 0.5).abs() < 1e-5);
        assert_eq!(intersection_ratio(outside, viewport), 0.0);
        assert_eq!(intersection_ratio(Rect::new(0.0, 0.0, 0.0, 0.0), viewport), 1.0);
    }
}
