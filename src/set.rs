//! Identifier → color registry.
//!
//! Colors are handed out by walking the palette scale: the first identifier
//! lands at a random point, the second directly opposite it, and every later
//! one in the middle of the widest remaining gap. The scale is treated as
//! wrapping from 1 back to 0 when measuring gaps.
use std::collections::HashMap;

use rand::RngExt;
use rand::rngs::ThreadRng;
use tracing::{debug, trace};

use crate::color::Color;
use crate::palette::Palette;

/// A single allocated identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    id: String,
    point: f64,
    color: Color,
}

impl Entry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn point(&self) -> f64 {
        self.point
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

/// A stretch of unallocated scale, possibly wrapping past 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gap {
    pub start: f64,
    pub width: f64,
}

impl Gap {
    pub fn midpoint(&self) -> f64 {
        wrap(self.start + self.width / 2.0)
    }
}

fn wrap(point: f64) -> f64 {
    if point > 1.0 { point - 1.0 } else { point }
}

pub struct AllocationSet<R = ThreadRng> {
    palette: Palette,
    entries: Vec<Entry>,
    index: HashMap<String, (f64, Color)>,
    origin: Option<f64>,
    rng: R,
}

impl AllocationSet<ThreadRng> {
    /// An empty set using the default palette.
    pub fn new() -> Self {
        Self::with_palette(Palette::default())
    }

    pub fn with_palette(palette: Palette) -> Self {
        Self::with_rng(palette, rand::rng())
    }
}

impl Default for AllocationSet<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngExt> AllocationSet<R> {
    /// An empty set drawing its first point from `rng`.
    pub fn with_rng(palette: Palette, rng: R) -> Self {
        Self {
            palette,
            entries: Vec::new(),
            index: HashMap::new(),
            origin: None,
            rng,
        }
    }

    /// Places the first identifier at `point` instead of a random one.
    /// The point is clamped into `[0, 1]`; NaN and infinities start at 0.
    pub fn starting_at(mut self, point: f64) -> Self {
        let point = if point.is_finite() { point } else { 0.0 };
        self.origin = Some(point.clamp(0.0, 1.0));
        self
    }

    /// Returns the color for `id`, allocating one if it has not been seen.
    pub fn color_for(&mut self, id: &str) -> Color {
        if let Some(&(point, color)) = self.index.get(id) {
            trace!(id, point, "color already allocated");
            return color;
        }

        let point = self.next_point();
        let color = self.palette.map_point(point);
        debug!(id, point, %color, allocated = self.entries.len() + 1, "allocated color");

        let at = self.entries.partition_point(|entry| entry.point <= point);
        self.entries.insert(
            at,
            Entry {
                id: id.to_string(),
                point,
                color,
            },
        );
        self.index.insert(id.to_string(), (point, color));
        color
    }

    fn next_point(&mut self) -> f64 {
        if let Some(gap) = self.largest_gap() {
            return gap.midpoint();
        }
        match self.entries.first() {
            Some(only) => wrap(only.point + 0.5),
            None => match self.origin {
                Some(point) => point,
                None => self.rng.random_range(0.0..1.0),
            },
        }
    }
}

impl<R> AllocationSet<R> {
    /// The gap the next allocation will bisect, once at least two points
    /// exist. Ties go to the wraparound gap, then to the lowest start.
    pub fn largest_gap(&self) -> Option<Gap> {
        let [first, .., last] = self.entries.as_slice() else {
            return None;
        };

        let mut best = Gap {
            start: last.point,
            width: 1.0 - last.point + first.point,
        };
        for pair in self.entries.windows(2) {
            let width = pair[1].point - pair[0].point;
            if width > best.width {
                best = Gap {
                    start: pair[0].point,
                    width,
                };
            }
        }
        Some(best)
    }

    /// Looks up an already allocated color without allocating.
    pub fn get(&self, id: &str) -> Option<Color> {
        self.index.get(id).map(|&(_, color)| color)
    }

    pub fn point_of(&self, id: &str) -> Option<f64> {
        self.index.get(id).map(|&(point, _)| point)
    }

    /// All allocations, ordered by ascending point.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    const EPSILON: f64 = 1e-9;

    fn starting_at(point: f64) -> AllocationSet {
        AllocationSet::new().starting_at(point)
    }

    #[test]
    fn repeat_lookups_return_the_same_color() {
        let mut set = AllocationSet::new();
        let first = set.color_for("alice");
        set.color_for("bob");
        assert_eq!(set.color_for("alice"), first);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn lookup_is_case_sensitive_and_untrimmed() {
        let mut set = starting_at(0.0);
        set.color_for("host");
        set.color_for("Host");
        set.color_for(" host");
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn random_first_point_is_in_unit_interval() {
        for _ in 0..100 {
            let mut set = AllocationSet::new();
            set.color_for("x");
            let point = set.point_of("x").unwrap();
            assert!((0.0..1.0).contains(&point), "{point}");
        }
    }

    #[test]
    fn seeded_sets_agree() {
        let mut a = AllocationSet::with_rng(Palette::new(), StdRng::seed_from_u64(42));
        let mut b = AllocationSet::with_rng(Palette::new(), StdRng::seed_from_u64(42));
        for id in ["one", "two", "three", "four"] {
            assert_eq!(a.color_for(id), b.color_for(id));
        }
    }

    #[rstest]
    #[case(0.0, 0.5)]
    #[case(0.3, 0.8)]
    #[case(0.5, 1.0)]
    #[case(0.7, 0.2)]
    #[case(0.999, 0.499)]
    fn second_point_is_opposite_the_first(#[case] first: f64, #[case] expected: f64) {
        let mut set = starting_at(first);
        set.color_for("a");
        set.color_for("b");
        assert!((set.point_of("b").unwrap() - expected).abs() < EPSILON);
    }

    #[test]
    fn third_point_breaks_tie_towards_wraparound_gap() {
        let mut set = starting_at(0.0);
        let palette = Palette::new();

        assert_eq!(set.color_for("a"), palette.map_point(0.0));
        assert_eq!(set.color_for("b"), palette.map_point(0.5));
        assert_eq!(set.color_for("c"), palette.map_point(0.75));
        assert_eq!(set.point_of("c"), Some(0.75));

        // The only half-width gap left is [0, 0.5].
        set.color_for("d");
        assert_eq!(set.point_of("d"), Some(0.25));
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn non_finite_start_begins_at_zero(#[case] start: f64) {
        let mut set = starting_at(start);
        for id in ["a", "b", "c", "d"] {
            set.color_for(id);
        }
        let points: Vec<f64> = set.entries().iter().map(|entry| entry.point()).collect();
        assert_eq!(points, [0.0, 0.25, 0.5, 0.75]);
        assert_eq!(set.get("a"), Some(Palette::new().map_point(0.0)));
    }

    #[rstest]
    #[case(-3.0, 0.0)]
    #[case(7.5, 1.0)]
    fn out_of_range_start_is_clamped(#[case] start: f64, #[case] expected: f64) {
        let mut set = starting_at(start);
        set.color_for("a");
        assert_eq!(set.point_of("a"), Some(expected));
    }

    #[test]
    fn gaps_are_bisected_in_order() {
        let mut set = starting_at(0.125);
        set.color_for("a");
        set.color_for("b");
        assert_eq!(set.point_of("b"), Some(0.625));
        assert_eq!(
            set.largest_gap(),
            Some(Gap {
                start: 0.625,
                width: 0.5
            })
        );

        // Wraps past 1: 0.625 + 0.25.
        set.color_for("c");
        assert_eq!(set.point_of("c"), Some(0.875));
        assert_eq!(
            set.largest_gap(),
            Some(Gap {
                start: 0.125,
                width: 0.5
            })
        );

        set.color_for("d");
        assert_eq!(set.point_of("d"), Some(0.375));
    }

    #[test]
    fn midpoint_wraps_past_one() {
        let gap = Gap {
            start: 0.75,
            width: 0.75,
        };
        assert_eq!(gap.midpoint(), 0.125);
    }

    #[test]
    fn entries_stay_sorted_by_point() {
        let mut set = AllocationSet::with_rng(Palette::new(), StdRng::seed_from_u64(9));
        for n in 0..64 {
            set.color_for(&format!("id-{n}"));
            assert!(
                set.entries()
                    .windows(2)
                    .all(|pair| pair[0].point() <= pair[1].point())
            );
        }
        assert_eq!(set.len(), 64);
    }

    #[test]
    fn new_points_land_in_the_largest_gap() {
        let mut set = AllocationSet::with_rng(Palette::new(), StdRng::seed_from_u64(1234));
        set.color_for("seed-a");
        set.color_for("seed-b");

        for n in 0..50 {
            let gap = set.largest_gap().unwrap();
            assert!(
                set.entries()
                    .windows(2)
                    .all(|pair| pair[1].point() - pair[0].point() <= gap.width + EPSILON)
            );

            let id = format!("id-{n}");
            set.color_for(&id);
            let point = set.point_of(&id).unwrap();
            let offset = (point - gap.start).rem_euclid(1.0);
            assert!((offset - gap.width / 2.0).abs() < EPSILON, "{point} not mid {gap:?}");
        }
    }

    #[test]
    fn get_does_not_allocate() {
        let mut set = starting_at(0.2);
        assert_eq!(set.get("a"), None);
        assert!(set.is_empty());
        let color = set.color_for("a");
        assert_eq!(set.get("a"), Some(color));
        assert_eq!(set.entries()[0].id(), "a");
        assert_eq!(set.entries()[0].color(), color);
    }

    #[test]
    fn colors_come_from_the_owned_palette() {
        use crate::palette::DimRamp;

        let palette = Palette::new().with_dim_ramp(DimRamp::Wrapping);
        let mut set = AllocationSet::with_palette(palette.clone()).starting_at(0.42);
        assert_eq!(set.color_for("a"), palette.map_point(0.42));
        assert_eq!(set.palette().dim_ramp(), DimRamp::Wrapping);
    }
}
