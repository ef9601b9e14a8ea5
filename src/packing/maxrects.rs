use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::rect::{Rect, common_interval_length};
use crate::error::SheetError;

/// Rule used to choose among candidate free rectangles for a placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackingHeuristic {
    /// Best Short Side Fit - minimizes the shorter leftover side
    #[default]
    BestShortSideFit,
    /// Best Long Side Fit - minimizes the longer leftover side
    BestLongSideFit,
    /// Best Area Fit - picks the smallest free rectangle that fits
    BestAreaFit,
    /// Bottom Left - Tetris-style placement, lowest top edge wins
    BottomLeft,
    /// Contact Point - maximizes contact with placed rectangles and bin edges
    ContactPoint,
}

impl FromStr for PackingHeuristic {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best-short-side-fit" => Ok(PackingHeuristic::BestShortSideFit),
            "best-long-side-fit" => Ok(PackingHeuristic::BestLongSideFit),
            "best-area-fit" => Ok(PackingHeuristic::BestAreaFit),
            "bottom-left" => Ok(PackingHeuristic::BottomLeft),
            "contact-point" => Ok(PackingHeuristic::ContactPoint),
            _ => Err(SheetError::InvalidHeuristic(s.to_string())),
        }
    }
}

/// A scored placement candidate; lower scores are better.
struct Candidate {
    rect: Rect,
    score: (i64, i64),
}

/// MaxRects bin packer over a single fixed-size bin.
///
/// Owns a free-rectangle list and the list of placed `(id, rect)` pairs.
/// Every placement splits the overlapping free rectangles into remainder
/// slivers and prunes any free rectangle contained in another, so the
/// free and used lists together always cover the bin exactly.
pub struct MaxRectsPacker {
    bin_width: i32,
    bin_height: i32,
    allow_flip: bool,
    free_rects: Vec<Rect>,
    used_rects: Vec<(usize, Rect)>,
}

impl MaxRectsPacker {
    pub fn new(width: i32, height: i32, allow_flip: bool) -> Self {
        Self {
            bin_width: width,
            bin_height: height,
            allow_flip,
            free_rects: vec![Rect::new(0, 0, width, height)],
            used_rects: Vec::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.bin_width
    }

    pub fn height(&self) -> i32 {
        self.bin_height
    }

    /// Placements so far, in placement order
    pub fn used_rects(&self) -> &[(usize, Rect)] {
        &self.used_rects
    }

    /// Try to place a rectangle of the given size.
    ///
    /// Returns the placed rectangle, or `None` when nothing fits; a failed
    /// placement is a normal outcome and leaves the bin untouched. With
    /// flipping enabled the result may have width and height swapped.
    pub fn insert(
        &mut self,
        id: usize,
        width: i32,
        height: i32,
        heuristic: PackingHeuristic,
    ) -> Option<Rect> {
        let candidate = self.score_rect(width, height, heuristic)?;
        self.place_rect(id, candidate.rect);
        Some(candidate.rect)
    }

    /// Place a batch of `(id, rect)` items; only each item's extent is used.
    ///
    /// Not first-fit: each round scores every still-unplaced item against
    /// the current free list and commits only the single best-scoring one.
    /// Items that never fit are omitted from the result, so the caller must
    /// compare counts to detect an incomplete pack. Deterministic for
    /// identical items, heuristic, and bin size.
    pub fn insert_batch(
        &mut self,
        items: &[(usize, Rect)],
        heuristic: PackingHeuristic,
    ) -> Vec<(usize, Rect)> {
        let mut pending: Vec<(usize, Rect)> = items.to_vec();
        let mut placed = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let mut best: Option<(usize, Candidate)> = None;

            for (index, &(_, rect)) in pending.iter().enumerate() {
                let Some(candidate) = self.score_rect(rect.width, rect.height, heuristic) else {
                    continue;
                };
                if best
                    .as_ref()
                    .is_none_or(|(_, b)| candidate.score < b.score)
                {
                    best = Some((index, candidate));
                }
            }

            let Some((index, candidate)) = best else {
                break;
            };

            let (id, _) = pending.remove(index);
            self.place_rect(id, candidate.rect);
            placed.push((id, candidate.rect));
        }

        placed
    }

    /// Check if a rectangle of the given size could currently be placed
    pub fn can_fit(&self, width: i32, height: i32) -> bool {
        self.free_rects.iter().any(|free| {
            (width <= free.width && height <= free.height)
                || (self.allow_flip && height <= free.width && width <= free.height)
        })
    }

    /// Fraction of the bin covered by placed rectangles
    pub fn occupancy(&self) -> f64 {
        let total = i64::from(self.bin_width) * i64::from(self.bin_height);
        if total == 0 {
            return 0.0;
        }
        let used: i64 = self.used_rects.iter().map(|(_, rect)| rect.area()).sum();
        used as f64 / total as f64
    }

    fn score_rect(
        &self,
        width: i32,
        height: i32,
        heuristic: PackingHeuristic,
    ) -> Option<Candidate> {
        let orientations = [(width, height), (height, width)];
        let orientations = if self.allow_flip {
            &orientations[..]
        } else {
            &orientations[..1]
        };

        let mut best: Option<Candidate> = None;
        for free in &self.free_rects {
            for &(w, h) in orientations {
                if w <= free.width && h <= free.height {
                    let score = self.score_placement(free, w, h, heuristic);
                    if best.as_ref().is_none_or(|b| score < b.score) {
                        best = Some(Candidate {
                            rect: Rect::new(free.x, free.y, w, h),
                            score,
                        });
                    }
                }
            }
        }
        best
    }

    fn score_placement(
        &self,
        free: &Rect,
        width: i32,
        height: i32,
        heuristic: PackingHeuristic,
    ) -> (i64, i64) {
        let leftover_h = i64::from(free.width - width);
        let leftover_v = i64::from(free.height - height);

        match heuristic {
            PackingHeuristic::BestShortSideFit => {
                (leftover_h.min(leftover_v), leftover_h.max(leftover_v))
            }
            PackingHeuristic::BestLongSideFit => {
                (leftover_h.max(leftover_v), leftover_h.min(leftover_v))
            }
            PackingHeuristic::BestAreaFit => {
                let leftover_area = free.area() - i64::from(width) * i64::from(height);
                (leftover_area, leftover_h.min(leftover_v))
            }
            PackingHeuristic::BottomLeft => (i64::from(free.y + height), i64::from(free.x)),
            // Bigger contact is better; negated so the shared minimizing
            // comparison applies. No secondary criterion.
            PackingHeuristic::ContactPoint => (
                -i64::from(self.contact_point_score(free.x, free.y, width, height)),
                0,
            ),
        }
    }

    /// Total edge length the placement would share with the bin border and
    /// already placed rectangles.
    fn contact_point_score(&self, x: i32, y: i32, width: i32, height: i32) -> i32 {
        let mut score = 0;

        if x == 0 || x + width == self.bin_width {
            score += height;
        }
        if y == 0 || y + height == self.bin_height {
            score += width;
        }

        for (_, used) in &self.used_rects {
            if used.x == x + width || used.right() == x {
                score += common_interval_length(used.y, used.bottom(), y, y + height);
            }
            if used.y == y + height || used.bottom() == y {
                score += common_interval_length(used.x, used.right(), x, x + width);
            }
        }

        score
    }

    fn place_rect(&mut self, id: usize, rect: Rect) {
        let mut new_rects = Vec::new();

        self.free_rects.retain(|free_rect| {
            if !rect.intersects(free_rect) {
                return true;
            }

            // Split the free rectangle around the placed rectangle
            // Left portion
            if rect.x > free_rect.x {
                new_rects.push(Rect::new(
                    free_rect.x,
                    free_rect.y,
                    rect.x - free_rect.x,
                    free_rect.height,
                ));
            }

            // Right portion
            if rect.right() < free_rect.right() {
                new_rects.push(Rect::new(
                    rect.right(),
                    free_rect.y,
                    free_rect.right() - rect.right(),
                    free_rect.height,
                ));
            }

            // Top portion
            if rect.y > free_rect.y {
                new_rects.push(Rect::new(
                    free_rect.x,
                    free_rect.y,
                    free_rect.width,
                    rect.y - free_rect.y,
                ));
            }

            // Bottom portion
            if rect.bottom() < free_rect.bottom() {
                new_rects.push(Rect::new(
                    free_rect.x,
                    rect.bottom(),
                    free_rect.width,
                    free_rect.bottom() - rect.bottom(),
                ));
            }

            false
        });

        self.free_rects.extend(new_rects);
        self.prune_free_rects();
        self.used_rects.push((id, rect));
    }

    fn prune_free_rects(&mut self) {
        // Remove rectangles that are fully contained within others.
        // Indices are re-adjusted explicitly after every removal so no
        // pair is skipped.
        let mut i = 0;
        while i < self.free_rects.len() {
            let mut j = i + 1;
            while j < self.free_rects.len() {
                if self.free_rects[i].contains(&self.free_rects[j]) {
                    self.free_rects.swap_remove(j);
                } else if self.free_rects[j].contains(&self.free_rects[i]) {
                    self.free_rects.swap_remove(i);
                    j = i + 1;
                    continue;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rasterize the bin and check that free and used rectangles together
    /// cover it exactly: every cell belongs to a free or used rectangle,
    /// no cell to both, and used rectangles never overlap each other.
    fn assert_exact_coverage(packer: &MaxRectsPacker) {
        let width = usize::try_from(packer.bin_width).unwrap();
        let height = usize::try_from(packer.bin_height).unwrap();
        let mut grid = vec![0u8; width * height];

        for (_, rect) in &packer.used_rects {
            for y in rect.y..rect.bottom() {
                for x in rect.x..rect.right() {
                    let cell = &mut grid[usize::try_from(y).unwrap() * width
                        + usize::try_from(x).unwrap()];
                    assert_eq!(*cell, 0, "used rectangles overlap at ({x}, {y})");
                    *cell = 1;
                }
            }
        }

        for rect in &packer.free_rects {
            for y in rect.y..rect.bottom() {
                for x in rect.x..rect.right() {
                    let cell = &mut grid[usize::try_from(y).unwrap() * width
                        + usize::try_from(x).unwrap()];
                    assert_ne!(*cell, 1, "free rectangle overlaps a used one at ({x}, {y})");
                    *cell = 2;
                }
            }
        }

        assert!(
            grid.iter().all(|&cell| cell != 0),
            "part of the bin is neither free nor used"
        );
    }

    fn assert_pruned(packer: &MaxRectsPacker) {
        for (i, a) in packer.free_rects.iter().enumerate() {
            for (j, b) in packer.free_rects.iter().enumerate() {
                if i != j {
                    assert!(!a.contains(b), "free rectangle {b:?} is contained in {a:?}");
                }
            }
        }
    }

    #[test]
    fn test_single_insert() {
        let mut packer = MaxRectsPacker::new(100, 100, false);
        let rect = packer
            .insert(0, 50, 50, PackingHeuristic::BestShortSideFit)
            .unwrap();

        assert_eq!(rect, Rect::new(0, 0, 50, 50));
        assert_eq!(packer.used_rects().len(), 1);
    }

    #[test]
    fn test_multiple_inserts_disjoint() {
        let mut packer = MaxRectsPacker::new(100, 100, false);

        for id in 0..4 {
            packer
                .insert(id, 50, 50, PackingHeuristic::BestShortSideFit)
                .unwrap();
        }

        let rects: Vec<Rect> = packer.used_rects().iter().map(|&(_, r)| r).collect();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn test_too_large() {
        let mut packer = MaxRectsPacker::new(100, 100, false);
        let result = packer.insert(0, 150, 50, PackingHeuristic::BestShortSideFit);
        assert!(result.is_none());
        // A failed placement leaves the bin untouched
        assert!(packer.used_rects().is_empty());
        assert_eq!(packer.free_rects.len(), 1);
    }

    #[test]
    fn test_can_fit() {
        let mut packer = MaxRectsPacker::new(100, 100, false);
        assert!(packer.can_fit(50, 50));
        assert!(packer.can_fit(100, 100));
        assert!(!packer.can_fit(101, 100));

        packer
            .insert(0, 100, 100, PackingHeuristic::BestShortSideFit)
            .unwrap();
        assert!(!packer.can_fit(1, 1));
    }

    #[test]
    fn test_coverage_invariant_after_every_placement() {
        let mut packer = MaxRectsPacker::new(64, 64, false);
        let sizes = [(32, 20), (64, 3), (12, 40), (20, 20), (7, 9), (5, 5)];

        for (id, &(w, h)) in sizes.iter().enumerate() {
            packer
                .insert(id, w, h, PackingHeuristic::BestAreaFit)
                .unwrap();
            assert_exact_coverage(&packer);
            assert_pruned(&packer);
        }
    }

    #[test]
    fn test_bottom_left_gravity() {
        let mut packer = MaxRectsPacker::new(100, 100, false);

        let first = packer.insert(0, 10, 10, PackingHeuristic::BottomLeft).unwrap();
        let second = packer.insert(1, 10, 10, PackingHeuristic::BottomLeft).unwrap();

        // Both land on the bottom row; ties on top edge break on smaller x
        assert_eq!(first, Rect::new(0, 0, 10, 10));
        assert_eq!(second, Rect::new(10, 0, 10, 10));
    }

    #[test]
    fn test_contact_point_prefers_touching() {
        let mut packer = MaxRectsPacker::new(100, 100, false);
        packer
            .insert(0, 10, 10, PackingHeuristic::ContactPoint)
            .unwrap();

        // A placement flush against the first rectangle scores strictly
        // higher than the same rectangle with a one-pixel gap
        let touching = packer.contact_point_score(10, 0, 10, 10);
        let gapped = packer.contact_point_score(21, 0, 10, 10);
        assert!(touching > gapped, "touching {touching} <= gapped {gapped}");
    }

    #[test]
    fn test_flip_placement() {
        let mut no_flip = MaxRectsPacker::new(100, 10, false);
        assert!(
            no_flip
                .insert(0, 5, 60, PackingHeuristic::BestShortSideFit)
                .is_none()
        );

        let mut packer = MaxRectsPacker::new(100, 10, true);
        let rect = packer
            .insert(0, 5, 60, PackingHeuristic::BestShortSideFit)
            .unwrap();
        assert_eq!((rect.width, rect.height), (60, 5));
    }

    #[test]
    fn test_batch_insert_places_globally_best_first() {
        // One 20x5 item has a lower resulting top edge than the 10x10
        // items, so it must be committed first regardless of input order.
        let items = [
            (0, Rect::new(0, 0, 10, 10)),
            (1, Rect::new(0, 0, 10, 10)),
            (2, Rect::new(0, 0, 20, 5)),
        ];

        let mut packer = MaxRectsPacker::new(32, 32, false);
        let placed = packer.insert_batch(&items, PackingHeuristic::BottomLeft);

        assert_eq!(placed.len(), 3);
        assert_eq!(placed[0].0, 2);

        let rects: Vec<Rect> = placed.iter().map(|&(_, r)| r).collect();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.intersects(b));
            }
        }

        let used_area: i64 = rects.iter().map(Rect::area).sum();
        assert_eq!(used_area, 300);
        assert_exact_coverage(&packer);
    }

    #[test]
    fn test_batch_insert_omits_unplaceable_items() {
        let items = [
            (0, Rect::new(0, 0, 8, 8)),
            (1, Rect::new(0, 0, 8, 8)),
            (2, Rect::new(0, 0, 8, 8)),
        ];

        let mut packer = MaxRectsPacker::new(10, 10, false);
        let placed = packer.insert_batch(&items, PackingHeuristic::BestShortSideFit);

        assert_eq!(placed.len(), 1);
        assert_exact_coverage(&packer);
    }

    #[test]
    fn test_batch_insert_deterministic() {
        let items: Vec<(usize, Rect)> = [(30, 20), (25, 15), (40, 10), (15, 35), (20, 20)]
            .iter()
            .enumerate()
            .map(|(id, &(w, h))| (id, Rect::new(0, 0, w, h)))
            .collect();

        let mut first = MaxRectsPacker::new(128, 128, false);
        let mut second = MaxRectsPacker::new(128, 128, false);

        let a = first.insert_batch(&items, PackingHeuristic::BestAreaFit);
        let b = second.insert_batch(&items, PackingHeuristic::BestAreaFit);
        assert_eq!(a, b);
    }

    #[test]
    fn test_occupancy() {
        let mut packer = MaxRectsPacker::new(100, 100, false);
        assert_eq!(packer.occupancy(), 0.0);

        for id in 0..4 {
            packer
                .insert(id, 50, 50, PackingHeuristic::BestShortSideFit)
                .unwrap();
        }
        assert!((packer.occupancy() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_heuristic_from_str() {
        assert_eq!(
            "bottom-left".parse::<PackingHeuristic>().unwrap(),
            PackingHeuristic::BottomLeft
        );
        assert_eq!(
            "contact-point".parse::<PackingHeuristic>().unwrap(),
            PackingHeuristic::ContactPoint
        );
        assert!(matches!(
            "diagonal".parse::<PackingHeuristic>(),
            Err(SheetError::InvalidHeuristic(_))
        ));
    }
}
