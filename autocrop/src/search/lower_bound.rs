//! Quick covered rectangle used as the search floor.

use common::CancelToken;

use super::Candidate;
use crate::coverage::CoverageSampler;
use crate::footprint::Footprint;
use crate::rect::CropRect;

/// Width to height ratios tried from every seed pixel, `2^(k/2)` for
/// `k = -4..=4`.
const ASPECT_RATIOS: [f64; 9] = [
    0.25,
    std::f64::consts::FRAC_1_SQRT_2 / 2.0,
    0.5,
    std::f64::consts::FRAC_1_SQRT_2,
    1.0,
    std::f64::consts::SQRT_2,
    2.0,
    2.0 * std::f64::consts::SQRT_2,
    4.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Top,
    Right,
    Bottom,
}

impl Side {
    const HORIZONTAL: [Side; 2] = [Side::Left, Side::Right];
    const VERTICAL: [Side; 2] = [Side::Top, Side::Bottom];
}

/// Some fully covered rectangle inside `within`, found greedily.
///
/// Seeds sit in the middle of the longest covered run of the rows at a
/// quarter, half and three quarters of the height. From each seed a
/// rectangle grows one pixel at a time toward each aspect ratio in turn.
/// The largest one wins. `None` if those rows hold no covered pixel or the
/// search was cancelled.
pub(super) fn covered_lower_bound<F: Footprint>(
    sampler: &mut CoverageSampler<'_, F>,
    within: CropRect,
    cancel: &CancelToken,
) -> Option<CropRect> {
    if within.is_empty() {
        return None;
    }

    let mut seeds: Vec<(usize, usize)> = Vec::with_capacity(3);
    for quarter in 1..=3 {
        let y = within.top + within.height() * quarter / 4;
        let Some((start, end)) = sampler.longest_covered_run_in_row(y, within.left, within.right)
        else {
            continue;
        };
        let seed = ((start + end - 1) / 2, y);
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }

    let mut best: Option<Candidate> = None;
    for &(x, y) in &seeds {
        for ratio in ASPECT_RATIOS {
            if cancel.is_cancelled() {
                return None;
            }
            let grown = Candidate::new(grow(sampler, within, x, y, ratio));
            if best.is_none_or(|best| grown > best) {
                best = Some(grown);
            }
        }
    }
    best.map(|candidate| candidate.rect)
}

/// Grows the covered pixel (x, y) into a covered rectangle whose width to
/// height ratio tracks `ratio` until no side can move.
fn grow<F: Footprint>(
    sampler: &mut CoverageSampler<'_, F>,
    within: CropRect,
    x: usize,
    y: usize,
    ratio: f64,
) -> CropRect {
    let mut rect = CropRect::new(x, y, x + 1, y + 1);
    let mut blocked = [false; 4];
    // Alternates the side tried first on each axis.
    let mut turns = [0usize; 2];

    loop {
        let too_narrow = (rect.width() as f64) < ratio * rect.height() as f64;
        let axes = if too_narrow { [0, 1] } else { [1, 0] };

        let next = axes.into_iter().find_map(|axis| {
            let pair = if axis == 0 { Side::HORIZONTAL } else { Side::VERTICAL };
            let first = turns[axis] % 2;
            [pair[first], pair[1 - first]]
                .into_iter()
                .find(|&side| !blocked[side as usize])
                .map(|side| (axis, side))
        });
        let Some((axis, side)) = next else {
            return rect;
        };

        turns[axis] += 1;
        match extend(sampler, within, rect, side) {
            Some(extended) => rect = extended,
            None => blocked[side as usize] = true,
        }
    }
}

/// `rect` moved out by one pixel on `side`, if that stays inside `within`
/// and the new strip is fully covered.
fn extend<F: Footprint>(
    sampler: &mut CoverageSampler<'_, F>,
    within: CropRect,
    rect: CropRect,
    side: Side,
) -> Option<CropRect> {
    let CropRect {
        left,
        top,
        right,
        bottom,
    } = rect;
    match side {
        Side::Left if left > within.left => sampler
            .first_uncovered_in_column(left - 1, top, bottom)
            .is_none()
            .then(|| CropRect::new(left - 1, top, right, bottom)),
        Side::Right if right < within.right => sampler
            .first_uncovered_in_column(right, top, bottom)
            .is_none()
            .then(|| CropRect::new(left, top, right + 1, bottom)),
        Side::Top if top > within.top => sampler
            .first_uncovered_in_row(top - 1, left, right)
            .is_none()
            .then(|| CropRect::new(left, top - 1, right, bottom)),
        Side::Bottom if bottom < within.bottom => sampler
            .first_uncovered_in_row(bottom, left, right)
            .is_none()
            .then(|| CropRect::new(left, top, right, bottom + 1)),
        _ => None,
    }
}
