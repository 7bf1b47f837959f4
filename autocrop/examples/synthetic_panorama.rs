//! Example: crop a synthetic panorama of rotated, overlapping images
//!
//! Builds five 400x300 images placed along a slightly wavy row, then prints
//! the inside crop, the intersection crop of two exposure brackets and the
//! outside crop.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --example synthetic_panorama
//! ```

use std::time::Instant;

use anyhow::Context;
use autocrop::{
    AspectRatio, Canvas, CropConfig, CropFinder, ProjectedFootprint, SearchStage,
    stacks_from_groups,
};
use common::log_setup::{LogConfig, setup_logging};
use glam::{DMat3, DVec2};

const IMAGE_WIDTH: usize = 400;
const IMAGE_HEIGHT: usize = 300;

fn main() -> anyhow::Result<()> {
    setup_logging(&LogConfig::with_level("info"));

    let canvas = Canvas::new(1700, 420);
    let footprints = build_row(canvas)?;
    println!(
        "Canvas {}x{} with {} images",
        canvas.width,
        canvas.height,
        footprints.len()
    );

    let start = Instant::now();
    let report = CropFinder::new(canvas, &footprints)
        .with_config(CropConfig::inside())
        .with_progress(|progress| {
            if progress.stage == SearchStage::Searching {
                println!(
                    "  {} candidates, best {} <= optimum <= {}",
                    progress.processed, progress.best_area, progress.bound_area
                );
            }
        })
        .run()?;
    println!("Inside crop: {} ({:?})", report.outcome, start.elapsed());
    println!(
        "  {} candidates{}, {} pixels evaluated",
        report.stats.candidates_processed,
        if report.stats.swept { " then a full sweep" } else { "" },
        report.stats.pixels_evaluated
    );

    if let Some(rect) = report.outcome.rect() {
        let ratio: AspectRatio = "16:9".parse()?;
        println!("  16:9 within crop: {}", rect.fit_aspect(ratio));
    }

    // Images 0, 2, 4 and 1, 3 as two brackets. Both must cover each pixel.
    let stacks = stacks_from_groups(&[0, 1, 0, 1, 0]);
    let hdr = CropFinder::new(canvas, &footprints)
        .with_config(CropConfig::intersection())
        .with_stacks(stacks)
        .run()?;
    println!("Intersection crop: {}", hdr.outcome);

    let outside = CropFinder::new(canvas, &footprints)
        .with_config(CropConfig::outside())
        .run()?;
    println!("Outside crop: {}", outside.outcome);

    Ok(())
}

fn build_row(canvas: Canvas) -> anyhow::Result<Vec<ProjectedFootprint>> {
    let step = 300.0;
    (0..5)
        .map(|i| {
            let angle = (i as f64 * 0.9).sin() * 0.05;
            let centre = DVec2::new(
                250.0 + i as f64 * step,
                canvas.height as f64 / 2.0 + (i as f64 * 1.3).cos() * 12.0,
            );
            let to_canvas = DMat3::from_translation(centre)
                * DMat3::from_angle(angle)
                * DMat3::from_translation(DVec2::new(
                    -(IMAGE_WIDTH as f64) / 2.0,
                    -(IMAGE_HEIGHT as f64) / 2.0,
                ));
            ProjectedFootprint::from_source_to_canvas(to_canvas, IMAGE_WIDTH, IMAGE_HEIGHT)
                .with_context(|| format!("image {i} has a singular placement"))
        })
        .collect()
}
