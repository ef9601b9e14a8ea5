use std::collections::HashMap;

use anyhow::Result;
use image::{RgbaImage, imageops};
use log::{debug, info};

use super::Atlas;
use crate::config::PackConfig;
use crate::error::SheetError;
use crate::packing::{MaxRectsPacker, PackingHeuristic, Rect, starting_size};
use crate::sprite::{SourceSprite, SpriteRecord, trim_rect};

/// Builds one atlas per call: trim, pad, pack, blit, emit metadata.
pub struct AtlasBuilder {
    config: PackConfig,
}

impl AtlasBuilder {
    pub fn new(config: PackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Build an atlas from the given sprites.
    ///
    /// Emission is all-or-nothing: every sprite is placed or the build
    /// fails. Identical sprites and configuration always produce an
    /// identical atlas.
    pub fn build(&self, sprites: &[SourceSprite]) -> Result<Atlas> {
        if sprites.is_empty() {
            return Err(SheetError::NoSprites.into());
        }

        let padding = i32::try_from(self.config.padding).unwrap_or(i32::MAX);

        let mut names = HashMap::with_capacity(sprites.len());
        let mut records = Vec::with_capacity(sprites.len());
        for (index, sprite) in sprites.iter().enumerate() {
            if names.insert(sprite.name.clone(), index).is_some() {
                return Err(SheetError::DuplicateName(sprite.name.clone()).into());
            }

            let source = sprite.bounds();
            let (trimmed, origin) = trim_rect(&sprite.image, source, self.config.key());
            records.push(SpriteRecord {
                name: sprite.name.clone(),
                source,
                trimmed,
                origin,
                dest: Rect::EMPTY,
            });
        }

        let padded: Vec<Rect> = records
            .iter()
            .map(|record| record.trimmed.inflate(padding))
            .collect();

        // A sprite larger than the bin maxima can never pack
        for (record, rect) in records.iter().zip(&padded) {
            if rect.width > self.config.max_width_px() || rect.height > self.config.max_height_px()
            {
                return Err(SheetError::SpriteTooLarge {
                    name: record.name.clone(),
                    width: rect.width,
                    height: rect.height,
                    max_width: self.config.max_width,
                    max_height: self.config.max_height,
                }
                .into());
            }
        }

        let placed = self.pack(&padded)?;

        // Keep the authored layout when packing did not pay off: it wins
        // only when its bounding box is tighter than the packed one while
        // still exceeding its own element-area sum.
        let packed_union = bounding_box(&placed).area();
        let input_union = bounding_box(&padded).area();
        let input_sum: i64 = padded.iter().map(Rect::area).sum();
        let keep_authored = input_union < packed_union && input_union > input_sum;
        if keep_authored {
            debug!(
                "authored layout ({input_union}px) beats packed layout ({packed_union}px), keeping it"
            );
        }

        let rotated: Vec<bool> = if keep_authored {
            vec![false; padded.len()]
        } else {
            placed
                .iter()
                .zip(&padded)
                .map(|(dest, item)| dest.width != item.width)
                .collect()
        };
        let destinations = if keep_authored { padded } else { placed };

        for (record, rect) in records.iter_mut().zip(&destinations) {
            record.dest = rect.deflate(padding);
        }

        let image = blit(sprites, &records, &rotated)?;

        let sources: Vec<Rect> = records.iter().map(|record| record.dest).collect();
        let origins = records.iter().map(|record| record.origin).collect();

        let sprite_area: i64 = sources.iter().map(Rect::area).sum();
        let bounds_area = bounding_box(&sources).area();
        let fill_rate = if bounds_area == 0 {
            0.0
        } else {
            sprite_area as f64 / bounds_area as f64
        };

        info!(
            "atlas {}x{} with {} sprites, fill rate {:.1}%",
            image.width(),
            image.height(),
            records.len(),
            fill_rate * 100.0
        );

        Ok(Atlas {
            image,
            names,
            sources,
            origins,
            rotated,
            fill_rate,
        })
    }

    /// Pack the padded rectangles, growing the bin until everything fits.
    ///
    /// The packer itself never retries; growth is decided here, doubling
    /// the smaller dimension up to the configured maxima. Returns the
    /// placements indexed by input order.
    fn pack(&self, padded: &[Rect]) -> Result<Vec<Rect>> {
        let mut items: Vec<(usize, Rect)> = padded.iter().copied().enumerate().collect();
        items.sort_by_key(|&(_, rect)| rect.width.max(rect.height));

        let (mut width, mut height) = starting_size(padded, &self.config);
        loop {
            let mut packer = MaxRectsPacker::new(width, height, self.config.allow_flip);
            let placed = packer.insert_batch(&items, PackingHeuristic::BottomLeft);
            debug!(
                "packed {}/{} into {width}x{height} ({:.1}% occupied)",
                placed.len(),
                items.len(),
                packer.occupancy() * 100.0
            );

            if placed.len() == items.len() {
                let mut destinations = vec![Rect::EMPTY; padded.len()];
                for (id, rect) in placed {
                    destinations[id] = rect;
                }
                return Ok(destinations);
            }

            let can_grow_w = width < self.config.max_width_px();
            let can_grow_h = height < self.config.max_height_px();
            if !can_grow_w && !can_grow_h {
                return Err(SheetError::PackingIncomplete {
                    placed: placed.len(),
                    total: items.len(),
                    width,
                    height,
                }
                .into());
            }
            if can_grow_w && (width <= height || !can_grow_h) {
                width = width.saturating_mul(2).min(self.config.max_width_px());
            } else {
                height = height.saturating_mul(2).min(self.config.max_height_px());
            }
        }
    }
}

/// Copy every sprite's trimmed pixels to its destination, verbatim.
#[expect(
    clippy::cast_sign_loss,
    reason = "trimmed and destination bounds are non-negative"
)]
fn blit(sprites: &[SourceSprite], records: &[SpriteRecord], rotated: &[bool]) -> Result<RgbaImage> {
    if records.len() != sprites.len() || rotated.len() != sprites.len() {
        return Err(SheetError::LengthMismatch {
            sources: sprites.len(),
            destinations: records.len(),
        }
        .into());
    }

    let width = records.iter().map(|r| r.dest.right()).max().unwrap_or(0);
    let height = records.iter().map(|r| r.dest.bottom()).max().unwrap_or(0);
    let mut bitmap = RgbaImage::new(width.max(0) as u32, height.max(0) as u32);

    for ((sprite, record), &flipped) in sprites.iter().zip(records).zip(rotated) {
        let trimmed = record.trimmed;
        let tile = imageops::crop_imm(
            &sprite.image,
            trimmed.x as u32,
            trimmed.y as u32,
            trimmed.width as u32,
            trimmed.height as u32,
        )
        .to_image();

        let x = i64::from(record.dest.x);
        let y = i64::from(record.dest.y);
        if flipped {
            imageops::replace(&mut bitmap, &imageops::rotate90(&tile), x, y);
        } else {
            imageops::replace(&mut bitmap, &tile, x, y);
        }
    }

    Ok(bitmap)
}

fn bounding_box(rects: &[Rect]) -> Rect {
    let mut iter = rects.iter();
    let Some(&first) = iter.next() else {
        return Rect::EMPTY;
    };
    iter.fold(first, |acc, rect| acc.union(rect))
}
