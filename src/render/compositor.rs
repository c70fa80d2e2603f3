use std::collections::{HashMap, VecDeque};

use crate::{
    assets::store::{Frame, FrameStore},
    foundation::{
        core::{Affine, FrameIndex, Rect, Vec2, Viewport},
        error::{ScrollSeqError, ScrollSeqResult},
        math::clamp01,
    },
};

/// Most recently drawn frames whose paints stay cached.
pub const PAINT_CACHE_CAPACITY: usize = 16;

/// Frame shown at `progress`: `ceil(p * n) - 1`, with `p` clamped to `[0, 1]` and the result
/// clamped to `[0, n - 1]`. `None` only for an empty sequence.
pub fn frame_index_for_progress(progress: f64, frame_count: u32) -> Option<FrameIndex> {
    if frame_count == 0 {
        return None;
    }
    let p = clamp01(progress);
    let raw = (p * f64::from(frame_count)).ceil() as i64 - 1;
    Some(FrameIndex(raw.clamp(0, i64::from(frame_count) - 1) as u32))
}

/// Destination rectangle of a frame scaled to cover the surface without distortion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    pub fn scale(&self, frame_width: u32) -> f64 {
        self.width / f64::from(frame_width)
    }

    pub fn to_affine(self, frame_width: u32, frame_height: u32) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y))
            * Affine::scale_non_uniform(
                self.width / f64::from(frame_width),
                self.height / f64::from(frame_height),
            )
    }
}

/// Cover fit: a surface wider than the frame fills its width and centers vertically;
/// otherwise the frame fills the height and centers horizontally.
pub fn cover_fit(frame_w: u32, frame_h: u32, surface_w: u32, surface_h: u32) -> Placement {
    let (fw, fh) = (f64::from(frame_w), f64::from(frame_h));
    let (sw, sh) = (f64::from(surface_w), f64::from(surface_h));
    let frame_aspect = fw / fh;
    let surface_aspect = sw / sh;

    if surface_aspect > frame_aspect {
        let height = sw / frame_aspect;
        Placement {
            x: 0.0,
            y: (sh - height) / 2.0,
            width: sw,
            height,
        }
    } else {
        let width = sh * frame_aspect;
        Placement {
            x: (sw - width) / 2.0,
            y: 0.0,
            width,
            height: sh,
        }
    }
}

/// Result of asking the compositor to show a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawOutcome {
    /// The surface was cleared and this frame drawn.
    Drawn(FrameIndex),
    /// The requested frame is already on the surface.
    Unchanged(FrameIndex),
    /// The requested frame is missing; the surface keeps whatever it showed.
    Held {
        requested: FrameIndex,
        showing: Option<FrameIndex>,
    },
    /// Nothing to draw (empty sequence).
    Empty,
}

/// Owns one full-viewport drawing surface and draws selected frames onto it.
pub struct FrameCompositor {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    paint_cache: HashMap<FrameIndex, vello_cpu::Image>,
    lru: VecDeque<FrameIndex>,
    last_drawn: Option<FrameIndex>,
}

impl std::fmt::Debug for FrameCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCompositor")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("cached_paints", &self.paint_cache.len())
            .field("last_drawn", &self.last_drawn)
            .finish()
    }
}

impl FrameCompositor {
    pub fn new(viewport: Viewport) -> ScrollSeqResult<Self> {
        let (width, height) = surface_dims(viewport)?;
        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
            paint_cache: HashMap::new(),
            lru: VecDeque::new(),
            last_drawn: None,
        })
    }

    /// Match the surface to a new viewport. Like a canvas resize, this clears it.
    pub fn resize(&mut self, viewport: Viewport) -> ScrollSeqResult<()> {
        let (width, height) = surface_dims(viewport)?;
        if width == self.width && height == self.height {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        self.pixmap = vello_cpu::Pixmap::new(width, height);
        self.last_drawn = None;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    pub fn cached_paints(&self) -> usize {
        self.paint_cache.len()
    }

    pub fn last_drawn(&self) -> Option<FrameIndex> {
        self.last_drawn
    }

    pub fn pixmap(&self) -> &vello_cpu::Pixmap {
        &self.pixmap
    }

    /// Surface bytes, row-major premultiplied RGBA8.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Show the frame selected by `progress`.
    pub fn draw_progress(
        &mut self,
        store: &FrameStore,
        progress: f64,
        frame_count: u32,
    ) -> ScrollSeqResult<DrawOutcome> {
        match frame_index_for_progress(progress, frame_count) {
            Some(index) => self.draw_index(store, index),
            None => Ok(DrawOutcome::Empty),
        }
    }

    /// Show frame `index` from `store`, holding the previous frame if it is missing.
    pub fn draw_index(
        &mut self,
        store: &FrameStore,
        index: FrameIndex,
    ) -> ScrollSeqResult<DrawOutcome> {
        if self.last_drawn == Some(index) {
            return Ok(DrawOutcome::Unchanged(index));
        }
        let Some(frame) = store.frame(index) else {
            tracing::trace!(index = index.0, "missing frame; holding previous");
            return Ok(DrawOutcome::Held {
                requested: index,
                showing: self.last_drawn,
            });
        };
        if let Err(e) = self.draw(index, frame) {
            tracing::warn!(index = index.0, error = %e, "frame not drawable; holding previous");
            return Ok(DrawOutcome::Held {
                requested: index,
                showing: self.last_drawn,
            });
        }
        Ok(DrawOutcome::Drawn(index))
    }

    /// Clear the surface and draw `frame` cover-fitted.
    pub fn draw(&mut self, index: FrameIndex, frame: &Frame) -> ScrollSeqResult<()> {
        let paint = self.paint_for(index, frame)?;
        let placement = cover_fit(frame.width, frame.height, self.width(), self.height());

        clear_pixmap(&mut self.pixmap, [0, 0, 0, 0]);
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(
            placement.to_affine(frame.width, frame.height),
        ));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(frame.width),
            f64::from(frame.height),
        ));
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);

        self.last_drawn = Some(index);
        Ok(())
    }

    /// Where `frame` lands on the current surface.
    pub fn placement_of(&self, frame: &Frame) -> Rect {
        let p = cover_fit(frame.width, frame.height, self.width(), self.height());
        Rect::new(p.x, p.y, p.x + p.width, p.y + p.height)
    }

    /// Forget cached paints, e.g. when the store is discarded.
    pub fn release(&mut self) {
        self.paint_cache.clear();
        self.lru.clear();
        self.last_drawn = None;
        clear_pixmap(&mut self.pixmap, [0, 0, 0, 0]);
    }

    fn paint_for(&mut self, index: FrameIndex, frame: &Frame) -> ScrollSeqResult<vello_cpu::Image> {
        if let Some(paint) = self.paint_cache.get(&index).cloned() {
            self.touch(index);
            return Ok(paint);
        }
        let pixmap = frame_to_pixmap(frame)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.paint_cache.insert(index, paint.clone());
        self.touch(index);
        while self.lru.len() > PAINT_CACHE_CAPACITY {
            if let Some(old) = self.lru.pop_front() {
                self.paint_cache.remove(&old);
            }
        }
        Ok(paint)
    }

    fn touch(&mut self, index: FrameIndex) {
        if let Some(pos) = self.lru.iter().position(|i| *i == index) {
            self.lru.remove(pos);
        }
        self.lru.push_back(index);
    }
}

fn surface_dims(viewport: Viewport) -> ScrollSeqResult<(u16, u16)> {
    let w: u16 = viewport
        .width
        .try_into()
        .map_err(|_| ScrollSeqError::render("surface width exceeds u16"))?;
    let h: u16 = viewport
        .height
        .try_into()
        .map_err(|_| ScrollSeqError::render("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(ScrollSeqError::render("surface must be non-empty"));
    }
    Ok((w, h))
}

pub(crate) fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn frame_to_pixmap(frame: &Frame) -> ScrollSeqResult<vello_cpu::Pixmap> {
    let w: u16 = frame
        .width
        .try_into()
        .map_err(|_| ScrollSeqError::render("frame width exceeds u16"))?;
    let h: u16 = frame
        .height
        .try_into()
        .map_err(|_| ScrollSeqError::render("frame height exceeds u16"))?;
    if frame.rgba8_premul.len() != frame.width as usize * frame.height as usize * 4 {
        return Err(ScrollSeqError::render("frame byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(frame.width as usize * frame.height as usize);
    for px in frame.rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
