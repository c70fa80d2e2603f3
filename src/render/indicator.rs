use crate::{
    foundation::{
        core::{Rgba8Premul, Viewport},
        error::{ScrollSeqError, ScrollSeqResult},
    },
    preload::orchestrator::LoadProgress,
    render::compositor::clear_pixmap,
};

const BACKGROUND: Rgba8Premul = Rgba8Premul {
    r: 0,
    g: 0,
    b: 0,
    a: 255,
};
const TRACK: Rgba8Premul = Rgba8Premul {
    r: 0x37,
    g: 0x41,
    b: 0x51,
    a: 255,
};
const FILL: Rgba8Premul = Rgba8Premul {
    r: 0x22,
    g: 0xc5,
    b: 0x5e,
    a: 255,
};

/// What the loading screen shows for a given progress.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct IndicatorView {
    pub percent: u8,
    pub label: String,
}

impl IndicatorView {
    pub fn from_progress(progress: &LoadProgress) -> Self {
        Self {
            percent: progress.percent,
            label: format!("Loading... {}%", progress.percent),
        }
    }

    /// Bar geometry `(track, fill)` as `(x0, y0, x1, y1)` for `viewport`.
    pub fn bar_rects(&self, viewport: Viewport) -> ([f64; 4], [f64; 4]) {
        let w = f64::from(viewport.width);
        let h = f64::from(viewport.height);
        let bar_w = (w * 0.4).max(1.0);
        let bar_h = (h * 0.01).clamp(2.0, 8.0);
        let x0 = (w - bar_w) / 2.0;
        let y0 = (h - bar_h) / 2.0;
        let fill_w = bar_w * f64::from(self.percent.min(100)) / 100.0;
        (
            [x0, y0, x0 + bar_w, y0 + bar_h],
            [x0, y0, x0 + fill_w, y0 + bar_h],
        )
    }

    /// Draw the progress bar full-screen.
    pub fn rasterize(&self, viewport: Viewport) -> ScrollSeqResult<vello_cpu::Pixmap> {
        let w: u16 = viewport
            .width
            .try_into()
            .map_err(|_| ScrollSeqError::render("indicator width exceeds u16"))?;
        let h: u16 = viewport
            .height
            .try_into()
            .map_err(|_| ScrollSeqError::render("indicator height exceeds u16"))?;

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        clear_pixmap(&mut pixmap, BACKGROUND.to_array());

        let (track, fill) = self.bar_rects(viewport);
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        fill_rect(
            &mut ctx,
            [0.0, 0.0, f64::from(w), f64::from(h)],
            BACKGROUND,
        );
        fill_rect(&mut ctx, track, TRACK);
        if self.percent > 0 {
            fill_rect(&mut ctx, fill, FILL);
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        Ok(pixmap)
    }
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, r: [f64; 4], color: Rgba8Premul) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(r[0], r[1], r[2], r[3]));
}

#[cfg(test)]
#[path = "../../tests/unit/render/indicator.rs"]
mod tests;
