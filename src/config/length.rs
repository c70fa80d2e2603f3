use crate::foundation::{
    core::Viewport,
    error::{ScrollSeqError, ScrollSeqResult},
};

/// A CSS length as accepted by `containerHeight`.
///
/// Only the units a pinned container is realistically sized with are supported.
/// Percentages resolve against the viewport height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CssLength {
    Px(f64),
    Vh(f64),
    Vw(f64),
    Percent(f64),
}

impl CssLength {
    pub fn parse(s: &str) -> ScrollSeqResult<Self> {
        let s = s.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(ScrollSeqError::validation("css length must be non-empty"));
        }

        let (num, ctor): (&str, fn(f64) -> Self) = if let Some(n) = s.strip_suffix("px") {
            (n, Self::Px)
        } else if let Some(n) = s.strip_suffix("vh") {
            (n, Self::Vh)
        } else if let Some(n) = s.strip_suffix("vw") {
            (n, Self::Vw)
        } else if let Some(n) = s.strip_suffix('%') {
            (n, Self::Percent)
        } else if s == "0" {
            ("0", Self::Px)
        } else {
            return Err(ScrollSeqError::validation(format!(
                "unsupported css length '{s}' (expected px, vh, vw or %)"
            )));
        };

        let v = num
            .trim()
            .parse::<f64>()
            .map_err(|e| ScrollSeqError::validation(format!("css length '{s}': {e}")))?;
        if !v.is_finite() || v < 0.0 {
            return Err(ScrollSeqError::validation(format!(
                "css length '{s}' must be finite and >= 0"
            )));
        }
        Ok(ctor(v))
    }

    /// Resolve to device-independent pixels for `viewport`.
    pub fn resolve(self, viewport: Viewport) -> f64 {
        match self {
            Self::Px(v) => v,
            Self::Vh(v) | Self::Percent(v) => v / 100.0 * f64::from(viewport.height),
            Self::Vw(v) => v / 100.0 * f64::from(viewport.width),
        }
    }
}

impl std::fmt::Display for CssLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Vh(v) => write!(f, "{v}vh"),
            Self::Vw(v) => write!(f, "{v}vw"),
            Self::Percent(v) => write!(f, "{v}%"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/length.rs"]
mod tests;
