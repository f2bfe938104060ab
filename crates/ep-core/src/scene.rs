// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! The drawable surface animations render into.

use tracing::warn;

/// Handle to a drawable created by a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct LineStyle {
    pub color: &'static str,
    pub width: f64,
    pub dashed: bool,
}

impl LineStyle {
    pub const fn solid(color: &'static str) -> Self {
        Self {
            color,
            width: 1.0,
            dashed: false,
        }
    }

    pub const fn dashed(color: &'static str) -> Self {
        Self {
            color,
            width: 1.0,
            dashed: true,
        }
    }
}

/// A plotting backend: line objects with settable coordinates, text labels
/// and a frame composition step.
pub trait Scene {
    fn create_line(&mut self, style: LineStyle) -> DrawableId;

    fn create_text(&mut self, x: f64, y: f64, text: &str) -> DrawableId;

    /// Replaces the coordinates of a line. `xs` and `ys` have equal length.
    fn set_line_data(&mut self, id: DrawableId, xs: &[f64], ys: &[f64]);

    fn set_text(&mut self, id: DrawableId, text: &str);

    /// Redraws the given drawables as one frame.
    fn compose(&mut self, ids: &[DrawableId]);
}

#[derive(Clone, Debug, PartialEq)]
pub enum Drawable {
    Line {
        style: LineStyle,
        xs: Vec<f64>,
        ys: Vec<f64>,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
    },
}

/// Scene that keeps every drawable in memory. Used for headless runs and
/// tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryScene {
    drawables: Vec<Drawable>,
    frames: u64,
    last_composed: Vec<DrawableId>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: DrawableId) -> Option<&Drawable> {
        self.drawables.get(id.0)
    }

    /// Coordinates of a line drawable.
    pub fn line(&self, id: DrawableId) -> Option<(&[f64], &[f64])> {
        match self.get(id)? {
            Drawable::Line { xs, ys, .. } => Some((xs.as_slice(), ys.as_slice())),
            Drawable::Text { .. } => None,
        }
    }

    pub fn text(&self, id: DrawableId) -> Option<&str> {
        match self.get(id)? {
            Drawable::Text { text, .. } => Some(text.as_str()),
            Drawable::Line { .. } => None,
        }
    }

    /// Frames composed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_composed(&self) -> &[DrawableId] {
        &self.last_composed
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    fn push(&mut self, drawable: Drawable) -> DrawableId {
        self.drawables.push(drawable);
        DrawableId(self.drawables.len() - 1)
    }
}

impl Scene for MemoryScene {
    fn create_line(&mut self, style: LineStyle) -> DrawableId {
        self.push(Drawable::Line {
            style,
            xs: Vec::new(),
            ys: Vec::new(),
        })
    }

    fn create_text(&mut self, x: f64, y: f64, text: &str) -> DrawableId {
        self.push(Drawable::Text {
            x,
            y,
            text: text.to_string(),
        })
    }

    fn set_line_data(&mut self, id: DrawableId, new_xs: &[f64], new_ys: &[f64]) {
        match self.drawables.get_mut(id.0) {
            Some(Drawable::Line { xs, ys, .. }) => {
                xs.clear();
                xs.extend_from_slice(new_xs);
                ys.clear();
                ys.extend_from_slice(new_ys);
            }
            _ => warn!(?id, "not a line drawable"),
        }
    }

    fn set_text(&mut self, id: DrawableId, new_text: &str) {
        match self.drawables.get_mut(id.0) {
            Some(Drawable::Text { text, .. }) => {
                text.clear();
                text.push_str(new_text);
            }
            _ => warn!(?id, "not a text drawable"),
        }
    }

    fn compose(&mut self, ids: &[DrawableId]) {
        self.frames += 1;
        self.last_composed.clear();
        self.last_composed.extend_from_slice(ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_and_texts_are_kept_apart() {
        let mut scene = MemoryScene::new();
        let line = scene.create_line(LineStyle::solid("black"));
        let label = scene.create_text(0.0, 1.0, "f(t)");
        scene.set_line_data(line, &[0.0, 1.0], &[2.0, 3.0]);
        scene.set_text(label, "f(t) = sin(t)");
        scene.set_line_data(label, &[9.0], &[9.0]);

        assert_eq!(scene.line(line), Some((&[0.0, 1.0][..], &[2.0, 3.0][..])));
        assert_eq!(scene.text(label), Some("f(t) = sin(t)"));
        assert_eq!(scene.line(label), None);

        scene.compose(&[line, label]);
        assert_eq!(scene.frames(), 1);
        assert_eq!(scene.last_composed(), [line, label]);
    }
}
