use std::str::FromStr;

use image::Rgb;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::error::{CanvasError, Result};

/// Corner pair `(start_x, start_y)`–`(end_x, end_y)` parameterizing a shape's extent.
///
/// Coordinates are signed and may fall outside the canvas; drawing clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

impl BoundingBox {
    pub fn new(start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> Self {
        Self {
            start_x,
            start_y,
            end_x,
            end_y,
        }
    }

    /// Horizontal extent, regardless of corner order
    pub fn width(&self) -> u32 {
        self.end_x.abs_diff(self.start_x)
    }

    /// Vertical extent, regardless of corner order
    pub fn height(&self) -> u32 {
        self.end_y.abs_diff(self.start_y)
    }

    /// Integer midpoint, rounding toward negative infinity
    pub fn center(&self) -> (i32, i32) {
        let mid = |a: i32, b: i32| (i64::from(a) + i64::from(b)).div_euclid(2) as i32;
        (mid(self.start_x, self.end_x), mid(self.start_y, self.end_y))
    }

    /// The same box moved by `(dx, dy)`, saturating at the `i32` range
    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.start_x.saturating_add(dx),
            self.start_y.saturating_add(dy),
            self.end_x.saturating_add(dx),
            self.end_y.saturating_add(dy),
        )
    }

    /// Corners reordered so that start <= end on both axes
    pub fn normalized(&self) -> Self {
        Self::new(
            self.start_x.min(self.end_x),
            self.start_y.min(self.end_y),
            self.start_x.max(self.end_x),
            self.start_y.max(self.end_y),
        )
    }

    /// Square anchored at the start corner with side `min(width, height)`.
    ///
    /// The box's own aspect ratio is discarded. The far corner saturates at
    /// the `i32` range.
    pub fn square(&self) -> Self {
        let side = i64::from(self.width().min(self.height()));
        let far = |start: i32| (i64::from(start) + side).min(i64::from(i32::MAX)) as i32;
        Self::new(self.start_x, self.start_y, far(self.start_x), far(self.start_y))
    }

    /// Base on the bottom edge, apex at the horizontal midpoint of the top edge
    pub fn triangle(&self) -> [(i32, i32); 3] {
        let (center_x, _) = self.center();
        [
            (self.start_x, self.end_y),
            (center_x, self.start_y),
            (self.end_x, self.end_y),
        ]
    }

    /// Diamond through the midpoints of the top, left, bottom and right edges
    pub fn rhombus(&self) -> [(i32, i32); 4] {
        let (center_x, center_y) = self.center();
        [
            (center_x, self.start_y),
            (self.start_x, center_y),
            (center_x, self.end_y),
            (self.end_x, center_y),
        ]
    }
}

impl From<(i32, i32, i32, i32)> for BoundingBox {
    fn from((start_x, start_y, end_x, end_y): (i32, i32, i32, i32)) -> Self {
        Self::new(start_x, start_y, end_x, end_y)
    }
}

/// RGB colour triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0]);
    pub const WHITE: Color = Color([255, 255, 255]);
    pub const RED: Color = Color([255, 0, 0]);
    pub const GREEN: Color = Color([0, 255, 0]);
    pub const BLUE: Color = Color([0, 0, 255]);
    pub const YELLOW: Color = Color([255, 255, 0]);
    pub const CYAN: Color = Color([0, 255, 255]);

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn is_black(&self) -> bool {
        self.0 == [0, 0, 0]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Self {
        Rgb(color.0)
    }
}

impl From<Rgb<u8>> for Color {
    fn from(pixel: Rgb<u8>) -> Self {
        Color(pixel.0)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color([r, g, b])
    }
}

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShapeKind {
    /// Axis-aligned rectangle between the two corners
    Rectangle,
    /// Triangle with its base on the bottom edge and apex at top-centre
    Triangle,
    /// Square anchored at the start corner, side = shorter box extent
    Square,
    /// Diamond inscribed in the bounding box
    Rhombus,
}

impl ShapeKind {
    /// Parse a shape name, rejecting anything outside the supported set
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| CanvasError::UnsupportedShapeKind(name.to_string()))
    }

    /// Names of every supported shape
    pub fn available() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }
}

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash, Default
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Axis {
    /// Mirror left-right
    #[default]
    Horizontal,
    /// Mirror top-bottom
    Vertical,
}

impl Axis {
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| CanvasError::InvalidAxis(name.to_string()))
    }
}

fn default_thickness() -> i32 {
    2
}

/// A shape to be rasterized onto a canvas. Not retained after drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Shape {
    pub kind: ShapeKind,
    pub bbox: BoundingBox,
    #[serde(default)]
    pub color: Color,
    /// Stroke width in pixels; negative fills the shape
    #[serde(default = "default_thickness")]
    pub thickness: i32,
}

impl Shape {
    pub fn new(kind: ShapeKind, bbox: impl Into<BoundingBox>, color: impl Into<Color>) -> Self {
        Self {
            kind,
            bbox: bbox.into(),
            color: color.into(),
            thickness: default_thickness(),
        }
    }

    pub fn with_thickness(mut self, thickness: i32) -> Self {
        self.thickness = thickness;
        self
    }
}
