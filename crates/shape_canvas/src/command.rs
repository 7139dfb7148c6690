use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::{
    error::Result,
    types::{Axis, BoundingBox},
};

/// A whole-canvas operation producing a derived image.
///
/// None of these mutate the canvas they are applied to.
#[derive(
    Debug, Clone,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq
)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Transform {
    /// The canvas as drawn
    Original,

    /// Shift content by a pixel offset
    Translate { tx: f32, ty: f32 },

    /// Scale about the canvas centre
    Scale {
        #[schemars(range(min = 0.01, max = 100.0))]
        scale_x: f32,
        /// Accepted but ignored; scaling is uniform by `scale_x`
        scale_y: f32,
    },

    /// Rotate about the canvas centre, degrees counter-clockwise
    Rotate { angle: f32 },

    /// Mirror across an axis
    Reflect { axis: Axis },

    /// Shear along both axes
    Shear { shear_x: f32, shear_y: f32 },

    /// Copy out a half-open region
    Crop { bbox: BoundingBox },
}

impl Transform {
    /// Get the JSON schema for all transforms
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Transform)
    }

    /// Pretty-printed JSON schema
    pub fn schema_json() -> Result<String> {
        Ok(serde_json::to_string_pretty(&Self::schema())?)
    }

    /// Get a list of all available transform names
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Original => "Unmodified copy of the canvas",
            Self::Translate { .. } => "Shift the whole canvas by (tx, ty) pixels, exposing black",
            Self::Scale { .. } => "Scale about the canvas centre by scale_x (scale_y is ignored)",
            Self::Rotate { .. } => "Rotate about the canvas centre by angle degrees, counter-clockwise",
            Self::Reflect { .. } => "Flip left-right (horizontal) or top-bottom (vertical)",
            Self::Shear { .. } => "Shear with x' = x + shear_x*y and y' = y + shear_y*x",
            Self::Crop { .. } => "Copy rows [start_y, end_y) and columns [start_x, end_x), clamped to the canvas",
        }
    }

    /// Get parameter requirements for the transform
    pub fn parameters_info(&self) -> Vec<(&'static str, &'static str, bool)> {
        match self {
            Self::Original => vec![],
            Self::Translate { .. } => vec![
                ("tx", "Horizontal offset in pixels", true),
                ("ty", "Vertical offset in pixels", true),
            ],
            Self::Scale { .. } => vec![
                ("scale_x", "Uniform scale factor", true),
                ("scale_y", "Ignored", false),
            ],
            Self::Rotate { .. } => vec![("angle", "Rotation in degrees", true)],
            Self::Reflect { .. } => vec![("axis", "horizontal or vertical", true)],
            Self::Shear { .. } => vec![
                ("shear_x", "Horizontal shear factor", true),
                ("shear_y", "Vertical shear factor", true),
            ],
            Self::Crop { .. } => vec![("bbox", "Region to copy", true)],
        }
    }
}
