use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shape_canvas::{
    Axis, BoundingBox, Canvas, CanvasError, Color, Shape, ShapeKind, Transform, save_image,
};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("Duplicate output name '{0}'")]
    DuplicateOutput(String),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// A shape to black out after all shapes are drawn
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EraseStep {
    pub kind: ShapeKind,
    pub bbox: BoundingBox,
}

/// One image written from the finished canvas
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SceneOutput {
    pub name: String,
    pub description: Option<String>,
    pub transform: Transform,
}

impl SceneOutput {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            description: None,
            transform,
        }
    }
}

/// Scene configuration: a canvas, the shapes drawn on it, and the images derived from it
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub erase: Vec<EraseStep>,
    #[serde(default)]
    pub outputs: Vec<SceneOutput>,
}

impl Scene {
    /// Load Scene configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load Scene configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SceneError> {
        let scene: Scene = toml::from_str(content)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Load Scene configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load Scene configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self, SceneError> {
        let scene: Scene = serde_json::from_str(content)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(SceneError::UnsupportedFileFormat),
        }
    }

    /// Save Scene configuration to a TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneError> {
        let content = self.to_toml()?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Convert Scene to TOML string
    pub fn to_toml(&self) -> Result<String, SceneError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Save Scene configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneError> {
        let content = self.to_json()?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Convert Scene to JSON string
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Scene)
    }

    /// Output names double as file names, so they must be unique
    pub fn validate(&self) -> Result<(), SceneError> {
        let mut seen = HashSet::new();
        for output in &self.outputs {
            if !seen.insert(output.name.as_str()) {
                return Err(SceneError::DuplicateOutput(output.name.clone()));
            }
        }
        Ok(())
    }

    /// Build the canvas: draw every shape, then apply every erase
    pub fn canvas(&self) -> Result<Canvas, SceneError> {
        let mut canvas = Canvas::new(self.width, self.height)?;
        for shape in &self.shapes {
            canvas.render(shape)?;
        }
        for step in &self.erase {
            canvas.erase_shape(step.bbox, step.kind);
        }
        Ok(canvas)
    }

    /// Produce every configured output, in order
    pub fn render(&self) -> Result<Vec<(String, RgbImage)>, SceneError> {
        self.validate()?;
        let canvas = self.canvas()?;
        self.outputs
            .iter()
            .map(|output| Ok((output.name.clone(), canvas.apply(&output.transform)?)))
            .collect()
    }

    /// Render and write each output as `<dir>/<name>.png`
    pub fn render_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>, SceneError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for (name, image) in self.render()? {
            let path = dir.join(format!("{name}.png"));
            save_image(&image, &path)?;
            info!("Wrote '{}' -> {:?}", name, path);
            written.push(path);
        }
        Ok(written)
    }

    /// The four stock shapes on one 500x500 canvas, with one output per transform
    pub fn demo() -> Self {
        let outputs = vec![
            SceneOutput::new("combined", Transform::Original),
            SceneOutput::new("scaled", Transform::Scale { scale_x: 1.5, scale_y: 1.5 }),
            SceneOutput::new("rotated", Transform::Rotate { angle: 45.0 }),
            SceneOutput::new("reflected_horizontal", Transform::Reflect { axis: Axis::Horizontal }),
            SceneOutput::new("reflected_vertical", Transform::Reflect { axis: Axis::Vertical }),
            SceneOutput::new("sheared", Transform::Shear { shear_x: 0.5, shear_y: 0.2 }),
            SceneOutput::new("translated", Transform::Translate { tx: 100.0, ty: 100.0 }),
            SceneOutput::new("cropped", Transform::Crop { bbox: BoundingBox::new(50, 50, 200, 150) }),
        ];

        Self {
            width: 500,
            height: 500,
            shapes: demo_shapes(),
            erase: Vec::new(),
            outputs,
        }
    }

    /// One canvas per stock shape, each written unmodified under the shape's name
    pub fn single_shape_demos() -> Vec<Self> {
        demo_shapes()
            .into_iter()
            .map(|shape| Self {
                width: 500,
                height: 500,
                outputs: vec![SceneOutput::new(shape.kind.to_string(), Transform::Original)],
                shapes: vec![shape],
                erase: Vec::new(),
            })
            .collect()
    }
}

fn demo_shapes() -> Vec<Shape> {
    vec![
        Shape::new(ShapeKind::Rectangle, (50, 50, 200, 150), Color::GREEN),
        Shape::new(ShapeKind::Triangle, (250, 50, 400, 200), Color::BLUE),
        Shape::new(ShapeKind::Square, (50, 250, 200, 400), Color::RED),
        Shape::new(ShapeKind::Rhombus, (250, 250, 400, 400), Color::CYAN),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_toml_round_trip() {
        let scene = Scene::demo();
        let toml = scene.to_toml().unwrap();
        assert_eq!(Scene::from_toml(&toml).unwrap(), scene);
    }

    #[test]
    fn test_demo_json_round_trip() {
        let scene = Scene::demo();
        let json = scene.to_json().unwrap();
        assert_eq!(Scene::from_json(&json).unwrap(), scene);
    }

    #[test]
    fn test_hand_written_toml() {
        let content = r#"
            width = 120
            height = 80

            [[shapes]]
            kind = "rectangle"
            bbox = { start_x = 10, start_y = 10, end_x = 60, end_y = 40 }
            color = [0, 255, 0]

            [[erase]]
            kind = "rectangle"
            bbox = { start_x = 10, start_y = 10, end_x = 60, end_y = 40 }

            [[outputs]]
            name = "flipped"
            transform = { type = "reflect", params = { axis = "horizontal" } }

            [[outputs]]
            name = "plain"
            transform = { type = "original" }
        "#;
        let scene = Scene::from_toml(content).unwrap();
        assert_eq!(scene.shapes[0].thickness, 2);

        let rendered = scene.render().unwrap();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].0, "flipped");

        // The shifted erase leaves the top edge of the rectangle in place
        let plain = &rendered[1].1;
        assert_eq!(plain.get_pixel(30, 10).0, [0, 255, 0]);
        assert_eq!(plain.get_pixel(30, 40).0, [0, 0, 0]);
    }

    #[test]
    fn test_unknown_shape_kind_rejected() {
        let content = r#"
            width = 10
            height = 10

            [[shapes]]
            kind = "hexagon"
            bbox = { start_x = 0, start_y = 0, end_x = 5, end_y = 5 }
        "#;
        assert!(matches!(Scene::from_toml(content), Err(SceneError::TomlDeError(_))));
    }

    #[test]
    fn test_duplicate_outputs_rejected() {
        let mut scene = Scene::demo();
        scene.outputs.push(SceneOutput::new("rotated", Transform::Original));
        assert!(matches!(scene.render(), Err(SceneError::DuplicateOutput(name)) if name == "rotated"));
    }

    #[test]
    fn test_zero_sized_scene() {
        let scene = Scene {
            width: 0,
            height: 10,
            shapes: Vec::new(),
            erase: Vec::new(),
            outputs: Vec::new(),
        };
        assert!(matches!(
            scene.canvas(),
            Err(SceneError::Canvas(CanvasError::InvalidDimensions { .. }))
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            Scene::from_file("scene.yaml"),
            Err(SceneError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_render_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let written = Scene::demo().render_to_dir(dir.path()).unwrap();
        assert_eq!(written.len(), 8);
        assert!(written.iter().all(|path| path.is_file()));

        let cropped = image::open(dir.path().join("cropped.png")).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (150, 100));
    }

    #[test]
    fn test_single_shape_demos() {
        let scenes = Scene::single_shape_demos();
        let names: Vec<_> = scenes.iter().map(|s| s.outputs[0].name.as_str()).collect();
        assert_eq!(names, ["rectangle", "triangle", "square", "rhombus"]);
        for scene in &scenes {
            let rendered = scene.render().unwrap();
            assert!(rendered[0].1.pixels().any(|p| p.0 != [0, 0, 0]));
        }
    }

    #[test]
    fn test_scene_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        Scene::demo().to_json_file(&path).unwrap();
        assert_eq!(Scene::from_file(&path).unwrap(), Scene::demo());
    }
}
