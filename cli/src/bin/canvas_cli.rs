use clap::{Parser, Subcommand};
use canvas_cli::Scene;
use color_eyre::eyre::{Result, eyre};
use shape_canvas::{BlurKind, DEFAULT_THRESHOLD, ImageProcessor, ResizeMethod, Transform, save_image};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a scene file and write one PNG per configured output
    Render {
        /// Path to the TOML or JSON scene file
        #[arg(short, long)]
        config: PathBuf,
        /// Output directory (defaults to the scene file's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Write the stock shapes and every transform of them
    Demo {
        /// Output directory for the images
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
    },
    /// Resize and/or blur an image
    Process {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Path of the processed image
        #[arg(short, long)]
        output: PathBuf,
        /// Resize factors along x and y
        #[arg(long, num_args = 2, value_names = ["FX", "FY"])]
        resize: Option<Vec<f32>>,
        /// Resize interpolation (linear, nearest, cubic)
        #[arg(long, default_value = "linear")]
        method: ResizeMethod,
        /// Blur to apply after resizing (box, gaussian)
        #[arg(long)]
        blur: Option<BlurKind>,
        /// Blur kernel size
        #[arg(long, default_value = "5")]
        ksize: u32,
    },
    /// Print image statistics and write grayscale and binary versions
    Analyze {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory for gray_image.png and binary_image.png
        #[arg(short, long)]
        output_dir: PathBuf,
        /// Binarization threshold
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: u8,
    },
    /// Print the scene file JSON schema
    Schema,
    /// List the available transforms and their parameters
    Transforms,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Render { config, output_dir } => {
            render_scene(config, output_dir.as_deref())?;
        }
        Commands::Demo { output_dir } => {
            run_demo(output_dir)?;
        }
        Commands::Process {
            input,
            output,
            resize,
            method,
            blur,
            ksize,
        } => {
            process_image(input, output, resize.as_deref(), *method, *blur, *ksize)?;
        }
        Commands::Analyze {
            input,
            output_dir,
            threshold,
        } => {
            analyze_image(input, output_dir, *threshold)?;
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&Scene::schema())?);
        }
        Commands::Transforms => {
            list_transforms();
        }
    }

    Ok(())
}

fn render_scene(config_path: &Path, output_dir: Option<&Path>) -> Result<()> {
    let scene = Scene::from_file(config_path)?;
    info!(
        "Scene: {}x{}, {} shapes, {} erases, {} outputs",
        scene.width,
        scene.height,
        scene.shapes.len(),
        scene.erase.len(),
        scene.outputs.len()
    );

    let output_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let written = scene.render_to_dir(&output_dir)?;
    info!("✅ Wrote {} images to {:?}", written.len(), output_dir);
    Ok(())
}

fn run_demo(output_dir: &Path) -> Result<()> {
    let mut written = 0;
    for scene in Scene::single_shape_demos() {
        written += scene.render_to_dir(output_dir)?.len();
    }

    let scene = Scene::demo();
    written += scene.render_to_dir(output_dir)?.len();

    // Editable copy of the stock scene for `render --config`
    let config_path = output_dir.join("scene.toml");
    scene.to_toml_file(&config_path)?;

    info!("✅ Demo completed: {} images, scene saved to {:?}", written, config_path);
    Ok(())
}

fn process_image(
    input: &Path,
    output: &Path,
    resize: Option<&[f32]>,
    method: ResizeMethod,
    blur: Option<BlurKind>,
    ksize: u32,
) -> Result<()> {
    let mut processor = ImageProcessor::open(input)?;

    if let Some(factors) = resize {
        let [fx, fy] = factors else {
            return Err(eyre!("--resize takes exactly two factors, got {}", factors.len()));
        };
        processor.resize(*fx, *fy, method)?;
    }

    if let Some(kind) = blur {
        processor.blur(kind, ksize)?;
    }

    processor.save(output)?;
    info!("✅ Processed image written to {:?}", output);
    Ok(())
}

fn analyze_image(input: &Path, output_dir: &Path, threshold: u8) -> Result<()> {
    let mut processor = ImageProcessor::open(input)?;

    let (height, width, channels) = processor.dimensions()?;
    info!("Image dimensions: {}x{}x{}", height, width, channels);
    info!("Total number of pixels: {}", processor.pixel_count()?);

    save_image(processor.to_grayscale()?, output_dir.join("gray_image.png"))?;
    save_image(processor.to_binary(threshold)?, output_dir.join("binary_image.png"))?;
    info!("Number of black pixels: {}", processor.count_black_pixels()?);

    Ok(())
}

fn list_transforms() {
    for transform in Transform::iter() {
        println!("{:<10} {}", transform.to_string(), transform.description());
        for (name, help, required) in transform.parameters_info() {
            let marker = if required { "required" } else { "optional" };
            println!("    {name:<8} {help} ({marker})");
        }
    }
}
