use std::path::PathBuf;

use clap::Parser;

use slicer::slicer::{LayerMode, SliceSettings};

#[derive(Debug, Parser)]
/// Slices a triangle mesh into a sheet of laser-cuttable layer outlines.
pub struct Args {
    /// Path to a .stl file, binary or ascii.
    pub mesh: PathBuf,

    /// File to save the layer sheet to, as .svg.
    pub output: PathBuf,

    #[arg(long, default_value_t = 100.0)]
    /// Height to scale the model to, in mm.
    pub height: f32,

    #[arg(long, group = "layer_mode")]
    /// Thickness of each layer in mm, usually the sheet material thickness.
    pub layer_height: Option<f32>,

    #[arg(long, group = "layer_mode")]
    /// Number of layers to cut the model into.
    pub layers: Option<u32>,
}

impl Args {
    pub fn slice_settings(&self) -> SliceSettings {
        let mode = match (self.layer_height, self.layers) {
            (Some(thickness), _) => LayerMode::Thickness(thickness),
            (None, Some(count)) => LayerMode::Count(count),
            // 3mm sheets are the common case.
            (None, None) => LayerMode::Thickness(3.0),
        };

        SliceSettings {
            target_height: self.height,
            mode,
        }
    }
}
