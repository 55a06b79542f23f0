use std::{
    fs,
    io::{stdout, Write},
    thread,
    time::Instant,
};

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use slicer::{format::SvgFile, mesh::NormalizedMesh, slicer::Slicer};

mod args;
use args::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("slicer", LevelFilter::INFO)
        .with_target("mesh_format", LevelFilter::INFO);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let buffer = fs::read(&args.mesh)?;
    let mesh = mesh_format::load_mesh(&buffer)?;
    println!(
        "Loaded `{}`. {{ triangles: {} }}",
        args.mesh.file_name().unwrap_or_default().to_string_lossy(),
        mesh.triangles.len()
    );

    let settings = args.slice_settings();
    let normalized = NormalizedMesh::new(&mesh, settings.target_height)?;
    println!(
        "Normalized to {:.1} x {:.1} x {:.1} mm",
        normalized.width(),
        normalized.length(),
        normalized.height()
    );

    // Slice on another thread so this one can report progress.
    let now = Instant::now();
    let slicer = Slicer::new(settings, normalized)?;
    let plan = slicer.layer_plan();
    println!("Slicing {} layers of {:.2} mm", plan.count, plan.thickness);

    let progress = slicer.progress();
    let worker = thread::spawn(move || slicer.slice());

    let mut completed = 0;
    while completed < progress.total() {
        completed = progress.wait();
        print!(
            "\rLayer: {}/{}, {:.1}%",
            completed,
            progress.total(),
            completed as f32 / progress.total() as f32 * 100.0
        );
        stdout().flush()?;
    }
    println!();

    let result = worker.join().expect("slicing thread panicked")?;
    let sheet = SvgFile::from_result(&result)?;
    svg::save(&args.output, &sheet.into_document())?;

    println!("Done. Elapsed: {:.1}s", now.elapsed().as_secs_f32());
    Ok(())
}
