// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: Build a 3D wall mesh (OBJ + MTL) from floor plan wall lines
//!
//! Usage:
//!   walls-to-obj <walls.txt> [options]

use anyhow::{bail, Context};
use floorplan_walls::{
    read_openings, read_wall_lines, read_wall_points, reconstruct, save_mesh, PipelineConfig,
    PipelineInput,
};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

struct Options {
    walls_path: PathBuf,
    openings_path: Option<PathBuf>,
    points_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    output_path: PathBuf,
    report_path: Option<PathBuf>,
    weld_epsilon: Option<f64>,
    seed: Option<u64>,
    verbose: bool,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let options = match parse_args(&args[1..]) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    init_logging(options.verbose);

    if let Err(e) = run(&options) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(options: &Options) -> anyhow::Result<()> {
    let mut config = match &options.config_path {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    }
    .with_env_overrides();
    if let Some(eps) = options.weld_epsilon {
        config.mesh.weld_epsilon = Some(eps);
    }
    if let Some(seed) = options.seed {
        config.ransac.seed = Some(seed);
    }
    config.validate()?;

    let walls = read_wall_lines(&options.walls_path)?;
    if walls.items.is_empty() {
        bail!(
            "no valid wall lines in {} ({} lines skipped)",
            options.walls_path.display(),
            walls.errors.len()
        );
    }
    let mut skipped = walls.errors;

    let mut input = PipelineInput {
        walls: walls.items,
        ..Default::default()
    };

    if let Some(path) = &options.openings_path {
        let openings = read_openings(path)?;
        input.openings = openings.items;
        skipped.extend(openings.errors);
    }

    if let Some(path) = &options.points_path {
        let points = read_wall_points(path)?;
        input.point_clusters = points.items.into_iter().map(|c| c.points).collect();
        skipped.extend(points.errors);
    }

    let mut result = reconstruct(input, &config);
    result.report.skipped_lines = skipped;

    save_mesh(&result.mesh, &options.output_path, &config.material)
        .with_context(|| format!("writing {}", options.output_path.display()))?;

    if let Some(path) = &options.report_path {
        result.report.write_json(path)?;
    }

    let report = &result.report;
    println!("=== Wall Mesh Summary ===");
    println!(
        "  Walls: {} plain, {} door, {} window ({:.2}m total)",
        report.walls.plain, report.walls.door, report.walls.window, report.walls.total_length
    );
    println!(
        "  Openings: {} applied, {} without host, {} degenerate",
        report.openings_applied, report.openings_unhosted, report.openings_degenerate
    );
    if report.fitted_centerlines > 0 {
        println!(
            "  Fitted centerlines: {} ({} added as new walls)",
            report.fitted_centerlines, report.centerlines_added
        );
    }
    println!(
        "  Mesh: {} bands, {} vertices, {} faces",
        report.bands, report.vertices, report.faces
    );
    if !report.violations.is_empty() {
        println!("  Warnings: {} invariant violations", report.violations.len());
    }
    if !report.skipped_lines.is_empty() {
        println!("  Skipped input lines: {}", report.skipped_lines.len());
    }
    println!("Done! Open {} in a 3D viewer.", options.output_path.display());

    Ok(())
}

fn parse_args(args: &[String]) -> anyhow::Result<Options> {
    let mut options = Options {
        walls_path: PathBuf::from(&args[0]),
        openings_path: None,
        points_path: None,
        config_path: None,
        output_path: PathBuf::from("walls.obj"),
        report_path: None,
        weld_epsilon: None,
        seed: None,
        verbose: false,
    };

    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .with_context(|| format!("missing value for {}", arg))
        };
        match arg.as_str() {
            "--openings" => options.openings_path = Some(PathBuf::from(value()?)),
            "--points" => options.points_path = Some(PathBuf::from(value()?)),
            "--config" => options.config_path = Some(PathBuf::from(value()?)),
            "--output" => options.output_path = PathBuf::from(value()?),
            "--report" => options.report_path = Some(PathBuf::from(value()?)),
            "--weld" => {
                let raw = value()?;
                options.weld_epsilon =
                    Some(raw.parse().with_context(|| format!("invalid weld epsilon {:?}", raw))?);
            }
            "--seed" => {
                let raw = value()?;
                options.seed =
                    Some(raw.parse().with_context(|| format!("invalid seed {:?}", raw))?);
            }
            "--verbose" | "-v" => options.verbose = true,
            other => bail!("unknown option: {}", other),
        }
    }

    Ok(options)
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "info,floorplan_walls=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    eprintln!("Usage: walls-to-obj <walls.txt> [options]");
    eprintln!();
    eprintln!("Wall lines are 'x_start x_end y_start y_end', one per line.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --openings FILE   Door/window elements: 'kind x1 y1 z_min x2 y2 z_max'");
    eprintln!("  --points FILE     Labelled wall points 'x y label' for RANSAC centerlines");
    eprintln!("  --config FILE     JSON pipeline configuration");
    eprintln!("  --output FILE     Output OBJ path (default: walls.obj); MTL written alongside");
    eprintln!("  --report FILE     Write a JSON run report");
    eprintln!("  --weld EPS        Weld coincident vertices closer than EPS");
    eprintln!("  --seed N          Fixed RANSAC seed");
    eprintln!("  --verbose, -v     Debug logging (RUST_LOG overrides)");
}
