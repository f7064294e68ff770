use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use log::error;

use rsmosaic::collect::global_variables::{get_temp_path, DEFAULT_ASSET_TYPE};
use rsmosaic::collect::planet::PlanetCollect;
use rsmosaic::commons::geojson_io;
use rsmosaic::mosaic::scene_list::{build_date_ranges, SceneSearch};
use rsmosaic::{coverage, reduce};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = ClapCommand::new("rsmosaic")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Select a minimal PlanetScope scene set covering a region")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            ClapCommand::new("mosaic")
                .about("Search the catalog and keep only the scenes needed to cover the region")
                .arg(
                    Arg::new("geom_file")
                        .help("GeoJSON file with the region of interest")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("months")
                        .long("months")
                        .value_name("N")
                        .default_value("6")
                        .help("Number of months in the past to search"),
                )
                .arg(
                    Arg::new("idx")
                        .long("idx")
                        .value_name("I")
                        .help("Index of a single geometry inside the GeoJSON file (starting from 0)"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Where to write the reduced scene collection"),
                )
                .arg(
                    Arg::new("test")
                        .long("test")
                        .action(ArgAction::SetTrue)
                        .help("Report the region and date windows without searching"),
                ),
        )
        .subcommand(
            ClapCommand::new("reduce")
                .about("Reduce an existing scene collection against a region, offline")
                .arg(
                    Arg::new("geom_file")
                        .help("GeoJSON file with the region of interest")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("scenes_file")
                        .help("GeoJSON FeatureCollection of candidate scenes")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("idx")
                        .long("idx")
                        .value_name("I")
                        .help("Index of a single geometry inside the region file (starting from 0)"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Where to write the reduced scene collection"),
                ),
        )
        .subcommand(
            ClapCommand::new("download")
                .about("Activate and download assets for a scene collection, one scene at a time")
                .arg(
                    Arg::new("scenes_file")
                        .help("GeoJSON FeatureCollection of scenes to download")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .value_name("DIR")
                        .help("Destination directory (defaults to ./temp)"),
                )
                .arg(
                    Arg::new("asset-type")
                        .long("asset-type")
                        .value_name("TYPE")
                        .default_value(DEFAULT_ASSET_TYPE)
                        .help("Asset type to download"),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("mosaic", sub)) => run_mosaic(sub),
        Some(("reduce", sub)) => run_reduce(sub),
        Some(("download", sub)) => run_download(sub),
        _ => unreachable!("a subcommand is required"),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run_mosaic(sub: &ArgMatches) -> Result<()> {
    let geom_file = required_path(sub, "geom_file")?;
    let months: u32 = sub
        .get_one::<String>("months")
        .context("--months is missing")?
        .parse()
        .context("--months must be a non-negative integer")?;
    let idx = parse_idx(sub)?;

    let region = geojson_io::region_from_file(&geom_file, idx)?;
    println!("Region area: {:.6}", region.area());

    if sub.get_flag("test") {
        for (from, to) in build_date_ranges(months) {
            println!("window: {} -> {}", from, to);
        }
        return Ok(());
    }

    let collect = PlanetCollect::from_env()?;
    let search = SceneSearch::new(&collect);
    let scenes = search.run(&region, months)?;
    println!("Candidate scenes: {}", scenes.len());

    let full_coverage = coverage(&scenes, &region)?;
    let reduced = reduce(scenes, &region)?;
    println!(
        "Reduced to {} scenes, coverage {:.4}",
        reduced.len(),
        full_coverage
    );

    let output = output_path(sub, "mosaic_scenes.geojson");
    geojson_io::write_scene_collection(&output, &reduced)?;
    println!("Scene collection written to {}", output.display());
    Ok(())
}

fn run_reduce(sub: &ArgMatches) -> Result<()> {
    let geom_file = required_path(sub, "geom_file")?;
    let scenes_file = required_path(sub, "scenes_file")?;
    let idx = parse_idx(sub)?;

    let region = geojson_io::region_from_file(&geom_file, idx)?;
    let scenes = geojson_io::footprints_from_file(&scenes_file)?;
    println!("Candidate scenes: {}", scenes.len());

    let full_coverage = coverage(&scenes, &region)?;
    let reduced = reduce(scenes, &region)?;
    println!(
        "Reduced to {} scenes, coverage {:.4}",
        reduced.len(),
        full_coverage
    );

    let output = output_path(sub, "reduced_scenes.geojson");
    geojson_io::write_scene_collection(&output, &reduced)?;
    println!("Scene collection written to {}", output.display());
    Ok(())
}

fn run_download(sub: &ArgMatches) -> Result<()> {
    let scenes_file = required_path(sub, "scenes_file")?;
    let dir = sub
        .get_one::<String>("dir")
        .map(PathBuf::from)
        .unwrap_or_else(get_temp_path);
    let asset_type = sub
        .get_one::<String>("asset-type")
        .context("--asset-type is missing")?;

    let scenes = geojson_io::footprints_from_file(&scenes_file)?;
    let collect = PlanetCollect::from_env()?;

    for (index, scene) in scenes.iter().enumerate() {
        let id = scene.id().unwrap_or("<no id>");
        println!("[{}/{}] {}", index + 1, scenes.len(), id);
        let dest = collect.download_scene(scene.record(), asset_type, &dir)?;
        println!("  -> {}", dest.display());
    }
    Ok(())
}

fn required_path(sub: &ArgMatches, name: &str) -> Result<PathBuf> {
    Ok(PathBuf::from(
        sub.get_one::<String>(name)
            .with_context(|| format!("{} is required", name))?,
    ))
}

fn parse_idx(sub: &ArgMatches) -> Result<Option<usize>> {
    match sub.get_one::<String>("idx") {
        Some(raw) => Ok(Some(
            raw.parse()
                .context("--idx must be a non-negative integer")?,
        )),
        None => Ok(None),
    }
}

fn output_path(sub: &ArgMatches, default: &str) -> PathBuf {
    sub.get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
