//! Command-line front end for the bezedit curve model.
//!
//! Reads a curve document or a waypoint list (offset or legacy absolute
//! form), validates it, and writes the canonical curve document — or, with
//! `--samples`, the sampled polyline a renderer would draw.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, bail, Context, Result};
use kurbo::{Point, Vec2};

use bezedit_lib::{document, CurveDocument, EditSession, LegacyWaypoint, Waypoint};

const USAGE: &str = "\
usage: bezedit [options] <input.json> [output.json]

Converts a waypoint list to a curve document, or validates and rewrites an
existing document. Without an output path the result goes to stdout.

options:
    --canvas <W> <H>    set the canvasSize of the output document
    --offset <X> <Y>    translate every control point
    --samples <N>       output N sample points per segment instead of a document
";

struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    canvas: Option<Point>,
    offset: Option<Vec2>,
    samples: Option<usize>,
}

fn main() {
    env_logger::init();
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}\n{}", err, USAGE);
            process::exit(2);
        }
    };
    if let Err(err) = run(&args) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let bytes = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let mut doc = read_input(&bytes)?;

    if let Some(offset) = args.offset {
        for pt in &mut doc.control_points {
            pt.x += offset.x;
            pt.y += offset.y;
        }
    }
    if let Some(canvas) = args.canvas {
        doc.canvas_size = Some(canvas.into());
    }

    // a strict load both validates the document and gives us sampling
    let mut session = EditSession::new();
    session
        .load_document(&doc)
        .context("document failed validation")?;
    log::info!(
        "loaded {} control points ({} segments)",
        doc.control_points.len(),
        session.points().segment_count()
    );

    let out = if let Some(steps) = args.samples {
        let samples: Vec<document::DocPoint> = session
            .render_samples(steps)
            .map(document::DocPoint::from)
            .collect();
        serde_json::to_vec_pretty(&samples)?
    } else {
        serde_json::to_vec_pretty(&doc)?
    };

    match &args.output {
        Some(path) => fs::write(path, &out)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", String::from_utf8_lossy(&out)),
    }
    Ok(())
}

/// Accepts a curve document, a waypoint list, or a legacy absolute-coordinate
/// waypoint list, producing a curve document in every case.
fn read_input(bytes: &[u8]) -> Result<CurveDocument> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).context("input is not valid JSON")?;

    if value.is_object() {
        return CurveDocument::from_json(bytes).context("malformed curve document");
    }

    let waypoints: Vec<Waypoint> = match serde_json::from_value(value.clone()) {
        Ok(waypoints) => waypoints,
        Err(_) => {
            let legacy: Vec<LegacyWaypoint> = serde_json::from_value(value)
                .context("input is neither a curve document nor a waypoint list")?;
            legacy.into_iter().map(Waypoint::from).collect()
        }
    };
    let points = document::from_waypoints(&waypoints)?;
    Ok(CurveDocument::from_points(points, None)?)
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        input: PathBuf::new(),
        output: None,
        canvas: None,
        offset: None,
        samples: None,
    };
    let mut positional = Vec::new();
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--canvas" => args.canvas = Some(parse_pair(&mut iter, "--canvas")?.to_point()),
            "--offset" => args.offset = Some(parse_pair(&mut iter, "--offset")?),
            "--samples" => {
                let raw = iter
                    .next()
                    .ok_or_else(|| anyhow!("--samples needs a value"))?;
                let steps: usize = raw.parse().context("--samples expects an integer")?;
                if steps == 0 {
                    bail!("--samples must be at least 1");
                }
                args.samples = Some(steps);
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            other if other.starts_with('-') => bail!("unknown option {}", other),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    args.input = positional
        .next()
        .ok_or_else(|| anyhow!("missing input path"))?;
    args.output = positional.next();
    if positional.next().is_some() {
        bail!("too many arguments");
    }
    Ok(args)
}

fn parse_pair(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<Vec2> {
    let x = iter
        .next()
        .ok_or_else(|| anyhow!("{} needs two values", flag))?;
    let y = iter
        .next()
        .ok_or_else(|| anyhow!("{} needs two values", flag))?;
    Ok(Vec2::new(
        x.parse()
            .with_context(|| format!("{}: bad number {}", flag, x))?,
        y.parse()
            .with_context(|| format!("{}: bad number {}", flag, y))?,
    ))
}
