use clap::{ArgGroup, Parser, Subcommand};
use log::{info, warn};
use qr_guidance::bridge::to_rgba;
use qr_guidance::config::ScanConfig;
use qr_guidance::decode::FixedDecoder;
use qr_guidance::detector::pyramid::ScalePass;
use qr_guidance::payload::classify;
use qr_guidance::preprocess::Preprocessor;
use qr_guidance::tools::{image_files, load_config, load_rgb, save_mask, save_rgba};
use qr_guidance::{ChannelOrder, FinderPatternCandidate, Frame, Scanner, ToolError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "qrguide", version, about = "QR finder pattern detection and camera guidance")]
struct Cli {
    /// JSON configuration file (defaults apply to missing fields)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline on an image and write the annotated result
    #[command(group(ArgGroup::new("input").required(true).multiple(false).args(["image", "dir"])))]
    Guide {
        /// Input image
        #[arg(long)]
        image: Option<PathBuf>,
        /// Process every image under a directory (no output images)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Maximum number of images taken from --dir
        #[arg(long)]
        limit: Option<usize>,
        /// Where to write the annotated image (PNG recommended)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Text the stand-in decoder returns when the area gate opens
        #[arg(long)]
        payload: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List finder pattern candidates for an image
    Detect {
        #[arg(long)]
        image: PathBuf,
        /// Run a single pass at this resize factor instead of the full search
        #[arg(long)]
        scale: Option<f32>,
        /// Write the original-scale binary mask to this path
        #[arg(long)]
        mask_out: Option<PathBuf>,
    },
    /// Print the effective configuration as JSON
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Guide {
            image,
            dir,
            limit,
            out,
            payload,
            json,
        } => match (image, dir) {
            (Some(image), _) => guide_cmd(&config, &image, out.as_deref(), payload.as_deref(), json),
            (None, dir) => guide_dir_cmd(&config, &dir.unwrap_or_default(), limit, payload.as_deref()),
        },
        Command::Detect {
            image,
            scale,
            mask_out,
        } => detect_cmd(&config, &image, scale, mask_out.as_deref()),
        Command::Config => config_cmd(&config),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn guide_cmd(
    config: &ScanConfig,
    image: &Path,
    out: Option<&Path>,
    payload: Option<&str>,
    json: bool,
) -> Result<(), ToolError> {
    let (mut pixels, width, height) = load_rgb(image)?;
    let mut frame = Frame::new(&mut pixels, width, height, ChannelOrder::Rgb)?;
    let scanner = Scanner::new(config.clone());

    let start = Instant::now();
    let mut decoder = FixedDecoder::from_option(payload.map(str::to_string));
    let report = scanner.process_frame(&mut frame, &mut decoder);
    info!("processed {} in {:?}", image.display(), start.elapsed());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Image: {} ({}x{})", image.display(), width, height);
        println!("Found {} finder patterns", report.candidates.len());
        print_candidates(&report.candidates);
        if let Some(decision) = &report.decision {
            for line in &decision.overlay.messages {
                println!("  {}", line);
            }
        }
        if let Some(text) = &report.decoded {
            match classify(text) {
                Ok(marker) => println!("Decoded: {} -> {}", text, marker.id()),
                Err(err) => println!("Decoded: {} ({})", text, err),
            }
        }
    }

    if let Some(out) = out {
        save_rgba(out, &to_rgba(&frame), width, height)?;
        info!("annotated frame written to {}", out.display());
    }
    Ok(())
}

fn guide_dir_cmd(config: &ScanConfig, dir: &Path, limit: Option<usize>, payload: Option<&str>) -> Result<(), ToolError> {
    let scanner = Scanner::new(config.clone());
    let mut decoder = FixedDecoder::from_option(payload.map(str::to_string));
    let mut seen = 0usize;
    let mut found = 0usize;

    for path in image_files(dir, limit) {
        let (mut pixels, width, height) = match load_rgb(&path) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!("skipping {}: {}", path.display(), err);
                continue;
            }
        };
        let mut frame = Frame::new(&mut pixels, width, height, ChannelOrder::Rgb)?;
        let report = scanner.process_frame(&mut frame, &mut decoder);
        seen += 1;
        if !report.candidates.is_empty() {
            found += 1;
        }
        println!("{}: {} ({} patterns)", path.display(), report.headline(), report.candidates.len());
    }

    println!("{} of {} images had finder patterns", found, seen);
    Ok(())
}

fn detect_cmd(config: &ScanConfig, image: &Path, scale: Option<f32>, mask_out: Option<&Path>) -> Result<(), ToolError> {
    let (mut pixels, width, height) = load_rgb(image)?;
    let frame = Frame::new(&mut pixels, width, height, ChannelOrder::Rgb)?;
    println!("Image: {} ({}x{})", image.display(), width, height);

    if let Some(mask_out) = mask_out {
        let mask = Preprocessor::Standard.apply(&frame, config);
        save_mask(mask_out, &mask)?;
        println!("Mask written to {}", mask_out.display());
    }

    let candidates = match scale {
        Some(factor) => ScalePass::at(config, factor).run(&frame.luma(), width, height, config),
        None => Scanner::new(config.clone()).detect(&frame),
    };

    println!("Found {} finder patterns", candidates.len());
    print_candidates(&candidates);
    Ok(())
}

fn config_cmd(config: &ScanConfig) -> Result<(), ToolError> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn print_candidates(candidates: &[FinderPatternCandidate]) {
    for (i, c) in candidates.iter().enumerate() {
        println!(
            "  Pattern {}: center=({:.1}, {:.1}) area={:.0} outline_points={}",
            i,
            c.center.x,
            c.center.y,
            c.area,
            c.outline.len()
        );
    }
}
