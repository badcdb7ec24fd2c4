use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use daypart::config::{
    DEFAULT_DAY_THRESHOLD, DEFAULT_EVENING_THRESHOLD, DEFAULT_FRAME_STEP,
    DEFAULT_MORNING_THRESHOLD, DEFAULT_NIGHT_THRESHOLD,
};
use daypart::{report, FfmpegBackend, Pipeline, PipelineConfig, ThresholdSet};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short = 'i', long = "input", help = "input video to classify")]
    input: PathBuf,

    #[arg(short = 'o', long = "output", help = "annotated output video")]
    output: PathBuf,

    #[arg(long = "plot", help = "brightness trend plot (svg), defaults to <output>_brightness.svg")]
    plot: Option<PathBuf>,

    #[arg(long = "no-plot", help = "skip the brightness trend plot")]
    no_plot: bool,

    #[arg(
        long = "day-threshold",
        default_value_t = DEFAULT_DAY_THRESHOLD,
        allow_negative_numbers = true,
    )]
    day_threshold: f64,

    #[arg(
        long = "evening-threshold",
        default_value_t = DEFAULT_EVENING_THRESHOLD,
        allow_negative_numbers = true,
    )]
    evening_threshold: f64,

    // reported and plotted only; the cascade reaches Night by elimination
    #[arg(
        long = "night-threshold",
        default_value_t = DEFAULT_NIGHT_THRESHOLD,
        allow_negative_numbers = true,
    )]
    night_threshold: f64,

    #[arg(
        long = "morning-threshold",
        default_value_t = DEFAULT_MORNING_THRESHOLD,
        allow_negative_numbers = true,
    )]
    morning_threshold: f64,

    #[arg(
        short = 's',
        long = "frame-step",
        default_value_t = DEFAULT_FRAME_STEP,
        help = "process every Nth frame",
    )]
    frame_step: u32,
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new(&self.input, &self.output)
            .with_thresholds(ThresholdSet {
                day: self.day_threshold,
                evening: self.evening_threshold,
                morning: self.morning_threshold,
                night: self.night_threshold,
            })
            .with_frame_step(self.frame_step)
    }

    fn plot_path(&self) -> Option<PathBuf> {
        if self.no_plot {
            return None;
        }
        if let Some(plot) = &self.plot {
            return Some(plot.clone());
        }
        let stem = self
            .output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        Some(self.output.with_file_name(format!("{stem}_brightness.svg")))
    }
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("daypart=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = args.pipeline_config();
    let thresholds = config.thresholds;
    info!(?thresholds, frame_step = config.frame_step, "starting daypart");

    let pipeline = Pipeline::new(config)?;
    let run = match pipeline.run(&FfmpegBackend::new()) {
        Ok(run) => run,
        Err(e) => {
            if let Some(partial) = e.partial_series() {
                error!(samples = partial.len(), "run aborted; partial output kept");
            }
            return Err(e).context("video classification failed");
        }
    };

    let plot = args.plot_path();
    report::publish(
        &run.series,
        &thresholds,
        plot.as_deref(),
        &mut std::io::stdout().lock(),
    )
    .context("failed to report results")?;

    Ok(())
}
