use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use mediafilter::{
    Background, Filter, FilterConfig, ImageJob, MediaFilterError, MediaKind, VideoSession,
};

#[derive(Parser, Debug)]
#[command(name = "mediafilter", version, about = "Sketch and cartoon filters for images and video")]
struct Cli {
    /// Source image or video.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory for the stylized output.
    #[arg(long)]
    out_dir: PathBuf,

    /// Stylization to apply.
    #[arg(long, value_enum)]
    filter: FilterChoice,

    /// Sketch background; defaults to rendering both.
    #[arg(long, value_enum)]
    bg: Option<BgChoice>,

    /// JSON file overriding default parameters.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FilterChoice {
    Sketch,
    Cartoon,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum BgChoice {
    White,
    Black,
    Both,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => FilterConfig::from_path(path)?,
        None => FilterConfig::default(),
    };

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || cancel.store(true, Ordering::Relaxed))
            .context("install Ctrl-C handler")?;
    }

    for filter in filters(cli.filter, cli.bg)? {
        let out = run_one(&cli.in_path, &cli.out_dir, filter, &cfg, &cancel)?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn filters(choice: FilterChoice, bg: Option<BgChoice>) -> anyhow::Result<Vec<Filter>> {
    Ok(match (choice, bg) {
        (FilterChoice::Cartoon, None) => vec![Filter::Cartoon],
        (FilterChoice::Cartoon, Some(_)) => {
            anyhow::bail!("--bg only applies to the sketch filter")
        }
        (FilterChoice::Sketch, Some(BgChoice::White)) => vec![Filter::Sketch(Background::White)],
        (FilterChoice::Sketch, Some(BgChoice::Black)) => vec![Filter::Sketch(Background::Black)],
        (FilterChoice::Sketch, None | Some(BgChoice::Both)) => vec![
            Filter::Sketch(Background::White),
            Filter::Sketch(Background::Black),
        ],
    })
}

fn run_one(
    source: &Path,
    out_dir: &Path,
    filter: Filter,
    cfg: &FilterConfig,
    cancel: &Arc<AtomicBool>,
) -> anyhow::Result<PathBuf> {
    if cancel.load(Ordering::Relaxed) {
        return Err(MediaFilterError::Cancelled.into());
    }
    let out = match MediaKind::from_path(source) {
        MediaKind::Image => ImageJob::new(cfg.clone())?.run(source, out_dir, filter)?,
        MediaKind::Video => VideoSession::new(cfg.clone())?
            .with_cancel(Arc::clone(cancel))
            .run(source, out_dir, filter)?,
    };
    Ok(out)
}
