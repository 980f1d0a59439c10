use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use frameid::{
    Campaign, CropRect, DirectoryHost, EditorConfig, EditorSession, FrameAsset, FrameIdError,
    ImageLoader, ImageSource, JsonLinesStats, LocalUploads, NoStats, PlatformCapabilities,
    ShareIntent, ShareTarget, StatsSink, Vec2,
};

#[derive(Parser, Debug)]
#[command(name = "frameid", version)]
struct Cli {
    /// Editor configuration JSON. Missing keys use the defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the detected photo area of a frame as JSON.
    Detect(DetectArgs),
    /// Composite a photo behind a frame and export the PNG.
    Compose(ComposeArgs),
    /// Print the share action for a campaign.
    Share(ShareArgs),
}

#[derive(Args, Debug)]
struct DetectArgs {
    /// Frame image: file path, data URL or uploads path.
    #[arg(long)]
    frame: String,

    /// Directory serving `/uploads/<file>` frame paths.
    #[arg(long, default_value = ".")]
    uploads_root: PathBuf,
}

#[derive(Args, Debug)]
struct CampaignArgs {
    /// Campaign slug.
    #[arg(long, default_value = "twibbon")]
    slug: String,

    /// Campaign name, used in the output filename.
    #[arg(long, default_value = "frame")]
    name: String,

    #[arg(long)]
    description: Option<String>,
}

impl CampaignArgs {
    fn campaign(&self) -> Campaign {
        Campaign {
            slug: self.slug.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Frame image: file path, data URL or uploads path.
    #[arg(long)]
    frame: String,

    /// User photo file.
    #[arg(long)]
    photo: PathBuf,

    /// Directory receiving the export.
    #[arg(long)]
    out_dir: PathBuf,

    #[command(flatten)]
    campaign: CampaignArgs,

    /// Explicit crop `x,y,w,h` in photo pixels. Defaults to the centered cover crop.
    #[arg(long, value_parser = parse_crop, conflicts_with = "freehand")]
    crop: Option<CropRect>,

    /// Use the fitted pan/zoom/rotate placement instead of a crop.
    #[arg(long)]
    freehand: bool,

    /// Freehand photo center `x,y` on the output canvas.
    #[arg(long, value_parser = parse_point, requires = "freehand")]
    translate: Option<Vec2>,

    /// Freehand zoom relative to the fitted size.
    #[arg(long, requires = "freehand")]
    scale: Option<f64>,

    /// Freehand rotation in degrees.
    #[arg(long, requires = "freehand")]
    rotate: Option<f64>,

    /// Pick the export path from this browser user agent.
    #[arg(long)]
    user_agent: Option<String>,

    /// Simulate a popup blocker on the save-image path.
    #[arg(long)]
    block_popups: bool,

    /// Append download counter updates to this JSON-lines file.
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Directory serving `/uploads/<file>` frame paths.
    #[arg(long, default_value = ".")]
    uploads_root: PathBuf,
}

#[derive(Args, Debug)]
struct ShareArgs {
    /// whatsapp, facebook, twitter or instagram.
    #[arg(long, value_parser = parse_target)]
    target: ShareTarget,

    /// Site origin hosting the campaign page.
    #[arg(long, default_value = "https://frame.id")]
    origin: String,

    #[command(flatten)]
    campaign: CampaignArgs,

    /// Append share counter updates to this JSON-lines file.
    #[arg(long)]
    stats: Option<PathBuf>,
}

fn parse_numbers<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<_, _>>()?;
    parts
        .try_into()
        .map_err(|_| format!("expected {N} comma-separated numbers"))
}

fn parse_crop(s: &str) -> Result<CropRect, String> {
    let [x, y, w, h] = parse_numbers::<4>(s)?;
    CropRect::new(x, y, w, h).map_err(|e| e.to_string())
}

fn parse_point(s: &str) -> Result<Vec2, String> {
    let [x, y] = parse_numbers::<2>(s)?;
    Ok(Vec2::new(x, y))
}

fn parse_target(s: &str) -> Result<ShareTarget, String> {
    s.parse().map_err(|e: FrameIdError| e.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = match &cli.config {
        Some(path) => EditorConfig::from_json_file(path)?,
        None => EditorConfig::default(),
    };

    let res = match cli.cmd {
        Command::Detect(args) => cmd_detect(&cfg, args).await,
        Command::Compose(args) => cmd_compose(cfg, args).await,
        Command::Share(args) => cmd_share(&cfg, args),
    };
    if let Err(err) = &res
        && let Some(e) = err.downcast_ref::<FrameIdError>()
    {
        eprintln!("{}", e.user_message());
    }
    res
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn image_source(arg: &str) -> ImageSource {
    if arg.starts_with("data:") {
        ImageSource::DataUrl(arg.to_string())
    } else if arg.starts_with("/api/images/uploads/") || arg.starts_with("/uploads/") {
        ImageSource::Url(arg.to_string())
    } else {
        ImageSource::Path(PathBuf::from(arg))
    }
}

fn loader(cfg: &EditorConfig, uploads_root: &Path) -> ImageLoader {
    let uploads = LocalUploads::new(uploads_root);
    let loader = ImageLoader::new(cfg.max_upload_bytes);
    tracing::debug!(
        max_bytes = loader.max_bytes(),
        uploads = %uploads.root().display(),
        "image loader ready"
    );
    loader.with_fetcher(Arc::new(uploads))
}

fn stats_sink(path: Option<PathBuf>) -> Box<dyn StatsSink> {
    match path {
        Some(p) => Box::new(JsonLinesStats::new(p)),
        None => Box::new(NoStats),
    }
}

async fn cmd_detect(cfg: &EditorConfig, args: DetectArgs) -> anyhow::Result<()> {
    let loader = loader(cfg, &args.uploads_root);
    let bitmap = loader.load(image_source(&args.frame)).await?;

    let mut session = EditorSession::new(
        cfg.clone(),
        PlatformCapabilities::desktop(),
        Campaign {
            slug: String::new(),
            name: String::new(),
            description: None,
        },
    )?;
    let ticket = session.begin_frame_load();
    session.finish_frame_load(ticket, Ok(FrameAsset::new(bitmap)))?;
    let report = session
        .detection()
        .context("frame produced no detection report")?;

    let out = serde_json::json!({
        "canvas": session.canvas(),
        "photo_area": report.area,
        "source": report.source,
        "qualifying_pixels": report.qualifying_pixels,
        "fill_ratio": report.fill_ratio,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

async fn cmd_compose(cfg: EditorConfig, args: ComposeArgs) -> anyhow::Result<()> {
    let loader = loader(&cfg, &args.uploads_root);
    let caps = args
        .user_agent
        .as_deref()
        .map(PlatformCapabilities::from_user_agent)
        .unwrap_or_default();

    let mut session = EditorSession::new(cfg, caps, args.campaign.campaign())?;
    session
        .load_frame(&loader, image_source(&args.frame))
        .await?;
    session
        .load_photo(&loader, ImageSource::Path(args.photo.clone()))
        .await?;

    if args.freehand {
        let fitted = session
            .transform()
            .context("freshly loaded photo has no freehand transform")?;
        let t = fitted
            .with_translate(args.translate.unwrap_or(fitted.translate()))
            .with_scale(args.scale.unwrap_or(fitted.scale()))
            .with_rotation_deg(args.rotate.unwrap_or(fitted.rotation_deg()));
        session.set_transform(t)?;
    } else if let Some(crop) = args.crop {
        session.set_crop(crop)?;
    } else {
        session.use_cover_crop()?;
    }
    session.compose()?;

    let mut host = DirectoryHost::new(&args.out_dir).with_popups_allowed(!args.block_popups);
    let mut stats = stats_sink(args.stats);
    let receipt = session.export(&mut host, stats.as_mut())?;

    println!("{}", serde_json::to_string_pretty(&receipt)?);
    for path in host.written() {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_share(cfg: &EditorConfig, args: ShareArgs) -> anyhow::Result<()> {
    let session = EditorSession::new(
        cfg.clone(),
        PlatformCapabilities::desktop(),
        args.campaign.campaign(),
    )?;
    let mut host = DirectoryHost::new(".");
    let mut stats = stats_sink(args.stats);
    let intent = session.share(args.target, &args.origin, &mut host, stats.as_mut())?;

    match intent {
        ShareIntent::OpenUrl(url) => println!("{url}"),
        ShareIntent::CopyLink(url) => {
            eprintln!("copy this link to share on {}:", args.target.as_str());
            println!("{url}");
        }
    }
    Ok(())
}
