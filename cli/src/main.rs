mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use badge_core::{BadgeDraft, BadgePublisher, ContentStore, HttpContentStore, PublishedBadge};
use badge_media::{NormalizeOptions, SourceImage, inspect, normalize_to_square};
use badge_memory_storage::MemoryContentStore;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use crate::config::{CliOverrides, ResolvedConfig};

const IMAGE_REJECTED_HINT: &str = "the image was rejected; pick a different image";
const INPUT_REJECTED_HINT: &str =
    "the badge was rejected; pick a different image or fix the name, description or location";
const DEFAULT_LOG_FILTER: &str = "touchbadge=info,badge_core=info,badge_media=info";
const VERBOSE_LOG_FILTER: &str = "touchbadge=debug,badge_core=debug,badge_media=debug";

#[derive(Debug, Parser)]
#[command(name = "touchbadge")]
#[command(about = "Prepare and publish Touch Badge artwork")]
struct Cli {
    /// TOML config file (default: ./touchbadge.toml when present)
    #[arg(long, global = true, env = "TOUCHBADGE_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging for touchbadge crates
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Crop an image to its centered square and re-encode it as JPEG
    Normalize {
        /// Source image
        input: PathBuf,

        /// Output path (default: <input>-badge.jpg next to the input)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// JPEG quality, 1-100
        #[arg(long)]
        quality: Option<u8>,
    },

    /// Show what normalization would do, without encoding
    Inspect {
        /// Source image
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Normalize artwork and upload it with its metadata
    Publish {
        /// Source image
        #[arg(long)]
        image: PathBuf,

        /// Badge name
        #[arg(long)]
        name: String,

        /// Badge description
        #[arg(long, default_value = "")]
        description: String,

        /// Where the badge is issued
        #[arg(long)]
        location: Option<String>,

        /// Storage endpoint, overrides [storage].endpoint
        #[arg(long)]
        endpoint: Option<String>,

        /// JPEG quality, 1-100
        #[arg(long)]
        quality: Option<u8>,

        /// Keep uploads in memory instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let overlay = config::load_overlay(cli.config.as_deref())?;

    match cli.cmd {
        Command::Normalize {
            input,
            output,
            quality,
        } => {
            let config = ResolvedConfig::new(
                overlay,
                CliOverrides {
                    jpeg_quality: quality,
                    ..Default::default()
                },
            )?;
            cmd_normalize(&config.normalize, &input, output)
        }
        Command::Inspect { input, json } => {
            let config = ResolvedConfig::new(overlay, CliOverrides::default())?;
            cmd_inspect(&config.normalize, &input, json)
        }
        Command::Publish {
            image,
            name,
            description,
            location,
            endpoint,
            quality,
            dry_run,
        } => {
            let config = ResolvedConfig::new(
                overlay,
                CliOverrides {
                    jpeg_quality: quality,
                    endpoint,
                },
            )?;
            let draft = BadgeDraft {
                image: read_source(&image)?,
                name,
                description,
                location,
                recipient: None,
            };
            cmd_publish(&config, &draft, dry_run).await
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn print(v: serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&v).context("encode output")?);
    Ok(())
}

fn mime_type_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

fn read_source(path: &Path) -> Result<SourceImage> {
    let data = std::fs::read(path).with_context(|| format!("read image {}", path.display()))?;
    let mime_type = path
        .extension()
        .and_then(|e| e.to_str())
        .map(mime_type_for_extension)
        .unwrap_or("application/octet-stream");
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("badge")
        .to_string();
    Ok(SourceImage::new(data, mime_type, filename))
}

/// `photo.png` -> `photo-badge.jpg` in the same directory
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("badge");
    input.with_file_name(format!("{stem}-badge.jpg"))
}

// ── Commands ────────────────────────────────────────────────────────────────

fn cmd_normalize(options: &NormalizeOptions, input: &Path, output: Option<PathBuf>) -> Result<()> {
    let source = read_source(input)?;
    let normalized = normalize_to_square(&source, options).map_err(|e| {
        let input_error = e.is_input_error();
        let err = anyhow::Error::new(e).context(format!("normalize {}", input.display()));
        if input_error {
            err.context(IMAGE_REJECTED_HINT)
        } else {
            err
        }
    })?;

    let output = output.unwrap_or_else(|| default_output_path(input));
    std::fs::write(&output, &normalized.data)
        .with_context(|| format!("write {}", output.display()))?;
    tracing::info!(output = %output.display(), side = normalized.side, "wrote badge artwork");

    print(json!({
        "output": output.display().to_string(),
        "side": normalized.side,
        "bytes": normalized.data.len(),
        "crop": normalized.crop,
        "source_dimensions": [normalized.source_dimensions.0, normalized.source_dimensions.1],
    }))
}

fn cmd_inspect(options: &NormalizeOptions, input: &Path, as_json: bool) -> Result<()> {
    let source = read_source(input)?;
    let info = inspect(&source, options).with_context(|| format!("inspect {}", input.display()))?;

    if as_json {
        return print(serde_json::to_value(&info).context("encode image info")?);
    }
    let (width, height) = info.dimensions;
    println!("type:        {}", info.detected_mime_type);
    println!("dimensions:  {width}x{height}");
    match info.orientation {
        Some(o) => println!("orientation: {o}"),
        None => println!("orientation: none"),
    }
    println!(
        "crop:        {side}x{side} at ({x}, {y})",
        side = info.crop.side,
        x = info.crop.x,
        y = info.crop.y
    );
    Ok(())
}

async fn cmd_publish(config: &ResolvedConfig, draft: &BadgeDraft, dry_run: bool) -> Result<()> {
    let published = if dry_run {
        publish_to(MemoryContentStore::new(), &config.normalize, draft).await?
    } else {
        let http = config
            .storage
            .http_store_config(|name| std::env::var(name).ok())?;
        let store = HttpContentStore::new(http).context("configure storage")?;
        publish_to(store, &config.normalize, draft).await?
    };

    print(json!({
        "dry_run": dry_run,
        "token_uri": published.token_uri(),
        "image": published.image,
        "crop": published.crop,
        "metadata": published.metadata,
        "metadata_sha256": published.metadata_object.id,
    }))
}

async fn publish_to<S: ContentStore>(
    store: S,
    options: &NormalizeOptions,
    draft: &BadgeDraft,
) -> Result<PublishedBadge> {
    tracing::debug!(backend = ?store.backend(), "publishing badge");
    let publisher = BadgePublisher::new(store, options.clone());
    publisher.publish(draft).await.map_err(|e| {
        let user_error = e.is_user_error();
        let err = anyhow::Error::new(e).context("publish badge");
        if user_error {
            err.context(INPUT_REJECTED_HINT)
        } else {
            err
        }
    })
}

#[cfg(test)]
mod tests {
    use badge_test_utils::images::solid_png;

    use super::*;

    #[test]
    fn cli_parses_commands() {
        let cli = Cli::try_parse_from([
            "touchbadge",
            "--verbose",
            "publish",
            "--image",
            "art.png",
            "--name",
            "Meetup",
            "--dry-run",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.cmd {
            Command::Publish {
                image,
                name,
                description,
                dry_run,
                ..
            } => {
                assert_eq!(image, PathBuf::from("art.png"));
                assert_eq!(name, "Meetup");
                assert_eq!(description, "");
                assert!(dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["touchbadge", "normalize", "in.png", "-o", "out.jpg"]).unwrap();
        assert!(matches!(cli.cmd, Command::Normalize { output: Some(_), .. }));

        assert!(Cli::try_parse_from(["touchbadge", "publish", "--name", "x"]).is_err());
    }

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(mime_type_for_extension("JPG"), "image/jpeg");
        assert_eq!(mime_type_for_extension("png"), "image/png");
        assert_eq!(mime_type_for_extension("txt"), "application/octet-stream");
    }

    #[test]
    fn default_output_is_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("/tmp/photos/cat.png")),
            PathBuf::from("/tmp/photos/cat-badge.jpg")
        );
        assert_eq!(
            default_output_path(Path::new("cat.jpg")),
            PathBuf::from("cat-badge.jpg")
        );
    }

    #[test]
    fn normalize_writes_square_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("wide.png");
        std::fs::write(&input, solid_png(40, 20, [200, 10, 10])).unwrap();

        cmd_normalize(&NormalizeOptions::default(), &input, None).unwrap();

        let written = std::fs::read(dir.path().join("wide-badge.jpg")).unwrap();
        assert_eq!(&written[..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn normalize_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("art.dat");
        std::fs::write(&input, solid_png(8, 8, [0, 0, 0])).unwrap();

        assert!(cmd_normalize(&NormalizeOptions::default(), &input, None).is_err());
        assert!(!dir.path().join("art-badge.jpg").exists());
    }

    #[test]
    fn undecodable_image_asks_for_another() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.png");
        std::fs::write(&input, b"").unwrap();

        let err = cmd_normalize(&NormalizeOptions::default(), &input, None).unwrap_err();
        assert_eq!(err.to_string(), IMAGE_REJECTED_HINT);
        assert!(format!("{err:#}").contains("Failed to decode image"));
    }

    #[tokio::test]
    async fn rejected_badge_input_gets_hint() {
        let draft = BadgeDraft {
            image: SourceImage::new(Vec::new(), "image/png", "empty.png"),
            name: "Meetup".to_string(),
            description: String::new(),
            location: None,
            recipient: None,
        };
        let err = publish_to(MemoryContentStore::new(), &NormalizeOptions::default(), &draft)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), INPUT_REJECTED_HINT);

        let mut blank_name = draft.clone();
        blank_name.name = "  ".to_string();
        blank_name.image = SourceImage::new(solid_png(8, 8, [1, 2, 3]), "image/png", "ok.png");
        let err = publish_to(MemoryContentStore::new(), &NormalizeOptions::default(), &blank_name)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), INPUT_REJECTED_HINT);
    }

    #[tokio::test]
    async fn storage_failure_has_no_input_hint() {
        let store = MemoryContentStore::with_limits(
            badge_memory_storage::MemoryStoreLimits::default().with_max_file_size(1),
        );
        let draft = BadgeDraft {
            image: SourceImage::new(solid_png(8, 8, [1, 2, 3]), "image/png", "ok.png"),
            name: "Meetup".to_string(),
            description: String::new(),
            location: None,
            recipient: None,
        };
        let err = publish_to(store, &NormalizeOptions::default(), &draft)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "publish badge");
    }

    #[tokio::test]
    async fn dry_run_publish_uses_memory_store() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("art.png");
        std::fs::write(&input, solid_png(30, 60, [0, 120, 0])).unwrap();

        let draft = BadgeDraft {
            image: read_source(&input).unwrap(),
            name: "Meetup".to_string(),
            description: "Thanks".to_string(),
            location: None,
            recipient: None,
        };
        let published = publish_to(MemoryContentStore::new(), &NormalizeOptions::default(), &draft)
            .await
            .unwrap();
        assert_eq!(published.crop.side, 30);
        assert!(published.token_uri().starts_with("memory://"));
        assert_eq!(published.metadata.image, published.image.url);
    }
}
