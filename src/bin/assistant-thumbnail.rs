use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use assistant_thumbnail::{
    AppState, AssistantId, AssistantStore, AvatarBucket, AvatarConfig, AvatarErrorPolicy,
    FontSet, FsStore, RendererConfig, Theme, ThumbnailRenderer,
};
use clap::{Args, Parser, Subcommand};
use sha2::Digest as _;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "assistant-thumbnail", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve thumbnails over HTTP.
    Serve(ServeArgs),
    /// Render one assistant's thumbnail to a PNG file.
    Render(RenderArgs),
    /// Print the resolved font faces (family, weight, SHA-256 of the font bytes).
    Fonts(FontArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "THUMBNAIL_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    renderer: RendererArgs,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Assistant id (24 hex characters).
    #[arg(long)]
    id: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    renderer: RendererArgs,
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Directory with `assistants/<id>.json` and `avatars/<id>`.
    #[arg(long, env = "THUMBNAIL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// MongoDB connection string; takes precedence over `--data-dir`.
    #[cfg(feature = "mongodb")]
    #[arg(long, env = "MONGODB_URL")]
    mongo_uri: Option<String>,

    #[cfg(feature = "mongodb")]
    #[arg(long, env = "MONGODB_DB_NAME", default_value = "chat-ui")]
    mongo_db: String,
}

#[derive(Args, Debug)]
struct FontArgs {
    /// Regular face (TTF/OTF). Without both paths, system sans-serif faces are used.
    #[arg(long, env = "THUMBNAIL_FONT_REGULAR", requires = "font_bold")]
    font_regular: Option<PathBuf>,

    /// Bold face (TTF/OTF).
    #[arg(long, env = "THUMBNAIL_FONT_BOLD", requires = "font_regular")]
    font_bold: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RendererArgs {
    #[command(flatten)]
    fonts: FontArgs,

    /// Primary color: palette name (`blue`, `emerald`, ...) or `#RRGGBB`.
    #[arg(long, env = "PUBLIC_APP_COLOR", default_value = "blue")]
    app_color: String,

    /// Brand shown in the card footer.
    #[arg(long, env = "PUBLIC_APP_NAME")]
    brand: Option<String>,

    /// Upper bound for one request, lookup to PNG.
    #[arg(long, default_value_t = 10_000)]
    request_timeout_ms: u64,

    /// What to do with an avatar that cannot be read or decoded.
    #[arg(long, value_enum, default_value_t = AvatarErrorPolicy::Degrade)]
    avatar_errors: AvatarErrorPolicy,

    /// Largest avatar blob accepted, in bytes.
    #[arg(long, default_value_t = AvatarConfig::default().max_bytes)]
    max_avatar_bytes: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,assistant_thumbnail=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Render(args) => cmd_render(args).await,
        Command::Fonts(args) => cmd_fonts(args),
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let renderer = build_renderer(&args.store, &args.renderer).await?;
    assistant_thumbnail::serve(Arc::new(AppState::new(renderer)), args.bind).await
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let id = AssistantId::parse(&args.id)?;
    let renderer = build_renderer(&args.store, &args.renderer).await?;
    let png = renderer.render(&id.to_string()).await?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_fonts(args: FontArgs) -> anyhow::Result<()> {
    let fonts = load_fonts(&args)?;
    for (label, face) in [("regular", fonts.regular()), ("bold", fonts.bold())] {
        println!("{label}:");
        println!("  family: {}", face.family);
        println!("  weight: {}", face.weight);
        let sha = hex::encode(sha2::Sha256::digest(face.bytes.as_slice()));
        println!("  sha256: {sha}");
    }
    Ok(())
}

fn load_fonts(args: &FontArgs) -> anyhow::Result<FontSet> {
    let fonts = match (&args.font_regular, &args.font_bold) {
        (Some(regular), Some(bold)) => FontSet::from_files(regular, bold)?,
        _ => FontSet::from_system().context("no font paths given and no system fonts usable")?,
    };
    Ok(fonts)
}

async fn build_renderer(
    store: &StoreArgs,
    args: &RendererArgs,
) -> anyhow::Result<ThumbnailRenderer> {
    let fonts = Arc::new(load_fonts(&args.fonts)?);
    let config = RendererConfig {
        request_timeout_ms: args.request_timeout_ms,
        avatar: AvatarConfig {
            max_bytes: args.max_avatar_bytes,
            on_error: args.avatar_errors,
            ..AvatarConfig::default()
        },
        theme: Theme {
            brand: args.brand.clone().filter(|b| !b.trim().is_empty()),
            ..Theme::default()
        }
        .with_primary(&args.app_color)?,
        ..RendererConfig::default()
    };

    let (assistants, avatars) = open_store(store).await?;
    Ok(ThumbnailRenderer::new(assistants, avatars, fonts, config))
}

async fn open_store(
    args: &StoreArgs,
) -> anyhow::Result<(Arc<dyn AssistantStore>, Arc<dyn AvatarBucket>)> {
    #[cfg(feature = "mongodb")]
    if let Some(uri) = &args.mongo_uri {
        let store = Arc::new(assistant_thumbnail::MongoStore::connect(uri, &args.mongo_db).await?);
        tracing::info!(db = %args.mongo_db, "using mongodb store");
        let assistants: Arc<dyn AssistantStore> = store.clone();
        let avatars: Arc<dyn AvatarBucket> = store;
        return Ok((assistants, avatars));
    }

    let dir = args
        .data_dir
        .clone()
        .context("no store configured: pass --data-dir (or --mongo-uri with the mongodb feature)")?;
    anyhow::ensure!(dir.is_dir(), "data dir '{}' is not a directory", dir.display());
    let store = Arc::new(FsStore::new(dir));
    tracing::info!(dir = %store.root().display(), "using filesystem store");
    let assistants: Arc<dyn AssistantStore> = store.clone();
    let avatars: Arc<dyn AvatarBucket> = store;
    Ok((assistants, avatars))
}
