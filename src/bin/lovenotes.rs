use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

use lovenotes::{
    Card, CardId, EditorSession, ExportMode, NoticeLevel, SessionMode, StudioConfig, catalog,
};

#[derive(Parser, Debug)]
#[command(name = "lovenotes", version, about = "Compose, store and export greeting cards")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON config file; `LOVENOTES_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    paths: PathArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct PathArgs {
    /// Directory that asset paths resolve against.
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Card store directory.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Legacy key/value storage file consulted on store misses.
    #[arg(long, global = true)]
    legacy: Option<PathBuf>,

    /// Page location that share links are built on.
    #[arg(long, global = true)]
    page_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a card to PNG.
    Export(ExportArgs),
    /// Store a card document and print its share link.
    Save(SaveArgs),
    /// Open a page URL the way the editor does and report the result.
    Open(OpenArgs),
    /// Extract the video id from an audio link.
    AudioId(AudioIdArgs),
    /// List the built-in catalog.
    Catalog(CatalogArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Card JSON document to render.
    #[arg(long = "in", conflicts_with = "id", required_unless_present = "id")]
    in_path: Option<PathBuf>,

    /// Id of a stored card to render.
    #[arg(long)]
    id: Option<String>,

    /// Output PNG path. Defaults to `love-note.png` in the current directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Canvas size to render at.
    #[arg(long, value_enum, default_value_t = ModeChoice::Editor)]
    mode: ModeChoice,

    /// Pixel density multiplier.
    #[arg(long)]
    supersample: Option<u32>,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Skip installed system fonts.
    #[arg(long)]
    no_system_fonts: bool,
}

#[derive(Args, Debug)]
struct SaveArgs {
    /// Card JSON document to store.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Overwrite this card id instead of allocating a new one.
    #[arg(long)]
    id: Option<String>,
}

#[derive(Args, Debug)]
struct OpenArgs {
    /// Page URL, optionally carrying `?card=<id>`.
    url: String,

    /// Write the opened card document here.
    #[arg(long)]
    dump: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AudioIdArgs {
    /// Pasted video link.
    link: String,
}

#[derive(Args, Debug)]
struct CatalogArgs {
    /// Which part of the catalog to list.
    #[arg(value_enum, default_value_t = CatalogPart::All)]
    part: CatalogPart,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Editor,
    View,
}

impl From<ModeChoice> for ExportMode {
    fn from(m: ModeChoice) -> Self {
        match m {
            ModeChoice::Editor => ExportMode::Editor,
            ModeChoice::View => ExportMode::View,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CatalogPart {
    All,
    Stickers,
    Backgrounds,
    Templates,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = load_config(cli.config.as_deref(), &cli.paths)?;
    match cli.cmd {
        Command::Export(args) => cmd_export(cfg, args),
        Command::Save(args) => cmd_save(&cfg, args),
        Command::Open(args) => cmd_open(&cfg, args),
        Command::AudioId(args) => cmd_audio_id(args),
        Command::Catalog(args) => cmd_catalog(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>, paths: &PathArgs) -> anyhow::Result<StudioConfig> {
    let mut cfg = match path {
        Some(p) => StudioConfig::from_json_file(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => StudioConfig::default(),
    };
    cfg.apply_env();
    if let Some(v) = &paths.assets {
        cfg.assets_root = v.clone();
    }
    if let Some(v) = &paths.store {
        cfg.store_dir = v.clone();
    }
    if let Some(v) = &paths.legacy {
        cfg.legacy_file = Some(v.clone());
    }
    if let Some(v) = &paths.page_url {
        cfg.page_url = v.clone();
    }
    Ok(cfg)
}

fn read_card(path: &Path) -> anyhow::Result<Card> {
    let bytes = std::fs::read(path).with_context(|| format!("read card '{}'", path.display()))?;
    Card::from_json_slice(&bytes).with_context(|| format!("parse card '{}'", path.display()))
}

fn parse_id(raw: &str) -> anyhow::Result<CardId> {
    CardId::parse(raw).with_context(|| format!("invalid card id '{raw}'"))
}

fn cmd_export(mut cfg: StudioConfig, args: ExportArgs) -> anyhow::Result<()> {
    if let Some(n) = args.supersample {
        cfg.supersample = n;
    }
    if args.no_system_fonts {
        cfg.load_system_fonts = false;
    }
    cfg.font_dirs.extend(args.font_dirs);
    cfg.validate()?;

    let card = match (&args.in_path, &args.id) {
        (Some(path), _) => read_card(path)?,
        (None, Some(raw)) => {
            let id = parse_id(raw)?;
            pollster::block_on(cfg.repository().load(&id))?
                .with_context(|| format!("card '{id}' not found"))?
        }
        (None, None) => anyhow::bail!("either --in or --id is required"),
    };

    let loader = cfg.asset_loader();
    let fonts = cfg.font_book();
    let png = pollster::block_on(lovenotes::export_png(
        &card,
        cfg.export_opts(args.mode.into()),
        &loader,
        &fonts,
    ))
    .context("export card")?;

    let out = args.out.unwrap_or_else(|| PathBuf::from(&png.file_name));
    png.write_to(&out)
        .with_context(|| format!("write png '{}'", out.display()))?;
    eprintln!("wrote {} ({}x{})", out.display(), png.width, png.height);
    Ok(())
}

fn cmd_save(cfg: &StudioConfig, args: SaveArgs) -> anyhow::Result<()> {
    let page = cfg.page_url()?;
    let card = read_card(&args.in_path)?;
    let existing = args.id.as_deref().map(parse_id).transpose()?;

    let id = pollster::block_on(cfg.repository().save(existing.as_ref(), &card))
        .context("save card")?;
    println!("{}", lovenotes::share_url(&page, &id));
    Ok(())
}

fn cmd_open(cfg: &StudioConfig, args: OpenArgs) -> anyhow::Result<()> {
    let page = url::Url::parse(&args.url).with_context(|| format!("invalid url '{}'", args.url))?;
    let mut session = EditorSession::new(
        cfg.repository(),
        Arc::new(cfg.asset_loader()),
        Arc::new(lovenotes::FontBook::new()),
        cfg.page_url()?,
    );

    let mode = pollster::block_on(session.open_entry(&page));
    for notice in session.take_notices() {
        match notice.level {
            NoticeLevel::Info => eprintln!("{}", notice.message),
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
        }
    }
    match mode {
        SessionMode::Edit => println!("mode: edit"),
        SessionMode::View => {
            println!("mode: view");
            if let Some(id) = session.card_id() {
                println!("card: {id}");
            }
            println!("elements: {}", session.scene().len());
            if let Some(embed) = session.audio_embed_url() {
                println!("audio: {embed}");
            }
        }
    }

    if let Some(path) = &args.dump {
        let json = session.card().to_json_pretty()?;
        std::fs::write(path, json).with_context(|| format!("write '{}'", path.display()))?;
    }
    Ok(())
}

fn cmd_audio_id(args: AudioIdArgs) -> anyhow::Result<()> {
    let id = lovenotes::extract_video_id(&args.link)
        .with_context(|| format!("no valid video id in '{}'", args.link))?;
    println!("{id}");
    println!("{}", id.embed_url());
    Ok(())
}

fn cmd_catalog(args: CatalogArgs) -> anyhow::Result<()> {
    let want = |p: CatalogPart| args.part == CatalogPart::All || args.part == p;
    if want(CatalogPart::Stickers) {
        for s in catalog::stickers() {
            println!("sticker\t{}\t{}", s.id, s.image);
        }
    }
    if want(CatalogPart::Backgrounds) {
        for b in catalog::backgrounds() {
            println!("background\t{}\t{}\t{}", b.id, b.name, b.value);
        }
    }
    if want(CatalogPart::Templates) {
        for t in catalog::templates() {
            println!("template\t{}\t{}\t{} elements", t.id, t.name, t.elements.len());
        }
    }
    Ok(())
}
