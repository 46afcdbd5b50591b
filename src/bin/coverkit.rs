use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "coverkit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw styled text lines over an image.
    Cover(CoverArgs),
    /// Overlay every PNG element onto every background image.
    Overlay(OverlayArgs),
    /// Group file names by the text after `_{marker}_` and write the groups as JSON.
    Group(GroupArgs),
}

#[derive(Parser, Debug)]
struct CoverArgs {
    /// Source image.
    #[arg(long)]
    image: PathBuf,

    /// Output image; the extension selects the format.
    #[arg(long)]
    out: PathBuf,

    /// Text lines as a JSON array of strings, e.g. '["line one", "line two"]'.
    #[arg(long)]
    texts: String,

    /// CSS stylesheet with `.text-block p` and `p.lineN` rules.
    #[arg(long)]
    style: PathBuf,

    /// Main font file (defaults to a platform font).
    #[arg(long)]
    font_main: Option<PathBuf>,

    /// Font used for the `zongyi` role.
    #[arg(long)]
    font_zongyi: Option<PathBuf>,

    /// Font used for the `english` role.
    #[arg(long)]
    font_english: Option<PathBuf>,

    /// Font used for `font-style: italic` lines.
    #[arg(long)]
    font_italic: Option<PathBuf>,

    /// Extra `font-family` mapping, `NAME=ROLE` (repeatable).
    #[arg(long = "family-role", value_name = "NAME=ROLE")]
    family_roles: Vec<String>,

    /// JSON file overriding layout and output settings.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Print the resolved fonts (origin + SHA-256 of font bytes).
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Parser, Debug)]
struct OverlayArgs {
    /// Directory of background images (jpg, jpeg, png, bmp, gif).
    #[arg(long)]
    background_dir: PathBuf,

    /// Directory of PNG elements.
    #[arg(long)]
    element_dir: PathBuf,

    /// Directory the `{bg}_with_{element}.jpg` files are written to.
    #[arg(long)]
    output_dir: PathBuf,

    /// center, top-left, top-right, bottom-left, bottom-right or `x,y`.
    #[arg(long, default_value = "center")]
    position: String,

    /// Element opacity, 0.0 to 1.0.
    #[arg(long, default_value_t = 1.0)]
    opacity: f32,

    /// Element resize factor.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,
}

#[derive(Parser, Debug)]
struct GroupArgs {
    /// Directory to scan (defaults to `out`, then `img-output`).
    dir: Option<PathBuf>,

    /// Output JSON path.
    #[arg(long, default_value = "filename_groups.json")]
    out: PathBuf,

    /// Marker preceding the group name.
    #[arg(long, default_value = coverkit::DEFAULT_MARKER)]
    marker: String,
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
    match cli.cmd {
        Command::Cover(args) => cmd_cover(args),
        Command::Overlay(args) => cmd_overlay(args),
        Command::Group(args) => cmd_group(args),
    }
}

fn cmd_cover(args: CoverArgs) -> anyhow::Result<()> {
    let texts: Vec<String> =
        serde_json::from_str(&args.texts).with_context(|| "parse --texts as a JSON string array")?;

    let mut roles = coverkit::FamilyRoles::default();
    for assignment in &args.family_roles {
        roles.insert_assignment(assignment)?;
    }
    let settings = match &args.settings {
        Some(path) => coverkit::CoverSettings::from_path(path)?,
        None => coverkit::CoverSettings::default(),
    };
    let fonts = coverkit::FontTable {
        main: args.font_main,
        zongyi: args.font_zongyi,
        english: args.font_english,
        italic: args.font_italic,
    };

    if args.dump_fonts {
        dump_font_diagnostics(&fonts)?;
    }

    let job = coverkit::CoverJob {
        image_path: args.image,
        output_path: args.out,
        texts,
        style_path: args.style,
        fonts,
        roles,
        settings,
    };
    job.run()?;

    eprintln!("wrote {}", job.output_path.display());
    Ok(())
}

fn cmd_overlay(args: OverlayArgs) -> anyhow::Result<()> {
    let opts = coverkit::OverlayOptions {
        position: coverkit::OverlayPosition::parse_or_center(&args.position),
        opacity: args.opacity,
        scale: args.scale,
    };
    let summary = coverkit::overlay_directory(
        &args.background_dir,
        &args.element_dir,
        &args.output_dir,
        &opts,
    )?;

    for (path, err) in &summary.failed {
        eprintln!("failed {}: {err}", path.display());
    }
    eprintln!(
        "wrote {}/{} images to {}",
        summary.written.len(),
        summary.total,
        args.output_dir.display()
    );
    Ok(())
}

fn cmd_group(args: GroupArgs) -> anyhow::Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => ["out", "img-output"]
            .into_iter()
            .map(PathBuf::from)
            .find(|p| p.is_dir())
            .context("no directory given and neither ./out nor ./img-output exists")?,
    };

    let groups = coverkit::scan_directory(&dir, &args.marker)?;
    if groups.is_empty() {
        eprintln!("no groups found in {}", dir.display());
        return Ok(());
    }
    for (name, files) in &groups {
        eprintln!("{name}: {} file(s)", files.len());
    }
    coverkit::write_groups_json(&groups, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn dump_font_diagnostics(table: &coverkit::FontTable) -> anyhow::Result<()> {
    let library = coverkit::FontLibrary::load(table)?;
    eprintln!("font diagnostics:");
    for (role, font) in library.iter() {
        eprintln!("  {role}:");
        eprintln!("    origin: {}", describe_origin(&font.origin));
        eprintln!("    sha256: {}", sha256_hex(&font.bytes));
    }
    Ok(())
}

fn describe_origin(origin: &coverkit::FontOrigin) -> String {
    match origin {
        coverkit::FontOrigin::File(path) => path.display().to_string(),
        coverkit::FontOrigin::System { family } => format!("system ({family})"),
        coverkit::FontOrigin::Memory => "memory".to_string(),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
