use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "posterkit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one poster per captioned image and pack them into a ZIP archive.
    Build(BuildArgs),
    /// Print how a caption splits into display lines.
    Chunk(ChunkArgs),
    /// List the template catalog.
    Templates(TemplatesArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Configuration JSON (template catalog, fonts, layout policy).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Caption file, one caption per line. `-` reads stdin.
    #[arg(long)]
    captions: PathBuf,

    /// Select a template by name (repeatable).
    #[arg(long = "template")]
    templates: Vec<String>,

    /// Select every template in the catalog.
    #[arg(long, default_value_t = false)]
    all_templates: bool,

    /// Background image file (repeatable).
    #[arg(long = "upload")]
    uploads: Vec<PathBuf>,

    /// Randomize which image gets which caption.
    #[arg(long, default_value_t = false)]
    shuffle: bool,

    /// Seed for font and shuffle randomness.
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory for the archive.
    #[arg(long)]
    out: PathBuf,

    /// Also write every poster as a standalone PNG next to the archive.
    #[arg(long, default_value_t = false)]
    png: bool,
}

#[derive(Parser, Debug)]
struct ChunkArgs {
    /// Caption text.
    text: String,

    /// Grapheme budget per line.
    #[arg(long, default_value_t = posterkit::LINE_BUDGET)]
    limit: usize,

    /// Split by code point instead of extended grapheme clusters.
    #[arg(long, default_value_t = false)]
    code_points: bool,

    /// Canvas size as `WIDTHxHEIGHT`; prints the estimated font size too.
    #[arg(long)]
    canvas: Option<String>,
}

#[derive(Parser, Debug)]
struct TemplatesArgs {
    /// Configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Chunk(args) => cmd_chunk(args),
        Command::Templates(args) => cmd_templates(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("POSTERKIT_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<posterkit::PosterConfig> {
    Ok(match path {
        Some(p) => posterkit::PosterConfig::from_path(p)?,
        None => posterkit::PosterConfig::default(),
    })
}

fn read_captions(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read captions from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("read captions '{}'", path.display()))
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut sess = match args.seed {
        Some(seed) => posterkit::PosterSession::with_seed(config, seed)?,
        None => posterkit::PosterSession::new(config)?,
    };

    if args.all_templates {
        sess.select_all_templates();
    }
    for name in &args.templates {
        sess.select_template(name)?;
    }
    let uploads = args
        .uploads
        .iter()
        .map(posterkit::UploadFile::from_path)
        .collect::<Result<Vec<_>, _>>()?;
    sess.set_uploads(uploads);
    sess.set_captions(read_captions(&args.captions)?);

    let status = sess.status();
    if status.missing_captions > 0 {
        eprintln!(
            "{} image(s) have no caption and will be skipped",
            status.missing_captions
        );
    }

    let count = sess.build(args.shuffle)?;
    eprintln!(
        "rendered {count} poster(s) with {} font(s)",
        sess.font_variety()
    );

    if args.png {
        write_pngs(&sess, &args.out)?;
    }

    let archive = sess.export()?;
    let path = archive.write_to_dir(&args.out)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn write_pngs(sess: &posterkit::PosterSession, out: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(out).with_context(|| format!("create output dir '{}'", out.display()))?;
    let suffix = &sess.config().file_suffix;
    for (i, entry) in sess.entries().iter().enumerate() {
        let path = out.join(format!(
            "{}{suffix}",
            posterkit::entry_base_name(&entry.name, i)
        ));
        image::save_buffer_with_format(
            &path,
            &entry.canvas.to_rgba8(),
            entry.canvas.width(),
            entry.canvas.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_chunk(args: ChunkArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.limit > 0, "--limit must be >= 1");
    let lines = if args.code_points {
        tracing::warn!("code-point segmentation; combined sequences count as several graphemes");
        posterkit::chunk_with(&args.text, args.limit, &posterkit::CodePointSegmenter)
    } else {
        posterkit::chunk(&args.text, args.limit)
    };
    for line in &lines {
        println!("{line}");
    }

    if let Some(canvas) = args.canvas.as_deref() {
        let (w, h) = canvas
            .split_once('x')
            .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)))
            .with_context(|| format!("canvas must be WIDTHxHEIGHT, got '{canvas}'"))?;
        let policy = posterkit::LayoutPolicy {
            line_budget: args.limit,
            ..posterkit::LayoutPolicy::default()
        };
        let metrics = posterkit::estimate_font_size(&lines, w, h, &policy);
        eprintln!(
            "font size {}px, line height {:.1}px",
            metrics.size, metrics.line_height
        );
    }
    Ok(())
}

fn cmd_templates(args: TemplatesArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    for t in &config.templates {
        println!("{}\t{}", t.name, t.src);
    }
    Ok(())
}
