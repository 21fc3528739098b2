use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "psd-compose", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten an exported layer directory (or tree JSON) into one PNG.
    Compose(ComposeArgs),
    /// Write a difference image of two composites.
    Compare(CompareArgs),
    /// Print the layer tree and summary statistics.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Exporter output directory or tree JSON file.
    input: PathBuf,

    /// Output PNG path (default: `<parent>/<doc>_composed.png`).
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Raster directory for tree JSON input (default: the JSON file's directory).
    #[arg(long)]
    rasters: Option<PathBuf>,

    /// Render independent groups in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Paint groups from their exported composite PNG when present.
    #[arg(long, default_value_t = false)]
    use_group_rasters: bool,

    /// Print the compiled paint order before rendering.
    #[arg(long, default_value_t = false)]
    print_order: bool,

    /// Print the SHA-256 of the output pixels.
    #[arg(long, default_value_t = false)]
    digest: bool,
}

#[derive(Parser, Debug)]
struct CompareArgs {
    /// Reference image.
    image1: PathBuf,

    /// Image to compare against the reference.
    image2: PathBuf,

    /// Output PNG path (default: `<image1>_diff.png`).
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Keep the raw difference instead of the enhanced one.
    #[arg(long, default_value_t = false)]
    no_enhance: bool,

    /// Write `[image1 | image2 | diff]` side by side.
    #[arg(long, default_value_t = false)]
    side_by_side: bool,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Exporter output directory or tree JSON file.
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Compare(args) => cmd_compare(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let opts = psd_compose::ComposeOptions {
        parallel: args.parallel,
        threads: args.threads,
        use_group_rasters: args.use_group_rasters,
    };
    opts.validate()?;

    let loaded =
        psd_compose::load_document(&args.input, args.rasters.as_deref(), opts.use_group_rasters)
            .with_context(|| format!("load '{}'", args.input.display()))?;

    if args.print_order {
        let (plan, _) = psd_compose::PaintPlan::compile(&loaded.tree, &loaded.rasters, &opts);
        print!("{plan}");
    }

    let composed = psd_compose::compose_tree(&loaded.tree, &loaded.rasters, &opts)?;
    let warnings = loaded.report.diagnostics().len() + composed.report.diagnostics().len();

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| default_compose_out(&args.input, loaded.tree.name()));
    write_png(&out, &composed.canvas)?;

    if args.digest {
        println!("sha256: {}", composed.digest_hex());
    }
    tracing::info!(warnings, "wrote {}", out.display());
    Ok(())
}

fn cmd_compare(args: CompareArgs) -> anyhow::Result<()> {
    let opts = psd_compose::CompareOptions {
        enhance: !args.no_enhance,
        side_by_side: args.side_by_side,
    };
    let cmp = psd_compose::compare_files(&args.image1, &args.image2, &opts)?;

    let out = args.out.clone().unwrap_or_else(|| {
        let stem = file_stem(&args.image1);
        sibling_path(&args.image1, &format!("{stem}_diff.png"))
    });
    write_png(&out, &cmp.image)?;

    println!(
        "differing_pixels: {}\nmax_channel_delta: {}\nmean_abs_error: {:.4}",
        cmp.stats.differing_pixels, cmp.stats.max_channel_delta, cmp.stats.mean_abs_error
    );
    tracing::info!("wrote {}", out.display());
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let loaded = psd_compose::load_document(&args.input, None, false)
        .with_context(|| format!("load '{}'", args.input.display()))?;
    let tree = &loaded.tree;

    println!(
        "{} ({}x{})",
        tree.name(),
        tree.size().width,
        tree.size().height
    );
    for (node, depth) in tree.walk() {
        let g = node.geometry();
        println!(
            "{}{} [{}] {} opacity={} at ({}, {}) {}x{}{}",
            "  ".repeat(depth + 1),
            node.name(),
            if node.is_group() { "group" } else { "layer" },
            node.blend_mode(),
            node.opacity(),
            g.left,
            g.top,
            g.width,
            g.height,
            if node.is_visible() { "" } else { " hidden" },
        );
    }
    print!("{}", psd_compose::TreeStats::of(tree));
    Ok(())
}

fn write_png(path: &Path, img: &image::RgbaImage) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        img.as_raw(),
        img.width(),
        img.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn default_compose_out(input: &Path, doc_name: &str) -> PathBuf {
    let stem = Path::new(doc_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| file_stem(input));
    sibling_path(input, &format!("{stem}_composed.png"))
}

fn sibling_path(path: &Path, file_name: &str) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}
