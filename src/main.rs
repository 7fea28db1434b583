use anyhow::Context;
use browsershot::{parse_numeric, Browsershot, Margin, PaperSize, RenderConfig};
use clap::Parser;
use std::path::PathBuf;

/// Render a web page to a PNG, JPEG or PDF file
#[derive(Parser, Debug)]
#[command(name = "browsershot", version, about)]
struct Args {
    /// Page to capture
    url: String,

    /// Output file; the extension (png, jpg, jpeg, pdf) selects the format
    output: PathBuf,

    /// JSON file with default settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Renderer executable; overrides the config file (default: bin/phantomjs)
    #[arg(long = "bin", env = "BROWSERSHOT_PHANTOMJS")]
    bin_path: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long)]
    width: Option<String>,

    /// Viewport height in pixels; 0 captures the whole page
    #[arg(long)]
    height: Option<String>,

    /// Capture the whole page instead of a fixed viewport height
    #[arg(long, conflicts_with = "height")]
    full_page: bool,

    /// Image quality, 1-100
    #[arg(long)]
    quality: Option<String>,

    /// Delay before capture, in milliseconds
    #[arg(long)]
    timeout: Option<String>,

    /// Renderer flag; repeat to pass several. Replaces the defaults.
    #[arg(long = "renderer-option", allow_hyphen_values = true)]
    renderer_options: Vec<String>,

    /// PDF paper format, e.g. A4 or Letter
    #[arg(long)]
    paper_format: Option<String>,

    /// PDF orientation: portrait or landscape
    #[arg(long)]
    orientation: Option<String>,

    /// PDF margin applied on every side, e.g. 1cm
    #[arg(long)]
    margin: Option<String>,

    /// Smallest output accepted as a successful render, in bytes
    #[arg(long)]
    min_bytes: Option<u64>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn build(args: &Args) -> anyhow::Result<Browsershot> {
    let config = match &args.config {
        Some(path) => RenderConfig::from_json_file(path)?,
        None => RenderConfig::default(),
    };
    let paper = config.paper_size.clone();
    let mut shot = Browsershot::from_config(config)?.set_url(&args.url)?;

    if let Some(bin) = &args.bin_path {
        shot = shot.set_bin_path(bin);
    }
    if let Some(raw) = &args.width {
        let width = u32::try_from(parse_numeric("width", raw)?).context("width is too large")?;
        shot = shot.set_width(width)?;
    }
    if let Some(raw) = &args.height {
        let height = u32::try_from(parse_numeric("height", raw)?).context("height is too large")?;
        shot = shot.set_height(height);
    }
    if args.full_page {
        shot = shot.set_height_to_render_whole_page();
    }
    if let Some(raw) = &args.quality {
        // out-of-range values still reach the range check
        let quality = u8::try_from(parse_numeric("quality", raw)?).unwrap_or(u8::MAX);
        shot = shot.set_quality(quality)?;
    }
    if let Some(raw) = &args.timeout {
        shot = shot.set_timeout(parse_numeric("timeout", raw)?);
    }
    if !args.renderer_options.is_empty() {
        shot = shot.set_renderer_options(args.renderer_options.iter().cloned());
    }
    if args.paper_format.is_some() || args.orientation.is_some() || args.margin.is_some() {
        shot = shot.set_paper_size(PaperSize {
            format: args.paper_format.clone().unwrap_or(paper.format),
            orientation: args.orientation.clone().unwrap_or(paper.orientation),
            margin: args.margin.clone().map(Margin::uniform).unwrap_or(paper.margin),
        });
    }
    if let Some(bytes) = args.min_bytes {
        shot = shot.set_min_output_bytes(bytes);
    }
    Ok(shot)
}

fn run(args: Args) -> anyhow::Result<()> {
    let shot = build(&args)?;
    let output = shot
        .save(&args.output)
        .with_context(|| format!("failed to capture {}", args.url))?;
    println!("{} ({} bytes)", output.path.display(), output.bytes);
    Ok(())
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("browsershot: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["browsershot", "https://example.com", "out.png"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let shot = build(&parse(&["--width", "100", "--height", "200", "--quality", "80", "--timeout", "10"])).unwrap();
        let cfg = shot.config();
        assert_eq!((cfg.width, cfg.height, cfg.quality, cfg.timeout_ms), (100, 200, 80, 10));
        assert_eq!(cfg.url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn non_numeric_flag_is_invalid_input() {
        let err = build(&parse(&["--width", "wide"])).unwrap_err();
        assert!(matches!(err.downcast_ref::<browsershot::Error>(), Some(browsershot::Error::InvalidInput(_))));
    }

    #[test]
    fn out_of_range_quality_is_rejected() {
        assert!(build(&parse(&["--quality", "300"])).is_err());
        assert!(build(&parse(&["--quality", "0"])).is_err());
    }

    #[test]
    fn bin_flag_overrides_config_default() {
        let shot = build(&parse(&["--bin", "/usr/local/bin/phantomjs"])).unwrap();
        assert_eq!(shot.config().bin_path, PathBuf::from("/usr/local/bin/phantomjs"));
    }

    #[test]
    fn renderer_options_and_paper() {
        let shot = build(&parse(&[
            "--renderer-option",
            "--load-images=false",
            "--orientation",
            "landscape",
            "--full-page",
        ]))
        .unwrap();
        let cfg = shot.config();
        assert_eq!(cfg.renderer_options, vec!["--load-images=false".to_string()]);
        assert_eq!(cfg.paper_size.orientation, "landscape");
        assert_eq!(cfg.paper_size.format, "A4");
        assert_eq!(cfg.height, 0);
    }
}
