//! CLI binary for edgequake-pdf2html.
//!
//! A thin shim over the library crate: maps CLI flags to
//! `ConversionConfig`, then either converts one document or starts the
//! upload server.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2html::web::{self, ServerConfig};
use edgequake_pdf2html::{
    convert, convert_to_file, inspect, ConversionConfig, ConversionStats, ExtractionMode,
    PageSelection,
};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # OCR a scanned FAQ page (stdout)
  pdf2html faq.png

  # PDF text layer to a file
  pdf2html prosedur.pdf -o prosedur.html

  # English OCR, pages 2 to 4
  pdf2html --lang eng --pages 2-4 manual.pdf

  # Let a vision model write the HTML
  pdf2html --mode vision --model gpt-4.1-mini slides.pdf

  # Convert from URL
  pdf2html https://example.com/sop.pdf -o sop.html

  # Inspect PDF metadata (no OCR engine or API key needed)
  pdf2html --inspect-only prosedur.pdf

  # JSON output with per-page stats
  pdf2html --json prosedur.pdf > output.json

  # Start the upload page on http://127.0.0.1:5000
  pdf2html --serve

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (vision mode)
  ANTHROPIC_API_KEY       Anthropic API key (vision mode)
  GEMINI_API_KEY          Google Gemini API key (vision mode)
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, overrides -v / -q

SETUP:
  OCR mode needs the tesseract binary with the language data you pass to
  --lang (default: ind). PDFs need a pdfium shared library, found via
  PDFIUM_LIB_PATH or the system library path.
"#;

/// Convert PDFs and images to embeddable HTML fragments.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2html",
    version,
    about = "Convert PDFs and images to embeddable HTML fragments",
    long_about = "Convert PDF documents and scanned images (local files or URLs) to an HTML \
fragment. OCR mode structures extracted text into headings, lists, FAQ questions and \
paragraphs; vision mode asks a Vision Language Model to write the HTML directly. \
With --serve, runs a small upload page instead.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF/PNG/JPG path or HTTP/HTTPS URL.
    #[arg(required_unless_present = "serve")]
    input: Option<String>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long, env = "PDF2HTML_OUTPUT")]
    output: Option<PathBuf>,

    /// Extraction mode: ocr (text layer / tesseract) or vision (LLM).
    #[arg(long, env = "PDF2HTML_MODE", value_enum, default_value = "ocr")]
    mode: ModeArg,

    /// Tesseract language code(s), e.g. ind, eng, ind+eng.
    #[arg(long = "lang", env = "PDF2HTML_OCR_LANG", default_value = "ind")]
    ocr_language: String,

    /// Tesseract executable.
    #[arg(long, env = "PDF2HTML_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Per-image OCR timeout in seconds.
    #[arg(long, env = "PDF2HTML_OCR_TIMEOUT", default_value_t = 120)]
    ocr_timeout: u64,

    /// Do not OCR PDFs that have no text layer.
    #[arg(long, env = "PDF2HTML_NO_OCR_FALLBACK")]
    no_ocr_fallback: bool,

    /// LLM model ID for vision mode (e.g. gpt-4.1-nano, gpt-4.1).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider for vision mode. Auto-detected from API key env vars if not set."
    )]
    provider: Option<String>,

    /// Rendering DPI (72–400).
    #[arg(long, env = "PDF2HTML_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Number of concurrent vision API calls.
    #[arg(short, long, env = "PDF2HTML_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2HTML_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2HTML_PASSWORD")]
    password: Option<String>,

    /// Path to a text file containing a custom vision system prompt.
    #[arg(long, env = "PDF2HTML_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Max LLM output tokens per page.
    #[arg(long, env = "PDF2HTML_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDF2HTML_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Retries per page on LLM failure.
    #[arg(long, env = "PDF2HTML_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Output structured JSON (ConversionOutput) instead of HTML.
    #[arg(long, env = "PDF2HTML_JSON")]
    json: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2HTML_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2HTML_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2HTML_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-page LLM call timeout in seconds.
    #[arg(long, env = "PDF2HTML_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Run the upload page instead of converting INPUT.
    #[arg(long, conflicts_with_all = ["output", "json", "inspect_only"])]
    serve: bool,

    /// Address for --serve.
    #[arg(long, env = "PDF2HTML_BIND", default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    /// Directory for uploaded files (default: <tmp>/pdf2html-uploads).
    #[arg(long, env = "PDF2HTML_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,

    /// Maximum upload size in MiB.
    #[arg(long, env = "PDF2HTML_MAX_UPLOAD_MB", default_value_t = 32)]
    max_upload_mb: usize,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Ocr,
    Vision,
}

impl From<ModeArg> for ExtractionMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Ocr => ExtractionMode::Ocr,
            ModeArg::Vision => ExtractionMode::Vision,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The server logs requests at info; one-shot conversions stay quiet
    // unless asked, since the HTML goes to stdout.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if cli.serve {
        "info,tower_http=debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli).await?;

    // ── Server mode ──────────────────────────────────────────────────────
    if cli.serve {
        let defaults = ServerConfig::default();
        let server = ServerConfig {
            bind: cli.bind,
            upload_dir: cli.upload_dir.clone().unwrap_or(defaults.upload_dir),
            max_upload_bytes: cli.max_upload_mb.saturating_mul(1024 * 1024),
        };
        if !cli.quiet {
            eprintln!(
                "{} Upload page on {}",
                cyan("◆"),
                bold(&format!("http://{}", server.bind))
            );
        }
        return web::serve(server, config)
            .await
            .context("Web server failed");
    }

    let input = cli
        .input
        .as_deref()
        .context("INPUT is required unless --serve is given")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", input);
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = convert_to_file(input, output_path, &config)
            .await
            .context("Conversion failed")?;

        if !cli.quiet {
            print_summary(&stats, Some(&output_path.display().to_string()));
        }
    } else {
        let output = convert(input, &config).await.context("Conversion failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.html.as_bytes())
                .context("Failed to write to stdout")?;
            if !output.html.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }

        if !cli.quiet && !cli.json {
            print_summary(&output.stats, None);
        }
    }

    Ok(())
}

fn print_summary(stats: &ConversionStats, destination: Option<&str>) {
    let mark = if stats.failed_pages == 0 {
        green("✔")
    } else {
        cyan("⚠")
    };
    let target = destination
        .map(|d| format!("  →  {}", bold(d)))
        .unwrap_or_default();
    eprintln!(
        "{}  {}/{} pages  {}ms{}",
        mark, stats.processed_pages, stats.total_pages, stats.total_duration_ms, target
    );
    if stats.used_ocr_fallback {
        eprintln!("   {}", dim("no text layer, pages were OCR'd"));
    }
    if stats.total_input_tokens > 0 {
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&stats.total_input_tokens.to_string()),
            dim(&stats.total_output_tokens.to_string()),
        );
    }
}

/// Map CLI args to `ConversionConfig`.
async fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let pages = parse_pages(&cli.pages)?;

    let mut builder = ConversionConfig::builder()
        .mode(cli.mode.into())
        .ocr_language(cli.ocr_language.clone())
        .tesseract_cmd(cli.tesseract.clone())
        .ocr_timeout_secs(cli.ocr_timeout)
        .ocr_scanned_pdfs(!cli.no_ocr_fallback)
        .dpi(cli.dpi)
        .concurrency(cli.concurrency)
        .pages(pages)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}
