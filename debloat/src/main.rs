use clap::Parser;
use debloat_lib::parser::html::collect_used_markup;
use debloat_lib::{AllowEntry, PreservedCatalog, Sanitizer, SanitizerConfig, Stylesheet, UsedMarkup};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

const DEBLOAT_INTRO: &str = r#"
        ____       __    __            __
       / __ \___  / /_  / /___  ____ _/ /_
      / / / / _ \/ __ \/ / __ \/ __ `/ __/
     / /_/ /  __/ /_/ / / /_/ / /_/ / /_
    /_____/\___/_.___/_/\____/\__,_/\__/

    Debloat - strips the CSS rules a page never uses.
"#;

#[derive(Parser)]
#[command(name = "debloat")]
#[command(about = "Remove unused rules from a stylesheet")]
struct Args {
    /// Stylesheet to reduce.
    css: PathBuf,

    /// HTML page(s) whose markup decides which rules survive.
    #[arg(long = "html", required = true)]
    html: Vec<PathBuf>,

    /// URL the stylesheet was loaded from; relative url()s resolve against it.
    #[arg(long, default_value = "")]
    url: String,

    /// Stylesheet handle used to scope allow-list entries.
    #[arg(long, default_value = "stylesheet")]
    id: String,

    /// JSON file with a list of allow-list entries.
    #[arg(long)]
    allow: Option<PathBuf>,

    /// Do not force-keep the common layout selectors (containers, header, nav, ...).
    #[arg(long)]
    no_preserve_critical: bool,

    /// Only keep structural selectors, not the built-in WordPress classes and tags.
    #[arg(long)]
    minimal_catalog: bool,

    /// Write the result here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn read_or_exit(path: &Path, what: &str) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {} file {}: {}", what, path.display(), e);
            process::exit(1);
        }
    }
}

fn main() {
    let args: Args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if args.output.is_some() {
        println!("{}", DEBLOAT_INTRO);
    }

    let mut used = UsedMarkup::new();
    for path in &args.html {
        used.merge(&collect_used_markup(&read_or_exit(path, "HTML")));
    }
    log::info!(
        "page uses {} classes, {} ids, {} tags",
        used.classes.len(),
        used.ids.len(),
        used.tags.len()
    );
    if used.is_empty() {
        log::warn!("no markup found in the HTML input, only preserved selectors will survive");
    }

    let allow: Vec<AllowEntry> = match &args.allow {
        Some(path) => match serde_json::from_str(&read_or_exit(path, "allow-list")) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("Error parsing allow-list {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Vec::new(),
    };

    let catalog = if args.minimal_catalog {
        PreservedCatalog::minimal()
    } else {
        PreservedCatalog::default()
    };
    let sanitizer = Sanitizer::new(
        SanitizerConfig::default()
            .with_catalog(catalog)
            .preserve_critical(!args.no_preserve_critical),
    );

    log::debug!(
        "preserve critical: {}, {} preserved classes",
        sanitizer.config().preserve_critical,
        sanitizer.config().catalog.classes.len()
    );

    let mut sheet = Stylesheet::new(args.id, args.url, read_or_exit(&args.css, "CSS"));
    let (css, report) = sanitizer.sanitize_with_report(&mut sheet, &used, &allow);

    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &css) {
                eprintln!("Error writing {}: {}", path.display(), e);
                process::exit(1);
            }
            if report.fell_back {
                println!("Could not sanitize {}, wrote it unchanged.", sheet.id);
            } else {
                println!(
                    "Wrote {} ({} -> {} bytes, {} rules kept, {} removed).",
                    path.display(),
                    report.original_len,
                    report.output_len,
                    report.rules_kept,
                    report.rules_dropped
                );
            }
        }
        None => print!("{}", css),
    }
}
