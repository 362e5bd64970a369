// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#![allow(clippy::uninlined_format_args)]

use std::path;

use svg_png_export::{
    Delivery, DirectorySink, DownloadSink, Exporter, FileSource, MarkupSource, NamingPolicy,
    Options, Scale, StdinSource, StdoutSink,
};
use usvg::fontdb;

fn main() {
    if let Err(e) = process() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn timed<F, T>(perf: bool, name: &str, mut f: F) -> T
where
    F: FnMut() -> T,
{
    let now = std::time::Instant::now();
    let result = f();
    if perf {
        let elapsed = now.elapsed().as_micros() as f64 / 1000.0;
        eprintln!("{}: {:.2}ms", name, elapsed);
    }

    result
}

fn process() -> Result<(), String> {
    let mut args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            println!("{}", HELP);
            return Err(format!("{}.", e));
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            let level = if args.verbose {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Warn
            };
            log::set_max_level(level);
        }
    }

    if !args.scale.is_preset() {
        log::warn!("{} is not one of the preset scales.", args.scale);
    }

    if args.list_scales {
        for scale in Scale::PRESETS.iter() {
            if *scale == Scale::default() {
                println!("{} (default)", scale);
            } else {
                println!("{}", scale);
            }
        }
        return Ok(());
    }

    let source: Box<dyn MarkupSource> = match args.input {
        InputFrom::Stdin => {
            let source = timed(args.perf, "Reading", StdinSource::read)
                .map_err(|e| e.user_message())?;
            Box::new(source)
        }
        InputFrom::File(ref file) => Box::new(FileSource::new(file.clone())),
    };

    let mut options = Options {
        usvg: args.usvg.take().unwrap_or_default(),
        fallback_size: args.fallback_size,
    };
    timed(args.perf, "FontDB", || load_fonts(&args, options.usvg.fontdb_mut()));

    let mut exporter = Exporter::new(options);
    exporter.set_scale(args.scale);
    exporter.set_title(args.title.take());
    exporter.set_naming(NamingPolicy { date: args.date });

    let mut sink: Box<dyn DownloadSink> = match args.output {
        OutputTo::Stdout => Box::new(StdoutSink),
        OutputTo::Dir(ref dir) => Box::new(DirectorySink::new(dir)),
    };

    let export = timed(args.perf, "Exporting", || {
        exporter.export(source.as_ref(), sink.as_mut())
    })
    .map_err(|e| e.user_message())?;

    if let Delivery::File(ref path) = export.delivery {
        if !args.quiet {
            println!("{}", path.display());
        }
    }

    Ok(())
}

const HELP: &str = "\
svg-png-export finds an SVG in a file or stdin and saves it as a PNG.

USAGE:
  svg-png-export [OPTIONS] <input>        # save into the current directory
  svg-png-export [OPTIONS] <input> -o DIR # save into DIR
  svg-png-export [OPTIONS] - -c           # from stdin to stdout

  svg-png-export drawing.svg
  svg-png-export -s 4x chat-transcript.md
  svg-png-export --title 'Solar System' -s 8x page.html -o exports

  The input can be an SVG file or any text containing SVG markup:
  a saved page, a chat transcript, a Markdown file with a code block.

  Files are named <title>-<YYYY-MM-DD>-<scale>.png

OPTIONS:
      --help                    Prints this help
  -V, --version                 Prints version
  -c                            Prints the output PNG to the stdout
  -o, --out-dir DIR             Sets the output directory
                                [default: .]

  -s, --scale SCALE             Sets the scale factor
                                [default: 2x] [possible values: 1x, 2x, 3x,
                                4x, 6x, 8x or any number >= 1]
      --list-scales             Lists scale presets
      --fallback-size WxH       Sets the size to use when the SVG has no viewBox
                                [default: the SVG size]
      --title TEXT              Sets the title used in the file name
                                [default: a page heading, an SVG <title>
                                or 'svg-export']
      --date YYYY-MM-DD         Sets the date used in the file name
                                [default: today, UTC]

      --dpi DPI                 Sets the resolution
                                [default: 96] [possible values: 10..4000 (inclusive)]
      --font-family FAMILY      Sets the default font family that will be
                                used when no 'font-family' is present
                                [default: Times New Roman]
      --use-font-file PATH      Load a specified font file into the fonts database.
                                This option can be set multiple times
      --use-fonts-dir PATH      Loads all fonts from the specified directory
                                into the fonts database.
                                This option can be set multiple times
      --skip-system-fonts       Disables system fonts loading.

      --perf                    Prints performance stats
      --quiet                   Disables warnings
      --verbose                 Prints rasterization steps

ARGS:
  <input>                       Input file or '-' for stdin
";

#[derive(Debug)]
struct CliArgs {
    scale: Option<Scale>,
    list_scales: bool,
    fallback_size: Option<usvg::Size>,
    title: Option<String>,
    date: Option<chrono::NaiveDate>,
    out_dir: Option<path::PathBuf>,
    stdout: bool,

    dpi: u32,
    font_family: Option<String>,
    font_files: Vec<path::PathBuf>,
    font_dirs: Vec<path::PathBuf>,
    skip_system_fonts: bool,

    perf: bool,
    quiet: bool,
    verbose: bool,

    input: Option<String>,
}

fn collect_args() -> Result<CliArgs, pico_args::Error> {
    let mut input = pico_args::Arguments::from_env();

    if input.contains("--help") {
        print!("{}", HELP);
        std::process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    let list_scales = input.contains("--list-scales");

    Ok(CliArgs {
        scale: input.opt_value_from_fn(["-s", "--scale"], parse_scale)?,
        list_scales,
        fallback_size: input.opt_value_from_fn("--fallback-size", parse_size)?,
        title: input.opt_value_from_str("--title")?,
        date: input.opt_value_from_fn("--date", parse_date)?,
        out_dir: input.opt_value_from_str(["-o", "--out-dir"])?,
        stdout: input.contains("-c"),

        dpi: input.opt_value_from_fn("--dpi", parse_dpi)?.unwrap_or(96),
        font_family: input.opt_value_from_str("--font-family")?,
        font_files: input.values_from_str("--use-font-file")?,
        font_dirs: input.values_from_str("--use-fonts-dir")?,
        skip_system_fonts: input.contains("--skip-system-fonts"),

        perf: input.contains("--perf"),
        quiet: input.contains("--quiet"),
        verbose: input.contains("--verbose"),

        input: if list_scales {
            input.opt_free_from_str()?
        } else {
            Some(input.free_from_str()?)
        },
    })
}

fn parse_scale(s: &str) -> Result<Scale, String> {
    s.parse().map_err(|e: svg_png_export::Error| e.to_string())
}

fn parse_size(s: &str) -> Result<usvg::Size, String> {
    let (w, h) = s
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or("size must be set as WxH")?;
    let w: f32 = w.trim().parse().map_err(|_| "invalid width")?;
    let h: f32 = h.trim().parse().map_err(|_| "invalid height")?;

    if w.is_finite() && h.is_finite() {
        usvg::Size::from_wh(w, h).ok_or_else(|| "size should be positive".to_string())
    } else {
        Err("size should be finite".to_string())
    }
}

fn parse_date(s: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| "invalid date".to_string())
}

fn parse_dpi(s: &str) -> Result<u32, String> {
    let n: u32 = s.parse().map_err(|_| "invalid number")?;

    if (10..=4000).contains(&n) {
        Ok(n)
    } else {
        Err("DPI out of bounds".to_string())
    }
}

#[derive(Clone, PartialEq, Debug)]
enum InputFrom {
    Stdin,
    File(path::PathBuf),
}

#[derive(Clone, PartialEq, Debug)]
enum OutputTo {
    Stdout,
    Dir(path::PathBuf),
}

struct Args {
    input: InputFrom,
    output: OutputTo,
    scale: Scale,
    list_scales: bool,
    fallback_size: Option<usvg::Size>,
    title: Option<String>,
    date: Option<chrono::NaiveDate>,
    usvg: Option<usvg::Options<'static>>,

    font_files: Vec<path::PathBuf>,
    font_dirs: Vec<path::PathBuf>,
    skip_system_fonts: bool,

    perf: bool,
    quiet: bool,
    verbose: bool,
}

fn parse_args() -> Result<Args, String> {
    let args = collect_args().map_err(|e| e.to_string())?;

    let input = match args.input.as_deref() {
        Some("-") => InputFrom::Stdin,
        Some(file) => InputFrom::File(file.into()),
        None => InputFrom::Stdin,
    };

    let output = if args.stdout {
        if args.out_dir.is_some() {
            return Err("-c and --out-dir cannot be used together".to_string());
        }
        OutputTo::Stdout
    } else {
        OutputTo::Dir(args.out_dir.unwrap_or_else(|| path::PathBuf::from(".")))
    };

    let resources_dir = match input {
        InputFrom::File(ref file) => {
            // Get input file absolute directory.
            std::fs::canonicalize(file)
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        }
        InputFrom::Stdin => None,
    };

    let mut usvg = usvg::Options {
        resources_dir,
        dpi: args.dpi as f32,
        ..usvg::Options::default()
    };
    if let Some(family) = args.font_family {
        usvg.font_family = family;
    }
    if let Some(size) = args.fallback_size {
        usvg.default_size = size;
    }

    Ok(Args {
        input,
        output,
        scale: args.scale.unwrap_or_default(),
        list_scales: args.list_scales,
        fallback_size: args.fallback_size,
        title: args.title,
        date: args.date,
        usvg: Some(usvg),
        font_files: args.font_files,
        font_dirs: args.font_dirs,
        skip_system_fonts: args.skip_system_fonts,
        perf: args.perf,
        quiet: args.quiet,
        verbose: args.verbose,
    })
}

fn load_fonts(args: &Args, fontdb: &mut fontdb::Database) {
    if !args.skip_system_fonts {
        fontdb.load_system_fonts();
    }

    for path in &args.font_files {
        if let Err(e) = fontdb.load_font_file(path) {
            log::warn!("Failed to load '{}' cause {}.", path.display(), e);
        }
    }

    for path in &args.font_dirs {
        fontdb.load_fonts_dir(path);
    }

    fontdb.set_serif_family("Times New Roman");
    fontdb.set_sans_serif_family("Arial");
    fontdb.set_cursive_family("Comic Sans MS");
    fontdb.set_fantasy_family("Impact");
    fontdb.set_monospace_family("Courier New");
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);
            let args = record.args();

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, args),
                log::Level::Warn => eprintln!("Warning (in {}:{}): {}", target, line, args),
                log::Level::Info => eprintln!("Info (in {}:{}): {}", target, line, args),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, args),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, args),
            }
        }
    }

    fn flush(&self) {}
}
