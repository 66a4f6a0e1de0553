use anyhow::{Context, Result};
use log::info;
use relative_path::RelativePathBuf;
use std::{env, path::PathBuf, process};
use vimhelp_config::{Config, OutputFormat};
use vimhelp_engine::{BuildOptions, Converter, Rendered, ScanRules, io};

struct Job {
    format: OutputFormat,
    input_dir: PathBuf,
    output_dir: PathBuf,
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} [html|xml|txt] INPUT_DIR [OUTPUT_DIR]");
    eprintln!("OUTPUT_DIR defaults to INPUT_DIR and must hold the tags file");
    eprintln!("unless tags_file is set in {}", Config::config_path().display());
    process::exit(1);
}

/// `[FORMAT] INPUT_DIR [OUTPUT_DIR]`; the format falls back to the config file.
fn parse_args(args: &[String], config: &Config) -> Option<Job> {
    let mut rest = &args[1..];
    let mut format = config.format;
    if let Some(first) = rest.first()
        && let Some(named) = OutputFormat::from_name(first)
    {
        format = named;
        rest = &rest[1..];
    }

    match rest {
        [input] => Some(Job {
            format,
            input_dir: PathBuf::from(input),
            output_dir: PathBuf::from(input),
        }),
        [input, output] => Some(Job {
            format,
            input_dir: PathBuf::from(input),
            output_dir: PathBuf::from(output),
        }),
        _ => None,
    }
}

fn convert_one(converter: &Converter, job: &Job, name: &RelativePathBuf) -> Result<Rendered> {
    let path = name.to_path(&job.input_dir);
    let lines = io::read_lines(&path)?;
    let filename = name.as_str();
    Ok(match job.format {
        OutputFormat::Html => converter.to_html(filename, &lines),
        OutputFormat::Xml => converter.to_xml(filename, &lines),
        OutputFormat::Txt => converter.to_text(filename, &lines),
    })
}

fn output_name(name: &RelativePathBuf, format: OutputFormat) -> RelativePathBuf {
    RelativePathBuf::from(format!("{}.{}", name, format.extension()))
}

fn run(job: &Job, config: &Config) -> Result<()> {
    let tags_path = config.tags_path(&job.output_dir);
    let registry = io::read_tags(&tags_path)
        .with_context(|| format!("reading tags from {}", tags_path.display()))?;
    info!("{} tags loaded from {}", registry.len(), tags_path.display());

    let rules = ScanRules::new(config.title_pattern.as_deref(), config.tab_stop)
        .context("invalid title_pattern in config")?;
    let options = BuildOptions {
        table_fixups: config.table_fixups,
    };
    let converter = Converter::new(registry, rules, options);

    let files = io::help_files(&job.input_dir)?;
    info!(
        "Converting {} files from {} into {}",
        files.len(),
        job.input_dir.display(),
        job.output_dir.display()
    );

    let mut total_diagnostics = 0;
    for name in &files {
        let rendered = convert_one(&converter, job, name)
            .with_context(|| format!("converting {name}"))?;
        let out = output_name(name, job.format);
        io::write_output(&out, &job.output_dir, &rendered.output)?;
        info!("{name} -> {out}: {} diagnostics", rendered.diagnostics.len());
        total_diagnostics += rendered.diagnostics.len();
    }

    let unreferenced = converter.registry().unreferenced();
    if job.format == OutputFormat::Html && !unreferenced.is_empty() {
        info!("{} tags never linked to", unreferenced.len());
    }
    info!("Done: {} files, {total_diagnostics} diagnostics", files.len());
    Ok(())
}

fn load_config() -> Config {
    match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("vimhelp");
    let config = load_config();

    let Some(job) = parse_args(&args, &config) else {
        usage(program);
    };

    if !job.input_dir.is_dir() {
        eprintln!(
            "Error: input directory '{}' does not exist",
            job.input_dir.display()
        );
        usage(program);
    }

    run(&job, &config)
}
