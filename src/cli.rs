use crate::config::load_config;
use crate::layout_dump::write_layout_dump;
use crate::parser::InputFormat;
use crate::render::write_output_svg;
use crate::visualizer::{HttpFetcher, Visualizer, DEFAULT_DOWNLOAD_NAME};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "cwlviz", version, about = "CWL workflow visualizer (SVG/PNG)")]
pub struct Args {
    /// Input file (.cwl/.json/.yml), http(s) URL, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<String>,

    /// Output file or directory. Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Document format; auto treats text starting with '{' or '[' as JSON
    #[arg(long = "inputFormat", value_enum, default_value = "auto")]
    pub input_format: InputFormatArg,

    /// Config JSON file (theme, themeVariables, layout, ports, view)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Write the computed layout (levels, nodes, edge routes) as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormatArg {
    Auto,
    Json,
    Yaml,
}

impl From<InputFormatArg> for InputFormat {
    fn from(arg: InputFormatArg) -> Self {
        match arg {
            InputFormatArg::Auto => InputFormat::Auto,
            InputFormatArg::Json => InputFormat::Json,
            InputFormatArg::Yaml => InputFormat::Yaml,
        }
    }
}

pub fn run() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let mut visualizer = Visualizer::new(config);
    load_input(&mut visualizer, args.input.as_deref(), args.input_format.into())?;

    let scene = visualizer
        .scene()
        .ok_or_else(|| anyhow::anyhow!("No workflow loaded"))?;
    if let Some(path) = &args.dump_layout {
        write_layout_dump(path, scene)?;
    }

    let svg = visualizer.export_svg();
    let output = resolve_output(args.output.as_deref(), args.input.as_deref(), args.output_format);
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, output.as_deref())?,
        OutputFormat::Png => {
            let output = ensure_output(&output, "png")?;
            write_png(&svg, &output, &visualizer)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, visualizer: &Visualizer) -> Result<()> {
    crate::render::write_output_png(svg, output, &visualizer.config().render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _visualizer: &Visualizer) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn load_input(visualizer: &mut Visualizer, input: Option<&str>, format: InputFormat) -> Result<()> {
    match input {
        Some(url) if is_url(url) => {
            let fetcher = HttpFetcher::new()?;
            visualizer.load_from_url(url, &fetcher)?;
        }
        Some(path) if path != "-" && format == InputFormat::Auto => {
            visualizer.load_from_file(Path::new(path))?;
        }
        Some(path) if path != "-" => {
            let text = std::fs::read_to_string(path)?;
            visualizer.load_from_text_with_format(&text, format)?;
        }
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            visualizer.load_from_text_with_format(&buf, format)?;
        }
    }
    Ok(())
}

fn is_url(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// A directory output gets a file named after the input (or the default
/// download name) with the extension of the chosen format.
fn resolve_output(output: Option<&Path>, input: Option<&str>, format: OutputFormat) -> Option<PathBuf> {
    let output = output?;
    if !output.is_dir() {
        return Some(output.to_path_buf());
    }
    let stem = input
        .filter(|i| *i != "-")
        .and_then(|i| i.rsplit('/').next())
        .and_then(|name| Path::new(name).file_stem())
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            DEFAULT_DOWNLOAD_NAME
                .trim_end_matches(".svg")
                .to_string()
        });
    Some(output.join(format!("{stem}.{}", format.extension())))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_urls() {
        assert!(is_url("https://example.org/wf.cwl"));
        assert!(is_url("http://localhost:8000/wf.cwl"));
        assert!(!is_url("workflows/wf.cwl"));
        assert!(!is_url("-"));
        assert!(!is_url("file:///tmp/wf.cwl"));
        assert!(!is_url("C:/workflows/wf.cwl"));
        assert!(!is_url("http//missing-colon"));
    }

    #[test]
    fn directory_outputs_take_input_name() {
        let dir = std::env::temp_dir();
        assert_eq!(
            resolve_output(Some(&dir), Some("pipelines/align.cwl"), OutputFormat::Png),
            Some(dir.join("align.png"))
        );
        assert_eq!(
            resolve_output(Some(&dir), Some("https://example.org/x/main.cwl"), OutputFormat::Svg),
            Some(dir.join("main.svg"))
        );
        assert_eq!(
            resolve_output(Some(&dir), None, OutputFormat::Svg),
            Some(dir.join("cwl-workflow.svg"))
        );
        let file = dir.join("explicit.svg");
        assert_eq!(resolve_output(Some(&file), None, OutputFormat::Svg), Some(file));
        assert_eq!(resolve_output(None, Some("a.cwl"), OutputFormat::Svg), None);
    }

    #[test]
    fn png_requires_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        assert!(ensure_output(&Some(PathBuf::from("out.png")), "png").is_ok());
    }

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "cwlviz",
            "-i",
            "wf.cwl",
            "-e",
            "png",
            "--inputFormat",
            "yaml",
            "-w",
            "1200",
        ])
        .unwrap();
        assert_eq!(args.input.as_deref(), Some("wf.cwl"));
        assert_eq!(args.output_format, OutputFormat::Png);
        assert_eq!(InputFormat::from(args.input_format), InputFormat::Yaml);
        assert_eq!(args.width, Some(1200.0));
        assert_eq!(args.height, None);
    }
}
