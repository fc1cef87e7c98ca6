use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use docmark_config::Config;
use docmark_engine::tree::json::{parse_tree, to_json};
use docmark_engine::{
    HtmlWriter, OutputNode, PlainHighlighter, RenderOptions, Renderer, TreeNode,
    UnknownNodePolicy, parse_markdown, raw_source_fallback,
};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "docmark")]
#[command(version, about = "Render markdown docs to HTML with heading anchors", long_about = None)]
#[command(after_help = "EXAMPLES:
    docmark guide.md                  Render markdown to HTML
    docmark -f json guide.md          Print the rendered output tree as JSON
    docmark -f tree guide.md          Print the parsed document tree as JSON
    docmark --from-tree tree.json     Render a JSON document tree")]
struct Cli {
    /// Markdown file, or `-` for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Read INPUT as a JSON document tree instead of markdown
    #[arg(long)]
    from_tree: bool,

    /// Config file (default: ~/.config/docmark/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Drop nodes of unknown type instead of failing
    #[arg(long)]
    skip_unknown: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Rendered HTML
    Html,
    /// Rendered output tree as JSON
    Json,
    /// Parsed document tree as JSON, before rendering
    Tree,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        })
        .init();

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    let options = load_options(cli)?;
    let source = read_input(&cli.input)?;
    log::info!("Read {} bytes from {}", source.len(), cli.input);

    let parsed = if cli.from_tree {
        parse_tree(&source, options.unknown_nodes)
    } else {
        parse_markdown(&source, &options)
    };

    match parsed {
        Ok(tree) => render_or_fallback(&tree, &options, cli.format, &source),
        Err(e) if cli.format == Format::Html => {
            log::warn!("Parsing failed, showing raw source: {e}");
            Ok(raw_source_fallback(&source))
        }
        Err(e) => Err(e).with_context(|| format!("Failed to parse {}", cli.input)),
    }
}

/// Format a parsed tree. HTML output degrades to the escaped source when
/// rendering fails; other formats report the error.
fn render_or_fallback(
    tree: &[TreeNode],
    options: &RenderOptions,
    format: Format,
    source: &str,
) -> Result<String> {
    match format_tree(tree, options, format) {
        Ok(output) => Ok(output),
        Err(e) if format == Format::Html => {
            log::warn!("Rendering failed, showing raw source: {e:#}");
            Ok(raw_source_fallback(source))
        }
        Err(e) => Err(e),
    }
}

fn load_options(cli: &Cli) -> Result<RenderOptions> {
    let config = match &cli.config {
        Some(path) => {
            log::info!("Using config file from CLI argument: {}", path.display());
            Config::load_from_path(path)?
        }
        None => {
            log::info!("Config path: {}", Config::config_path().display());
            Config::load()?
        }
    };

    let mut options = match config {
        Some(config) => config.render,
        None => {
            log::info!("No config file found, using defaults");
            RenderOptions::default()
        }
    };
    if cli.skip_unknown {
        options.unknown_nodes = UnknownNodePolicy::Skip;
    }
    Ok(options)
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
}

fn format_tree(tree: &[TreeNode], options: &RenderOptions, format: Format) -> Result<String> {
    if format == Format::Tree {
        return Ok(to_json(tree)?);
    }

    let root: OutputNode = Renderer::new(options.clone()).render(tree)?;
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(&root)?),
        _ => Ok(HtmlWriter::new(&PlainHighlighter).write(&root)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmark_engine::TagNode;

    fn heading_tree() -> Vec<TreeNode> {
        vec![TreeNode::tag("h2", vec![TreeNode::text("Getting Started")])]
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from(["docmark", "-f", "json", "--skip-unknown", "doc.md"]);

        assert_eq!(cli.input, "doc.md");
        assert_eq!(cli.format, Format::Json);
        assert!(cli.skip_unknown);
        assert!(!cli.from_tree);
    }

    #[test]
    fn test_format_html() {
        let html = format_tree(&heading_tree(), &RenderOptions::default(), Format::Html).unwrap();

        assert_eq!(
            html,
            "<h2 id=\"getting-started\">Getting Started<a class=\"doc-header_link\" href=\"#getting-started\">#</a></h2>"
        );
    }

    #[test]
    fn test_format_tree_is_json_tree() {
        let json = format_tree(&heading_tree(), &RenderOptions::default(), Format::Tree).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["type"], "tag");
        assert_eq!(value[0]["tagName"], "h2");
    }

    #[test]
    fn test_format_json_is_output_tree() {
        let json = format_tree(&heading_tree(), &RenderOptions::default(), Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["kind"], "element");
        assert_eq!(value["attrs"]["id"], "getting-started");
    }

    #[test]
    fn test_bad_json_tree_falls_back_to_raw_source() {
        let source = r#"{"type": "tag", "tagName": "p", "attrs": {"x><i": "v"}}"#;
        let tree = parse_tree(source, UnknownNodePolicy::Reject).unwrap();

        let html =
            render_or_fallback(&tree, &RenderOptions::default(), Format::Html, source).unwrap();

        assert!(html.starts_with("<pre class=\"raw-source\">"));
        assert!(html.contains("&lt;i"));
        assert!(render_or_fallback(&tree, &RenderOptions::default(), Format::Json, source).is_err());
    }

    #[test]
    fn test_structural_error_surfaces() {
        let tree = vec![TreeNode::Tag(TagNode::new("not a tag"))];

        assert!(format_tree(&tree, &RenderOptions::default(), Format::Json).is_err());
    }
}
