use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use liquidmark_config::Config;
use liquidmark_engine::{DocumentParser, Mark, MarkdownSerializer, Node, to_html};
use liquidmark_syntax::{TemplateTag, dump_tokens};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "liquidmark")]
#[command(about = "Markdown with Liquid template tags", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/liquidmark/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the token stream
    Tokens {
        /// Markdown file, or `-` for stdin
        input: PathBuf,
    },
    /// Print the document tree
    Tree { input: PathBuf },
    /// Render HTML
    Html { input: PathBuf },
    /// Re-serialize as Markdown
    Fmt { input: PathBuf },
    /// List template tags and verify they survive re-serialization
    Check { input: PathBuf },
}

/// A template tag found in a document: tag-marked text or a link href.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FoundTag {
    Text(String),
    Href(String),
}

impl FoundTag {
    fn raw(&self) -> &str {
        match self {
            Self::Text(raw) | Self::Href(raw) => raw,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            let path = Config::expand_path(path);
            Config::load_from_path(&path)?
                .with_context(|| format!("config file {} not found", path.display()))?
        }
        None => Config::load()?.unwrap_or_default(),
    };
    log::debug!("using {config:?}");
    Ok(config)
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut src = String::new();
        std::io::stdin()
            .read_to_string(&mut src)
            .context("failed to read stdin")?;
        return Ok(src);
    }
    std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    let parser = DocumentParser::new(config.parser_options());
    let serializer = MarkdownSerializer::new(config.serializer_options());

    match cli.command {
        Command::Tokens { input } => {
            let src = read_input(&input)?;
            print!("{}", dump_tokens(&parser.tokenizer().parse(&src)));
        }
        Command::Tree { input } => {
            let doc = parser.parse(&read_input(&input)?)?;
            print!("{}", doc.dump());
        }
        Command::Html { input } => {
            let doc = parser.parse(&read_input(&input)?)?;
            print!("{}", to_html(&doc));
        }
        Command::Fmt { input } => {
            let doc = parser.parse(&read_input(&input)?)?;
            println!("{}", serializer.serialize(&doc));
        }
        Command::Check { input } => {
            let src = read_input(&input)?;
            if !check(&src, &parser, &serializer)? {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Print every tag, then report tags that re-serializing changes.
/// Returns whether all tags were preserved.
fn check(src: &str, parser: &DocumentParser, serializer: &MarkdownSerializer) -> Result<bool> {
    let before = collect_tags(&parser.parse(src)?);
    for tag in &before {
        match tag {
            FoundTag::Text(raw) => println!("tag   {raw}"),
            FoundTag::Href(raw) => println!("href  {raw}"),
        }
    }

    let output = serializer.serialize(&parser.parse(src)?);
    let after = collect_tags(&parser.parse(&output)?);
    let changed = changed_tags(&before, &after);

    if changed.is_empty() {
        println!("{} tags preserved", before.len());
        return Ok(true);
    }
    for (old, new) in &changed {
        eprintln!(
            "changed: {:?} -> {:?}",
            old.map_or("", FoundTag::raw),
            new.map_or("", FoundTag::raw)
        );
    }
    Ok(false)
}

/// Pairs of tags that differ between two tag lists, in document order.
fn changed_tags<'a>(
    before: &'a [FoundTag],
    after: &'a [FoundTag],
) -> Vec<(Option<&'a FoundTag>, Option<&'a FoundTag>)> {
    (0..before.len().max(after.len()))
        .map(|i| (before.get(i), after.get(i)))
        .filter(|(old, new)| old != new)
        .collect()
}

fn collect_tags(doc: &Node) -> Vec<FoundTag> {
    let mut found = Vec::new();
    collect_into(doc, &mut found);
    found
}

fn collect_into(node: &Node, found: &mut Vec<FoundTag>) {
    if !node.is_textblock() {
        for child in &node.content {
            collect_into(child, found);
        }
        return;
    }

    let mut previous_link = None;
    for child in &node.content {
        let link = child
            .marks
            .iter()
            .find(|mark| matches!(mark, Mark::Link { .. }));
        if let Some(Mark::Link { href, .. }) = link
            && link != previous_link
            && TemplateTag::from_raw(href).is_some()
        {
            found.push(FoundTag::Href(href.clone()));
        }
        previous_link = link;

        if child.marks.contains(&Mark::Liquid)
            && let Some(text) = child.as_text()
        {
            found.push(FoundTag::Text(text.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn tags(src: &str) -> Vec<FoundTag> {
        collect_tags(&DocumentParser::default().parse(src).unwrap())
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommand_and_config() {
        let cli = Cli::try_parse_from(["liquidmark", "--config", "c.toml", "check", "-"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Command::Check { input } if input == Path::new("-")));
    }

    #[test]
    fn collects_tags_in_document_order() {
        assert_eq!(
            tags("# {{ title }}\n\n* [a *b*]({{ url }}) {% if x %}\n"),
            vec![
                FoundTag::Text("{{ title }}".to_string()),
                FoundTag::Href("{{ url }}".to_string()),
                FoundTag::Text("{% if x %}".to_string()),
            ]
        );
    }

    #[test]
    fn plain_links_are_not_tags() {
        assert_eq!(tags("[a](/b) {{ c }}"), vec![FoundTag::Text("{{ c }}".to_string())]);
    }

    #[rstest]
    #[case("Hi {{ name }}, *{{ a*b }}*\n\n> {% if x_y %}")]
    #[case("[x]({{ \"a\" | url }})")]
    #[case("Price: \\{% raw %} {\\{ x }}")]
    fn check_passes_for_preserved_tags(#[case] src: &str) {
        let parser = DocumentParser::default();
        assert!(check(src, &parser, &MarkdownSerializer::default()).unwrap());
    }

    #[test]
    fn changed_tags_are_reported() {
        let before = vec![FoundTag::Text("{{ a }}".to_string())];
        let after = vec![FoundTag::Text("{{ b }}".to_string())];
        assert_eq!(
            changed_tags(&before, &after),
            vec![(Some(&before[0]), Some(&after[0]))]
        );
        assert_eq!(changed_tags(&before, &[]), vec![(Some(&before[0]), None)]);
        assert!(changed_tags(&before, &before).is_empty());
    }
}
