use liquidmark_syntax::helpers::{MAX_DESTINATION_DEPTH, parse_link_destination};
use liquidmark_syntax::{MarkdownParser, ParserOptions, Token, TokenKind, parse};
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Inline tokens of the first paragraph.
fn inline(src: &str) -> Vec<Token> {
    inline_with(&MarkdownParser::default(), src)
}

fn inline_with(parser: &MarkdownParser, src: &str) -> Vec<Token> {
    parser
        .parse(src)
        .into_iter()
        .find(|t| t.kind == TokenKind::Inline)
        .map(|t| t.children)
        .unwrap_or_default()
}

fn kinds(tokens: &[Token]) -> Vec<&'static str> {
    tokens.iter().map(|t| t.kind.name()).collect()
}

fn tag_texts(tokens: &[Token]) -> Vec<String> {
    tokens
        .windows(2)
        .filter(|pair| pair[0].kind == TokenKind::LiquidOpen)
        .map(|pair| pair[1].content.clone())
        .collect()
}

fn first_link(tokens: &[Token]) -> Option<&Token> {
    tokens.iter().find(|t| t.kind == TokenKind::LinkOpen)
}

#[test]
fn star_inside_tag_is_not_an_emphasis_delimiter() {
    let tokens = inline("*a{{ b * c }}d*");
    assert_eq!(
        kinds(&tokens),
        vec![
            "em_open",
            "text",
            "liquid_open",
            "text",
            "liquid_close",
            "text",
            "em_close"
        ]
    );
    assert_eq!(tokens[1].content, "a");
    assert_eq!(tokens[3].content, "{{ b * c }}");
    assert_eq!(tokens[5].content, "d");
}

#[test]
fn underscores_inside_statement_survive() {
    let tokens = inline("_{% if x_y_z %}_");
    assert_eq!(tag_texts(&tokens), vec!["{% if x_y_z %}"]);
    assert_eq!(tokens[0].kind, TokenKind::EmOpen);
}

#[rstest]
#[case("{{ unterminated")]
#[case("text {% if")]
#[case("{{ a }")]
fn unterminated_tag_is_plain_text(#[case] src: &str) {
    let tokens = inline(src);
    assert_eq!(kinds(&tokens), vec!["text"]);
    assert_eq!(tokens[0].content, src);
}

#[rstest]
#[case("[label]({{ url_tag }})", "{{ url_tag }}")]
#[case("[label]({{ a < b }})", "{{ a < b }}")]
#[case("[label]({% url 'home' %})", "{% url 'home' %}")]
#[case("[label]({{ x }} \"Title\")", "{{ x }}")]
fn tag_destination_is_verbatim(#[case] src: &str, #[case] href: &str) {
    let tokens = inline(src);
    let link = first_link(&tokens).expect("link");
    assert_eq!(link.attr("href"), Some(href));
}

#[test]
fn tag_destination_keeps_title() {
    let tokens = inline("[label]({{ x }} \"Title\")");
    assert_eq!(first_link(&tokens).and_then(|l| l.attr("title")), Some("Title"));
}

#[test]
fn tag_destination_needs_tag_extension() {
    let parser = MarkdownParser::new(ParserOptions {
        liquid_tags: false,
        ..ParserOptions::default()
    });
    let tokens = inline_with(&parser, "[label]({{ a < b }})");
    assert!(first_link(&tokens).is_none());
}

/// Conventional destinations parse the same with or without the tag
/// extension, and agree with an independent CommonMark implementation.
#[rstest]
#[case("[label](https://example.org/path (x))")]
#[case("[label](https://example.org/a(b)c)")]
#[case("[label](/url \"title\")")]
#[case("[label](</my-url>)")]
#[case("[label](foo\\)bar)")]
#[case("[label](/a((b))c 'single')")]
fn conventional_destination_unaffected(#[case] src: &str) {
    let plain = MarkdownParser::new(ParserOptions {
        liquid_tags: false,
        ..ParserOptions::default()
    });

    let with_tags = inline(src);
    let without_tags = inline_with(&plain, src);
    assert_eq!(with_tags, without_tags);

    let link = first_link(&with_tags).expect("link");
    let (dest, title) = reference_link(src);
    assert_eq!(link.attr("href"), Some(dest.as_str()));
    assert_eq!(link.attr("title").unwrap_or(""), title);
}

fn reference_link(src: &str) -> (String, String) {
    use pulldown_cmark::{Event, Parser, Tag};

    Parser::new(src)
        .find_map(|event| match event {
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) => Some((dest_url.to_string(), title.to_string())),
            _ => None,
        })
        .expect("reference implementation found no link")
}

#[test]
fn destination_depth_guard() {
    let nested = |depth: usize| {
        format!(
            "[a]({}x{})",
            "(".repeat(depth),
            ")".repeat(depth)
        )
    };

    let at_limit = inline(&nested(MAX_DESTINATION_DEPTH));
    assert!(first_link(&at_limit).is_some());

    let too_deep = inline(&nested(MAX_DESTINATION_DEPTH + 1));
    assert!(first_link(&too_deep).is_none());

    let src = format!("{}x", "(".repeat(MAX_DESTINATION_DEPTH + 1));
    assert_eq!(parse_link_destination(&src, 0, src.len()), None);
}

#[rstest]
#[case("{% if x %}", true)]
#[case("{{ x }}", true)]
#[case("{$ x $}", false)]
#[case("{ x }", false)]
#[case("{{ x %}", false)]
fn delimiter_forms(#[case] src: &str, #[case] is_tag: bool) {
    let tokens = inline(src);
    assert_eq!(tag_texts(&tokens).len(), usize::from(is_tag), "{src}");
}

#[test]
fn tags_in_every_inline_context() {
    let tokens = parse(
        "# {{ title }}\n\n> {% quote %}\n\n* item {{ i }}\n\nSetext {{ s }}\n---\n",
    );
    let found: Vec<String> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Inline)
        .flat_map(|t| tag_texts(&t.children))
        .collect();
    assert_eq!(
        found,
        vec!["{{ title }}", "{% quote %}", "{{ i }}", "{{ s }}"]
    );
}

#[test]
fn tags_in_code_are_not_tags() {
    let tokens = parse("`{{ x }}`\n\n    {{ y }}\n");
    let inline = &tokens[1].children;
    assert_eq!(kinds(inline), vec!["code_inline"]);
    assert_eq!(tokens[3].kind, TokenKind::CodeBlock);
    assert_eq!(tokens[3].content, "{{ y }}\n");
}

#[test]
fn tag_span_maps_back_to_inline_source() {
    let src = "see {{ a }} and {% b %}";
    let tokens = inline(src);
    for token in tokens.iter().filter(|t| t.span.is_some()) {
        let span = token.span.clone().unwrap_or_default();
        assert_eq!(&src[span], token.content);
    }
    assert_eq!(tokens.iter().filter(|t| t.span.is_some()).count(), 2);
}
