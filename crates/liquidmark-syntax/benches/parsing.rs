use criterion::{Criterion, criterion_group, criterion_main};
use liquidmark_syntax::{MarkdownParser, ParserOptions};

fn generate_template(size: usize) -> String {
    let base = "# {{ page.title }}\n\n{% if user %}Hello *{{ user.name }}*, see [the docs]({{ docs_url }}).{% endif %}\n\n- Item with `code` and **strong {{ x }}**\n  - Nested [link](https://example.org/a(b) \"t\")\n- Another {% for i in items %}{{ i }}{% endfor %}\n\n```liquid\n{{ raw }}\n```\n\n";
    base.repeat(size)
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let content = generate_template(100);
    let with_tags = MarkdownParser::default();
    let without_tags = MarkdownParser::new(ParserOptions {
        liquid_tags: false,
        ..ParserOptions::default()
    });

    group.bench_function("parse_with_tags", |b| {
        b.iter(|| {
            let tokens = with_tags.parse(std::hint::black_box(&content));
            std::hint::black_box(tokens);
        });
    });

    group.bench_function("parse_without_tags", |b| {
        b.iter(|| {
            let tokens = without_tags.parse(std::hint::black_box(&content));
            std::hint::black_box(tokens);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
