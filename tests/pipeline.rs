use rusub_merge::aggregate::AggregationContext;
use rusub_merge::normalize::normalize;
use rusub_merge::output::build_writer;
use rusub_merge::root::RootStrategy;
use rusub_merge::runner::build_domain_map;
use rusub_merge::sources::{CrtShFileSource, FileSource, Source, StaticSource};

const CRTSH_SAMPLE: &str = r#"[
  {"name_value": "*.example.com\nexample.com"},
  {"name_value": "Mail.Example.com"},
  {"name_value": "evil.example.org"}
]"#;

#[tokio::test]
async fn full_pipeline_from_mixed_sources() {
    let dir = tempfile::tempdir().unwrap();
    let amass = dir.path().join("amass_output.txt");
    let crtsh = dir.path().join("crtsh_domains.json");
    std::fs::write(&amass, "api.example.com\nwww.example.com\nnot a domain!!\n\n").unwrap();
    std::fs::write(&crtsh, CRTSH_SAMPLE).unwrap();

    let sources: Vec<Box<dyn Source>> = vec![
        Box::new(FileSource::named("amass", amass)),
        Box::new(FileSource::named("subfinder", dir.path().join("subfinder_output.txt"))),
        Box::new(CrtShFileSource::new(crtsh)),
        Box::new(StaticSource::new("stdin", vec!["api.example.com".into(), " API.EXAMPLE.COM ".into()])),
    ];
    let mut ctx = AggregationContext::new();
    ctx.collect(&sources).await;

    let target = normalize("example.com").unwrap();
    let resolver = RootStrategy::Heuristic.resolver();
    let (map, summary) = build_domain_map(ctx, &target, resolver.as_ref());
    assert_eq!(summary.sources["subfinder"].lines, 0);
    assert_eq!(summary.out_of_scope, 1);
    assert_eq!(summary.dropped, 1);

    let out = dir.path().join("domains.txt");
    build_writer(out.clone(), "txt", false).unwrap().write(&map, &summary).unwrap();
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "ROOT: example.com\nSUBS:\napi.example.com\nmail.example.com\nwww.example.com\n--------\n"
    );
}

#[tokio::test]
async fn nothing_found_writes_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let sources: Vec<Box<dyn Source>> = vec![Box::new(StaticSource::new("empty", vec![]))];
    let mut ctx = AggregationContext::new();
    ctx.collect(&sources).await;
    let target = normalize("example.com").unwrap();
    let (map, summary) = build_domain_map(ctx, &target, RootStrategy::Heuristic.resolver().as_ref());
    assert!(map.is_empty());
    let out = dir.path().join("domains.txt");
    build_writer(out.clone(), "txt", false).unwrap().write(&map, &summary).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "");
}

#[test]
fn root_only_report_has_no_subs_block() {
    let mut ctx = AggregationContext::new();
    ctx.absorb("crt.sh", ["example.com", "*.example.com"]);
    let target = normalize("example.com").unwrap();
    let (map, summary) = build_domain_map(ctx, &target, RootStrategy::Heuristic.resolver().as_ref());
    let mut buf = Vec::new();
    rusub_merge::output::render_plain(&map, &mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "ROOT: example.com\n--------\n");
    assert_eq!(summary.subdomains, 0);
}
