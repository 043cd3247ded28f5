use tabload::ingestion::{Format, FormatOptions, LoaderFactory, SourceType};
use tabload::LoadError;

#[test]
fn unknown_extension_lists_every_registered_extension() {
    let factory = LoaderFactory::file();
    let err = factory.resolve_by_extension("data.UNKNOWNEXT").unwrap_err();
    let LoadError::LoaderNotFound { message } = &err else {
        panic!("unexpected error: {err}");
    };
    assert!(message.contains("unknownext"), "{message}");
    for ext in factory.extensions() {
        assert!(message.contains(ext), "missing '{ext}' in: {message}");
    }
}

#[test]
fn extensions_resolve_case_insensitively() {
    let factory = LoaderFactory::file();
    assert_eq!(factory.resolve_by_extension("a.CSV").unwrap(), Format::Csv);
    assert_eq!(factory.resolve_by_extension("dir.v2/a.tsv").unwrap(), Format::Tsv);
    assert_eq!(factory.resolve_by_extension("x.ndjson").unwrap(), Format::JsonLines);
    assert_eq!(factory.resolve_by_extension("x.jsonl").unwrap(), Format::JsonLines);
    assert_eq!(factory.resolve_by_extension("page.htm").unwrap(), Format::Html);
    assert_eq!(factory.resolve_by_extension("README.md").unwrap(), Format::Markdown);
    assert_eq!(factory.resolve_by_extension("book.xlsx").unwrap(), Format::Excel);
    assert_eq!(factory.resolve_by_extension("db.sqlite3").unwrap(), Format::Sqlite);
}

#[test]
fn empty_path_is_invalid() {
    let err = LoaderFactory::file().resolve_by_extension("  ").unwrap_err();
    assert!(matches!(err, LoadError::InvalidPath { .. }));
}

#[test]
fn names_and_aliases_resolve() {
    let factory = LoaderFactory::file();
    assert_eq!(factory.resolve_by_format_name("CSV", None).unwrap(), Format::Csv);
    assert_eq!(factory.resolve_by_format_name("ndjson", None).unwrap(), Format::JsonLines);
    assert_eq!(factory.resolve_by_format_name("ssv", None).unwrap(), Format::Ssv);
    assert_eq!(factory.resolve_by_format_name("mediawiki", None).unwrap(), Format::MediaWiki);
    assert_eq!(
        factory.resolve_by_format_name("auto", Some("x.ltsv")).unwrap(),
        Format::Ltsv
    );
}

#[test]
fn unknown_name_lists_every_registered_name() {
    let factory = LoaderFactory::file();
    let err = factory.resolve_by_format_name("yaml", None).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("'yaml'"));
    for name in factory.format_names() {
        assert!(message.contains(name), "missing '{name}' in: {message}");
    }
}

#[test]
fn text_factory_needs_an_explicit_name() {
    let factory = LoaderFactory::text();
    assert!(factory.extensions().is_empty());
    assert!(!factory.format_names().contains(&"excel"));
    assert!(!factory.format_names().contains(&"sqlite"));

    let err = factory.resolve_by_format_name("auto", None).unwrap_err();
    assert!(matches!(err, LoadError::LoaderNotFound { .. }));

    let err = factory.resolve_by_format_name("excel", None).unwrap_err();
    assert!(matches!(err, LoadError::LoaderNotFound { .. }));
}

#[test]
fn url_factory_resolves_by_url_path() {
    let factory = LoaderFactory::url();
    assert_eq!(
        factory.resolve_url("https://example.com/data/rows.json?x=1#top", None).unwrap(),
        Format::Json
    );
    assert_eq!(
        factory.resolve_url("http://example.com/t.html", Some("auto")).unwrap(),
        Format::Html
    );
    assert_eq!(
        factory.resolve_url("http://example.com/download", Some("csv")).unwrap(),
        Format::Csv
    );

    let err = factory.resolve_url("ftp://example.com/a.csv", None).unwrap_err();
    assert!(matches!(err, LoadError::InvalidUrl { .. }));

    let err = factory.resolve_url("https://example.com/", None).unwrap_err();
    assert!(matches!(err, LoadError::LoaderNotFound { .. }));
}

#[test]
fn text_loader_reports_its_configuration() {
    let mut loader = LoaderFactory::text()
        .create_from_text("a,b\n1,2\n", "csv", &FormatOptions::default())
        .unwrap();
    assert_eq!(loader.format_name(), "csv");
    assert_eq!(loader.source_type(), SourceType::Text);
    assert_eq!(loader.table_name_template(), "%(format_name)s%(format_id)s");

    loader.set_table_name_template("t_%(global_id)s");
    assert_eq!(loader.table_name_template(), "t_%(global_id)s");
}

#[test]
fn file_loader_default_templates_follow_the_format() {
    let factory = LoaderFactory::file();
    let opts = FormatOptions::default();
    let cases = [
        ("tests/fixtures/people.csv", "%(filename)s"),
        ("tests/fixtures/roster.json", "%(filename)s_%(key)s"),
        ("tests/fixtures/planets.html", "%(filename)s_%(key)s"),
        ("tests/fixtures/access.ltsv", "%(filename)s"),
    ];
    for (path, template) in cases {
        let loader = factory.create_from_path(path, None, &opts).unwrap();
        assert_eq!(loader.source_type(), SourceType::File);
        assert_eq!(loader.table_name_template(), template, "{path}");
    }
}

#[test]
fn explicit_format_overrides_the_extension() {
    let loader = LoaderFactory::file()
        .create_from_path("tests/fixtures/planets.wiki", Some("mediawiki"), &FormatOptions::default())
        .unwrap();
    assert_eq!(loader.format_name(), "mediawiki");
}

#[cfg(not(feature = "excel"))]
#[test]
fn excel_without_feature_is_reported() {
    let err = LoaderFactory::file()
        .create_from_path("book.xlsx", None, &FormatOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        LoadError::FeatureDisabled {
            feature: "excel",
            ..
        }
    ));
}
