use svg_png_export::{
    Delivery, DirectorySink, Error, Exporter, FileSource, MemorySink, NamingPolicy, Options,
    Scale, TextSource,
};

use crate::{load_png, svg, RED};

fn exporter(scale: f32) -> Exporter {
    let mut exporter = Exporter::new(Options::default());
    exporter.set_scale(Scale::new(scale).unwrap());
    exporter.set_naming(NamingPolicy {
        date: chrono::NaiveDate::from_ymd_opt(2024, 12, 31),
    });
    exporter
}

#[test]
fn chat_transcript() {
    let transcript = format!(
        "# Traffic Light\n\nHere is the artifact:\n\n```svg\n{}\n```\n\nLet me know!",
        svg(
            r#"viewBox="0 0 30 90""#,
            r#"<circle cx="15" cy="15" r="10" fill="red"/>"#
        )
    );

    let exporter = exporter(4.0);
    let mut sink = MemorySink::default();
    let export = exporter
        .export(&TextSource(transcript), &mut sink)
        .unwrap();

    assert_eq!(export.file_name, "traffic-light-2024-12-31-4x.png");
    assert_eq!(sink.files.len(), 1);

    let img = load_png(&sink.files[0].1);
    assert_eq!((img.width, img.height), (120, 360));
    assert_eq!(img.pixel(60, 60), RED);
    assert_eq!(exporter.handles().live(), 0);
}

#[test]
fn code_comment_is_not_a_title() {
    let transcript = format!(
        "Setup:\n\n```bash\n# install deps\nnpm i\n```\n\n```svg\n{}\n```\n",
        svg(r#"viewBox="0 0 8 8""#, "")
    );

    let exporter = exporter(1.0);
    let mut sink = MemorySink::default();
    let export = exporter
        .export(&TextSource(transcript), &mut sink)
        .unwrap();

    assert_eq!(export.file_name, "svg-export-2024-12-31-1x.png");
}

#[test]
fn escaped_code_view() {
    let page = "<html><body><h2>Bar &amp; Chart</h2>\
        <pre><code>&lt;svg viewBox=&quot;0 0 10 5&quot;&gt;&lt;/svg&gt;</code></pre>\
        </body></html>";

    let exporter = exporter(1.0);
    let mut sink = MemorySink::default();
    let export = exporter
        .export(&TextSource(page.to_string()), &mut sink)
        .unwrap();

    assert_eq!(export.file_name, "bar-chart-2024-12-31-1x.png");
    let img = load_png(&sink.files[0].1);
    assert_eq!((img.width, img.height), (10, 5));
}

#[test]
fn no_markup() {
    let exporter = exporter(2.0);
    let mut sink = MemorySink::default();
    let err = exporter
        .export(&TextSource("Just some words.".to_string()), &mut sink)
        .unwrap_err();

    assert!(matches!(err, Error::NoMarkup));
    assert!(!err.is_render_error());
    assert!(sink.files.is_empty());
}

#[test]
fn render_error_delivers_nothing() {
    let exporter = exporter(2.0);
    let mut sink = MemorySink::default();
    let source = TextSource("```\n<svg><not-closed\n```".to_string());

    for _ in 0..2 {
        let err = exporter.export(&source, &mut sink).unwrap_err();
        assert!(err.is_render_error());
        assert!(err.user_message().starts_with("Error loading SVG."));
    }

    assert!(sink.files.is_empty());
    assert_eq!(exporter.handles().live(), 0);
    assert!(!exporter.is_busy());
}

#[test]
fn into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let svg_path = dir.path().join("logo.svg");
    std::fs::write(
        &svg_path,
        svg(r#"viewBox="0 0 16 16""#, "<title>Company Logo</title>"),
    )
    .unwrap();

    let out = dir.path().join("out");
    let exporter = exporter(8.0);
    let mut sink = DirectorySink::new(&out);
    let export = exporter
        .export(&FileSource::new(svg_path), &mut sink)
        .unwrap();

    let expected = out.join("company-logo-2024-12-31-8x.png");
    assert_eq!(export.delivery, Delivery::File(expected.clone()));

    let img = load_png(&std::fs::read(expected).unwrap());
    assert_eq!((img.width, img.height), (128, 128));
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter(2.0);
    let mut sink = MemorySink::default();
    let err = exporter
        .export(&FileSource::new(dir.path().join("nope.svg")), &mut sink)
        .unwrap_err();

    assert!(matches!(err, Error::Io(_)));
    assert!(!exporter.is_busy());
}
