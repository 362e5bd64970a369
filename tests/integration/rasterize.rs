use svg_png_export::{rasterize, HandleRegistry, Options, Rasterizer, RenderRequest, Scale};

use crate::{load_png, svg, RED, WHITE};

fn render(markup: &str, scale: f32) -> crate::Image {
    let req = RenderRequest::new(markup, Scale::new(scale).unwrap());
    load_png(&rasterize(&req, &Options::default()).unwrap())
}

#[test]
fn view_box_size_for_every_preset() {
    let markup = svg(r#"viewBox="0 0 37 23""#, r#"<circle cx="10" cy="10" r="5"/>"#);
    for scale in Scale::PRESETS {
        let req = RenderRequest::new(&markup, scale);
        let img = load_png(&rasterize(&req, &Options::default()).unwrap());
        let s = scale.get() as u32;
        assert_eq!((img.width, img.height), (37 * s, 23 * s), "{}", scale);
    }
}

#[test]
fn view_box_100x50_at_2x() {
    let markup = svg(
        r#"viewBox="0 0 100 50""#,
        r#"<rect x="25" y="10" width="50" height="30" fill="red"/>"#,
    );
    let img = render(&markup, 2.0);
    assert_eq!((img.width, img.height), (200, 100));
    assert_eq!(img.pixel(100, 50), RED);
    assert_eq!(img.pixel(0, 0), WHITE);
    assert_eq!(img.pixel(199, 99), WHITE);
}

#[test]
fn view_box_wins_over_width_and_height() {
    let markup = svg(
        r#"width="10" height="10" viewBox="0 0 100 50""#,
        r#"<rect width="100" height="50" fill="red"/>"#,
    );
    let img = render(&markup, 3.0);
    assert_eq!((img.width, img.height), (300, 150));
    // The natural 10x10 image is stretched into the raster.
    assert_eq!(img.pixel(150, 75), RED);
}

#[test]
fn natural_size_without_view_box() {
    let markup = svg(r#"width="300" height="150""#, "");
    let img = render(&markup, 3.0);
    assert_eq!((img.width, img.height), (900, 450));
}

#[test]
fn fallback_size_without_view_box() {
    let markup = svg("", r#"<rect width="100" height="100" fill="red"/>"#);
    let req = RenderRequest::new(&markup, Scale::new(3.0).unwrap())
        .with_fallback(usvg::Size::from_wh(300.0, 150.0));
    let img = load_png(&rasterize(&req, &Options::default()).unwrap());
    assert_eq!((img.width, img.height), (900, 450));
    assert_eq!(img.pixel(450, 225), RED);
}

#[test]
fn fallback_size_from_options() {
    let markup = svg("", "");
    let opt = Options {
        fallback_size: usvg::Size::from_wh(40.0, 20.0),
        ..Options::default()
    };
    let req = RenderRequest::new(&markup, Scale::new(4.0).unwrap());
    let img = load_png(&rasterize(&req, &opt).unwrap());
    assert_eq!((img.width, img.height), (160, 80));
}

#[test]
fn fallback_per_axis() {
    let markup = svg(r#"width="64" height="32" viewBox="0 0 100 oops""#, "");
    let img = render(&markup, 2.0);
    assert_eq!((img.width, img.height), (200, 64));
}

#[test]
fn fractional_scale() {
    let markup = svg(r#"viewBox="0 0 100 50""#, "");
    let img = render(&markup, 1.5);
    assert_eq!((img.width, img.height), (150, 75));
}

#[test]
fn fractional_view_box_is_truncated() {
    let markup = svg(r#"viewBox="0 0 10.6 5.6""#, "");
    let img = render(&markup, 1.0);
    assert_eq!((img.width, img.height), (10, 5));

    let img = render(&markup, 1.5);
    assert_eq!((img.width, img.height), (15, 8));
}

#[test]
fn transparent_svg_is_white() {
    let markup = svg(
        r#"viewBox="0 0 20 20""#,
        r#"<rect width="20" height="20" fill="blue" fill-opacity="0"/>"#,
    );
    let img = render(&markup, 2.0);
    assert!(img.pixels.iter().all(|p| *p == WHITE));
}

#[test]
fn semi_transparent_content_is_composited() {
    let markup = svg(
        r#"viewBox="0 0 10 10""#,
        r#"<rect width="10" height="10" fill="black" fill-opacity="0.5"/>"#,
    );
    let img = render(&markup, 1.0);
    let p = img.pixel(5, 5);
    assert_eq!(p.a, 255);
    assert!(p.r > 100 && p.r < 150, "{:?}", p);
}

#[test]
fn deterministic() {
    let markup = svg(
        r#"viewBox="0 0 64 64""#,
        r#"<circle cx="32" cy="32" r="20" fill="green" stroke="black"/>"#,
    );
    let req = RenderRequest::new(&markup, Scale::new(6.0).unwrap());
    let a = rasterize(&req, &Options::default()).unwrap();
    let b = rasterize(&req, &Options::default()).unwrap();
    assert_eq!(load_png(&a).pixels, load_png(&b).pixels);
    assert_eq!(a, b);
}

#[test]
fn malformed_markup() {
    let opt = Options::default();
    let handles = HandleRegistry::new();
    let mut rasterizer = Rasterizer::new(&opt, &handles);

    for _ in 0..3 {
        let req = RenderRequest::new("<svg><not-closed", Scale::default());
        let err = rasterizer.rasterize(&req).unwrap_err();
        assert!(err.is_render_error());
        assert_eq!(handles.live(), 0);
    }
}

#[test]
fn zero_size() {
    let markup = svg(r#"width="0" height="10""#, "");
    let req = RenderRequest::new(&markup, Scale::default());
    let err = rasterize(&req, &Options::default()).unwrap_err();
    assert!(err.is_render_error());
}
