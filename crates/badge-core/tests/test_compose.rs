mod common;

use approx::assert_abs_diff_eq;
use image::{Rgba, RgbaImage};

use badge_core::compose::{placement, ArtifactKind, Compositor, LabelFont};
use badge_core::config::MarkOptions;
use badge_core::error::RenderError;
use badge_core::geometry::geometry;
use badge_core::transform::TransformModel;

use common::{
    channel_diff, downsample_2x, gradient_source, loaded_model, solid_source, source_from_fn,
};

#[test]
fn test_empty_model_renders_nothing() {
    let compositor = Compositor::default();
    let model = TransformModel::new(300);
    assert_eq!(compositor.render(&model, 2000), Ok(None));
    assert_eq!(
        compositor.render_print_ready(&model, &MarkOptions::default()),
        Ok(None)
    );
}

#[test]
fn test_zero_export_size_is_render_error() {
    let compositor = Compositor::default();
    let model = loaded_model(solid_source(50, 50, [9, 9, 9]), 300);
    assert_eq!(
        compositor.render(&model, 0),
        Err(RenderError::InvalidSize(0))
    );
}

#[test]
fn test_oversized_export_is_render_error() {
    let compositor = Compositor::default();
    let model = loaded_model(solid_source(50, 50, [9, 9, 9]), 300);
    assert_eq!(
        compositor.render(&model, 100_000),
        Err(RenderError::InvalidSize(100_000))
    );
    let opts = MarkOptions {
        dpi: 20_000.0,
        ..Default::default()
    };
    assert!(matches!(
        compositor.render_print_ready(&model, &opts),
        Err(RenderError::InvalidDpi(_))
    ));
}

#[test]
fn test_invalid_dpi_is_render_error() {
    let compositor = Compositor::default();
    let model = loaded_model(solid_source(50, 50, [9, 9, 9]), 300);
    let opts = MarkOptions {
        dpi: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        compositor.render_print_ready(&model, &opts),
        Err(RenderError::InvalidDpi(_))
    ));
}

#[test]
fn test_plain_render_is_circular_and_transparent_outside() {
    let compositor = Compositor::default();
    let model = loaded_model(solid_source(200, 200, [200, 40, 10]), 100);
    let artifact = compositor.render(&model, 120).unwrap().unwrap();

    assert_eq!(artifact.kind, ArtifactKind::Plain);
    assert_eq!((artifact.width, artifact.height), (120, 120));
    assert!(artifact.png_bytes().starts_with(b"\x89PNG"));

    let img = artifact.to_rgba().unwrap();
    assert_eq!(img.dimensions(), (120, 120));
    // Corners lie outside the circle.
    for (x, y) in [(0, 0), (119, 0), (0, 119), (119, 119), (10, 10)] {
        assert_eq!(img.get_pixel(x, y).0[3], 0, "pixel ({x},{y}) should be clear");
    }
    // Center and points well inside the circle carry the image.
    for (x, y) in [(60, 60), (60, 10), (10, 60), (100, 60)] {
        let p = img.get_pixel(x, y);
        assert!(
            channel_diff(p, &Rgba([200, 40, 10, 255])) <= 2,
            "pixel ({x},{y}) = {p:?}"
        );
    }
}

#[test]
fn test_offset_image_leaves_gap_inside_circle() {
    let compositor = Compositor::default();
    // 100px image at zoom 1 fills a 100px viewport; shift it right by half.
    let mut model = loaded_model(solid_source(100, 100, [0, 0, 255]), 100);
    model.set_zoom(1.0);
    model.set_position(50.0, 0.0);

    let img = compositor.render(&model, 200).unwrap().unwrap().to_rgba().unwrap();
    // Left half of the circle is now empty, right half is blue.
    assert_eq!(img.get_pixel(40, 100).0[3], 0);
    assert!(channel_diff(img.get_pixel(160, 100), &Rgba([0, 0, 255, 255])) <= 2);
}

#[test]
fn test_data_url() {
    let compositor = Compositor::default();
    let model = loaded_model(solid_source(40, 40, [1, 2, 3]), 40);
    let artifact = compositor.render(&model, 16).unwrap().unwrap();
    let url = artifact.to_data_url();
    assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"), "got: {url}");
}

#[test]
fn test_scale_invariance() {
    let compositor = Compositor::default();
    let mut model = loaded_model(gradient_source(64, 48), 100);
    model.set_zoom(3.0);
    model.set_position(5.0, -3.0);
    model.set_rotation(15.0);

    let small = compositor.render(&model, 100).unwrap().unwrap().to_rgba().unwrap();
    let large = compositor.render(&model, 200).unwrap().unwrap().to_rgba().unwrap();
    let reduced = downsample_2x(&large);
    assert_eq!(reduced.dimensions(), small.dimensions());

    // Compare inside the circle, away from the antialiased clip edge.
    let mut compared = 0;
    for y in 0..100u32 {
        for x in 0..100u32 {
            let dx = x as f64 + 0.5 - 50.0;
            let dy = y as f64 + 0.5 - 50.0;
            if (dx * dx + dy * dy).sqrt() > 44.0 {
                continue;
            }
            let a = small.get_pixel(x, y);
            let b = reduced.get_pixel(x, y);
            assert!(
                channel_diff(a, b) <= 6,
                "pixel ({x},{y}): {a:?} vs {b:?}"
            );
            compared += 1;
        }
    }
    assert!(compared > 5000);
}

#[test]
fn test_placement_scales_position_and_size() {
    let mut model = loaded_model(solid_source(600, 400, [1, 2, 3]), 300);
    model.set_zoom(1.5);
    model.set_position(30.0, -12.0);
    model.set_rotation(-40.0);

    let p = placement(&model, 900.0, 450.0).unwrap();
    assert_abs_diff_eq!(p.scale_factor, 3.0);
    assert_abs_diff_eq!(p.center_x, 450.0 + 90.0);
    assert_abs_diff_eq!(p.center_y, 450.0 - 36.0);
    assert_abs_diff_eq!(p.drawn_width, 600.0 * 1.5 * 3.0);
    assert_abs_diff_eq!(p.drawn_height, 400.0 * 1.5 * 3.0);
    assert_abs_diff_eq!(p.rotation, -40.0);

    assert!(placement(&TransformModel::new(300), 900.0, 450.0).is_none());
}

/// Source whose red/green channels encode position around the image center.
fn coordinate_source(width: u32, height: u32) -> badge_core::source::SourceImage {
    let (cx, cy) = (width as i64 / 2, height as i64 / 2);
    source_from_fn(width, height, |x, y| {
        [
            (x as i64 - cx + 128).clamp(0, 255) as u8,
            (y as i64 - cy + 128).clamp(0, 255) as u8,
            60,
            255,
        ]
    })
}

#[test]
fn test_end_to_end_export_reproduces_preview_transform() {
    let compositor = Compositor::default();
    let mut model = loaded_model(coordinate_source(1800, 1200), 300);
    model.set_zoom(1.2);
    model.set_position(20.0, -10.0);
    model.set_rotation(15.0);

    let export_size = 2000;
    let p = placement(&model, export_size as f64, export_size as f64 / 2.0).unwrap();
    let natural = model.natural_size().unwrap();
    assert_abs_diff_eq!(p.scale_factor, 2000.0 / 300.0, epsilon = 1e-12);

    let recovered = p.preview_transform(natural);
    assert_abs_diff_eq!(recovered.position.x, 20.0, epsilon = 1e-9);
    assert_abs_diff_eq!(recovered.position.y, -10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(recovered.zoom, 1.2, epsilon = 1e-9);
    assert_abs_diff_eq!(recovered.rotation, 15.0, epsilon = 1e-9);

    let artifact = compositor.render(&model, export_size).unwrap().unwrap();
    let img = artifact.to_rgba().unwrap();
    assert_eq!(img.dimensions(), (2000, 2000));

    // One source pixel spans 1.2 * 2000/300 = 8 output pixels, so sampling
    // the mapped center of a source pixel must return that pixel's value.
    for (sx, sy) in [(900u32, 600u32), (950, 620), (860, 560), (1000, 650)] {
        let (ox, oy) = p.map_source_point(natural, sx as f64 + 0.5, sy as f64 + 0.5);
        let px = img.get_pixel(ox.floor() as u32, oy.floor() as u32);
        let expected_r = (sx as i64 - 900 + 128) as u8;
        let expected_g = (sy as i64 - 600 + 128) as u8;
        assert!(
            px.0[0].abs_diff(expected_r) <= 3 && px.0[1].abs_diff(expected_g) <= 3,
            "source ({sx},{sy}) -> output ({ox:.1},{oy:.1}) = {px:?}, expected r={expected_r} g={expected_g}"
        );
        assert_eq!(px.0[3], 255);
    }
}

#[test]
fn test_print_ready_layout() {
    let compositor = Compositor::default();
    let model = loaded_model(solid_source(400, 400, [0, 200, 0]), 300);
    let opts = MarkOptions::default();
    let g = geometry(opts.dpi).unwrap();

    let artifact = compositor.render_print_ready(&model, &opts).unwrap().unwrap();
    assert_eq!(artifact.kind, ArtifactKind::PrintReady);
    assert_eq!(artifact.width, g.canvas_size_px);
    assert_eq!(artifact.height, g.canvas_size_px);

    let img = artifact.to_rgba().unwrap();
    let c = g.canvas_size_px / 2;

    // Background outside the bleed circle.
    assert_eq!(*img.get_pixel(5, 5), Rgba([255, 255, 255, 255]));
    assert_eq!(
        *img.get_pixel(c + g.bleed_diameter_px / 2 + 20, c),
        Rgba([255, 255, 255, 255])
    );

    // Image fills the bleed ring beyond the cutting line.
    let ring_x = c + (g.cutting_diameter_px / 2 + g.bleed_diameter_px / 2) / 2;
    assert!(channel_diff(img.get_pixel(ring_x, c), &Rgba([0, 200, 0, 255])) <= 2);
    assert!(channel_diff(img.get_pixel(c, c), &Rgba([0, 200, 0, 255])) <= 2);

    // Solid blue cutting line.
    let cut = img.get_pixel(c + g.cutting_diameter_px / 2, c);
    assert!(cut.0[2] > 200 && cut.0[0] < 60 && cut.0[1] < 60, "cut line {cut:?}");

    // Black corner registration mark on the left arm of the top-left corner.
    let inset = (g.label_margin_px as f32 * 0.25) as u32;
    let mark = img.get_pixel(inset, inset + 10);
    assert!(mark.0[0] < 80 && mark.0[1] < 80 && mark.0[2] < 80, "mark {mark:?}");
}

#[test]
fn test_print_ready_toggles() {
    let compositor = Compositor::default();
    let model = loaded_model(solid_source(400, 400, [0, 200, 0]), 300);
    let g = geometry(300.0).unwrap();
    let c = g.canvas_size_px / 2;

    let no_cut = MarkOptions {
        show_cut_line: false,
        ..Default::default()
    };
    let img = compositor
        .render_print_ready(&model, &no_cut)
        .unwrap()
        .unwrap()
        .to_rgba()
        .unwrap();
    assert!(channel_diff(img.get_pixel(c + g.cutting_diameter_px / 2, c), &Rgba([0, 200, 0, 255])) <= 2);

    let base = compositor
        .render_print_ready(&model, &MarkOptions::default())
        .unwrap()
        .unwrap();
    let with_safe = compositor
        .render_print_ready(
            &model,
            &MarkOptions {
                show_safe_zone: true,
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    let no_bleed = compositor
        .render_print_ready(
            &model,
            &MarkOptions {
                show_bleed_line: false,
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_ne!(base.png_bytes(), with_safe.png_bytes());
    assert_ne!(base.png_bytes(), no_bleed.png_bytes());
}

#[test]
fn test_print_ready_background_color() {
    let compositor = Compositor::default();
    let model = loaded_model(solid_source(400, 400, [0, 200, 0]), 300);
    let opts = MarkOptions {
        background_color: "#102030".parse().unwrap(),
        ..Default::default()
    };
    let img = compositor
        .render_print_ready(&model, &opts)
        .unwrap()
        .unwrap()
        .to_rgba()
        .unwrap();
    assert_eq!(*img.get_pixel(5, 5), Rgba([0x10, 0x20, 0x30, 255]));
}

#[test]
fn test_print_ready_higher_dpi_is_larger() {
    let compositor = Compositor::default();
    let model = loaded_model(solid_source(400, 400, [0, 200, 0]), 300);
    let lo = compositor
        .render_print_ready(&model, &MarkOptions { dpi: 150.0, ..Default::default() })
        .unwrap()
        .unwrap();
    let hi = compositor
        .render_print_ready(&model, &MarkOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(lo.width, geometry(150.0).unwrap().canvas_size_px);
    assert!(hi.width > lo.width);
}

#[test]
fn test_translucent_source_keeps_straight_color() {
    let compositor = Compositor::default();
    let model = loaded_model(source_from_fn(64, 64, |_, _| [200, 100, 0, 128]), 64);
    let img = compositor.render(&model, 64).unwrap().unwrap().to_rgba().unwrap();
    let p = img.get_pixel(32, 32);
    assert!(channel_diff(p, &Rgba([200, 100, 0, 128])) <= 3, "center {p:?}");
}

#[test]
fn test_bundled_label_font() {
    let font = LabelFont::bundled().unwrap();
    assert!(font.measure("CUT 58mm", 24.0) > 0.0);
    assert!(font.measure("CUT 58mm", 48.0) > font.measure("CUT 58mm", 24.0));
    assert_eq!(font.measure("", 24.0), 0.0);
    assert!(Compositor::default().has_label_font());
    assert!(Compositor::default().with_system_font().has_label_font());
}

/// Pixels in rows `ys` within `half_width` of the horizontal center that
/// satisfy `pred`.
fn count_in_band(
    img: &RgbaImage,
    ys: std::ops::Range<u32>,
    half_width: u32,
    pred: impl Fn(&Rgba<u8>) -> bool,
) -> usize {
    let c = img.width() / 2;
    ys.flat_map(|y| (c - half_width..c + half_width).map(move |x| (x, y)))
        .filter(|&(x, y)| pred(img.get_pixel(x, y)))
        .count()
}

fn is_red(p: &Rgba<u8>) -> bool {
    p.0[0] > 150 && p.0[1] < 100 && p.0[2] < 100
}

fn is_green(p: &Rgba<u8>) -> bool {
    p.0[1] > 120 && p.0[0] < 100 && p.0[2] < 100
}

fn is_blue(p: &Rgba<u8>) -> bool {
    p.0[2] > 150 && p.0[0] < 100 && p.0[1] < 100
}

fn is_dark(p: &Rgba<u8>) -> bool {
    p.0[0] < 100 && p.0[1] < 100 && p.0[2] < 100
}

fn is_ink(p: &Rgba<u8>) -> bool {
    p.0[..3].iter().any(|&v| v < 200)
}

#[test]
fn test_print_labels_above_and_below_badge() {
    let compositor = Compositor::default();
    let model = loaded_model(solid_source(400, 400, [0, 200, 0]), 300);
    let g = geometry(300.0).unwrap();
    let margin = g.label_margin_px;
    let bottom_edge = g.canvas_size_px - margin;
    let top = margin / 2..margin - 6;
    let cut_label = bottom_edge + 6..bottom_edge + margin / 3;
    let caption = bottom_edge + margin / 3 + 2..g.canvas_size_px - 20;

    let render = |opts: MarkOptions| {
        compositor
            .render_print_ready(&model, &opts)
            .unwrap()
            .unwrap()
            .to_rgba()
            .unwrap()
    };

    // Defaults: red bleed label on top, blue cut label and black caption below.
    let img = render(MarkOptions::default());
    assert!(count_in_band(&img, top.clone(), 200, is_red) > 20);
    assert!(count_in_band(&img, cut_label.clone(), 200, is_blue) > 20);
    assert!(count_in_band(&img, caption.clone(), 200, is_dark) > 20);

    // Bleed label gone with the bleed line; safe zone is off by default.
    let img = render(MarkOptions {
        show_bleed_line: false,
        ..Default::default()
    });
    assert_eq!(count_in_band(&img, top.clone(), 200, is_ink), 0);

    // Safe zone label takes its place in its own color.
    let img = render(MarkOptions {
        show_bleed_line: false,
        show_safe_zone: true,
        ..Default::default()
    });
    assert!(count_in_band(&img, top.clone(), 200, is_green) > 20);
    assert_eq!(count_in_band(&img, top, 200, is_red), 0);

    // Cut label gone with the cut line; the caption stays.
    let img = render(MarkOptions {
        show_cut_line: false,
        ..Default::default()
    });
    let below = bottom_edge + 6..g.canvas_size_px - 20;
    assert_eq!(count_in_band(&img, below.clone(), 200, is_blue), 0);
    assert!(count_in_band(&img, below, 200, is_dark) > 20);
}
