use mandelset_core::{Complex, Extent, Membership, PixelSize, RenderParameters, Viewport};

/// Classify every pixel of a viewport serially into a row-major Vec.
fn render_grid(params: &RenderParameters) -> Vec<Membership> {
    let size = params.viewport.pixel_size;
    let mut results = Vec::with_capacity((size.width * size.height) as usize);
    for py in 0..size.height {
        for px in 0..size.width {
            results.push(params.classify_pixel(px, py));
        }
    }
    results
}

#[test]
fn headless_mandelbrot_render() {
    let params =
        RenderParameters::new(Viewport::default_mandelbrot(100, 70)).with_max_iterations(256);

    let results = render_grid(&params);

    assert_eq!(results.len(), 100 * 70);
    let bounded = results.iter().filter(|m| m.is_bounded()).count();
    let escaped = results.len() - bounded;
    assert!(bounded > 0, "should have some bounded points");
    assert!(escaped > 0, "should have some escaped points");
}

#[test]
fn headless_render_is_deterministic() {
    let params =
        RenderParameters::new(Viewport::default_mandelbrot(80, 60)).with_max_iterations(500);

    assert_eq!(
        render_grid(&params),
        render_grid(&params),
        "two identical renders must produce identical results"
    );
}

#[test]
fn first_row_samples_the_top_of_the_plane() {
    // Only the lower half of this view touches the set: the top row sits at
    // im = 2.0, far outside, while the bottom rows cross the real axis.
    let viewport = Viewport::new(
        PixelSize::new(40, 40),
        Complex::new(-0.5, 1.0),
        Extent::new(3.0, 2.0),
    );
    let params = RenderParameters::new(viewport).with_max_iterations(200);
    let results = render_grid(&params);

    let top_row = &results[..40];
    let bottom_row = &results[39 * 40..];
    assert!(top_row.iter().all(|m| !m.is_bounded()));
    assert!(bottom_row.iter().any(|m| m.is_bounded()));
}
