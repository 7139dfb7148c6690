//! Thin rasterization helpers over `imageproc::drawing`.
//!
//! `imageproc` walks every point of the geometry it is handed, so everything
//! is clipped to the canvas (in `i64`/`f64`) before it gets there. It also
//! only draws one-pixel lines: wider rectangle strokes are drawn as four
//! bands, wider polyline strokes as a quad per segment with round joins.

use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut},
    point::Point,
    rect::Rect,
};

use crate::types::BoundingBox;

/// Fill the inclusive pixel range `[left, right] x [top, bottom]`, clipped to the image
fn fill_span(image: &mut RgbImage, left: i64, top: i64, right: i64, bottom: i64, color: Rgb<u8>) {
    let left = left.max(0);
    let top = top.max(0);
    let right = right.min(i64::from(image.width()) - 1);
    let bottom = bottom.min(i64::from(image.height()) - 1);
    if right < left || bottom < top {
        return;
    }
    let rect = Rect::at(left as i32, top as i32)
        .of_size((right - left + 1) as u32, (bottom - top + 1) as u32);
    draw_filled_rect_mut(image, rect, color);
}

/// Outline of an axis-aligned rectangle, `thickness` pixels wide, centred on the edge
pub(crate) fn stroke_rect(image: &mut RgbImage, bbox: BoundingBox, color: Rgb<u8>, thickness: u32) {
    let bbox = bbox.normalized();
    let (x0, y0) = (i64::from(bbox.start_x), i64::from(bbox.start_y));
    let (x1, y1) = (i64::from(bbox.end_x), i64::from(bbox.end_y));
    let outer = i64::from(thickness / 2);
    let inner = i64::from(thickness) - 1 - outer;

    let (left, top, right, bottom) = (x0 - outer, y0 - outer, x1 + outer, y1 + outer);
    // Untouched interior of the innermost edge
    let (in_left, in_top, in_right, in_bottom) = (x0 + inner + 1, y0 + inner + 1, x1 - inner - 1, y1 - inner - 1);

    if in_right < in_left || in_bottom < in_top {
        fill_span(image, left, top, right, bottom, color);
        return;
    }
    fill_span(image, left, top, right, in_top - 1, color);
    fill_span(image, left, in_bottom + 1, right, bottom, color);
    fill_span(image, left, in_top, in_left - 1, in_bottom, color);
    fill_span(image, in_right + 1, in_top, right, in_bottom, color);
}

/// Solid rectangle including both corners
pub(crate) fn fill_rect(image: &mut RgbImage, bbox: BoundingBox, color: Rgb<u8>) {
    let bbox = bbox.normalized();
    fill_span(
        image,
        i64::from(bbox.start_x),
        i64::from(bbox.start_y),
        i64::from(bbox.end_x),
        i64::from(bbox.end_y),
        color,
    );
}

/// Solid disc of `radius` around `center`
fn fill_disc(image: &mut RgbImage, center: (f64, f64), radius: f64, color: Rgb<u8>) {
    let (cx, cy) = center;
    let top = ((cy - radius).ceil() as i64).max(0);
    let bottom = ((cy + radius).floor() as i64).min(i64::from(image.height()) - 1);
    for y in top..=bottom {
        let dy = y as f64 - cy;
        let half = (radius * radius - dy * dy).max(0.0).sqrt();
        fill_span(image, (cx - half).ceil() as i64, y, (cx + half).floor() as i64, y, color);
    }
}

/// Liang-Barsky clip of the segment `start -> end` to `[min, max]` on both axes
fn clip_segment(
    start: (f64, f64),
    end: (f64, f64),
    min: (f64, f64),
    max: (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);

    for (p, q) in [
        (-dx, start.0 - min.0),
        (dx, max.0 - start.0),
        (-dy, start.1 - min.1),
        (dy, max.1 - start.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f64| {
        if t == 0.0 {
            start
        } else if t == 1.0 {
            end
        } else {
            (start.0 + t * dx, start.1 + t * dy)
        }
    };
    Some((at(t0), at(t1)))
}

/// Sutherland-Hodgman clip of a closed polygon to `[min, max]` on both axes
fn clip_polygon(points: &[(f64, f64)], min: (f64, f64), max: (f64, f64)) -> Vec<(f64, f64)> {
    // (axis, bound, keep values >= bound)
    let planes = [(0, min.0, true), (0, max.0, false), (1, min.1, true), (1, max.1, false)];

    let mut output = points.to_vec();
    for (axis, bound, keep_above) in planes {
        let coord = |p: (f64, f64)| if axis == 0 { p.0 } else { p.1 };
        let inside = |p: (f64, f64)| if keep_above { coord(p) >= bound } else { coord(p) <= bound };
        let cross = |a: (f64, f64), b: (f64, f64)| {
            let t = (bound - coord(a)) / (coord(b) - coord(a));
            let point = (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1));
            if axis == 0 { (bound, point.1) } else { (point.0, bound) }
        };

        let input = std::mem::take(&mut output);
        let Some(&last) = input.last() else {
            break;
        };
        let mut prev = last;
        for &current in &input {
            match (inside(prev), inside(current)) {
                (true, true) => output.push(current),
                (true, false) => output.push(cross(prev, current)),
                (false, true) => {
                    output.push(cross(prev, current));
                    output.push(current);
                }
                (false, false) => {}
            }
            prev = current;
        }
    }
    output
}

/// Canvas bounds grown by `margin` pixels on every side
fn window(image: &RgbImage, margin: f64) -> ((f64, f64), (f64, f64)) {
    (
        (-margin, -margin),
        (f64::from(image.width()) - 1.0 + margin, f64::from(image.height()) - 1.0 + margin),
    )
}

fn as_f64(point: (i32, i32)) -> (f64, f64) {
    (f64::from(point.0), f64::from(point.1))
}

fn stroke_segment(
    image: &mut RgbImage,
    start: (f64, f64),
    end: (f64, f64),
    color: Rgb<u8>,
    thickness: u32,
) {
    if thickness <= 1 {
        let (min, max) = window(image, 1.0);
        if let Some((a, b)) = clip_segment(start, end, min, max) {
            draw_line_segment_mut(image, (a.0 as f32, a.1 as f32), (b.0 as f32, b.1 as f32), color);
        }
        return;
    }

    let radius = f64::from(thickness / 2);
    let (min, max) = window(image, radius + 1.0);
    let Some((a, b)) = clip_segment(start, end, min, max) else {
        return;
    };
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let length = dx.hypot(dy);
    if length == 0.0 {
        return;
    }
    let (nx, ny) = (-dy / length * radius, dx / length * radius);
    let quad = [
        (a.0 + nx, a.1 + ny),
        (b.0 + nx, b.1 + ny),
        (b.0 - nx, b.1 - ny),
        (a.0 - nx, a.1 - ny),
    ];
    fill_clipped_polygon(image, &quad, color);
}

/// Connected line segments through `points`, optionally closing back to the first
pub(crate) fn stroke_polyline(
    image: &mut RgbImage,
    points: &[(i32, i32)],
    closed: bool,
    color: Rgb<u8>,
    thickness: u32,
) {
    let points: Vec<(f64, f64)> = points.iter().copied().map(as_f64).collect();
    for pair in points.windows(2) {
        stroke_segment(image, pair[0], pair[1], color, thickness);
    }
    if closed && points.len() > 2 {
        stroke_segment(image, points[points.len() - 1], points[0], color, thickness);
    }
    if thickness > 1 {
        let radius = f64::from(thickness / 2);
        for &vertex in &points {
            fill_disc(image, vertex, radius, color);
        }
    }
}

/// Filled polygon over float vertices, clipped to just outside the canvas
fn fill_clipped_polygon(image: &mut RgbImage, points: &[(f64, f64)], color: Rgb<u8>) {
    let (min, max) = window(image, 1.0);
    let clipped = clip_polygon(points, min, max);

    let mut vertices: Vec<Point<i32>> = Vec::with_capacity(clipped.len());
    for (x, y) in clipped {
        let point = Point::new(x.round() as i32, y.round() as i32);
        if vertices.last() != Some(&point) {
            vertices.push(point);
        }
    }
    // draw_polygon_mut rejects an explicitly closed ring
    while vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    if vertices.len() < 3 {
        match vertices.as_slice() {
            [point] => {
                if point.x >= 0
                    && point.y >= 0
                    && (point.x as u32) < image.width()
                    && (point.y as u32) < image.height()
                {
                    image.put_pixel(point.x as u32, point.y as u32, color);
                }
            }
            [a, b] => draw_line_segment_mut(
                image,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                color,
            ),
            _ => {}
        }
        return;
    }

    draw_polygon_mut(image, &vertices, color);
}

/// Filled polygon. Degenerate outlines (fewer than three distinct vertices)
/// collapse to their line segments.
pub(crate) fn fill_polygon(image: &mut RgbImage, points: &[(i32, i32)], color: Rgb<u8>) {
    let points: Vec<(f64, f64)> = points.iter().copied().map(as_f64).collect();
    fill_clipped_polygon(image, &points, color);
}
