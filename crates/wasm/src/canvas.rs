//! Replays a compositor [`Frame`] onto a 2D canvas context.

use glam::DAffine2;
use gradient_field_core::{DrawOp, Frame, Paint, SurfaceLayout};
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// `setTransform(a, b, c, d, e, f)` arguments for an affine transform.
pub fn transform_args(m: &DAffine2) -> [f64; 6] {
    [
        m.matrix2.x_axis.x,
        m.matrix2.x_axis.y,
        m.matrix2.y_axis.x,
        m.matrix2.y_axis.y,
        m.translation.x,
        m.translation.y,
    ]
}

/// Context `filter` value for a per-draw blur.
pub fn blur_filter(blur: f64) -> String {
    if blur > 0.0 {
        format!("blur({blur}px)")
    } else {
        "none".to_owned()
    }
}

/// Matches the canvas backing store and display size to `layout`.
fn size_canvas(canvas: &HtmlCanvasElement, layout: &SurfaceLayout) -> Result<(), JsValue> {
    if canvas.width() != layout.physical_width || canvas.height() != layout.physical_height {
        canvas.set_width(layout.physical_width);
        canvas.set_height(layout.physical_height);
    }
    let css = layout.css_size();
    let style = canvas.style();
    style.set_property("width", &format!("{}px", css.x))?;
    style.set_property("height", &format!("{}px", css.y))?;
    Ok(())
}

fn draw_op(ctx: &CanvasRenderingContext2d, base: DAffine2, op: &DrawOp) -> Result<(), JsValue> {
    let [a, b, c, d, e, f] = transform_args(&(base * op.transform));
    ctx.save();
    ctx.set_transform(a, b, c, d, e, f)?;
    ctx.set_global_composite_operation(op.blend.composite_operation())?;
    ctx.set_filter(&blur_filter(op.blur));
    match &op.paint {
        Paint::Solid(color) => ctx.set_fill_style_str(&color.to_css()),
        Paint::Radial {
            center,
            radius,
            stops,
        } => {
            let gradient =
                ctx.create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, *radius)?;
            for stop in stops {
                gradient.add_color_stop(stop.offset as f32, &stop.color.to_css())?;
            }
            ctx.set_fill_style_canvas_gradient(&gradient);
        }
    }
    ctx.fill_rect(op.rect.x, op.rect.y, op.rect.width, op.rect.height);
    ctx.restore();
    Ok(())
}

/// Draws every op of `frame`, then applies its display filter to the element.
pub fn paint_frame(
    canvas: &HtmlCanvasElement,
    ctx: &CanvasRenderingContext2d,
    frame: &Frame,
) -> Result<(), JsValue> {
    size_canvas(canvas, &frame.layout)?;
    let base = frame.layout.base_transform();
    for op in &frame.ops {
        draw_op(ctx, base, op)?;
    }
    canvas.style().set_property("filter", &frame.filter.to_css())?;
    Ok(())
}
