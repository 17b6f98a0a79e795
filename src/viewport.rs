use crate::state::SceneContext;
use tracing::{debug, warn};

/// Applies a host surface size change: resizes the output surface, sets the
/// camera aspect to `width / height` and rebuilds its projection.
///
/// Returns `false` when nothing changed, either because the size is the
/// current one or because the height is zero and `width / height` has no value.
/// A zero width is applied and yields an aspect of 0.
pub fn handle_resize(ctx: &mut SceneContext, width: usize, height: usize) -> bool {
    if height == 0 {
        warn!(width, height, "ignoring resize to a zero-height surface");
        return false;
    }
    if ctx.renderer.size() == (width, height) {
        return false;
    }

    ctx.renderer.set_size(width, height);
    ctx.camera.aspect = width as f64 / height as f64;
    ctx.camera.update_projection_matrix();
    ctx.controls.set_viewport_size(width as f64, height as f64);

    debug!(width, height, aspect = ctx.camera.aspect, "viewport resized");
    true
}
