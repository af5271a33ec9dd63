use glam::Affine2;

use crate::api::types::ComponentId;
use crate::components::component::Component;
use crate::core::scene::Scene;
use crate::renderer::traits::Surface;

/// Issue draw calls for every live renderable, in registration order, and
/// then for every live gizmo drawable when the scene runs in debug mode.
///
/// `view` maps world space to device pixels (letterbox · camera view). Each
/// component is drawn in its own local space under `view · world`, wrapped
/// in a save/restore pair.
pub fn draw_scene(scene: &Scene, surface: &mut dyn Surface, view: Affine2) {
    surface.clear();
    draw_pass(scene, surface, view, scene.renderables(), Component::render);
    if scene.config().debug {
        draw_pass(scene, surface, view, scene.gizmo_drawables(), Component::draw_gizmos);
    }
}

fn draw_pass(
    scene: &Scene,
    surface: &mut dyn Surface,
    view: Affine2,
    ids: &[ComponentId],
    draw: fn(&Component, &mut dyn Surface),
) {
    for &id in ids {
        if !scene.is_component_live(id) {
            continue;
        }
        let Some(component) = scene.component(id) else { continue };
        // Standalone components draw in world space.
        let world = component
            .transform()
            .and_then(|t| scene.transforms().world_matrix(t))
            .unwrap_or(Affine2::IDENTITY);
        surface.save();
        surface.set_transform(view * world);
        draw(component, surface);
        surface.restore();
    }
}
