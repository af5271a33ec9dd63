// extensions/camera_controller.rs
//
// A camera component that pans with WASD. Pan speed is divided by zoom so the
// view moves at the same on-screen rate at every zoom level.

use glam::Vec2;

use crate::components::component::{ComponentDesc, LifecycleEvent};
use crate::renderer::camera::Camera;

pub const PAN_X_AXIS: &str = "camera-pan-x";
pub const PAN_Y_AXIS: &str = "camera-pan-y";

/// Build a camera component that binds W/A/S/D while it is in a scene and
/// moves its entity by `pan_speed / zoom` world units per second. Other
/// bindings on the same keys are left alone.
pub fn controllable_camera(camera: Camera, pan_speed: f32) -> ComponentDesc {
    ComponentDesc::camera(camera)
        .on_lifecycle(|scene, _, event| match event {
            LifecycleEvent::AddedToScene => {
                scene.add_virtual_axis("a", "d", PAN_X_AXIS, None);
                scene.add_virtual_axis("w", "s", PAN_Y_AXIS, None);
            }
            LifecycleEvent::RemovedFromScene | LifecycleEvent::Destroy => {
                scene.remove_virtual_axis(PAN_X_AXIS);
                scene.remove_virtual_axis(PAN_Y_AXIS);
            }
            _ => {}
        })
        .on_update(move |scene, this, dt| {
            let input = Vec2::new(scene.axis_value(PAN_X_AXIS), scene.axis_value(PAN_Y_AXIS)).normalize_or_zero();
            if input == Vec2::ZERO {
                return;
            }
            let zoom = scene
                .component(this.id)
                .and_then(|c| c.camera())
                .map_or(1.0, Camera::zoom);
            if let Some(transform) = this.transform_mut(scene) {
                transform.position += input * (pan_speed / zoom) * dt;
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::Scene;
    use crate::input::bindings::{KeyBinding, KeyEdge, KeyEvent};

    #[test]
    fn pans_slower_when_zoomed_in() {
        let mut scene = Scene::default();
        let cam = scene.spawn_entity("camera");
        scene.set_camera(cam, controllable_camera(Camera::new(), 500.0)).unwrap();

        scene.handle_input(&KeyEvent::new("d"), KeyEdge::Down);
        scene.update(0.1);
        assert!((scene.transform(cam).unwrap().position.x - 50.0).abs() < 1e-3);

        scene.camera_mut().unwrap().set_zoom(2.0);
        scene.update(0.1);
        assert!((scene.transform(cam).unwrap().position.x - 75.0).abs() < 1e-3);
    }

    #[test]
    fn leaving_the_scene_unbinds_pan_keys() {
        let mut scene = Scene::default();
        let cam = scene.spawn_entity("camera");
        let id = scene.set_camera(cam, controllable_camera(Camera::new(), 100.0)).unwrap();
        scene.add_virtual_axis("a", "d", "MoveX", None);
        assert!(scene.input().is_bound("w"));

        scene.remove_entity(cam);
        assert!(!scene.input().is_bound("w"));
        assert!(!scene.input().is_bound("s"));
        assert_eq!(scene.input().bindings("a"), &[KeyBinding::axis("MoveX", -1)]);

        scene.add_entity(cam).unwrap();
        assert!(scene.input().is_bound("w"));
        scene.destroy_component(id);
        assert!(!scene.input().is_bound("w"));
    }

    #[test]
    fn replacing_the_camera_keeps_the_new_one_bound() {
        let mut scene = Scene::default();
        let a = scene.spawn_entity("cam-a");
        let b = scene.spawn_entity("cam-b");
        scene.set_camera(a, controllable_camera(Camera::new(), 100.0)).unwrap();
        scene.set_camera(b, controllable_camera(Camera::new(), 100.0)).unwrap();
        assert!(scene.input().is_bound("d"));

        scene.handle_input(&KeyEvent::new("d"), KeyEdge::Down);
        scene.update(1.0);
        assert!((scene.transform(b).unwrap().position.x - 100.0).abs() < 1e-3);
        assert_eq!(scene.transform(a).unwrap().position, Vec2::ZERO);

        scene.set_camera(a, Camera::new()).unwrap();
        assert!(!scene.input().is_bound("d"));
        assert_eq!(scene.axis_value(PAN_X_AXIS), 0.0);
    }

    #[test]
    fn diagonal_speed_is_normalized() {
        let mut scene = Scene::default();
        let cam = scene.spawn_entity("camera");
        scene.set_camera(cam, controllable_camera(Camera::new(), 100.0)).unwrap();
        scene.handle_input(&KeyEvent::new("d"), KeyEdge::Down);
        scene.handle_input(&KeyEvent::new("s"), KeyEdge::Down);
        scene.update(1.0);
        let moved = scene.transform(cam).unwrap().position.length();
        assert!((moved - 100.0).abs() < 1e-3, "{moved}");
    }
}
