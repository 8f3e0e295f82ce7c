//! Headless ground-snap walkthrough.
//!
//! Builds a tilted ground plane and a handful of props floating above it,
//! restores snap options from a stored preset, and snaps the whole
//! selection in one batch. Run with `RUST_LOG=debug` to watch the
//! per-target pipeline.

use anyhow::Result;
use glam::{Quat, Vec3};
use talus::{GroundSnapper, Node, Scene, SnapOptions, SurfaceMesh};

fn main() -> Result<()> {
    env_logger::init();

    let mut scene = Scene::new();

    // A big quad tilted 20 degrees, standing in for terrain.
    let ground_mesh = scene.add_mesh(SurfaceMesh::plane(50.0));
    let mut ground = Node::with_mesh(ground_mesh);
    ground.transform.rotation = Quat::from_rotation_x(20f32.to_radians());
    let ground = scene.add_node(ground);

    // Props: unit crates hovering at various heights and headings, pivot at
    // the base center so the extent offset has something to measure.
    let crate_mesh = scene.add_mesh(SurfaceMesh::cuboid(
        Vec3::new(-0.5, 0.0, -0.5),
        Vec3::new(0.5, 1.0, 0.5),
    ));
    let spots = [
        (Vec3::new(0.0, 6.0, 0.0), 0.0_f32),
        (Vec3::new(4.0, 9.0, -3.0), 45.0),
        (Vec3::new(-6.0, 4.0, 5.0), 120.0),
    ];
    let targets: Vec<_> = spots
        .iter()
        .map(|&(position, yaw_deg)| {
            let mut prop = Node::with_mesh(crate_mesh);
            prop.transform.position = position;
            prop.transform.rotation = Quat::from_rotation_y(yaw_deg.to_radians());
            scene.add_node(prop)
        })
        .collect();
    scene.update_hierarchy();

    // Restore options from a stored preset; unspecified fields keep their
    // defaults.
    let preset = r#"{ "user_offset": 0.02, "heading_only": true }"#;
    let options: SnapOptions = serde_json::from_str(preset)?;
    println!("options: {}", serde_json::to_string(&options)?);

    let mut snapper = GroundSnapper::with_options(options);
    snapper.set_surface(&scene, ground)?;

    for (i, result) in snapper.align_batch(&mut scene, &targets)?.iter().enumerate() {
        if result.success {
            println!("prop {i}: snapped to {}", result.applied_position);
        } else {
            println!(
                "prop {i}: not snapped ({})",
                result.failure.as_ref().map_or_else(String::new, ToString::to_string)
            );
        }
    }
    Ok(())
}
