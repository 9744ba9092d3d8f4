use bevy::{
    pbr::wireframe::{WireframeConfig, WireframePlugin},
    prelude::*,
};
use implicit_mc::scenes;

/// Preview resolution, the built-in scenes are tuned for 400-500 samples per axis.
const RESOLUTION: usize = 96;

#[derive(Resource)]
struct Polygonized {
    mesh: Mesh,
    extent: f32,
}

/// Usage: `cargo run --release --features bevy --example scene -- [name]`
fn main() -> implicit_mc::Result<()> {
    let name = std::env::args().nth(1).unwrap_or_else(|| "carved_box".to_string());
    let scene = scenes::all()?
        .into_iter()
        .find(|(scene_name, _)| *scene_name == name)
        .map(|(_, scene)| scene)
        .unwrap_or(scenes::carved_box()?)
        .with_resolution(RESOLUTION);

    let mesh = scene.polygonize()?;

    App::new()
        .add_plugins((DefaultPlugins, WireframePlugin::default()))
        .insert_resource(WireframeConfig {
            global: true,
            ..Default::default()
        })
        .insert_resource(Polygonized {
            mesh: Mesh::from(&mesh.weld()),
            extent: (scene.domain.diagonal().norm() * 0.5) as f32,
        })
        .add_systems(Startup, setup)
        .run();

    Ok(())
}

fn setup(
    mut commands: Commands,
    polygonized: Res<Polygonized>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let extent = polygonized.extent;

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(extent * 0.9, extent * 0.7, extent * 0.9)
            .looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::FULL_DAYLIGHT,
            ..Default::default()
        },
        Transform::default().with_rotation(Quat::from_rotation_x(-45.0_f32.to_radians())),
    ));

    // Scenes are modelled Z-up.
    commands.spawn((
        Mesh3d(meshes.add(polygonized.mesh.clone())),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.8, 0.7, 0.6),
            ..Default::default()
        })),
        Transform::from_rotation(Quat::from_rotation_x(-90.0_f32.to_radians())),
    ));
}
