//! Scene graph demo - headless frame loop.
//!
//! Builds the stock demo scene (a camera looking at a parent cube with a
//! child cube orbiting it), then runs the mutate -> traverse -> read-back
//! cycle for a configured number of frames. The per-object uniforms a
//! renderer would upload are packed every frame and summarized in the log.

use anyhow::{Context, Result};
use glam::Vec3;
use tracing::{debug, info};

use scenegraph_core::{DemoConfig, Timer};
use scenegraph_scene::{
    Camera, CameraUniform, Node, NodeId, ObjectUniform, SceneGraph, Spin,
};

struct DemoScene {
    graph: SceneGraph,
    root: NodeId,
    camera: NodeId,
    cubes: Vec<NodeId>,
}

impl DemoScene {
    fn new(config: &DemoConfig) -> Self {
        let spin = config.spin_degrees_per_second.to_radians();
        let camera_settings = &config.camera;

        let mut graph = SceneGraph::new();
        let root = graph.insert(Node::new("root"));
        let camera = graph.insert(
            Node::camera(
                "camera",
                Camera::perspective(
                    camera_settings.fov_degrees.to_radians(),
                    config.viewport.aspect(),
                    camera_settings.near,
                    camera_settings.far,
                ),
            )
            .with_position(Vec3::new(0.0, 0.0, -5.0))
            .with_rotation(Vec3::new(0.0, 180.0_f32.to_radians(), 0.0))
            .with_behavior(Spin::new(Vec3::new(0.0, 0.0, spin * 0.1))),
        );
        let parent = graph.insert(
            Node::new("parentThing")
                .with_position(Vec3::new(-2.0, 0.0, 0.0))
                .with_behavior(Spin::new(Vec3::new(0.0, spin, 0.0))),
        );
        let child = graph.insert(
            Node::new("childThing")
                .with_position(Vec3::new(2.0, 0.0, 0.0))
                .with_behavior(Spin::new(Vec3::new(0.0, 0.0, spin))),
        );

        graph.add(root, camera);
        graph.add(root, parent);
        graph.add(parent, child);
        graph.update_world_transform(root);

        Self {
            graph,
            root,
            camera,
            cubes: vec![parent, child],
        }
    }

    /// Advance one frame and return the packed uniforms for every cube.
    fn frame(&mut self, delta: f32) -> Result<(CameraUniform, Vec<ObjectUniform>)> {
        self.graph.update(self.root, delta);
        self.graph.update_world_transform(self.root);

        let camera = &self.graph[self.camera];
        let camera_uniform =
            CameraUniform::from_node(camera).context("camera node lost its camera state")?;
        let objects = self
            .cubes
            .iter()
            .map(|&id| {
                ObjectUniform::from_nodes(&self.graph[id], camera)
                    .context("camera node lost its camera state")
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((camera_uniform, objects))
    }
}

fn main() -> Result<()> {
    scenegraph_core::init_logging();
    info!("Starting scene graph demo");

    let config = DemoConfig::from_env().context("failed to load demo config")?;
    debug!(?config, "Demo config");

    let mut timer = match config.fixed_delta {
        Some(step) => Timer::fixed(step),
        None => Timer::new(),
    };
    let mut scene = DemoScene::new(&config);
    info!(nodes = scene.graph.len(), "Scene built, entering frame loop");

    let mut uploaded = 0usize;
    for frame in 0..config.frames {
        let delta = timer.delta_secs();
        let (camera, objects) = scene.frame(delta)?;

        uploaded += bytemuck::bytes_of(&camera).len();
        uploaded += objects
            .iter()
            .map(|object| bytemuck::bytes_of(object).len())
            .sum::<usize>();

        if frame % 60 == 0 {
            for (&id, object) in scene.cubes.iter().zip(&objects) {
                let world = object.model.w_axis.truncate();
                debug!(
                    frame,
                    node = %scene.graph[id].name,
                    x = world.x,
                    y = world.y,
                    z = world.z,
                    "World position"
                );
            }
        }
    }

    info!(
        frames = config.frames,
        bytes = uploaded,
        elapsed = timer.elapsed_secs(),
        "Frame loop finished"
    );
    Ok(())
}
