//! A field of textured cubes lit by an orbiting sun, a point light and two
//! spot lights.
//!
//! W/A/S/D move, Z/X go down/up, hold the right mouse button to look around.
//! N/M push the point light along Z. Escape quits.

use std::rc::Rc;

use lumen_ngin::{
    KeyCode,
    camera::Camera,
    cgmath::{Vector3, Zero},
    config::EngineConfig,
    data_structures::{
        entity::Entity,
        light::{Attenuation, DirectionalLight, PointLight, SpotLight},
    },
    flow::{Engine, GameLogic},
    input::MouseInput,
    render::{Renderer, SceneLights},
    resources::AssetLoader,
    window::{DesktopWindow, Window},
};

const CUBE_COUNT: usize = 200;

/// xorshift32, enough to scatter the cubes.
struct Scatter {
    state: u32,
}

impl Scatter {
    fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Uniform in [0, 1).
    fn next(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x >> 8) as f32 / (1u32 << 24) as f32
    }
}

struct CubeField {
    config: EngineConfig,
    renderer: Option<Renderer>,
    loader: Option<AssetLoader>,
    entities: Vec<Entity>,
    camera: Camera,
    camera_inc: Vector3<f32>,
    light_angle: f32,
    directional_light: DirectionalLight,
    point_lights: Vec<PointLight>,
    spot_lights: Vec<SpotLight>,
}

impl CubeField {
    fn new(config: EngineConfig) -> Self {
        Self {
            config,
            renderer: None,
            loader: None,
            entities: Vec::new(),
            camera: Camera::default(),
            camera_inc: Vector3::zero(),
            light_angle: -90.0,
            directional_light: DirectionalLight::new(
                Vector3::new(1.0, 1.0, 1.0),
                Vector3::new(-1.0, -10.0, 0.0),
                1.0,
            ),
            point_lights: Vec::new(),
            spot_lights: Vec::new(),
        }
    }

    /// The sun rises at -90°, is fully lit between -80° and 80°, sets at 90°
    /// and stays dark until the angle wraps around at 360°.
    fn move_sun(&mut self) {
        self.light_angle += 0.5;
        let light = &mut self.directional_light;
        if self.light_angle > 90.0 {
            light.intensity = 0.0;
            if self.light_angle >= 360.0 {
                self.light_angle = -90.0;
            }
        } else if self.light_angle <= -80.0 || self.light_angle >= 80.0 {
            let factor = 1.0 - (self.light_angle.abs() - 80.0) / 10.0;
            light.intensity = factor;
            light.colour.y = factor.max(0.9);
            light.colour.z = factor.max(0.5);
        } else {
            light.intensity = 1.0;
            light.colour = Vector3::new(1.0, 1.0, 1.0);
        }
        let radians = self.light_angle.to_radians();
        light.direction.x = radians.sin();
        light.direction.y = radians.cos();
    }
}

impl GameLogic<DesktopWindow> for CubeField {
    fn init(&mut self, window: &mut DesktopWindow) -> anyhow::Result<()> {
        let ctx = window.context()?;
        let mut renderer = Renderer::new(&self.config)?;
        renderer.upload(ctx)?;
        let mut loader = AssetLoader::new(ctx, self.config.asset_root.clone());

        let texture = loader.load_texture("textures/world.png")?;
        let model = Rc::new(loader.load_model("/models/cube.obj")?.with_texture(texture, 1.0));

        let mut scatter = Scatter::new(0x2545_f491);
        for _ in 0..CUBE_COUNT {
            let x = scatter.next() * 100.0 - 50.0;
            let y = scatter.next() * 100.0 - 50.0;
            let z = scatter.next() * 300.0;
            let rotation = Vector3::new(scatter.next() * 180.0, scatter.next() * 180.0, z);
            self.entities
                .push(Entity::new(model.clone(), Vector3::new(x, y, z), rotation, 1.0));
        }
        self.entities.push(Entity::new(
            model,
            Vector3::new(0.0, 0.0, -2.0),
            Vector3::zero(),
            1.0,
        ));

        let white = Vector3::new(1.0, 1.0, 1.0);
        let falloff = Attenuation {
            constant: 0.0,
            linear: 0.0,
            exponent: 1.0,
        };
        let cone_direction = Vector3::new(0.0, 0.0, 1.0);
        let cutoff = 180.0f32.to_radians().cos();
        self.point_lights = vec![PointLight::with_attenuation(
            white,
            Vector3::new(-0.5, -0.5, -3.2),
            1.0,
            falloff,
        )];
        self.spot_lights = vec![
            SpotLight::new(
                PointLight::with_attenuation(white, Vector3::new(0.0, 0.0, 3.6), 1.0, falloff),
                cone_direction,
                cutoff,
            ),
            SpotLight::new(
                PointLight::with_attenuation(white, Vector3::new(0.5, 0.5, -3.6), 1.0, falloff),
                cone_direction,
                cutoff,
            ),
        ];

        self.renderer = Some(renderer);
        self.loader = Some(loader);
        Ok(())
    }

    fn input(&mut self, window: &DesktopWindow) {
        self.camera_inc = Vector3::zero();
        if window.is_key_pressed(KeyCode::KeyW) {
            self.camera_inc.z = -1.0;
        }
        if window.is_key_pressed(KeyCode::KeyS) {
            self.camera_inc.z = 1.0;
        }
        if window.is_key_pressed(KeyCode::KeyA) {
            self.camera_inc.x = -1.0;
        }
        if window.is_key_pressed(KeyCode::KeyD) {
            self.camera_inc.x = 1.0;
        }
        if window.is_key_pressed(KeyCode::KeyZ) {
            self.camera_inc.y = -1.0;
        }
        if window.is_key_pressed(KeyCode::KeyX) {
            self.camera_inc.y = 1.0;
        }

        if let Some(light) = self.point_lights.first_mut() {
            if window.is_key_pressed(KeyCode::KeyN) {
                light.position.z += 0.01;
            }
            if window.is_key_pressed(KeyCode::KeyM) {
                light.position.z -= 0.01;
            }
        }
    }

    fn update(&mut self, _interval: f32, mouse: &MouseInput) {
        let step = self.config.camera_step;
        self.camera.move_by(
            self.camera_inc.x * step,
            self.camera_inc.y * step,
            self.camera_inc.z * step,
        );
        if mouse.is_right_button_pressed() {
            let rotation = mouse.displacement() * self.config.mouse_sensitivity;
            self.camera.rotate(rotation.x, rotation.y, 0.0);
        }

        self.move_sun();

        if let Some(renderer) = &mut self.renderer {
            for entity in &self.entities {
                renderer.process_entity(entity);
            }
        }
    }

    fn render(&mut self, window: &mut DesktopWindow) -> anyhow::Result<()> {
        if window.is_resize() {
            window.set_resize(false);
        }
        let projection = window.update_projection_matrix();
        let (Some(renderer), Some(loader)) = (self.renderer.as_mut(), self.loader.as_ref()) else {
            return Ok(());
        };
        renderer.render(
            window.context()?,
            loader,
            &self.camera,
            projection,
            SceneLights {
                directional: self.directional_light,
                point: &self.point_lights,
                spot: &self.spot_lights,
            },
        )
    }

    fn cleanup(&mut self) {
        if let Some(renderer) = &mut self.renderer {
            renderer.cleanup();
        }
        if let Some(loader) = &mut self.loader {
            loader.cleanup();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = EngineConfig::default().with_asset_root(env!("LUMEN_ASSET_DIR"));
    let window = DesktopWindow::new(&config);
    let game = CubeField::new(config.clone());
    Engine::new(&config, window, game).start()
}
