use std::{cell::RefCell, collections::HashSet, rc::Rc};

use lumen_ngin::{
    Color, KeyCode,
    cgmath::{Matrix4, SquareMatrix},
    data_structures::{
        model::{Model, ModelId},
        texture::{Texture, TextureId},
    },
    flow::GameLogic,
    input::{CursorState, MouseInput},
    pipelines,
    render::DrawTarget,
    shader::{ShaderProgram, ShaderStage},
    window::Window,
};

/// Ordered record of lifecycle calls shared between test doubles.
pub type CallLog = Rc<RefCell<Vec<&'static str>>>;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Clear(Color),
    BindProgram,
    BindModel(ModelId),
    BindTexture(Option<Texture>),
    Draw { index_count: u32, uniforms: Vec<u8> },
    UnbindModel,
    UnbindProgram,
}

/// A [`DrawTarget`] that remembers every call instead of drawing.
#[derive(Default)]
pub struct RecordingTarget {
    pub calls: Vec<Call>,
}

impl RecordingTarget {
    pub fn draws(&self) -> Vec<&[u8]> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw { uniforms, .. } => Some(uniforms.as_slice()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| wanted(c)).count()
    }
}

impl DrawTarget for RecordingTarget {
    fn clear(&mut self, colour: Color) {
        self.calls.push(Call::Clear(colour));
    }

    fn bind_program(&mut self, _program: &ShaderProgram) -> anyhow::Result<()> {
        self.calls.push(Call::BindProgram);
        Ok(())
    }

    fn bind_model(&mut self, model: &Model) -> anyhow::Result<()> {
        self.calls.push(Call::BindModel(model.id()));
        Ok(())
    }

    fn bind_texture(&mut self, texture: Option<Texture>) -> anyhow::Result<()> {
        self.calls.push(Call::BindTexture(texture));
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, uniforms: &[u8]) {
        self.calls.push(Call::Draw {
            index_count,
            uniforms: uniforms.to_vec(),
        });
    }

    fn unbind_model(&mut self) {
        self.calls.push(Call::UnbindModel);
    }

    fn unbind_program(&mut self) {
        self.calls.push(Call::UnbindProgram);
    }
}

/// A window that asks to close after a fixed number of presented frames.
pub struct ScriptedWindow {
    pub log: CallLog,
    pub close_after: Option<u32>,
    pub updates: u32,
    pub title: String,
    pub keys: HashSet<KeyCode>,
    pub cursor: CursorState,
    pub resize: bool,
    pub fail_init: bool,
}

impl ScriptedWindow {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            close_after: None,
            updates: 0,
            title: String::new(),
            keys: HashSet::new(),
            cursor: CursorState::default(),
            resize: false,
            fail_init: false,
        }
    }

    pub fn closing_after(log: CallLog, frames: u32) -> Self {
        Self {
            close_after: Some(frames),
            ..Self::new(log)
        }
    }
}

impl Window for ScriptedWindow {
    fn init(&mut self) -> anyhow::Result<()> {
        self.log.borrow_mut().push("window.init");
        if self.fail_init {
            anyhow::bail!("no display");
        }
        Ok(())
    }

    fn update(&mut self) {
        self.updates += 1;
    }

    fn cleanup(&mut self) {
        self.log.borrow_mut().push("window.cleanup");
    }

    fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    fn window_should_close(&self) -> bool {
        self.close_after.is_some_and(|frames| self.updates >= frames)
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn width(&self) -> u32 {
        800
    }

    fn height(&self) -> u32 {
        600
    }

    fn update_projection_matrix(&mut self) -> Matrix4<f32> {
        Matrix4::identity()
    }

    fn is_resize(&self) -> bool {
        self.resize
    }

    fn set_resize(&mut self, resize: bool) {
        self.resize = resize;
    }

    fn cursor(&self) -> CursorState {
        self.cursor
    }
}

/// Game logic that only counts how often each callback runs.
pub struct CountingGame {
    pub log: CallLog,
    pub inits: u32,
    pub inputs: u32,
    pub updates: u32,
    pub renders: u32,
    pub last_interval: f32,
}

impl CountingGame {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            inits: 0,
            inputs: 0,
            updates: 0,
            renders: 0,
            last_interval: 0.0,
        }
    }
}

impl GameLogic<ScriptedWindow> for CountingGame {
    fn init(&mut self, _window: &mut ScriptedWindow) -> anyhow::Result<()> {
        self.inits += 1;
        self.log.borrow_mut().push("game.init");
        Ok(())
    }

    fn input(&mut self, _window: &ScriptedWindow) {
        self.inputs += 1;
    }

    fn update(&mut self, interval: f32, _mouse: &MouseInput) {
        self.updates += 1;
        self.last_interval = interval;
    }

    fn render(&mut self, _window: &mut ScriptedWindow) -> anyhow::Result<()> {
        self.renders += 1;
        Ok(())
    }

    fn cleanup(&mut self) {
        self.log.borrow_mut().push("game.cleanup");
    }
}

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// The engine's default lighting program, linked but without GPU objects.
pub fn linked_program() -> ShaderProgram {
    let mut program = ShaderProgram::new();
    program
        .compile(ShaderStage::Vertex, &pipelines::vertex_source())
        .expect("vertex stage compiles");
    program
        .compile(ShaderStage::Fragment, &pipelines::fragment_source())
        .expect("fragment stage compiles");
    program.link().expect("program links");
    program
}

pub fn textured_model(id: u32) -> Model {
    Model::new(ModelId::from_raw(id), 24, 36).with_texture(Texture::new(TextureId::from_raw(id)), 1.0)
}

pub fn read_f32(bytes: &[u8], offset: u32) -> f32 {
    let o = offset as usize;
    f32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]])
}

pub fn read_mat4(bytes: &[u8], offset: u32) -> [f32; 16] {
    let mut out = [0.0; 16];
    for (i, value) in out.iter_mut().enumerate() {
        *value = read_f32(bytes, offset + 4 * i as u32);
    }
    out
}
