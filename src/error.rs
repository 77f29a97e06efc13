//! Error taxonomy of the engine.
//!
//! Every error here is fatal to the operation that raised it: nothing in the
//! engine retries. Setup code propagates these through `anyhow::Result` up to
//! the caller of [`crate::flow::Engine::start`].

use std::path::PathBuf;

use crate::data_structures::{model::ModelId, texture::TextureId};
use crate::shader::ShaderStage;

/// Failures of the shader program life cycle and of its uniform interface.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("error compiling {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("error linking shader program: {0}")]
    Link(String),
    #[error("unable to validate shader program: {0}")]
    Validation(String),
    #[error("could not find uniform {0}")]
    UnknownUniform(String),
    #[error("uniform {0} was set before it was declared")]
    UndeclaredUniform(String),
    #[error("uniform {name} holds a {expected} but a {found} was given")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("uniform {0} was set while the program is not bound")]
    NotBound(String),
    #[error("cannot {operation} a shader program that is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}

/// Failures while decoding or registering geometry and textures.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode model {path:?}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("model {path:?} contains no geometry")]
    EmptyModel { path: PathBuf },
    #[error("could not decode image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("model {0:?} is not registered with this loader")]
    UnknownModel(ModelId),
    #[error("texture {0:?} is not registered with this loader")]
    UnknownTexture(TextureId),
}

/// Failures while bringing up the window and the GPU context.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("initialization failed: {0}")]
    Initialization(String),
}
