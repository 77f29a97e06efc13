use std::path::{Path, PathBuf};

use crate::error::AssetError;

/// Layout of bind group 1: an RGBA texture and its filtering sampler.
pub fn texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("Model texture_bind_group_layout"),
    })
}

/// Resolve `file_name` against the asset root. A leading `/` is treated as
/// relative to the root, not to the file system.
pub fn resolve(root: &Path, file_name: &str) -> PathBuf {
    root.join(file_name.trim_start_matches(['/', '\\']))
}

pub fn load_string(root: &Path, file_name: &str) -> Result<String, AssetError> {
    let path = resolve(root, file_name);
    std::fs::read_to_string(&path).map_err(|source| AssetError::Io { path, source })
}

pub fn load_binary(root: &Path, file_name: &str) -> Result<Vec<u8>, AssetError> {
    let path = resolve(root, file_name);
    std::fs::read(&path).map_err(|source| AssetError::Io { path, source })
}

/// Decode any image format enabled on the `image` crate.
pub fn decode_image(bytes: &[u8], path: &Path) -> Result<image::DynamicImage, AssetError> {
    image::load_from_memory(bytes).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_slash_stays_under_the_root() {
        let path = resolve(Path::new("assets"), "/models/cube.obj");
        assert_eq!(path, Path::new("assets").join("models").join("cube.obj"));
    }

    #[test]
    fn missing_files_report_the_resolved_path() {
        let err = load_binary(Path::new("does-not-exist"), "nothing.png").unwrap_err();
        match err {
            AssetError::Io { path, .. } => assert!(path.ends_with("nothing.png")),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
