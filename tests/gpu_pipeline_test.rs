// Needs a graphics adapter: cargo test --features integration-tests
#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
fn headless_device() -> (wgpu::Device, wgpu::Queue) {
    futures::executor::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .expect("a graphics adapter");
        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .expect("a device")
    })
}

#[test]
#[cfg(feature = "integration-tests")]
fn default_program_builds_a_render_pipeline() {
    use crate::common::test_utils::linked_program;

    let (device, _queue) = headless_device();
    let mut program = linked_program();
    program
        .upload(&device, wgpu::TextureFormat::Bgra8UnormSrgb)
        .expect("pipeline is created");
    let gpu = program.gpu().expect("program was uploaded");
    assert_eq!(gpu.block_size, 864);

    program.cleanup();
    assert!(program.gpu().is_none());
}

#[test]
#[cfg(feature = "integration-tests")]
fn loader_releases_everything_it_created() {
    use lumen_ngin::{error::AssetError, resources::AssetLoader};

    let (device, queue) = headless_device();
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
    let mut loader = AssetLoader::with_device(device, queue, root);

    let texture = loader.load_texture("textures/world.png").expect("texture loads");
    let model = loader
        .load_model("/models/cube.obj")
        .expect("cube loads")
        .with_texture(texture, 1.0);
    assert_eq!(model.index_count(), 36);
    assert_eq!(loader.model_count(), 1);
    assert_eq!(loader.texture_count(), 1);
    assert_eq!(loader.mesh(model.id()).expect("mesh is registered").index_count, 36);
    assert!(loader.texture_bind_group(model.texture()).is_ok());
    assert!(loader.texture_bind_group(None).is_ok());

    loader.cleanup();
    assert_eq!(loader.model_count(), 0);
    assert_eq!(loader.texture_count(), 0);
    assert!(matches!(
        loader.mesh(model.id()),
        Err(AssetError::UnknownModel(id)) if id == model.id()
    ));
    assert!(matches!(
        loader.texture_bind_group(model.texture()),
        Err(AssetError::UnknownTexture(id)) if id == texture.id()
    ));
    // The white fallback outlives cleanup.
    assert!(loader.texture_bind_group(None).is_ok());

    loader.cleanup();
    assert_eq!(loader.model_count(), 0);
}

#[test]
#[cfg(feature = "integration-tests")]
fn loader_ids_are_unique_per_load() {
    use lumen_ngin::resources::AssetLoader;

    let (device, queue) = headless_device();
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
    let mut loader = AssetLoader::with_device(device, queue, root);
    let first = loader.load_model("models/cube.obj").expect("cube loads");
    let second = loader.load_model("models/cube.obj").expect("cube loads");
    assert_ne!(first.id(), second.id());
    assert_eq!(loader.model_count(), 2);
}
