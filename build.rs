use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");
    println!("cargo:rerun-if-changed=src/pipelines/shaders");

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");

    // Demos load their assets from the copy, so a running binary never
    // depends on the source tree layout.
    let asset_dir = if assets_src.exists() {
        let mut copy_options = CopyOptions::new();
        copy_options.overwrite = true;
        copy_items(&[&assets_src], &out_dir, &copy_options)?;
        out_dir.join("assets")
    } else {
        assets_src
    };
    println!("cargo:rustc-env=LUMEN_ASSET_DIR={}", asset_dir.display());

    Ok(())
}
