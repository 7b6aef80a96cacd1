use std::{fs, path};

// Shaders are compiled at runtime with DXC, so the sources have to sit next
// to the binary.
fn main() {
    println!("cargo::rerun-if-changed=shaders/");

    copy_shader("scene.hlsl");
    copy_shader("overlay.hlsl");
}

fn copy_shader(shader: &str) {
    let out_dir = std::env::var("OUT_DIR").unwrap() + "/../../../";
    let out_dir = path::Path::new(&out_dir).join("shaders/");

    if !out_dir.exists() {
        if let Err(e) = fs::create_dir(&out_dir) {
            println!("failed to create {}: {e}", out_dir.display());
        }
    }

    let src_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap() + "/shaders/";
    let src = src_dir + shader;
    let dst = out_dir.join(shader);
    println!("copying {src} to {}", dst.display());

    if let Err(e) = fs::copy(&src, &dst) {
        panic!("failed to copy {src}: {e}");
    }
}
