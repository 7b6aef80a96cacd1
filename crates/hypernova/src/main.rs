#[cfg(windows)]
fn main() -> hypernova::Result<()> {
    use tracing::warn;

    tracing_subscriber::fmt()
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .init();

    // change cwd so opening HLSL files will not fail
    let dir = std::env::current_exe()
        .inspect_err(|e| warn!("failed to get the path of this program: {e}"))
        .ok()
        .and_then(|path| path.parent().map(|p| p.to_path_buf()));
    if let Some(dir) = dir {
        if let Err(e) = std::env::set_current_dir(dir) {
            warn!("failed to change the current working directory: {e}");
        }
    }

    let config = hypernova::parse_args(std::env::args().skip(1))?;
    hypernova::framework::run(&config)?;
    hypernova::d3d12::device::report_live_objects()?;
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("hypernova renders through Direct3D 12 and only runs on Windows");
    std::process::exit(1);
}
