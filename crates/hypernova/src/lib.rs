pub mod camera;
pub mod error;
pub mod font;
pub mod frame;
pub mod input;
pub mod overlay;
pub mod timer;

#[cfg(windows)]
pub mod d3d12;
#[cfg(windows)]
pub mod framework;
#[cfg(windows)]
pub mod renderer;

pub use error::{Error, Result};

pub struct Config {
    client_width: u32,
    client_height: u32,
    fullscreen: bool,
    vsync: bool,

    debug_layer_enabled: bool,
    gpu_validation_enabled: bool,
}

impl Config {
    pub fn client_width(&self) -> u32 {
        self.client_width
    }

    pub fn client_height(&self) -> u32 {
        self.client_height
    }

    pub fn fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn vsync(&self) -> bool {
        self.vsync
    }

    pub fn debug_layer_enabled(&self) -> bool {
        self.debug_layer_enabled || self.gpu_validation_enabled
    }

    pub fn gpu_validation_enabled(&self) -> bool {
        self.gpu_validation_enabled
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_width: 1200,
            client_height: 960,
            fullscreen: false,
            vsync: true,
            debug_layer_enabled: cfg!(debug_assertions),
            gpu_validation_enabled: false,
        }
    }
}

/// Parses command-line flags (without the program name). Unknown flags are
/// logged and ignored; malformed values are errors.
pub fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Config> {
    let mut config = Config::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--width" => config.client_width = parse_dimension(&arg, args.next())?,
            "--height" => config.client_height = parse_dimension(&arg, args.next())?,
            "--fullscreen" => config.fullscreen = true,
            "--no-vsync" => config.vsync = false,
            "--debug-layer" => config.debug_layer_enabled = true,
            "--gpu-validation" => config.gpu_validation_enabled = true,
            other => tracing::warn!("ignoring unknown argument `{other}`"),
        }
    }

    Ok(config)
}

fn parse_dimension(flag: &str, value: Option<String>) -> Result<u32> {
    let value = value.ok_or_else(|| Error::Config(format!("{flag} expects a value")))?;
    let parsed: u32 = value
        .parse()
        .map_err(|_| Error::Config(format!("{flag} expects a pixel count, got `{value}`")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{flag} must be non-zero")));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_match_the_stock_window() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.client_width(), 1200);
        assert_eq!(config.client_height(), 960);
        assert!(!config.fullscreen());
        assert!(config.vsync());
    }

    #[test]
    fn dimensions_and_toggles_are_applied() {
        let config = parse(&["--width", "1920", "--height", "1080", "--fullscreen", "--no-vsync"])
            .unwrap();
        assert_eq!(config.client_width(), 1920);
        assert_eq!(config.client_height(), 1080);
        assert!(config.fullscreen());
        assert!(!config.vsync());
    }

    #[test]
    fn gpu_validation_implies_the_debug_layer() {
        let config = parse(&["--gpu-validation"]).unwrap();
        assert!(config.debug_layer_enabled());
        assert!(config.gpu_validation_enabled());
    }

    #[test]
    fn malformed_dimensions_are_rejected() {
        assert!(parse(&["--width"]).is_err());
        assert!(parse(&["--width", "abc"]).is_err());
        assert!(parse(&["--height", "0"]).is_err());
    }

    #[test]
    fn unknown_flags_are_ignored() {
        let config = parse(&["--frobnicate"]).unwrap();
        assert_eq!(config.client_width(), 1200);
    }
}
