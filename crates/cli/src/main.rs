use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use faceattend_core::capture::domain::frame_source::FrameSource;
use faceattend_core::capture::infrastructure::camera_source::CameraSource;
use faceattend_core::capture::infrastructure::image_file_source::ImageFileSource;
use faceattend_core::client::infrastructure::http_attendance_client::HttpAttendanceClient;
use faceattend_core::encoding::infrastructure::jpeg_encoder::JpegEncoder;
use faceattend_core::feedback::infrastructure::stdout_feedback::StdoutFeedback;
use faceattend_core::pipeline::attendance_kiosk::AttendanceKiosk;
use faceattend_core::shared::constants::IMAGE_EXTENSIONS;
use faceattend_core::shared::settings::Settings;

/// Capture a face from the camera and submit it to the attendance server.
#[derive(Parser)]
#[command(name = "faceattend")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Attendance server URL (default from settings). Only scheme, host and
    /// port are used; endpoints always live under /api/.
    #[arg(long, global = true)]
    server: Option<String>,

    /// Camera device, e.g. /dev/video0 (default from settings).
    #[arg(long, global = true)]
    device: Option<String>,

    /// ffmpeg input driver, e.g. video4linux2, avfoundation, dshow.
    #[arg(long, global = true)]
    driver: Option<String>,

    /// Use a still image instead of the camera.
    #[arg(long, global = true)]
    image: Option<PathBuf>,

    /// Capture canvas width in pixels.
    #[arg(long, global = true)]
    width: Option<u32>,

    /// Capture canvas height in pixels.
    #[arg(long, global = true)]
    height: Option<u32>,

    /// JPEG quality (1-100).
    #[arg(long, global = true)]
    quality: Option<u8>,

    /// Repeat the action on every Enter press until end of input.
    #[arg(long, global = true)]
    interactive: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Mark attendance with the current camera frame.
    Attend {
        /// Log in by face under this name first, in the same session.
        #[arg(long)]
        login: Option<String>,
    },
    /// Register a face under a name.
    Register {
        /// Name to register.
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Log in by face.
    Login {
        /// Name of the account to log in to.
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Write the captured JPEG to a file without contacting the server.
    Snapshot {
        /// Output .jpg file.
        output: PathBuf,
    },
    /// Save the current flags as the defaults for later runs.
    Config,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = apply_overrides(Settings::load(), &cli);
    validate(&cli, &settings)?;

    if let Command::Config = cli.command {
        let path = Settings::config_path()?;
        save_settings(&settings, &path)?;
        log::info!("Saved settings to {}", path.display());
        return Ok(());
    }

    let source = build_source(&cli, &settings);
    let encoder = JpegEncoder::new(
        Some((settings.canvas_width, settings.canvas_height)),
        settings.jpeg_quality,
    )?;
    let client = HttpAttendanceClient::new(&settings.server_url)?;
    log::info!("Using attendance server {}", client.base_url());

    let mut kiosk = AttendanceKiosk::new(
        source,
        Box::new(encoder),
        Box::new(client),
        Box::new(StdoutFeedback::new()),
    );

    let result = if cli.interactive {
        run_interactive(&mut kiosk, &cli.command, &mut io::stdin().lock())
    } else {
        run_once(&mut kiosk, &cli.command)
    };
    kiosk.close();
    result
}

fn run_once(
    kiosk: &mut AttendanceKiosk,
    command: &Command,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Attend { login } => {
            if let Some(name) = login {
                let logged_in = kiosk
                    .login_face(name)?
                    .map(|reply| reply.is_success())
                    .unwrap_or(false);
                if !logged_in {
                    return Ok(());
                }
            }
            kiosk.mark_attendance()?;
        }
        Command::Register { name } => {
            kiosk.register(name)?;
        }
        Command::Login { name } => {
            if let Some(role) = kiosk.login_face(name)?.and_then(|reply| reply.role) {
                log::info!("Logged in as {role}");
            }
        }
        Command::Snapshot { output } => {
            let image = kiosk.snapshot()?;
            write_snapshot(output, image.bytes())?;
            log::info!(
                "Saved {}x{} snapshot to {}",
                image.width(),
                image.height(),
                output.display()
            );
        }
        // Handled in `run` before a kiosk exists.
        Command::Config => {}
    }
    Ok(())
}

/// Runs `command` once per line of `input`. The camera is released after
/// every trigger so the next one captures a fresh frame instead of one
/// queued by the driver while waiting.
fn run_interactive(
    kiosk: &mut AttendanceKiosk,
    command: &Command,
    input: &mut impl BufRead,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        eprint!("Press Enter to capture (Ctrl-D to quit) ");
        io::stderr().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            eprintln!();
            return Ok(());
        }
        let result = run_once(kiosk, command);
        kiosk.close();
        result?;
    }
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(server) = &cli.server {
        settings.server_url = server.clone();
    }
    if let Some(device) = &cli.device {
        settings.device = device.clone();
    }
    if let Some(driver) = &cli.driver {
        settings.driver = driver.clone();
    }
    if let Some(width) = cli.width {
        settings.canvas_width = width;
    }
    if let Some(height) = cli.height {
        settings.canvas_height = height;
    }
    if let Some(quality) = cli.quality {
        settings.jpeg_quality = quality;
    }
    settings
}

fn validate(cli: &Cli, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(image) = &cli.image {
        if !image.exists() {
            return Err(format!("Image file not found: {}", image.display()).into());
        }
        if !is_image(image) {
            return Err(format!(
                "Image must be one of: {}, got {}",
                IMAGE_EXTENSIONS.join(", "),
                image.display()
            )
            .into());
        }
    }
    if settings.canvas_width == 0 || settings.canvas_height == 0 {
        return Err(format!(
            "Canvas size must be non-zero, got {}x{}",
            settings.canvas_width, settings.canvas_height
        )
        .into());
    }
    if !(1..=100).contains(&settings.jpeg_quality) {
        return Err(format!(
            "Quality must be between 1 and 100, got {}",
            settings.jpeg_quality
        )
        .into());
    }
    if cli.interactive && matches!(cli.command, Command::Snapshot { .. } | Command::Config) {
        return Err("--interactive can only be used with attend, register and login".into());
    }
    if let Command::Snapshot { output } = &cli.command {
        if output.is_dir() {
            return Err(format!("Output is a directory: {}", output.display()).into());
        }
    }
    Ok(())
}

fn build_source(cli: &Cli, settings: &Settings) -> Box<dyn FrameSource> {
    match &cli.image {
        Some(path) => Box::new(ImageFileSource::new(path)),
        None => Box::new(CameraSource::new(&settings.driver, &settings.device)),
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn save_settings(settings: &Settings, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    settings.save_to(path)?;
    Ok(())
}

fn write_snapshot(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
}
