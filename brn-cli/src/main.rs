mod logger;

use std::error::Error;
use std::path::PathBuf;

use brn_core::{CameraInfo, PixelEncoding};
use brn_node::{
    CollectingSink, CycleReport, FrameProcessor, NodeSettings, PoseStamped, ProcessOutcome,
};
use clap::Parser;
use tracing::{info, warn};

/// Detect a ball in one image and report its viewing ray
#[derive(Debug, Parser)]
#[command(author, version, about = "Ball detection and back-projection")]
struct Args {
    /// Input image file
    #[arg(long)]
    image: PathBuf,

    /// JSON calibration `{ "k": [..9], "p": [..9] }`. Without it the ray stays zero.
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// JSON node settings. Defaults are used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the annotated image
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pixel layout the image is decoded into before processing
    #[arg(long, default_value = "rgb8")]
    encoding: PixelEncoding,

    /// Print the published pose as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

struct RunOutput {
    report: Option<CycleReport>,
    pose: PoseStamped,
}

fn build_processor(
    settings: &NodeSettings,
    calibration: Option<&CameraInfo>,
) -> brn_core::Result<FrameProcessor> {
    let mut processor = FrameProcessor::new(settings.processor.clone())?;
    match calibration {
        Some(info) => processor.set_calibration(info)?,
        None => warn!("no calibration given, the published ray will be zero"),
    }
    Ok(processor)
}

fn run(args: &Args) -> Result<RunOutput, Box<dyn Error>> {
    let settings: NodeSettings = match &args.config {
        Some(path) => brn_io::load_json(path)?,
        None => NodeSettings::default(),
    };
    let calibration = args
        .calibration
        .as_ref()
        .map(brn_io::load_camera_info)
        .transpose()?;

    let mut processor = build_processor(&settings, calibration.as_ref())?;

    let frame = brn_io::read_frame_as(&args.image, args.encoding)?;
    info!(
        width = frame.width(),
        height = frame.height(),
        encoding = %frame.encoding(),
        "loaded image"
    );
    processor.submit_frame(frame);

    let report = match processor.process() {
        ProcessOutcome::Processed(report) => Some(report),
        ProcessOutcome::Idle => None,
    };

    let mut sink = CollectingSink::new();
    processor.publish(&mut sink);

    if let (Some(path), Some(frame)) = (&args.output, processor.output()) {
        brn_io::write_frame(path, frame)?;
        info!(path = %path.display(), "wrote annotated image");
    }

    let pose = sink
        .poses
        .pop()
        .ok_or("processor published no pose")?;
    Ok(RunOutput { report, pose })
}

fn main() {
    let args = Args::parse();
    logger::init(args.verbose);

    if let Err(err) = try_main(&args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main(args: &Args) -> Result<(), Box<dyn Error>> {
    let out = run(args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&out.pose)?);
        return Ok(());
    }

    if let Some(report) = &out.report {
        for circle in &report.circles {
            println!(
                "circle: center=({:.1}, {:.1}) radius={:.1} support={}",
                circle.center.x, circle.center.y, circle.radius, circle.support
            );
        }
    }
    let ray = out.pose.ray();
    println!("ray: [{:.6}, {:.6}, {:.6}]", ray.x(), ray.y(), ray.z());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brn_core::Frame;
    use image::Rgb;
    use nalgebra::Matrix3;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_ball(path: &Path) {
        let mut frame = Frame::filled(200, 200, PixelEncoding::Rgb8, Rgb([255, 255, 255]));
        for y in 0..200 {
            for x in 0..200 {
                let (dx, dy) = (x as f64 - 100.0, y as f64 - 100.0);
                if dx * dx + dy * dy <= 900.0 {
                    frame.put_rgb(x, y, Rgb([0, 0, 0]));
                }
            }
        }
        brn_io::write_frame(path, &frame).unwrap();
    }

    fn args(dir: &Path) -> Args {
        Args {
            image: dir.join("ball.png"),
            calibration: Some(dir.join("camera.json")),
            config: None,
            output: Some(dir.join("out.png")),
            encoding: PixelEncoding::Rgb8,
            json: true,
            verbose: false,
        }
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "brn",
            "--image",
            "a.png",
            "--encoding",
            "bgr8",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.image, PathBuf::from("a.png"));
        assert_eq!(args.encoding, PixelEncoding::Bgr8);
        assert!(args.json);
        assert!(args.calibration.is_none());

        assert!(Args::try_parse_from(["brn", "--json"]).is_err());
    }

    #[test]
    fn test_run_on_files() {
        let dir = tempdir().unwrap();
        write_ball(&dir.path().join("ball.png"));
        brn_io::save_json(
            dir.path().join("camera.json"),
            &CameraInfo::from_intrinsics(&Matrix3::identity()),
        )
        .unwrap();

        let out = run(&args(dir.path())).unwrap();
        assert_eq!(out.report.unwrap().circles.len(), 1);
        let ray = out.pose.ray();
        assert!((ray.x() - 100.0).abs() < 3.0);
        assert!((ray.y() - 100.0).abs() < 3.0);
        assert!((ray.z() - 1.0).abs() < 1e-9);

        let annotated = brn_io::read_frame(dir.path().join("out.png")).unwrap();
        assert_eq!(annotated.rgb(100, 100), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_run_with_settings_file() {
        let dir = tempdir().unwrap();
        write_ball(&dir.path().join("ball.png"));
        brn_io::save_json(
            dir.path().join("camera.json"),
            &CameraInfo::from_intrinsics(&Matrix3::identity()),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{ "processor": { "normalize_ray": true, "ray_frame_id": "ball" } }"#,
        )
        .unwrap();

        let mut args = args(dir.path());
        args.config = Some(dir.path().join("settings.json"));
        let out = run(&args).unwrap();

        assert_eq!(out.pose.header.frame_id, "ball");
        assert!((out.pose.ray().direction().norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_singular_calibration_fails() {
        let dir = tempdir().unwrap();
        write_ball(&dir.path().join("ball.png"));
        brn_io::save_json(
            dir.path().join("camera.json"),
            &CameraInfo {
                k: [0.0; 9],
                p: [0.0; 9],
            },
        )
        .unwrap();

        let err = run(&args(dir.path())).err().unwrap();
        assert_eq!(err.to_string(), "Camera error: Intrinsic matrix is singular");
    }
}
