mod support;

use kge_report::config;
use kge_report::report::{self, RenderOutcome, ReportError, ReportRenderer};
use kge_report::training_log::{Count, ExtractError, RequiredField, StructureKind};
use support::{kge_env::ConfigHomeGuard, logs::write_training_log};

#[test]
fn renders_report_next_to_log() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let log = write_training_log(
        temp.path(),
        "distmult.log",
        &[(0.9, 1.1), (0.6, 0.8), (0.5, 0.8), (0.4, 0.85)],
    );
    let renderer = ReportRenderer::new(640, 480);

    let outcome = report::generate_report(&log, &renderer, false).expect("render report");
    let RenderOutcome::Written { path, record } = outcome else {
        panic!("expected a fresh render");
    };
    assert_eq!(path, temp.path().join("distmult.log.png"));
    assert_eq!(record.best_epoch, 2);
    assert_eq!(record.entity_count, Some(Count::Known(5000)));
    assert_eq!(record.structure_kind, StructureKind::Indirect);

    let image = image::open(&path).expect("decode png").to_rgba8();
    assert_eq!(image.dimensions(), (640, 480));

    let lines: Vec<String> = report::annotations(&record)
        .into_iter()
        .map(|annotation| annotation.text)
        .collect();
    assert_eq!(
        lines,
        [
            "Batch_size = 128",
            "Hit@1 = 0.275",
            "Best epoch = 2",
            "Training time = 01:20:30",
        ]
    );
}

#[test]
fn existing_report_is_kept_unless_forced() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let log = write_training_log(temp.path(), "run.log", &[(0.5, 0.6), (0.4, 0.5)]);
    let png = report::output_path(&log);
    std::fs::write(&png, b"placeholder").expect("seed output");
    let renderer = ReportRenderer::default();

    let skipped = report::generate_report(&log, &renderer, false).expect("skip");
    assert!(matches!(skipped, RenderOutcome::Skipped { .. }));
    assert_eq!(std::fs::read(&png).expect("read output"), b"placeholder");

    let forced = report::generate_report(&log, &renderer, true).expect("force");
    assert!(matches!(forced, RenderOutcome::Written { .. }));
    assert!(image::open(&png).is_ok());
}

#[test]
fn infinite_and_nan_losses_render_with_gaps() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let log = write_training_log(
        temp.path(),
        "diverged.log",
        &[(0.9, 1.1), (f64::INFINITY, 0.8), (0.5, f64::NAN), (0.4, 0.85)],
    );
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let outcome = report::generate_report(&log, &ReportRenderer::new(400, 300), false);
        let _ = tx.send(outcome);
    });
    let outcome = rx
        .recv_timeout(std::time::Duration::from_secs(20))
        .expect("render finishes")
        .expect("render report");
    let RenderOutcome::Written { path, record } = outcome else {
        panic!("expected a fresh render");
    };
    assert!(record.epoch_series[1].train.is_infinite());
    assert!(record.epoch_series[2].valid.is_nan());
    assert_eq!(record.best_epoch, 2);

    let image = image::open(&path).expect("decode png").to_rgba8();
    let blank_top = (0..image.width()).all(|x| image.get_pixel(x, 0).0[..3] == [255, 255, 255]);
    assert!(blank_top, "non-finite points must not be drawn at the image edge");
}

#[test]
fn oversized_requests_are_clamped() {
    let renderer = ReportRenderer::new(100_000, 100_000);
    assert_eq!(renderer.size(), (report::MAX_WIDTH, report::MAX_HEIGHT));
}

#[test]
fn malformed_log_reports_missing_fields_and_writes_nothing() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let log = temp.path().join("broken.log");
    std::fs::write(
        &log,
        "2024-05-02 08:00:02,000 - INFO: batch_size : 128\n\
         2024-05-02 08:01:00,000 - INFO - Epoch 1 | Train loss: 0.5, Valid loss: 0.6 | 1.0s\n",
    )
    .expect("write log");

    let err = report::generate_report(&log, &ReportRenderer::default(), false).unwrap_err();
    match err {
        ReportError::Extract(ExtractError::MalformedLog { missing, .. }) => {
            assert_eq!(missing, [RequiredField::Algorithm, RequiredField::HitAt1]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!report::output_path(&log).exists());
}

#[test]
fn report_size_comes_from_config_file() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let _env = ConfigHomeGuard::set(temp.path().join("config"));
    let app_dir = kge_report::app_dirs::app_root_dir().expect("app dir");
    std::fs::write(
        app_dir.join(config::CONFIG_FILE_NAME),
        "[report]\nwidth = 320\nheight = 200\n",
    )
    .expect("write config");

    let settings = config::load_or_default().expect("load settings");
    let renderer = ReportRenderer::new(settings.report.width, settings.report.height);
    assert_eq!(renderer.size(), (320, 200));
    assert_eq!(settings.prediction.cutoff, 50);
}
