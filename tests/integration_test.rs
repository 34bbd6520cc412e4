use mnemosyne::logger::{ImageData, Logger, LoggerBuilder};
use mnemosyne::visualization::{GraphOptions, MultiRunVisualizer, SingleRunVisualizer};
use ndarray::Array3;
use tempfile::tempdir;

/// Simulate a small training run and write its metrics.
fn train(run: &std::path::Path, runs_hot: bool) {
    let mut logger = LoggerBuilder::new().save_freq(10).open(run).unwrap();

    for step in 0..32i64 {
        let loss = if runs_hot {
            2.0 / (step + 1) as f64
        } else {
            1.0 / (step + 1) as f64
        };
        logger
            .add_scalars(
                "train/",
                "",
                Some(step),
                &[("loss", loss), ("lr", 1e-3 * 0.99f64.powi(step as i32))],
            )
            .unwrap();

        if step % 8 == 0 {
            let mut scoped = logger.scoped_prefix("eval/");
            scoped.add_scalar("loss", loss * 1.1, Some(step)).unwrap();
        }
    }

    logger.add_text("config", "lr=1e-3 batch=32", Some(0)).unwrap();

    let mut frame = Array3::<f32>::zeros((8, 8, 3));
    frame[[0, 0, 0]] = 0.9;
    logger
        .add_image("rollout/frame", &ImageData::from(frame), Some(31))
        .unwrap();

    logger.flush().unwrap();
}

#[test]
fn test_end_to_end_log_and_visualize() {
    let dir = tempdir().unwrap();
    let run = dir.path().join("exp1");
    train(&run, false);

    let viz = SingleRunVisualizer::new(&run).unwrap();

    // Every scalar series lands on one overlaid figure
    let all = viz.show_all_scalars(true, &GraphOptions::default()).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].series().len(), 3);

    // Raw and smoothed graphs keep the full series
    let opts = GraphOptions::default();
    let figure = viz.show_graph("train/loss", &opts).unwrap();
    assert_eq!(figure.series()[0].points().len(), 32);

    let smoothed = GraphOptions {
        smooth_window: 7,
        smooth_sigma: 2.0,
        ..GraphOptions::default()
    };
    let figure = viz.show_graph("train/loss", &smoothed).unwrap();
    assert_eq!(figure.series()[0].points().len(), 32);

    // The sparse eval series only has the logged iterations
    assert_eq!(viz.get_non_null_index("eval/loss").unwrap(), vec![0, 8, 16, 24]);

    // Rendering produces a real PNG file
    let out = dir.path().join("loss.png");
    figure.save_png(&out).unwrap();
    assert!(out.metadata().unwrap().len() > 0);

    // Logged image round-trips through the panel
    let panel = viz.show_img("rollout/frame", 31).unwrap();
    assert_eq!((panel.width(), panel.height()), (8, 8));
    let img_out = dir.path().join("frame.png");
    panel.save_png(&img_out).unwrap();
    assert!(img_out.exists());
}

#[test]
fn test_end_to_end_resume_and_compare() {
    let dir = tempdir().unwrap();
    let exp1 = dir.path().join("exp1");
    let exp2 = dir.path().join("exp2");
    train(&exp1, false);
    train(&exp2, true);

    // Resume the first run where it left off
    let mut logger = Logger::open(&exp1, true).unwrap();
    assert_eq!(logger.row_count(), 32);
    logger.add_scalar("train/loss", 0.01, Some(32)).unwrap();
    logger.flush().unwrap();
    drop(logger);

    let viz = MultiRunVisualizer::new(&[&exp1, &exp2]).unwrap();
    let figures = viz
        .show_matching_scalars(&["train/loss", "eval/.*"], &GraphOptions::default())
        .unwrap();
    assert_eq!(figures.len(), 2);

    let labels: Vec<&str> = figures[0].series().iter().map(|s| s.label()).collect();
    assert_eq!(labels, vec!["exp1/train/loss", "exp2/train/loss"]);
    assert_eq!(figures[0].series()[0].points().len(), 33);
    assert_eq!(figures[0].series()[1].points().len(), 32);

    let out = dir.path().join("compare.png");
    figures[0].save_png(&out).unwrap();
    assert!(out.exists());

    // Image comparison grid across both runs
    let grid = viz.show_img("rollout/frame", 31).unwrap();
    assert_eq!((grid.rows(), grid.cols()), (1, 2));
    let grid_out = dir.path().join("frames.png");
    grid.save_png(&grid_out).unwrap();
    assert!(grid_out.exists());
}
