use ndarray::{Array2, Array3};
use tempfile::tempdir;

use crate::error::MnemosyneError;
use crate::logger::confirm::is_affirmative;
use crate::logger::{ColumnType, ImageData, Logger, LoggerBuilder, DATA_FILE, META_FILE};

#[test]
fn test_fresh_directory_starts_empty() {
    let dir = tempdir().unwrap();
    let run = dir.path().join("run");

    let logger = Logger::open(&run, false).unwrap();
    assert!(run.is_dir());
    assert!(logger.columns().is_empty());
    assert_eq!(logger.row_count(), 0);
}

#[test]
fn test_scalar_appends_at_row_count() {
    let dir = tempdir().unwrap();
    let mut logger = Logger::open(dir.path().join("run"), false).unwrap();

    logger.add_scalar("loss", 0.9, None).unwrap();
    logger.add_scalar("loss", 0.5, None).unwrap();
    logger.add_scalar("loss", 0.1, Some(10)).unwrap();

    assert_eq!(
        logger.scalar_series("loss").unwrap(),
        vec![(0, 0.9), (1, 0.5), (10, 0.1)]
    );
    // Three distinct iterations, so the next default row is 3
    logger.add_scalar("loss", 0.05, None).unwrap();
    assert_eq!(logger.non_null_index("loss").unwrap(), vec![0, 1, 3, 10]);
}

#[test]
fn test_round_trip_persistence() {
    let dir = tempdir().unwrap();
    let run = dir.path().join("run");

    let mut logger = Logger::open(&run, false).unwrap();
    logger.add_scalar("loss", 0.25, None).unwrap();
    logger.add_scalar("loss", 0.125, None).unwrap();
    logger.add_text("note", "first epoch done", Some(1)).unwrap();
    let img = ImageData::from(Array2::<u8>::from_elem((4, 5), 200));
    logger.add_image("sample", &img, Some(1)).unwrap();
    logger.flush().unwrap();
    let image_path = logger.image_path("sample", 1).unwrap();
    drop(logger);

    let reopened = Logger::open(&run, true).unwrap();
    assert_eq!(
        reopened.columns(),
        vec!["loss".to_string(), "note".to_string(), "sample".to_string()]
    );
    assert_eq!(reopened.column_type("loss"), Some(ColumnType::Scalar));
    assert_eq!(reopened.column_type("note"), Some(ColumnType::Text));
    assert_eq!(reopened.column_type("sample"), Some(ColumnType::Image));
    assert_eq!(
        reopened.scalar_series("loss").unwrap(),
        vec![(0, 0.25), (1, 0.125)]
    );
    assert_eq!(
        reopened.text_series("note").unwrap(),
        vec![(1, "first epoch done".to_string())]
    );
    assert_eq!(reopened.image_path("sample", 1).unwrap(), image_path);
}

#[test]
fn test_type_is_immutable_after_creation() {
    let dir = tempdir().unwrap();
    let mut logger = Logger::open(dir.path().join("run"), false).unwrap();

    logger.add_scalar("x", 1.0, None).unwrap();
    let err = logger.add_text("x", "a", None).unwrap_err();
    assert!(matches!(
        err,
        MnemosyneError::TypeMismatch {
            requested: ColumnType::Text,
            actual: ColumnType::Scalar,
            ..
        }
    ));

    // The failed call must leave the table untouched
    assert_eq!(logger.columns(), vec!["x".to_string()]);
    assert_eq!(logger.scalar_series("x").unwrap(), vec![(0, 1.0)]);
}

#[test]
fn test_prefix_and_postfix_scoping() {
    let dir = tempdir().unwrap();
    let mut logger = Logger::open(dir.path().join("run"), false).unwrap();

    logger.add_to_prefix("a/");
    logger.add_scalar("loss", 1.0, None).unwrap();
    assert_eq!(logger.columns(), vec!["a/loss".to_string()]);

    logger.remove_from_prefix("a/").unwrap();
    assert_eq!(logger.prefix(), "");

    logger.add_to_prefix("a/");
    assert!(logger.remove_from_prefix("b/").is_err());
    assert_eq!(logger.prefix(), "a/");
    logger.remove_from_prefix("a/").unwrap();

    logger.add_to_postfix("/raw");
    logger.add_scalar("acc", 0.5, None).unwrap();
    assert!(logger.columns().contains(&"acc/raw".to_string()));
    assert!(logger.remove_from_postfix("/smooth").is_err());
    assert_eq!(logger.postfix(), "/raw");
    logger.remove_from_postfix("/raw").unwrap();
    assert_eq!(logger.postfix(), "");
}

#[test]
fn test_scoped_prefix_pops_on_drop() {
    let dir = tempdir().unwrap();
    let mut logger = Logger::open(dir.path().join("run"), false).unwrap();

    {
        let mut scoped = logger.scoped_prefix("train/");
        scoped.add_scalar("loss", 0.5, None).unwrap();
        {
            let mut inner = scoped.scoped_prefix("batch/");
            inner.add_scalar("loss", 0.25, None).unwrap();
        }
        scoped.add_scalar("acc", 0.75, None).unwrap();
    }

    assert_eq!(logger.prefix(), "");
    let cols = logger.columns();
    assert!(cols.contains(&"train/loss".to_string()));
    assert!(cols.contains(&"train/batch/loss".to_string()));
    assert!(cols.contains(&"train/acc".to_string()));
}

#[test]
fn test_add_scalars_shares_one_iteration() {
    let dir = tempdir().unwrap();
    let mut logger = Logger::open(dir.path().join("run"), false).unwrap();

    logger
        .add_scalars("train/", "", None, &[("loss", 0.5), ("acc", 0.8)])
        .unwrap();
    logger
        .add_scalars("train/", "", None, &[("loss", 0.4), ("acc", 0.9)])
        .unwrap();

    assert_eq!(
        logger.scalar_series("train/loss").unwrap(),
        vec![(0, 0.5), (1, 0.4)]
    );
    assert_eq!(
        logger.scalar_series("train/acc").unwrap(),
        vec![(0, 0.8), (1, 0.9)]
    );
    // Temporary prefix must be restored afterwards
    assert_eq!(logger.prefix(), "");
}

#[test]
fn test_buffered_save_threshold() {
    let dir = tempdir().unwrap();
    let run = dir.path().join("run");
    let mut logger = LoggerBuilder::new().save_freq(3).open(&run).unwrap();
    let data_path = run.join(DATA_FILE);

    logger.add_scalar("loss", 1.0, None).unwrap();
    logger.add_scalar("loss", 2.0, None).unwrap();
    assert!(!data_path.exists());

    logger.add_scalar("loss", 3.0, None).unwrap();
    assert!(data_path.exists());
    let contents = std::fs::read_to_string(&data_path).unwrap();
    assert_eq!(contents.lines().count(), 4); // header + 3 rows

    logger.add_scalar("loss", 4.0, None).unwrap();
    assert_eq!(
        std::fs::read_to_string(&data_path).unwrap().lines().count(),
        4
    );
    logger.flush().unwrap();
    assert_eq!(
        std::fs::read_to_string(&data_path).unwrap().lines().count(),
        5
    );
}

#[test]
fn test_existing_data_requires_confirmation() {
    let dir = tempdir().unwrap();
    let run = dir.path().join("run");

    let mut logger = Logger::open(&run, false).unwrap();
    logger.add_scalar("loss", 1.0, None).unwrap();
    logger.flush().unwrap();
    drop(logger);

    let err = Logger::open(&run, false).unwrap_err();
    assert!(matches!(err, MnemosyneError::ExistingData(_)));

    // A declining callback fails the same way
    let err = LoggerBuilder::new()
        .confirm_with(|_| false)
        .open(&run)
        .unwrap_err();
    assert!(matches!(err, MnemosyneError::ExistingData(_)));

    // An approving callback reopens with the old data intact
    let reopened = LoggerBuilder::new()
        .confirm_with(|conflict| conflict.dir.ends_with("run"))
        .open(&run)
        .unwrap();
    assert_eq!(reopened.scalar_series("loss").unwrap(), vec![(0, 1.0)]);
}

#[test]
fn test_empty_flush_reopens_without_conflict() {
    let dir = tempdir().unwrap();
    let run = dir.path().join("run");

    let mut logger = Logger::open(&run, false).unwrap();
    logger.flush().unwrap();
    drop(logger);

    // No columns were ever logged, so there is nothing to protect
    let logger = Logger::open(&run, false).unwrap();
    assert!(logger.columns().is_empty());
}

#[test]
fn test_unknown_metadata_type_is_fatal() {
    let dir = tempdir().unwrap();
    let run = dir.path().join("run");
    std::fs::create_dir_all(&run).unwrap();
    std::fs::write(run.join(DATA_FILE), "iteration,a\n0,1.0\n").unwrap();
    std::fs::write(run.join(META_FILE), r#"{"a": "blob"}"#).unwrap();

    let err = Logger::open(&run, true).unwrap_err();
    match err {
        MnemosyneError::UnknownDataType { column, tag } => {
            assert_eq!(column, "a");
            assert_eq!(tag, "blob");
        }
        other => panic!("expected UnknownDataType, got {:?}", other),
    }
}

#[test]
fn test_metadata_key_mismatch_is_fatal() {
    let dir = tempdir().unwrap();
    let run = dir.path().join("run");
    std::fs::create_dir_all(&run).unwrap();
    std::fs::write(run.join(DATA_FILE), "iteration,a\n0,1.0\n").unwrap();
    std::fs::write(run.join(META_FILE), r#"{"b": "scalar"}"#).unwrap();

    let err = Logger::open(&run, true).unwrap_err();
    assert!(matches!(err, MnemosyneError::CorruptLog(_)));
}

#[test]
fn test_image_written_under_column_path() {
    let dir = tempdir().unwrap();
    let run = dir.path().join("run");
    let mut logger = Logger::open(&run, false).unwrap();

    let img = ImageData::from(Array2::<f32>::from_elem((2, 2), 0.5));
    logger.add_image("imgs/sample", &img, Some(7)).unwrap();

    let path = logger.image_path("imgs/sample", 7).unwrap();
    assert!(path.exists());
    assert!(path.to_string_lossy().ends_with("imgs/sample-7.png"));

    // Float input in [0, 1) lands in the 8-bit range
    let decoded = image::open(&path).unwrap().to_luma8();
    assert_eq!(decoded.dimensions(), (2, 2));
    assert_eq!(decoded.get_pixel(0, 0).0[0], 127);

    let err = logger.image_path("imgs/sample", 99).unwrap_err();
    assert!(matches!(err, MnemosyneError::MissingCell { .. }));
}

#[test]
fn test_rgb_image_channel_check() {
    let dir = tempdir().unwrap();
    let mut logger = Logger::open(dir.path().join("run"), false).unwrap();

    let bad = ImageData::RgbU8(Array3::<u8>::zeros((2, 2, 4)));
    assert!(logger.add_image("sample", &bad, None).is_err());
    // The rejected write must not have created the column
    assert!(logger.columns().is_empty());

    let good = ImageData::RgbU8(Array3::<u8>::zeros((2, 2, 3)));
    logger.add_image("sample", &good, None).unwrap();
    assert_eq!(logger.column_type("sample"), Some(ColumnType::Image));
}

#[test]
fn test_snapshot_requires_existing_directory() {
    let dir = tempdir().unwrap();
    let err = Logger::snapshot(dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, MnemosyneError::RunNotFound(_)));
}

#[test]
fn test_affirmative_answers() {
    for answer in ["y", "Y", "yes", "YES", "j", "ja", "Ja", " ja \n"] {
        assert!(is_affirmative(answer), "{:?} should confirm", answer);
    }
    for answer in ["", "n", "no", "jaa", "yess", "maybe"] {
        assert!(!is_affirmative(answer), "{:?} should decline", answer);
    }
}
