use clap::Parser;
use pixclass::classify::{ClassNames, LinearModel, softmax, top_k};
use pixclass::engine::{
    Cli, ExtensionFilter, apply_cli_to_opts, check_image_file, is_supported_image, parse_size,
    select_source,
};
use pixclass::pipeline::{ItemSource, format_diagnostic, format_record};
use pixclass::utils::{PixclassToml, apply_file_to_opts, load_pixclass_toml};
use pixclass::{ItemError, Opts, Prediction};
use std::time::Duration;

// --- parse_size ---

#[test]
fn test_parse_size_plain_bytes() {
    assert_eq!(parse_size("0").unwrap(), 0);
    assert_eq!(parse_size("512").unwrap(), 512);
    assert_eq!(parse_size("512b").unwrap(), 512);
}

#[test]
fn test_parse_size_units_case_insensitive() {
    assert_eq!(parse_size("1k").unwrap(), 1024);
    assert_eq!(parse_size("1KB").unwrap(), 1024);
    assert_eq!(parse_size("100mb").unwrap(), 100 * 1024 * 1024);
    assert_eq!(parse_size("2G").unwrap(), 2 * 1024 * 1024 * 1024);
    assert_eq!(parse_size("1tb").unwrap(), 1 << 40);
}

#[test]
fn test_parse_size_trims_whitespace() {
    assert_eq!(parse_size("  64k \t").unwrap(), 64 * 1024);
}

#[test]
fn test_parse_size_rejects_bad_input() {
    assert!(parse_size("").is_err());
    assert!(parse_size("   ").is_err());
    assert!(parse_size("mb").is_err());
    assert!(parse_size("10xb").is_err());
    assert!(parse_size("1.5g").is_err());
}

#[test]
fn test_parse_size_overflow() {
    assert!(parse_size("18446744073709551615").is_ok());
    assert!(parse_size("18446744073709551616").is_err());
    assert!(parse_size("20000000tb").is_err());
}

// --- extension filter ---

#[test]
fn test_is_supported_image() {
    assert!(is_supported_image("png"));
    assert!(is_supported_image(".jpg"));
    assert!(is_supported_image("JPEG"));
    assert!(is_supported_image(".TiF"));
    assert!(is_supported_image("ecw"));
    assert!(!is_supported_image("txt"));
    assert!(!is_supported_image(""));
    assert!(!is_supported_image("."));
}

#[test]
fn test_extension_filter_enabled() {
    let f = ExtensionFilter::new(true);
    assert!(f.accepts("photos/cat.png"));
    assert!(f.accepts("/abs/dog.WEBP"));
    assert!(!f.accepts("notes.txt"));
    assert!(!f.accepts("Makefile"));
    assert!(!f.accepts(".png"));
}

#[test]
fn test_extension_filter_disabled_accepts_everything() {
    let f = ExtensionFilter::new(false);
    assert!(f.accepts("notes.txt"));
    assert!(f.accepts("Makefile"));
}

// --- check_image_file ---

#[test]
fn test_check_image_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = check_image_file(&dir.path().join("nope.png"), 1024).unwrap_err();
    assert!(matches!(err, ItemError::NotAFile));
}

#[test]
fn test_check_image_file_directory() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        check_image_file(dir.path(), 1024),
        Err(ItemError::NotAFile)
    ));
}

#[test]
fn test_check_image_file_empty_and_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("empty.png");
    std::fs::write(&empty, b"").unwrap();
    assert!(matches!(
        check_image_file(&empty, 1024),
        Err(ItemError::Empty)
    ));

    let big = dir.path().join("big.png");
    std::fs::write(&big, vec![0u8; 2048]).unwrap();
    assert!(matches!(
        check_image_file(&big, 1024),
        Err(ItemError::TooLarge {
            size: 2048,
            max: 1024
        })
    ));
    assert_eq!(check_image_file(&big, 2048).unwrap(), 2048);
}

// --- formatting ---

#[test]
fn test_format_record_plain() {
    let preds = vec![Prediction::new("cat", 0.9), Prediction::new("dog", 0.05)];
    assert_eq!(
        format_record("a.png", None, &preds),
        "a.png, cat 0.900000, dog 0.050000"
    );
}

#[test]
fn test_format_record_with_timing() {
    let preds = vec![Prediction::new("cat", 0.5)];
    assert_eq!(
        format_record("a.png", Some(Duration::from_millis(42)), &preds),
        "a.png, 42ms, cat 0.500000"
    );
}

#[test]
fn test_format_record_no_predictions() {
    assert_eq!(format_record("a.png", None, &[]), "a.png");
    assert_eq!(
        format_record("a.png", Some(Duration::from_millis(7)), &[]),
        "a.png, 7ms"
    );
}

#[test]
fn test_format_diagnostic_names_the_item() {
    let msg = format_diagnostic("b.png", &ItemError::Empty);
    assert_eq!(msg, "pixclass: could not process the file 'b.png': file is empty");
    assert!(!msg.contains('\n'));
}

// --- labels / tensor ---

#[test]
fn test_class_names_lookup_and_fallback() {
    let names = ClassNames::from_lines("cat\r\ndog\nfox\n");
    assert_eq!(names.len(), 3);
    assert_eq!(names.name_for(0), "cat");
    assert_eq!(names.name_for(1), "dog");
    assert_eq!(names.name_for(2), "fox");
    // One past the end must not index out of bounds.
    assert_eq!(names.name_for(3), "class_3");
    assert_eq!(names.name_for(99), "class_99");
}

#[test]
fn test_class_names_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ClassNames::load(&dir.path().join("missing.names")).is_err());
}

#[test]
fn test_softmax_sums_to_one_and_keeps_order() {
    let mut s = vec![1.0_f32, 2.0, 3.0];
    softmax(&mut s);
    let sum: f32 = s.iter().sum();
    assert!((sum - 1.0).abs() < 1e-6);
    assert!(s[0] < s[1] && s[1] < s[2]);
}

#[test]
fn test_softmax_large_values_are_stable() {
    let mut s = vec![1000.0_f32, 1000.0];
    softmax(&mut s);
    assert!((s[0] - 0.5).abs() < 1e-6);
    assert!((s[1] - 0.5).abs() < 1e-6);
}

#[test]
fn test_softmax_empty_is_noop() {
    let mut s: Vec<f32> = Vec::new();
    softmax(&mut s);
    assert!(s.is_empty());
}

#[test]
fn test_top_k_orders_descending() {
    let scores = [0.1_f32, 0.7, 0.2, 0.7];
    assert_eq!(top_k(&scores, 3), vec![(1, 0.7), (3, 0.7), (2, 0.2)]);
    assert_eq!(top_k(&scores, 10).len(), 4);
    assert!(top_k(&scores, 0).is_empty());
}

// --- model ---

#[test]
fn test_linear_model_validate_shapes() {
    let ok = LinearModel {
        input_width: 1,
        input_height: 1,
        weights: vec![vec![1.0, 0.0, 0.0], vec![0.0, 0.0, 1.0]],
        bias: vec![],
    };
    assert!(ok.validate().is_ok());
    assert_eq!(ok.scores(&[1.0, 0.5, 0.25]), vec![1.0, 0.25]);

    let bad_row = LinearModel {
        weights: vec![vec![1.0, 0.0]],
        ..ok.clone()
    };
    assert!(bad_row.validate().is_err());

    let bad_bias = LinearModel {
        bias: vec![0.0],
        ..ok.clone()
    };
    assert!(bad_bias.validate().is_err());

    let no_classes = LinearModel {
        weights: vec![],
        ..ok
    };
    assert!(no_classes.validate().is_err());
}

#[test]
fn test_linear_model_huge_input_is_an_error() {
    let huge = LinearModel {
        input_width: u32::MAX,
        input_height: u32::MAX,
        weights: vec![vec![0.0; 3]],
        bias: vec![],
    };
    assert_eq!(huge.input_len(), None);
    let err = huge.validate().unwrap_err();
    assert!(err.to_string().contains("input size too large"), "{err}");
}

#[test]
fn test_linear_model_load_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(
        &path,
        r#"{"input_width": 1, "input_height": 1, "weights": [[1, 1, 1]], "bias": [0.5]}"#,
    )
    .unwrap();
    let model = LinearModel::load(&path).unwrap();
    assert_eq!(model.num_classes(), 1);
    assert_eq!(model.scores(&[0.0, 0.0, 0.0]), vec![0.5]);

    std::fs::write(&path, r#"{"input_width": 0, "input_height": 1, "weights": [[]]}"#).unwrap();
    assert!(LinearModel::load(&path).is_err());
}

// --- config ---

#[test]
fn test_apply_file_to_opts() {
    let file: PixclassToml = r#"
        [settings]
        model = "m.json"
        classes = "c.names"
        top_k = 3
        threads = 2
        timing = true
        max_filesize = "1mb"
        extension_check = false
    "#
    .parse()
    .unwrap();
    let mut opts = Opts::default();
    apply_file_to_opts(&file, &mut opts).unwrap();
    assert_eq!(opts.model_path.as_deref(), Some(std::path::Path::new("m.json")));
    assert_eq!(opts.top_k, 3);
    assert_eq!(opts.threads, Some(2));
    assert!(opts.timing);
    assert!(!opts.softmax);
    assert_eq!(opts.max_filesize, 1024 * 1024);
    assert!(!opts.extension_check);
}

#[test]
fn test_apply_file_to_opts_bad_size() {
    let file: PixclassToml = "[settings]\nmax_filesize = \"lots\"\n".parse().unwrap();
    assert!(apply_file_to_opts(&file, &mut Opts::default()).is_err());
}

#[test]
fn test_unknown_setting_is_rejected() {
    assert!("[settings]\nthreadz = 4\n".parse::<PixclassToml>().is_err());
}

#[test]
fn test_load_pixclass_toml_from_dir() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_pixclass_toml(None, dir.path()).unwrap().is_none());

    std::fs::write(dir.path().join(".pixclass.toml"), "[settings]\ntop_k = 1\n").unwrap();
    let file = load_pixclass_toml(None, dir.path()).unwrap().unwrap();
    let mut opts = Opts::default();
    apply_file_to_opts(&file, &mut opts).unwrap();
    assert_eq!(opts.top_k, 1);

    std::fs::write(dir.path().join(".pixclass.toml"), "not toml [").unwrap();
    assert!(load_pixclass_toml(None, dir.path()).is_err());

    assert!(load_pixclass_toml(Some(&dir.path().join("missing.toml")), dir.path()).is_err());
}

#[test]
fn test_unreadable_default_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".pixclass.toml")).unwrap();
    let err = load_pixclass_toml(None, dir.path()).unwrap_err();
    assert!(err.to_string().contains("read config file"), "{err}");
}

// --- CLI ---

#[test]
fn test_cli_overrides_file_values() {
    let mut opts = Opts {
        top_k: 3,
        timing: true,
        softmax: true,
        ..Opts::default()
    };
    let cli = Cli::parse_from([
        "pixclass", "-m", "model.json", "-k", "7", "--timing=false", "-D", "-F", "2k", "x.png",
    ]);
    apply_cli_to_opts(&cli, &mut opts);
    assert_eq!(opts.top_k, 7);
    assert!(!opts.timing);
    assert!(opts.softmax);
    assert!(!opts.extension_check);
    assert_eq!(opts.max_filesize, 2048);
    assert_eq!(opts.items, vec!["x.png"]);
}

#[test]
fn test_cli_bool_flag_does_not_swallow_items() {
    let cli = Cli::parse_from(["pixclass", "-T", "a.png", "b.png"]);
    assert_eq!(cli.timing, Some(true));
    assert_eq!(cli.items, vec!["a.png", "b.png"]);
}

#[test]
fn test_cli_rejects_bad_size() {
    assert!(Cli::try_parse_from(["pixclass", "-F", "12qb"]).is_err());
}

#[test]
fn test_select_source_modes() {
    let direct = Opts {
        items: vec!["a.png".into()],
        ..Opts::default()
    };
    assert!(matches!(select_source(&direct, false), ItemSource::Direct(ref v) if v.len() == 1));

    let nothing = Opts::default();
    assert!(matches!(select_source(&nothing, true), ItemSource::Direct(ref v) if v.is_empty()));

    let recursive = Opts {
        recursive: true,
        items: vec![".".into()],
        ..Opts::default()
    };
    assert!(matches!(
        select_source(&recursive, true),
        ItemSource::Stream { .. }
    ));
}

#[test]
fn test_opts_settings_defaults() {
    let s = Opts::default().settings();
    assert!(s.threads >= 1);
    assert_eq!(s.top_k, 5);
    assert!(!s.timing);
}
