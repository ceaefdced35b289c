//! CLI round trips: spec file in, SMF and report files out.

use fugata_cli::commands;
use fugata_spec::report::GenerationReport;
use fugata_tests::fixtures::{self, SpecDir};

#[test]
fn generate_writes_smf_and_report() {
    let dir = SpecDir::new();
    let spec = fixtures::fugue_spec("cli-fugue", 42);
    let spec_path = dir.add(&spec);
    let out_dir = dir.path().join("out");

    commands::generate::run(
        spec_path.to_str().unwrap(),
        Some(out_dir.to_str().unwrap()),
        false,
    )
    .unwrap();

    let smf_path = out_dir.join("cli-fugue.mid");
    let report_path = out_dir.join(GenerationReport::filename("cli-fugue"));
    assert!(smf_path.exists());
    assert!(report_path.exists());

    let smf = std::fs::read(&smf_path).unwrap();
    assert_eq!(&smf[..4], b"MThd");

    let report: GenerationReport =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert!(report.ok);
    assert_eq!(report.seed, 42);
    assert!(report.errors.is_empty());
    assert!(!report.sections.is_empty());
    assert_eq!(report.track_count, 3);
    assert_eq!(
        report.spec_hash,
        fugata_spec::canonical_spec_hash(&spec).unwrap()
    );
    assert_eq!(report.score_hash, fugata_midi::bytes_hash(&smf));
}

#[test]
fn generate_report_hash_is_stable_across_runs() {
    let spec = fixtures::goldberg_spec("cli-goldberg", 11);
    let mut hashes = Vec::new();
    for _ in 0..2 {
        let dir = SpecDir::new();
        let spec_path = dir.add(&spec);
        commands::generate::run(spec_path.to_str().unwrap(), Some(dir.path().to_str().unwrap()), false)
            .unwrap();
        let report_path = dir.path().join(GenerationReport::filename("cli-goldberg"));
        let report: GenerationReport =
            serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
        hashes.push(report.score_hash);
    }
    assert_eq!(hashes[0], hashes[1]);
}

#[test]
fn generate_dump_json_writes_a_note_dump() {
    let dir = SpecDir::new();
    let spec = fixtures::prelude_spec("cli-prelude", 3);
    let spec_path = dir.add(&spec);

    commands::generate::run(
        spec_path.to_str().unwrap(),
        Some(dir.path().to_str().unwrap()),
        true,
    )
    .unwrap();

    let dump_path = dir.path().join("cli-prelude.json");
    let dump: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dump_path).unwrap()).unwrap();
    assert_eq!(dump["engine"], "fugata-engine");
    assert_eq!(dump["score"]["form"], "prelude");
}

#[test]
fn generate_rejects_an_invalid_spec_without_writing_files() {
    let dir = SpecDir::new();
    let mut spec = fixtures::fugue_spec("cli-bad", 1);
    if let fugata_spec::FormConfig::Fugue(cfg) = &mut spec.config {
        cfg.voices = 9;
    }
    let spec_path = dir.add(&spec);
    let out_dir = dir.path().join("out");

    commands::generate::run(
        spec_path.to_str().unwrap(),
        Some(out_dir.to_str().unwrap()),
        false,
    )
    .unwrap();

    assert!(!out_dir.join("cli-bad.mid").exists());
}

#[test]
fn validate_and_analyze_run_on_a_good_spec() {
    let dir = SpecDir::new();
    let spec_path = dir.add(&fixtures::chaconne_spec("cli-chaconne", 5));
    commands::validate::run(spec_path.to_str().unwrap()).unwrap();
    commands::analyze::run(spec_path.to_str().unwrap()).unwrap();
}

#[test]
fn validate_errors_on_a_missing_file() {
    assert!(commands::validate::run("/no/such/spec.json").is_err());
}
