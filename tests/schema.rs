mod common;

use assert_matches::assert_matches;
use camino::Utf8Path;
use tempfile::TempDir;

use common::{build_checkv_db, build_virsorter2_db, write_file, VALID_HMM, VALID_TSV};
use virokit::error::VirokitError;
use virokit::schema::{CheckvDb, GenomadDb, MetadataBundle, Virsorter2Db};

fn root(dir: &TempDir) -> &Utf8Path {
    Utf8Path::from_path(dir.path()).unwrap()
}

#[test]
fn checkv_db_validates_clean_tree() {
    let dir = TempDir::new().unwrap();
    build_checkv_db(root(&dir));
    let report = CheckvDb::schema().unwrap().validate(root(&dir)).unwrap();
    assert!(report.is_pass(), "unexpected violations: {report}");
}

#[test]
fn checkv_db_reports_missing_required_file() {
    let dir = TempDir::new().unwrap();
    build_checkv_db(root(&dir));
    std::fs::remove_file(dir.path().join("checkv-db-v1.5/README.txt")).unwrap();

    let report = CheckvDb::schema().unwrap().validate(root(&dir)).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].subject, r"[^/]+/README\.txt");
    assert!(report.violations[0].message.contains("no file matches"));
}

#[test]
fn checkv_db_accumulates_all_failures() {
    let dir = TempDir::new().unwrap();
    build_checkv_db(root(&dir));
    std::fs::remove_file(dir.path().join("checkv-db-v1.5/README.txt")).unwrap();
    // Single-column table: fails the tabular check independently.
    write_file(
        root(&dir),
        "checkv-db-v1.5/genome_db/checkv_error.tsv",
        "only\nvalue\n",
    );

    let report = CheckvDb::schema().unwrap().validate(root(&dir)).unwrap();
    assert_eq!(report.violations.len(), 2);
    let subjects: Vec<&str> = report
        .violations
        .iter()
        .map(|violation| violation.subject.as_str())
        .collect();
    assert!(subjects.contains(&r"[^/]+/README\.txt"));
    assert!(subjects.contains(&"checkv-db-v1.5/genome_db/checkv_error.tsv"));
}

#[test]
fn checkv_db_flags_invalid_profile() {
    let dir = TempDir::new().unwrap();
    build_checkv_db(root(&dir));
    let broken = VALID_HMM.replace("LENG  2\n", "");
    write_file(root(&dir), "checkv-db-v1.5/hmm_db/checkv_hmms/1.hmm", &broken);

    let report = CheckvDb::schema().unwrap().validate(root(&dir)).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert!(report.violations[0].message.contains("LENG"));
}

#[test]
fn ensure_valid_converts_report_into_error() {
    let dir = TempDir::new().unwrap();
    build_checkv_db(root(&dir));
    std::fs::remove_file(dir.path().join("checkv-db-v1.5/README.txt")).unwrap();

    let err = CheckvDb::schema()
        .unwrap()
        .ensure_valid(root(&dir))
        .unwrap_err();
    assert_matches!(err, VirokitError::LayoutInvalid { problems: 1, .. });
}

#[test]
fn virsorter2_db_validates_clean_tree() {
    let dir = TempDir::new().unwrap();
    build_virsorter2_db(root(&dir));
    let report = Virsorter2Db::schema().unwrap().validate(root(&dir)).unwrap();
    assert!(report.is_pass(), "unexpected violations: {report}");
}

#[test]
fn virsorter2_db_requires_setup_marker() {
    let dir = TempDir::new().unwrap();
    build_virsorter2_db(root(&dir));
    std::fs::remove_file(dir.path().join("Done_all_setup")).unwrap();

    let report = Virsorter2Db::schema().unwrap().validate(root(&dir)).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].subject, "Done_all_setup");
}

#[test]
fn virsorter2_db_flags_hallmark_gene_defects() {
    let dir = TempDir::new().unwrap();
    build_virsorter2_db(root(&dir));
    write_file(
        root(&dir),
        "group/dsDNAphage/hallmark-gene.list",
        "TerL\t\thallmark\n",
    );

    let report = Virsorter2Db::schema().unwrap().validate(root(&dir)).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert!(report.violations[0].message.contains("description"));
    assert!(report.violations[0].message.contains("line 1"));
}

#[test]
fn genomad_db_validates_reconstructed_layout() {
    let dir = TempDir::new().unwrap();
    write_file(root(&dir), "genomad_db/version.txt", "1.7\n");
    write_file(root(&dir), "genomad_db/genomad_db", "\u{0}mmseqs\u{0}");
    write_file(root(&dir), "genomad_db/genomad_db.dbtype", "\u{0}");
    write_file(
        root(&dir),
        "genomad_db/genomad_marker_metadata.tsv",
        VALID_TSV,
    );

    let report = GenomadDb::schema().unwrap().validate(root(&dir)).unwrap();
    assert!(report.is_pass(), "unexpected violations: {report}");
}

#[test]
fn metadata_bundle_requires_at_least_one_table() {
    let dir = TempDir::new().unwrap();
    let report = MetadataBundle::schema().unwrap().validate(root(&dir)).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].subject, r"[^/]+\.tsv");
}

// Path makers mirror the original tool layouts exactly.
#[test]
fn checkv_path_makers() {
    assert_eq!(
        CheckvDb::hmm_profile_path("checkVdb", "checkv_hmms", "1").as_str(),
        "checkVdb/hmm_db/checkv_hmms/1.hmm"
    );
    assert_eq!(
        CheckvDb::genome_table_path("checkVdb", "checkv_error").as_str(),
        "checkVdb/genome_db/checkv_error.tsv"
    );
    assert_eq!(
        CheckvDb::genome_index_path("checkVdb", "checkv_reps").as_str(),
        "checkVdb/genome_db/checkv_reps.dmnd"
    );
    assert_eq!(
        CheckvDb::hmm_table_path("checkVdb", "genome_lengths").as_str(),
        "checkVdb/hmm_db/genome_lengths.tsv"
    );
    assert_eq!(
        MetadataBundle::table_path("sample1_quality_summary").as_str(),
        "sample1_quality_summary.tsv"
    );
}

/// Round-trip property: a tree built purely from path-maker output passes
/// the corresponding schema, so every constructed path matches its pattern.
#[test]
fn checkv_path_makers_round_trip_through_schema() {
    let dir = TempDir::new().unwrap();
    let outer = "checkv-db-v1.5";
    let files = [
        (CheckvDb::readme_path(outer), "CheckV database\n".to_string()),
        (
            CheckvDb::hmm_profile_path(outer, "checkv_hmms", "1"),
            VALID_HMM.to_string(),
        ),
        (
            CheckvDb::hmm_table_path(outer, "genome_lengths"),
            VALID_TSV.to_string(),
        ),
        (
            CheckvDb::genome_table_path(outer, "checkv_error"),
            VALID_TSV.to_string(),
        ),
        (
            CheckvDb::genome_index_path(outer, "checkv_reps"),
            "binary".to_string(),
        ),
        (
            CheckvDb::genome_proteins_path(outer, "checkv_reps"),
            ">rep\nMAD\n".to_string(),
        ),
        (
            CheckvDb::genome_sequences_path(outer, "checkv_reps"),
            ">rep\nACGT\n".to_string(),
        ),
        (
            CheckvDb::genome_log_path(outer, "checkv_reps"),
            "ok\n".to_string(),
        ),
    ];
    for (relative, content) in &files {
        write_file(root(&dir), relative.as_str(), content);
    }

    let report = CheckvDb::schema().unwrap().validate(root(&dir)).unwrap();
    assert!(report.is_pass(), "unexpected violations: {report}");
}

#[test]
fn virsorter2_path_makers_round_trip_through_schema() {
    let dir = TempDir::new().unwrap();
    let files = [
        (Virsorter2Db::setup_marker_path(), "".to_string()),
        (Virsorter2Db::group_model_path("dsDNAphage"), "m".to_string()),
        (
            Virsorter2Db::hallmark_gene_list_path("dsDNAphage"),
            "TerL\tterminase\thallmark\n".to_string(),
        ),
        (
            Virsorter2Db::hmm_profile_path("pfam", "Pfam-A"),
            VALID_HMM.to_string(),
        ),
        (
            Virsorter2Db::hmm_table_path("pfam", "Pfam-A"),
            VALID_TSV.to_string(),
        ),
        (
            Virsorter2Db::rbs_category_path(),
            "AGGA\tStrong\n".to_string(),
        ),
        (
            Virsorter2Db::rbs_category_notes_path(),
            "Strong\tclassic Shine-Dalgarno\n".to_string(),
        ),
    ];
    for (relative, content) in &files {
        write_file(root(&dir), relative.as_str(), content);
    }

    let report = Virsorter2Db::schema().unwrap().validate(root(&dir)).unwrap();
    assert!(report.is_pass(), "unexpected violations: {report}");
}
