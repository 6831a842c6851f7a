#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};

/// A minimal but internally consistent HMMER3 profile (DNA alphabet,
/// two match states, uniform emissions).
pub const VALID_HMM: &str = "\
HMMER3/f [3.3.2 | Nov 2020]
NAME  test_profile
LENG  2
ALPH  DNA
HMM          A        C        G        T
            m->m     m->i     m->d     i->m     i->i     d->m     d->d
  COMPO   1.38629  1.38629  1.38629  1.38629
          1.38629  1.38629  1.38629  1.38629
          0.35667  1.60944  2.30259  0.69315  0.69315  0.00000        *
      1   1.38629  1.38629  1.38629  1.38629      1 - - - -
          1.38629  1.38629  1.38629  1.38629
          0.35667  1.60944  2.30259  0.69315  0.69315  0.00000        *
      2   1.38629  1.38629  1.38629  1.38629      2 - - - -
          1.38629  1.38629  1.38629  1.38629
          0.10536  2.30259        *  0.69315  0.69315  0.00000        *
//
";

/// A small two-column TSV with a header row, valid under the tabular check.
pub const VALID_TSV: &str = "contig_id\tlength\ncontig_1\t1000\ncontig_2\t2500\n";

/// Write `content` at `relative` under `root`, creating parent directories.
pub fn write_file(root: &Utf8Path, relative: &str, content: &str) -> Utf8PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent.as_std_path()).unwrap();
    }
    std::fs::write(path.as_std_path(), content).unwrap();
    path
}

/// Lay out a complete, well-formed CheckV database tree under `root`.
pub fn build_checkv_db(root: &Utf8Path) {
    write_file(root, "checkv-db-v1.5/README.txt", "CheckV database\n");
    write_file(root, "checkv-db-v1.5/genome_db/checkv_error.tsv", VALID_TSV);
    write_file(root, "checkv-db-v1.5/genome_db/checkv_reps.dmnd", "\u{0}binary\u{0}");
    write_file(root, "checkv-db-v1.5/genome_db/checkv_reps.faa", ">rep_1\nMAD\n");
    write_file(root, "checkv-db-v1.5/genome_db/checkv_reps.fna", ">rep_1\nACGT\n");
    write_file(root, "checkv-db-v1.5/genome_db/checkv_reps.log", "built ok\n");
    write_file(root, "checkv-db-v1.5/hmm_db/genome_lengths.tsv", VALID_TSV);
    write_file(root, "checkv-db-v1.5/hmm_db/checkv_hmms/1.hmm", VALID_HMM);
}

/// Lay out a complete, well-formed VirSorter2 database tree under `root`.
pub fn build_virsorter2_db(root: &Utf8Path) {
    write_file(root, "Done_all_setup", "");
    write_file(root, "group/dsDNAphage/model", "\u{0}model\u{0}");
    write_file(
        root,
        "group/dsDNAphage/hallmark-gene.list",
        "TerL\tterminase large subunit\thallmark\nMCP\tmajor capsid protein\thallmark\n",
    );
    write_file(root, "hmm/pfam/Pfam-A.hmm", VALID_HMM);
    write_file(root, "hmm/pfam/Pfam-A.tsv", VALID_TSV);
    write_file(
        root,
        "rbs/rbs-catetory.tsv",
        "# motif to category\nAGGA\tStrong\nGGAG\tMedium\n",
    );
    write_file(
        root,
        "rbs/rbs-catetory-notes.tsv",
        "Strong\tclassic Shine-Dalgarno\nMedium\tpartial motif\n",
    );
}
