use std::io::Cursor;

use crate::core::{CoreSbr, SbrState};
use crate::error::SbrError;
use crate::ingest::{read_entries, read_names, MemorySource, PrefixSource, SmrMatrix, TripletPart};
use crate::tests::test_data::{init_logger, random_tag_index, small_tag_index, small_triplet};

#[test]
fn test_read_names_strips_quotes() {
    let text = "\"\",\"x\"\n\"1\",\"Statistics, Cabbages\"\n2,plain\n\"3\",\"ApplicationArea:Chemistry\"\n";
    let names = read_names(Cursor::new(text), "names.csv").unwrap();
    assert_eq!(
        names,
        vec!["Statistics, Cabbages", "plain", "ApplicationArea:Chemistry"]
    );
}

#[test]
fn test_read_names_strips_quotes_after_whitespace() {
    let text = "id,name\n1, \"x\"\n2,  \"b\"  \n3, plain\n";
    let names = read_names(Cursor::new(text), "names.csv").unwrap();
    assert_eq!(names, vec!["x", "b", " plain"]);
}

#[test]
fn test_read_entries_quoted_fields_after_whitespace() {
    let text = "i,j,x\n 1, \"2\", \"0.5\"\n";
    let tri = read_entries(Cursor::new(text), "m.csv", 1, 2).unwrap();
    let csc = tri.to_csc::<usize>();
    assert_eq!(csc.get(0, 1), Some(&0.5));
}

#[test]
fn test_read_names_crlf() {
    let text = "id,name\r\n1,a\r\n2,\"b\"\r\n";
    let names = read_names(Cursor::new(text), "names.csv").unwrap();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_read_names_needs_two_fields() {
    let text = "id,name\n1,a\nlonely\n";
    match read_names(Cursor::new(text), "names.csv") {
        Err(SbrError::Parse { file, line, .. }) => {
            assert_eq!(file, "names.csv");
            assert_eq!(line, 3);
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_read_entries_sums_duplicates() {
    let text = "i,j,x\n1,1,1.5\n1,1,2\n2,1,1\n";
    let tri = read_entries(Cursor::new(text), "m.csv", 2, 1).unwrap();
    let smr = SmrMatrix {
        row_names: vec!["a".into(), "b".into()],
        col_names: vec!["t".into()],
        matrix: tri,
    };
    let index = smr.tag_index();
    assert_eq!(index.weight("t", "a"), Some(3.5));
    assert_eq!(index.weight("t", "b"), Some(1.0));
}

#[test]
fn test_read_entries_skips_zero_weights() {
    let text = "i,j,x\n1,1,0\n2,1,1\n";
    let tri = read_entries(Cursor::new(text), "m.csv", 2, 1).unwrap();
    assert_eq!(tri.nnz(), 1);
}

#[test]
fn test_read_entries_bad_number_names_file_and_line() {
    let text = "i,j,x\n1,1,1\n1,x,1\n";
    let err = read_entries(Cursor::new(text), "m.csv", 2, 2).unwrap_err();
    assert!(matches!(err, SbrError::Parse { .. }));
    assert_eq!(err.file(), Some("m.csv"));
    assert_eq!(err.line(), Some(3));

    let text = "i,j,x\n1,1,heavy\n";
    let err = read_entries(Cursor::new(text), "m.csv", 2, 2).unwrap_err();
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_read_entries_id_out_of_range() {
    for bad in ["0,1,1", "3,1,1", "1,3,1", "-1,1,1"] {
        let text = format!("i,j,x\n{bad}\n");
        let err = read_entries(Cursor::new(text), "m.csv", 2, 2).unwrap_err();
        assert!(
            matches!(err, SbrError::IdOutOfRange { line: 2, .. }),
            "{bad}: {err:?}"
        );
    }
}

#[test]
fn test_read_entries_rejects_nan() {
    let text = "i,j,x\n1,1,NaN\n";
    let err = read_entries(Cursor::new(text), "m.csv", 1, 1).unwrap_err();
    assert!(matches!(err, SbrError::NonFiniteWeight { line: 2, .. }));
}

#[test]
fn test_ingest_small_triplet() {
    init_logger();
    let mut sbr = CoreSbr::new();
    assert_eq!(sbr.state(), SbrState::Empty);
    sbr.ingest(&small_triplet()).unwrap();
    assert_eq!(sbr.state(), SbrState::Ingested);
    assert_eq!(sbr.tag_inverse_index(), &small_tag_index());

    let mut tags: Vec<&str> = sbr.known_tags().collect();
    tags.sort_unstable();
    assert_eq!(tags, vec!["A", "B", "C"]);
}

#[test]
fn test_failed_ingest_leaves_facade_unchanged() {
    init_logger();
    let mut sbr = CoreSbr::new();
    sbr.ingest(&small_triplet()).unwrap();
    sbr.transpose_tag_inverse_index();
    assert_eq!(sbr.state(), SbrState::Ready);

    let broken = MemorySource::new(
        "\"\",\"x\"\n1,z\n",
        "\"\",\"x\"\n1,Z\n",
        "i,j,x\n1,1,1\n1,2,1\n",
    );
    let err = sbr.ingest(&broken).unwrap_err();
    assert!(matches!(err, SbrError::IdOutOfRange { axis: "column", .. }));
    assert_eq!(sbr.state(), SbrState::Ready);
    assert_eq!(sbr.tag_inverse_index(), &small_tag_index());
}

#[test]
fn test_reingest_drops_item_index() {
    init_logger();
    let mut sbr = CoreSbr::new();
    sbr.ingest(&small_triplet()).unwrap();
    assert!(sbr.is_known_item("i1"));
    assert_eq!(sbr.state(), SbrState::Ready);

    let other = MemorySource::new("\"\",\"x\"\n1,z\n", "\"\",\"x\"\n1,Z\n", "i,j,x\n1,1,2\n");
    sbr.ingest(&other).unwrap();
    assert_eq!(sbr.state(), SbrState::Ingested);
    assert!(!sbr.is_known_item("i1"));
    assert!(sbr.is_known_item("z"));
}

#[test]
fn test_write_then_read_round_trip() {
    let index = small_tag_index();
    let smr = SmrMatrix::from_index(&index);
    assert_eq!(smr.shape(), (3, 3));

    let (mut rows, mut cols, mut entries) = (Vec::new(), Vec::new(), Vec::new());
    smr.write(&mut rows, &mut cols, &mut entries).unwrap();
    let source = MemorySource::new(
        String::from_utf8(rows).unwrap(),
        String::from_utf8(cols).unwrap(),
        String::from_utf8(entries).unwrap(),
    );

    let back = SmrMatrix::read(&source).unwrap();
    assert_eq!(back.row_names, vec!["i1", "i2", "i3"]);
    assert_eq!(back.col_names, vec!["A", "B", "C"]);
    assert_eq!(back.tag_index(), index);
}

#[test]
fn test_file_round_trip_with_awkward_names() {
    init_logger();
    let mut index = random_tag_index(13, 15, 120, 800);
    index.insert("Tag, with comma", "item \"quoted\"", 0.125);
    index.insert("ColumnHeading:Age", "Statistics, Cabbages", -2.5);

    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("smr-m01");

    let sbr = crate::builder::CoreSbrBuilder::new().build_from_index(index.clone());
    sbr.export_csv_matrices(&prefix).unwrap();
    for part in TripletPart::ALL {
        assert!(PrefixSource::new(&prefix).unwrap().path(part).exists());
    }

    let mut back = CoreSbr::new();
    back.ingest_csv_matrices(&prefix).unwrap();
    assert_eq!(back.tag_inverse_index(), &index);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut sbr = CoreSbr::new();
    let err = sbr.ingest_csv_matrices(dir.path().join("nothing")).unwrap_err();
    match err {
        SbrError::MissingFile(path) => {
            assert!(path.to_string_lossy().ends_with("nothing-rownames.csv"))
        }
        other => panic!("expected missing file, got {:?}", other),
    }
    assert_eq!(sbr.state(), SbrState::Empty);
}

#[test]
fn test_empty_prefix() {
    let mut sbr = CoreSbr::new();
    assert!(matches!(
        sbr.ingest_csv_matrices("  "),
        Err(SbrError::EmptyPrefix)
    ));
}

#[test]
fn test_csc_view_has_tags_as_columns() {
    let smr = SmrMatrix::read(&small_triplet()).unwrap();
    let csc = smr.to_csc();
    assert_eq!(csc.shape(), (3, 3));
    assert_eq!(csc.nnz(), 6);
    // column B (index 1) holds i2 -> 1.0 and i3 -> 4.0
    let col_b: Vec<(usize, f64)> = csc
        .outer_view(1)
        .unwrap()
        .iter()
        .map(|(r, &w)| (r, w))
        .collect();
    assert_eq!(col_b, vec![(1, 1.0), (2, 4.0)]);
}
