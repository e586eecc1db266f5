use std::io::Write;

use eda_domain::{read_dataset, ColumnKind, DomainError};

#[test]
fn read_dataset_from_csv_file() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "age,sex,bmi,charges").unwrap();
    writeln!(file, "25,male,22.5,1000").unwrap();
    writeln!(file, "30,female,,1200").unwrap();
    writeln!(file, "35,male,28.3,1500").unwrap();
    file.flush().unwrap();

    let ds = read_dataset(file.path()).expect("csv should load");
    assert_eq!(ds.n_rows(), 3);
    assert_eq!(ds.column_names(), vec!["age", "sex", "bmi", "charges"]);
    assert_eq!(ds.column("sex").unwrap().kind(), ColumnKind::Categorical);
    assert_eq!(ds.column("bmi").unwrap().missing_count(), 1);
    assert_eq!(ds.missing_cells(), 1);
}

#[test]
fn read_dataset_from_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"[{{"when": "2024-01-01", "v": 1.5}}, {{"when": "2024-01-02", "v": null}}]"#).unwrap();
    file.flush().unwrap();

    let ds = read_dataset(file.path()).expect("json should load");
    assert_eq!(ds.column("when").unwrap().kind(), ColumnKind::Datetime);
    assert_eq!(ds.column("v").unwrap().present_numbers(), vec![1.5]);
}

#[test]
fn infinite_cells_load_as_missing_numbers() {
    let ds = eda_domain::loader::read_csv("a,b\n1,2\ninf,3\n2,5\n3,-inf\n".as_bytes()).unwrap();
    let a = ds.column("a").unwrap();
    assert_eq!(a.kind(), ColumnKind::Numerical);
    assert_eq!(a.present_numbers(), vec![1.0, 2.0, 3.0]);
    assert_eq!(ds.column("b").unwrap().missing_count(), 1);
    assert_eq!(ds.missing_cells(), 2);
}

#[test]
fn excel_is_not_supported() {
    let err = read_dataset(std::path::Path::new("book.xlsx")).unwrap_err();
    assert!(matches!(err, DomainError::UnsupportedFormat(_)));
}
