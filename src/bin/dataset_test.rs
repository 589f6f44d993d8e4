use excelviz::dataset::{CellValue, Dataset, Row};

// Helper to build a row from (column, value) pairs
fn make_row(pairs: &[(&str, CellValue)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn num(n: f64) -> CellValue {
    CellValue::Number(n)
}

fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn test_dataset_create() {
    println!("\n====== Testing dataset creation ======");

    let ds = Dataset::new(vec![
        make_row(&[("Month", text("Jan")), ("Sales", num(120.0))]),
        make_row(&[("Month", text("Feb")), ("Sales", num(90.0))]),
    ])
    .unwrap();

    assert_eq!(ds.len(), 2);
    assert!(!ds.is_empty());
    println!("✓ Dataset created with 2 rows");

    assert_eq!(ds.columns(), vec!["Month", "Sales"]);
    println!("✓ Column set follows the first row's key order");

    assert!(ds.has_column("Sales"));
    assert!(!ds.has_column("Profit"));
    println!("✓ Column membership checks work");

    let empty = Dataset::new(Vec::new());
    assert!(empty.is_err());
    println!("✓ Empty dataset rejected");
}

fn test_classification() {
    println!("\n====== Testing column classification ======");

    let ds = Dataset::new(vec![
        make_row(&[("Month", text("Jan")), ("Sales", num(120.0)), ("Cost", num(80.0))]),
        make_row(&[("Month", text("Feb")), ("Sales", num(90.0)), ("Cost", num(60.0))]),
    ])
    .unwrap();

    let cls = ds.classify();
    assert_eq!(cls.numeric_columns, vec!["Sales", "Cost"]);
    assert_eq!(cls.text_columns, vec!["Month"]);
    println!("✓ Columns partitioned into numeric {:?} and text {:?}", cls.numeric_columns, cls.text_columns);

    // One non-numeric value anywhere disqualifies the whole column
    let mixed = Dataset::new(vec![
        make_row(&[("Amount", num(10.0))]),
        make_row(&[("Amount", num(20.0))]),
        make_row(&[("Amount", text("N/A"))]),
    ])
    .unwrap();
    let cls = mixed.classify();
    assert!(cls.numeric_columns.is_empty());
    assert_eq!(cls.text_columns, vec!["Amount"]);
    println!("✓ Single 'N/A' value disqualifies an otherwise numeric column");

    // Booleans are not numeric for classification
    let bools = Dataset::new(vec![make_row(&[("Flag", CellValue::Bool(true))])]).unwrap();
    assert_eq!(bools.classify().text_columns, vec!["Flag"]);
    println!("✓ Boolean column classified as text");

    // Numeric-looking strings stay text
    let codes = Dataset::new(vec![make_row(&[("Code", text("42"))])]).unwrap();
    assert_eq!(codes.classify().text_columns, vec!["Code"]);
    println!("✓ Numeric string '42' stays a text column");

    // A row missing the key disqualifies it
    let sparse = Dataset::new(vec![
        make_row(&[("A", num(1.0)), ("B", num(2.0))]),
        make_row(&[("A", num(3.0))]),
    ])
    .unwrap();
    let cls = sparse.classify();
    assert_eq!(cls.numeric_columns, vec!["A"]);
    assert_eq!(cls.text_columns, vec!["B"]);
    println!("✓ Missing cell disqualifies its column");
}

fn test_number_coercion() {
    println!("\n====== Testing number coercion ======");

    assert_eq!(num(12.5).to_number(), 12.5);
    println!("✓ Numbers pass through");

    assert_eq!(CellValue::Number(f64::NAN).to_number(), 0.0);
    println!("✓ NaN coerces to 0");

    assert_eq!(CellValue::Bool(true).to_number(), 1.0);
    assert_eq!(CellValue::Bool(false).to_number(), 0.0);
    println!("✓ Booleans coerce to 1/0");

    assert_eq!(text("12").to_number(), 12.0);
    assert_eq!(text(" 3.5 ").to_number(), 3.5);
    println!("✓ Numeric text parses, with trimming");

    assert_eq!(text("N/A").to_number(), 0.0);
    assert_eq!(text("").to_number(), 0.0);
    println!("✓ Non-numeric text coerces to 0");
}

fn test_labels() {
    println!("\n====== Testing label coercion ======");

    assert_eq!(num(10.0).to_label(), "10");
    println!("✓ Whole number prints without trailing .0");

    assert_eq!(num(10.5).to_label(), "10.5");
    println!("✓ Fractional number keeps its decimals");

    assert_eq!(text("Jan").to_label(), "Jan");
    assert_eq!(CellValue::Bool(true).to_label(), "true");
    println!("✓ Text and boolean labels are verbatim");
}

fn test_cell_access() {
    println!("\n====== Testing cell access ======");

    let ds = Dataset::new(vec![make_row(&[("A", num(7.0)), ("B", text("x"))])]).unwrap();

    assert_eq!(ds.number_at(0, "A"), 7.0);
    assert_eq!(ds.label_at(0, "A"), "7");
    println!("✓ Present cells coerce as expected");

    assert_eq!(ds.number_at(0, "missing"), 0.0);
    assert_eq!(ds.label_at(0, "missing"), "");
    println!("✓ Absent column reads as 0 / empty label");

    assert_eq!(ds.number_at(9, "A"), 0.0);
    println!("✓ Out-of-range row reads as 0");
}

fn test_json_shape() {
    println!("\n====== Testing JSON row shape ======");

    let r = make_row(&[("Month", text("Jan")), ("Sales", num(120.0))]);
    let json = serde_json::to_string(&r).unwrap();
    assert_eq!(json, r#"{"Month":"Jan","Sales":120.0}"#);
    println!("✓ Rows serialize as plain JSON objects");

    let back: Row = serde_json::from_str(&json).unwrap();
    assert_eq!(back, r);
    println!("✓ Rows deserialize back to the same cells");
}

pub fn run_tests() {
    println!("Starting dataset unit tests");
    test_dataset_create();
    test_classification();
    test_number_coercion();
    test_labels();
    test_cell_access();
    test_json_shape();
    println!("All tests passed!");
}

fn main() {
    run_tests();
}
