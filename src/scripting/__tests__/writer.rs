use crate::scripting::PlaceholderStyle;
use crate::scripting::writer::SqlWriter;

#[test]
fn push_and_finish_basic() {
    let mut w = SqlWriter::new(16, PlaceholderStyle::Question);
    w.push("SELECT ");
    w.push_char('*');
    w.push(" FROM ");
    let tbl = String::from("users");
    w.push(tbl); // проверяем, что принимает String (AsRef<str>)
    assert_eq!(w.finish(), "SELECT * FROM users");
}

#[test]
fn question_placeholders_do_not_increment_index() {
    let mut w = SqlWriter::new(8, PlaceholderStyle::Question);
    assert_eq!(w.next_param_idx, 1);
    w.push_placeholder();
    w.push_placeholder();
    w.push_placeholder();
    assert_eq!(w.next_param_idx, 1);
    assert_eq!(w.finish(), "???");
    // next_param_idx не меняется для '?'
}

#[test]
fn numbered_placeholders_increment_index() {
    let mut w = SqlWriter::new(8, PlaceholderStyle::Numbered);
    assert_eq!(w.next_param_idx, 1);
    w.push_placeholder(); // $1
    assert_eq!(w.next_param_idx, 2);
    w.push_placeholder(); // $2
    w.push_placeholder(); // $3
    assert_eq!(w.next_param_idx, 4);
    assert_eq!(w.finish(), "$1$2$3");
}

#[test]
fn compose_full_sql_with_question_placeholders() {
    let mut w = SqlWriter::new(64, PlaceholderStyle::Question);
    w.push("SELECT * FROM users WHERE a = ");
    w.push_placeholder();
    w.push(" AND b = ");
    w.push_placeholder();
    assert_eq!(w.finish(), "SELECT * FROM users WHERE a = ? AND b = ?");
}

#[test]
fn push_u64_uses_decimal_form() {
    let mut w = SqlWriter::new(8, PlaceholderStyle::Question);
    w.push("LIMIT ");
    w.push_u64(1048576);
    assert_eq!(w.finish(), "LIMIT 1048576");
}
