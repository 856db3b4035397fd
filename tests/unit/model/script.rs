use super::*;
use serde_json::json;

#[test]
fn parses_interpreter_response() {
    let s = r#"{
        "message": "manipulations created",
        "initial_arr": [1, 2, 3, 4],
        "manipulations": [
            {"type": "append", "value": 2},
            {"type": "swap", "indices": [0, 2]},
            {"type": "replace", "index": 0, "value": 4}
        ],
        "final_arr": null
    }"#;
    let script = Script::from_json_str(s).unwrap();
    assert_eq!(script.initial, vec![json!(1), json!(2), json!(3), json!(4)]);
    assert_eq!(script.commands.len(), 3);
    assert!(script.lines.is_empty());
    assert!(script.expected_final.is_none());
}

#[test]
fn playlist_pairs_lines_by_position() {
    let script = Script::new(vec![], vec![Command::append(1), Command::pop()]).with_lines(vec![3]);
    let pl = script.playlist();
    assert_eq!(pl.line_at(0), Some(3));
    assert_eq!(pl.line_at(1), None);
}

#[test]
fn non_array_final_is_ignored_by_playlist() {
    let script: Script = serde_json::from_value(json!({
        "initial_arr": [],
        "manipulations": [],
        "final_arr": "Traceback (most recent call last)"
    }))
    .unwrap();
    assert!(script.expected_final.is_some());
    assert!(script.playlist().expected_final.is_none());

    let script: Script = serde_json::from_value(json!({"final_arr": [1]})).unwrap();
    assert_eq!(script.playlist().expected_final, Some(vec![json!(1)]));
}

#[test]
fn rejects_non_object_payload() {
    let err = Script::from_json_str("[1, 2]").unwrap_err();
    assert_eq!(err.category(), "serde");
}

#[test]
fn missing_file_reports_path() {
    let err = Script::from_path(Path::new("definitely/not/here.json")).unwrap_err();
    assert!(format!("{err:#}").contains("definitely/not/here.json"));
}
