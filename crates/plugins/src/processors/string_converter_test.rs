use weir_model::{Processor, Record};

use super::StringConverter;

#[tokio::test]
async fn test_upper_cases_by_default() {
    let converter = StringConverter::new(true);
    let output = converter
        .execute(vec![Record::from_string("hello"), Record::from_string("World")])
        .await
        .unwrap();
    let strings: Vec<_> = output.iter().map(|r| r.as_str().unwrap()).collect();
    assert_eq!(strings, vec!["HELLO", "WORLD"]);
}

#[tokio::test]
async fn test_lower_cases_when_configured() {
    let converter = StringConverter::new(false);
    let output = converter
        .execute(vec![Record::from_string("HeLLo")])
        .await
        .unwrap();
    assert_eq!(output[0].as_str(), Some("hello"));
}

#[tokio::test]
async fn test_non_string_payloads_untouched() {
    let converter = StringConverter::new(true);
    let event = Record::from_event(serde_json::json!({"k": "v"}));
    let output = converter.execute(vec![event.clone()]).await.unwrap();
    assert_eq!(output[0], event);
}
