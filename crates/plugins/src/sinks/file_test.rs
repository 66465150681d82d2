use weir_model::{PluginSetting, Record, Sink};

use super::{FileSink, FileSinkFactory};
use weir_core::SinkFactory;

#[tokio::test]
async fn test_appends_one_line_per_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");
    let sink = FileSink::new(path.display().to_string());

    sink.output(&[Record::from_string("one"), Record::from_string("two")])
        .await
        .unwrap();
    sink.output(&[Record::from_string("three")]).await.unwrap();
    sink.shutdown().await;

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "one\ntwo\nthree\n");
}

#[tokio::test]
async fn test_unwritable_path_is_a_delivery_error() {
    let sink = FileSink::new("/nonexistent-dir/out.txt");
    assert!(sink.output(&[Record::from_string("x")]).await.is_err());
}

#[test]
fn test_path_is_required() {
    let setting = PluginSetting::empty("file").with_pipeline_name("p");
    assert!(FileSinkFactory.create(&setting).is_err());
}
