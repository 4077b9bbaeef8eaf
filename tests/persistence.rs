use std::fs;

use chrono::NaiveDate;
use think_todo::clock::FixedClock;
use think_todo::{JsonFileSink, NewTask, Priority, StoreError, TaskFilter, TaskStore};

fn open(path: &std::path::Path) -> TaskStore<JsonFileSink> {
    TaskStore::open(JsonFileSink::new(path))
        .unwrap()
        .with_clock(FixedClock(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()))
}

#[test]
fn nonexistent_path_gives_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("tasks.json");

    let mut store = open(&path);
    assert!(store.tasks().is_empty());
    assert_eq!(store.next_id(), 1);
    assert!(!path.exists());

    assert_eq!(store.add_task(NewTask::new("first")).unwrap().id, 1);
    assert!(path.exists());
}

#[test]
fn reopening_reproduces_the_same_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    let mut store = open(&path);
    store
        .add_task(NewTask::new("Buy groceries").priority("High").due_date("2023-12-10"))
        .unwrap();
    store.add_task(NewTask::new("Call mom").category("Family")).unwrap();
    store.add_task(NewTask::new("File taxes").priority("Low")).unwrap();
    store.complete_task(2).unwrap();
    store.delete_task(3).unwrap();
    store.save().unwrap();

    let reopened = open(&path);
    assert_eq!(reopened.tasks(), store.tasks());
    // next_id is rebuilt from the highest stored id, so a deleted top id is not remembered.
    assert_eq!(reopened.next_id(), 3);
}

#[test]
fn every_mutation_is_written_through() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    let mut store = open(&path);
    store.add_task(NewTask::new("a")).unwrap();
    store.add_task(NewTask::new("b")).unwrap();
    assert_eq!(open(&path).tasks().len(), 2);

    store.complete_task(1).unwrap();
    assert!(open(&path).get_task(1).unwrap().completed);

    store.delete_task(2).unwrap();
    let ids: Vec<_> = open(&path).tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1]);
}

#[test]
fn reads_documents_written_by_other_tools() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(
        &path,
        r#"[
  {
    "id": 4,
    "description": "Buy groceries",
    "completed": false,
    "priority": "High",
    "created_date": "2023-12-01",
    "due_date": "2023-12-10",
    "category": "General"
  },
  {
    "id": 9,
    "description": "Read book",
    "completed": true,
    "priority": "Low",
    "created_date": "2023-12-02",
    "due_date": null,
    "category": "Leisure"
  }
]"#,
    )
    .unwrap();

    let mut store = open(&path);
    assert_eq!(store.next_id(), 10);
    let high = store.list_tasks(&TaskFilter {
        priority: Some(Priority::High),
        ..TaskFilter::default()
    });
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].due_date, NaiveDate::from_ymd_opt(2023, 12, 10));

    assert_eq!(store.add_task(NewTask::new("next")).unwrap().id, 10);
}

#[test]
fn corrupt_file_is_reported_and_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(&path, "[{\"id\": 1,").unwrap();

    let err = TaskStore::open(JsonFileSink::new(&path)).err().unwrap();
    assert!(matches!(err, StoreError::Corrupt { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "[{\"id\": 1,");

    let recovered = TaskStore::open_or_recover(JsonFileSink::new(&path));
    assert!(recovered.tasks().is_empty());
    assert_eq!(recovered.next_id(), 1);
}

#[test]
fn unwritable_location_surfaces_write_error() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the parent directory should be.
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let mut store = TaskStore::open(JsonFileSink::new(blocker.join("tasks.json"))).unwrap();
    let err = store.add_task(NewTask::new("x")).unwrap_err();
    assert!(matches!(err, StoreError::Write { .. }));
    assert!(store.tasks().is_empty());
}
