use gtask_core::{
    CodecError, Node, NodeId, StoreConfig, StoreError, Task, TaskStore, TaskTree, EMPTY_DOCUMENT,
};
use std::fs;

fn open_store(dir: &tempfile::TempDir) -> TaskStore {
    TaskStore::open(StoreConfig::new(dir.path().join("G Task"))).unwrap()
}

fn backups(store: &TaskStore) -> Vec<String> {
    let mut names = fs::read_dir(store.config().data_dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("tasks_backup_"))
        .collect::<Vec<_>>();
    names.sort();
    names
}

#[test]
fn open_creates_the_data_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    assert!(store.config().data_dir().is_dir());
    assert!(!store.task_file().exists());
}

#[test]
fn first_load_seeds_an_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let decoded = store.load().unwrap();

    assert_eq!(fs::read_to_string(store.task_file()).unwrap(), EMPTY_DOCUMENT);
    assert_eq!(decoded.version, 0);
    assert_eq!(decoded.tree.node_count(), 1);
    assert_eq!(decoded.tree.task_count(), 0);
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let mut tree = TaskTree::with_root(Node::named("Root"));
    let node = tree.add_node(NodeId::ROOT, Node::named("Sprint")).unwrap();
    tree.add_task(node, Task::named("ship it")).unwrap();

    let outcome = store.save(&tree).unwrap();
    assert_eq!(outcome.path, store.task_file());
    assert!(outcome.backup.is_none());
    assert_eq!(
        outcome.bytes_written,
        fs::metadata(store.task_file()).unwrap().len() as usize
    );

    let loaded = store.load().unwrap();
    assert_eq!(loaded.version, 1);
    assert_eq!(loaded.tree.snapshot(), tree.snapshot());
}

#[test]
fn save_backs_up_the_previous_content_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.load().unwrap();

    let outcome = store.save(&TaskTree::new()).unwrap();
    let backup = outcome.backup.expect("existing file should be backed up");

    assert_eq!(fs::read_to_string(&backup).unwrap(), EMPTY_DOCUMENT);
    let name = backup.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("tasks_backup_"));
    assert!(name.ends_with(".xml"));
    assert!(!name.contains(':'));
    assert_eq!(backup.parent(), Some(store.config().data_dir()));
}

#[test]
fn every_save_keeps_its_own_backup() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.load().unwrap();

    for _ in 0..3 {
        store.save(&TaskTree::new()).unwrap();
    }

    assert_eq!(backups(&store).len(), 3);
}

#[test]
fn corrupt_file_surfaces_codec_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    fs::write(
        store.task_file(),
        r#"<GTask><Tasks><Bogus/></Tasks></GTask>"#,
    )
    .unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(
        err,
        StoreError::Codec(CodecError::UnknownElement { ref name }) if name == "Bogus"
    ));
}

#[test]
fn custom_file_name_and_prefix_are_honored() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        data_dir: dir.path().to_path_buf(),
        file_name: "todo.xml".to_string(),
        backup_prefix: "todo_".to_string(),
    };
    let store = TaskStore::open(config).unwrap();
    store.load().unwrap();
    let outcome = store.save(&TaskTree::new()).unwrap();

    assert!(dir.path().join("todo.xml").exists());
    let backup = outcome.backup.unwrap();
    assert!(backup
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("todo_"));
}

#[test]
fn config_deserializes_with_defaults() {
    let config: StoreConfig = serde_json::from_value(serde_json::json!({
        "data_dir": "/srv/tasks"
    }))
    .unwrap();

    assert_eq!(config, StoreConfig::new("/srv/tasks"));
}
