//! Integration tests for the coldorm-sqlite crate.

use coldorm_core::{
    Correlation, Entry, FieldDeclaration, LogicalType, Model, ModelDescription, SchemaError, Value,
    Where,
};
use coldorm_sqlite::{Engine, EngineConfig, Fields, ModelFile, OrmError, Table};
use rusqlite::Connection;

fn example_model() -> ModelDescription {
    ModelDescription::new("ExampleTable")
        .field(
            FieldDeclaration::new("id", LogicalType::Integer)
                .primary_key()
                .auto_increment(),
        )
        .field(FieldDeclaration::new("name", LogicalType::Text))
        .field(FieldDeclaration::new("value", LogicalType::Real))
}

fn join_model() -> ModelDescription {
    ModelDescription::new("JoinTable")
        .field(
            FieldDeclaration::new("id", LogicalType::Integer)
                .primary_key()
                .auto_increment(),
        )
        .field(FieldDeclaration::new("example_id", LogicalType::Integer))
        .field(FieldDeclaration::new("note", LogicalType::Text))
}

fn memory_engine() -> Engine {
    Engine::open_in_memory(
        EngineConfig::new("test").with_migration(true),
        &[example_model(), join_model()],
    )
    .unwrap()
}

/// Inserts NAME1..=NAMEn with value i.
fn seed(engine: &Engine, n: usize) {
    let table = engine.table("ExampleTable").unwrap();
    let entries: Vec<Entry> = (1..=n)
        .map(|i| {
            Entry::new()
                .with("name", format!("NAME{i}"))
                .with("value", i as f64)
        })
        .collect();
    table.add_all(&entries).unwrap();
}

fn names(entries: &[Entry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.decode::<String>("name").unwrap())
        .collect()
}

#[test]
fn test_round_trip_assigns_sequential_ids() {
    let engine = memory_engine();
    seed(&engine, 5);
    engine.commit().unwrap();

    let rows = engine
        .table("ExampleTable")
        .unwrap()
        .get_all(&Fields::All)
        .unwrap();
    assert_eq!(rows.len(), 5);
    for (i, row) in rows.iter().enumerate() {
        let n = i as i64 + 1;
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["id", "name", "value"]);
        assert_eq!(row.decode::<i64>("id").unwrap(), n);
        assert_eq!(row.decode::<String>("name").unwrap(), format!("NAME{n}"));
        assert_eq!(row.decode::<f64>("value").unwrap(), n as f64);
    }
}

#[test]
fn test_add_returns_row_ids() {
    let engine = memory_engine();
    let table = engine.table("ExampleTable").unwrap();
    let first = table
        .add(&Entry::new().with("name", "a").with("value", 1.0))
        .unwrap();
    let rest = table
        .add_all(&[
            Entry::new().with("name", "b").with("value", 2.0),
            Entry::new().with("name", "c").with("value", 3.0),
        ])
        .unwrap();
    assert_eq!(first, 1);
    assert_eq!(rest, vec![2, 3]);
}

#[test]
fn test_equality_filter() {
    let engine = memory_engine();
    seed(&engine, 3);

    let rows = engine
        .table("ExampleTable")
        .unwrap()
        .get(&Where::new("name", "NAME2"), &Fields::All)
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].decode::<i64>("id").unwrap(), 2);
    assert_eq!(rows[0].decode::<f64>("value").unwrap(), 2.0);
}

#[test]
fn test_disjunction_keeps_storage_order() {
    let engine = memory_engine();
    seed(&engine, 5);

    let filter = Where::new("name", "NAME3").or("name", "NAME1");
    let rows = engine
        .table("ExampleTable")
        .unwrap()
        .get(&filter, &Fields::All)
        .unwrap();
    assert_eq!(names(&rows), vec!["NAME1", "NAME3"]);
}

#[test]
fn test_conjunction_and_from_pairs() {
    let engine = memory_engine();
    seed(&engine, 3);
    let table = engine.table("ExampleTable").unwrap();

    let filter = Where::from_pairs(&["name", "value"], vec!["NAME2".into(), 2.0.into()]).unwrap();
    assert_eq!(table.get(&filter, &Fields::All).unwrap().len(), 1);

    let filter = Where::new("name", "NAME2").and("value", 3.0);
    assert!(table.get(&filter, &Fields::All).unwrap().is_empty());
}

#[test]
fn test_update_changes_only_matching_rows() {
    let engine = memory_engine();
    seed(&engine, 3);
    let table = engine.table("ExampleTable").unwrap();

    let changed = table
        .update(
            &Where::new("name", "NAME2"),
            &Entry::new().with("value", 20.0),
        )
        .unwrap();
    assert_eq!(changed, 1);

    let values: Vec<f64> = table
        .get_all(&Fields::only(["value"]))
        .unwrap()
        .iter()
        .map(|e| e.decode("value").unwrap())
        .collect();
    assert_eq!(values, vec![1.0, 20.0, 3.0]);

    let unchanged = table
        .update(&Where::new("name", "missing"), &Entry::new().with("value", 0.0))
        .unwrap();
    assert_eq!(unchanged, 0);
}

#[test]
fn test_update_can_set_null() {
    let engine = memory_engine();
    seed(&engine, 1);
    let table = engine.table("ExampleTable").unwrap();

    table
        .update(&Where::new("id", 1), &Entry::new().with("value", Value::Null))
        .unwrap();
    let row = &table.get(&Where::new("id", 1), &Fields::All).unwrap()[0];
    assert_eq!(row.get("value"), Some(&Value::Null));
    assert_eq!(row.decode::<Option<f64>>("value").unwrap(), None);
}

#[test]
fn test_remove_keeps_relative_order() {
    let engine = memory_engine();
    seed(&engine, 4);
    let table = engine.table("ExampleTable").unwrap();

    assert_eq!(table.remove(&Where::new("name", "NAME2")).unwrap(), 1);
    let rows = table.get_all(&Fields::All).unwrap();
    assert_eq!(names(&rows), vec!["NAME1", "NAME3", "NAME4"]);
    assert_eq!(table.count(None).unwrap(), 3);
}

#[test]
fn test_field_projection() {
    let engine = memory_engine();
    seed(&engine, 2);
    let table = engine.table("ExampleTable").unwrap();

    let rows = table.get_all(&Fields::only(["name", "id"])).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["name", "id"]);
    assert!(!rows[0].contains("value"));

    assert!(matches!(
        table.get_all(&Fields::only(["nope"])),
        Err(OrmError::UnknownField { field, .. }) if field == "nope"
    ));
    assert!(matches!(
        table.get_all(&Fields::only(["id", "name", "id"])),
        Err(OrmError::DuplicateSelection { field, .. }) if field == "id"
    ));
}

#[test]
fn test_cross_join() {
    let engine = memory_engine();
    seed(&engine, 3);
    let joins = engine.table("JoinTable").unwrap();
    joins
        .add_all(&[
            Entry::new().with("example_id", 1).with("note", "first"),
            Entry::new().with("example_id", 3).with("note", "third"),
            Entry::new().with("example_id", 3).with("note", "third again"),
        ])
        .unwrap();

    let examples = engine.table("ExampleTable").unwrap();
    let rows = examples
        .cross_join(
            joins,
            &Where::new("name", "NAME3"),
            &Correlation::new("id", "example_id"),
            &Fields::only(["ExampleTable.name", "note"]),
        )
        .unwrap();

    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(
            row.keys().collect::<Vec<_>>(),
            vec!["ExampleTable.name", "note"]
        );
        assert_eq!(row.decode::<String>("ExampleTable.name").unwrap(), "NAME3");
    }
    assert_eq!(rows[0].decode::<String>("note").unwrap(), "third");
}

#[test]
fn test_cross_join_rejects_wildcard_and_ambiguity() {
    let engine = memory_engine();
    let examples = engine.table("ExampleTable").unwrap();
    let joins = engine.table("JoinTable").unwrap();
    let filter = Where::new("name", "x");
    let correlation = Correlation::new("id", "example_id");

    assert!(matches!(
        examples.cross_join(joins, &filter, &correlation, &Fields::All),
        Err(OrmError::WildcardJoin(..))
    ));
    assert!(matches!(
        examples.cross_join(joins, &filter, &correlation, &Fields::only(["id"])),
        Err(OrmError::AmbiguousField(name)) if name == "id"
    ));
    assert!(matches!(
        examples.cross_join(
            joins,
            &filter,
            &Correlation::new("example_id", "id"),
            &Fields::only(["note"])
        ),
        Err(OrmError::UnknownField { .. })
    ));
    assert!(matches!(
        examples.cross_join(
            joins,
            &filter,
            &correlation,
            &Fields::only(["JoinTable.note", "name", "JoinTable.note"])
        ),
        Err(OrmError::DuplicateSelection { field, .. }) if field == "JoinTable.note"
    ));
}

#[test]
fn test_cross_join_with_itself_is_rejected() {
    let engine = memory_engine();
    seed(&engine, 2);
    let examples = engine.table("ExampleTable").unwrap();

    let result = examples.cross_join(
        examples,
        &Where::new("name", "NAME1"),
        &Correlation::new("id", "id"),
        &Fields::only(["ExampleTable.name"]),
    );
    assert!(matches!(result, Err(OrmError::SelfJoin(name)) if name == "ExampleTable"));
}

#[test]
fn test_unsupported_type_fails_at_open() {
    let model = ModelDescription::new("Bad")
        .field(FieldDeclaration::new("id", LogicalType::Integer))
        .field(FieldDeclaration::with_type_name("created", "TIMESTAMP"));

    let err = Engine::open_in_memory(EngineConfig::new("test").with_migration(true), &[model])
        .unwrap_err();
    match err {
        OrmError::SchemaError(SchemaError::UnsupportedType { field, type_name }) => {
            assert_eq!(field, "created");
            assert_eq!(type_name, "TIMESTAMP");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_values_are_never_interpolated() {
    let engine = memory_engine();
    let table = engine.table("ExampleTable").unwrap();
    let hostile = "'; DROP TABLE ExampleTable; --";

    table
        .add(&Entry::new().with("name", hostile).with("value", 1.0))
        .unwrap();
    let rows = table.get(&Where::new("name", hostile), &Fields::All).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].decode::<String>("name").unwrap(), hostile);
    assert!(
        engine
            .list_tables()
            .unwrap()
            .contains(&"ExampleTable".to_string())
    );
}

#[test]
fn test_bad_condition_key_is_rejected() {
    let engine = memory_engine();
    let table = engine.table("ExampleTable").unwrap();
    let result = table.get(&Where::new("name = name OR 1", 1), &Fields::All);
    assert!(result.is_err());
}

#[test]
fn test_add_validates_entry_keys() {
    let engine = memory_engine();
    let table = engine.table("ExampleTable").unwrap();

    assert!(matches!(
        table.add(&Entry::new().with("name", "a")),
        Err(OrmError::MissingField { field, .. }) if field == "value"
    ));
    assert!(matches!(
        table.add(&Entry::new().with("name", "a").with("value", 1.0).with("extra", 1)),
        Err(OrmError::UnknownField { field, .. }) if field == "extra"
    ));
    assert!(matches!(
        table.update(&Where::new("id", 1), &Entry::new()),
        Err(OrmError::EmptyUpdate(_))
    ));
}

#[test]
fn test_add_all_stops_at_first_failure() {
    let engine = memory_engine();
    let table = engine.table("ExampleTable").unwrap();

    let entries = vec![
        Entry::new().with("name", "ok1").with("value", 1.0),
        Entry::new().with("name", "ok2").with("value", 2.0),
        Entry::new().with("id", 1).with("name", "dup").with("value", 3.0),
        Entry::new().with("name", "never").with("value", 4.0),
    ];
    let err = table.add_all(&entries).unwrap_err();
    assert!(matches!(err, OrmError::StorageError(_)));

    let rows = table.get_all(&Fields::All).unwrap();
    assert_eq!(names(&rows), vec!["ok1", "ok2"]);
}

#[test]
fn test_writes_invisible_until_commit() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::new("commit")
        .with_directory(dir.path())
        .with_migration(true);
    let db_path = config.db_path();
    let engine = Engine::open(config, &[example_model()]).unwrap();
    let table = engine.table("ExampleTable").unwrap();

    table
        .add(&Entry::new().with("name", "pending").with("value", 1.0))
        .unwrap();

    let count = |conn: &Connection| -> i64 {
        conn.query_row("SELECT COUNT(*) FROM ExampleTable", [], |row| row.get(0))
            .unwrap()
    };

    let observer = Connection::open(&db_path).unwrap();
    assert_eq!(count(&observer), 0);

    engine.commit().unwrap();
    assert_eq!(count(&observer), 1);
}

#[test]
fn test_rollback_and_drop_discard_writes() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::new("rollback")
        .with_directory(dir.path())
        .with_migration(true);

    {
        let engine = Engine::open(config.clone(), &[example_model()]).unwrap();
        let table = engine.table("ExampleTable").unwrap();
        table
            .add(&Entry::new().with("name", "kept").with("value", 1.0))
            .unwrap();
        engine.commit().unwrap();

        table
            .add(&Entry::new().with("name", "rolled back").with("value", 2.0))
            .unwrap();
        engine.rollback().unwrap();

        table
            .add(&Entry::new().with("name", "dropped").with("value", 3.0))
            .unwrap();
    }

    let engine = Engine::open(config.with_migration(false), &[example_model()]).unwrap();
    let rows = engine
        .table("ExampleTable")
        .unwrap()
        .get_all(&Fields::All)
        .unwrap();
    assert_eq!(names(&rows), vec!["kept"]);
}

#[test]
fn test_migration_rerun_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::new("twice")
        .with_directory(dir.path())
        .with_migration(true);

    let engine = Engine::open(config.clone(), &[example_model()]).unwrap();
    drop(engine);

    let err = Engine::open(config, &[example_model()]).unwrap_err();
    assert!(matches!(err, OrmError::StorageError(_)));
}

#[test]
fn test_list_tables_is_independent_of_registry() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::new("catalog")
        .with_directory(dir.path())
        .with_migration(true);
    drop(Engine::open(config.clone(), &[example_model(), join_model()]).unwrap());

    let engine = Engine::open(config.with_migration(false), &[]).unwrap();
    assert!(engine.tables().is_empty());
    let mut tables = engine.list_tables().unwrap();
    tables.sort();
    assert_eq!(tables, vec!["ExampleTable", "JoinTable"]);
}

#[test]
fn test_blob_and_integer_values() {
    let model = ModelDescription::new("Files")
        .field(FieldDeclaration::new("id", LogicalType::Integer).primary_key())
        .field(FieldDeclaration::new("data", LogicalType::Blob));
    let engine =
        Engine::open_in_memory(EngineConfig::new("test").with_migration(true), &[model]).unwrap();
    let table = engine.table("Files").unwrap();

    let payload = vec![0u8, 159, 146, 150];
    table
        .add(&Entry::new().with("id", 10).with("data", payload.clone()))
        .unwrap();
    let row = &table.get(&Where::new("id", 10), &Fields::All).unwrap()[0];
    assert_eq!(row.decode::<Vec<u8>>("data").unwrap(), payload);
}

#[derive(Debug, PartialEq)]
struct Example {
    id: Option<i64>,
    name: String,
    value: f64,
}

impl Model for Example {
    fn description() -> ModelDescription {
        example_model()
    }

    fn to_entry(&self) -> Entry {
        let mut entry = Entry::new()
            .with("name", self.name.as_str())
            .with("value", self.value);
        if let Some(id) = self.id {
            entry.set("id", id);
        }
        entry
    }

    fn from_entry(entry: &Entry) -> coldorm_core::Result<Self> {
        Ok(Self {
            id: entry.decode("id")?,
            name: entry.decode("name")?,
            value: entry.decode("value")?,
        })
    }
}

#[test]
fn test_typed_models() {
    let engine = Engine::open_in_memory(
        EngineConfig::new("test").with_migration(true),
        &[Example::description()],
    )
    .unwrap();
    let table = engine.table_for::<Example>().unwrap();

    let records = [
        Example { id: None, name: "NAME1".into(), value: 1.0 },
        Example { id: None, name: "NAME2".into(), value: 2.0 },
    ];
    assert_eq!(table.add_models(&records).unwrap(), vec![1, 2]);

    let found: Vec<Example> = table.get_as(&Where::new("name", "NAME2")).unwrap();
    assert_eq!(
        found,
        vec![Example { id: Some(2), name: "NAME2".into(), value: 2.0 }]
    );
    assert_eq!(table.get_all_as::<Example>().unwrap().len(), 2);
}

#[test]
fn test_engine_from_model_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models.yml");
    std::fs::write(
        &path,
        r#"
models:
  - name: ExampleTable
    fields:
      - { name: id, type: INTEGER, primary_key: true, auto_increment: true }
      - { name: name, type: TEXT }
      - { name: value, type: REAL }
"#,
    )
    .unwrap();

    let file = ModelFile::load(&path).unwrap();
    assert!(file.engine.is_none());
    let engine = Engine::open(
        EngineConfig::new("from_file")
            .with_directory(dir.path())
            .with_migration(true),
        &file.models,
    )
    .unwrap();
    assert_eq!(engine.list_tables().unwrap(), vec!["ExampleTable"]);
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_engine_and_table_are_send_and_sync() {
    assert_send_sync::<Engine>();
    assert_send_sync::<Table>();
}

#[test]
fn test_concurrent_adds_share_one_engine() {
    const THREADS: usize = 4;
    const PER_THREAD: usize = 25;

    let engine = memory_engine();
    let results: Vec<Vec<coldorm_sqlite::Result<i64>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let engine = &engine;
                scope.spawn(move || {
                    let table = engine.table("ExampleTable").unwrap();
                    (0..PER_THREAD)
                        .map(|i| {
                            table.add(
                                &Entry::new()
                                    .with("name", format!("T{t}-{i}"))
                                    .with("value", i as f64),
                            )
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut ids = Vec::new();
    for result in results.into_iter().flatten() {
        match result {
            Ok(id) => ids.push(id),
            Err(err) => panic!("concurrent add failed: {err}"),
        }
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), THREADS * PER_THREAD);

    engine.commit().unwrap();
    let table = engine.table("ExampleTable").unwrap();
    assert_eq!(table.count(None).unwrap(), THREADS * PER_THREAD);
    assert_eq!(table.count(Some(&Where::new("name", "T3-24"))).unwrap(), 1);
}
