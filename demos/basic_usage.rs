//! Basic engine workflow with a typed model.
//!
//! Creates `test.db` in the current directory (removing any previous copy),
//! inserts three rows, and reads them back with and without filters.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p coldorm-demos --example basic_usage
//! ORMLOG=1 cargo run -p coldorm-demos --example basic_usage
//! ```

use coldorm_core::{Entry, FieldDeclaration, LogicalType, Model, ModelDescription, Where};
use coldorm_sqlite::{Engine, EngineConfig, Fields, log_enabled_from_env};

#[derive(Debug)]
struct ExampleTable {
    id: Option<i64>,
    name: String,
    value: f64,
}

impl ExampleTable {
    fn new(name: &str, value: f64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            value,
        }
    }
}

impl Model for ExampleTable {
    fn description() -> ModelDescription {
        ModelDescription::new("ExampleTable")
            .field(
                FieldDeclaration::new("id", LogicalType::Integer)
                    .primary_key()
                    .auto_increment(),
            )
            .field(FieldDeclaration::new("name", LogicalType::Text))
            .field(FieldDeclaration::new("value", LogicalType::Real))
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

fn main() {
    if log_enabled_from_env() {
        tracing_subscriber::fmt()
            .with_env_filter("coldorm_sqlite=info")
            .init();
    }

    let config = EngineConfig::new("test")
        .with_migration(true)
        .with_env_overrides();
    let _ = std::fs::remove_file(config.db_path());

    // === Step 1: Open and create tables ===
    let engine = Engine::open(config, &[ExampleTable::description()]).unwrap();
    println!("Tables: {:?}", engine.list_tables().unwrap());

    // === Step 2: Insert ===
    let table = engine.table_for::<ExampleTable>().unwrap();
    let ids = table
        .add_models(&[
            ExampleTable::new("NAME1", 1.0),
            ExampleTable::new("NAME2", 2.0),
            ExampleTable::new("NAME3", 1.0),
        ])
        .unwrap();
    engine.commit().unwrap();
    println!("Inserted ids: {ids:?}");

    // === Step 3: Read everything ===
    println!("\n=== get_all ===");
    for row in table.get_all(&Fields::All).unwrap() {
        println!("{}", serde_json::to_string(&row).unwrap());
    }

    // === Step 4: Filters ===
    println!("\n=== name = NAME2 ===");
    let found: Vec<ExampleTable> = table.get_as(&Where::new("name", "NAME2")).unwrap();
    println!("{found:?}");

    println!("\n=== name = NAME1 OR name = NAME3 ===");
    let filter = Where::new("name", "NAME1").or("name", "NAME3");
    for row in table.get(&filter, &Fields::only(["id", "name"])).unwrap() {
        println!("{}", serde_json::to_string(&row).unwrap());
    }

    println!("\nRows with value 1.0: {}", table.count(Some(&Where::new("value", 1.0))).unwrap());
}
