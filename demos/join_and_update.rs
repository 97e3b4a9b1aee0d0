//! Cross joins, updates, deletes and rollback on an in-memory database.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p coldorm-demos --example join_and_update
//! ```

use coldorm_core::{Correlation, Entry, FieldDeclaration, LogicalType, ModelDescription, Where};
use coldorm_sqlite::{Engine, EngineConfig, Fields, Table};

fn models() -> Vec<ModelDescription> {
    vec![
        ModelDescription::new("Author")
            .field(
                FieldDeclaration::new("id", LogicalType::Integer)
                    .primary_key()
                    .auto_increment(),
            )
            .field(FieldDeclaration::new("name", LogicalType::Text)),
        ModelDescription::new("Book")
            .field(
                FieldDeclaration::new("id", LogicalType::Integer)
                    .primary_key()
                    .auto_increment(),
            )
            .field(FieldDeclaration::new("author_id", LogicalType::Integer))
            .field(FieldDeclaration::new("title", LogicalType::Text))
            .field(FieldDeclaration::new("rating", LogicalType::Real)),
    ]
}

fn print_rows(table: &Table) {
    for row in table.get_all(&Fields::All).unwrap() {
        println!("  {}", serde_json::to_string(&row).unwrap());
    }
}

fn main() {
    let engine =
        Engine::open_in_memory(EngineConfig::new("library").with_migration(true), &models())
            .unwrap();
    let authors = engine.table("Author").unwrap();
    let books = engine.table("Book").unwrap();

    let le_guin = authors.add(&Entry::new().with("name", "Le Guin")).unwrap();
    let banks = authors.add(&Entry::new().with("name", "Banks")).unwrap();
    books
        .add_all(&[
            Entry::new()
                .with("author_id", le_guin)
                .with("title", "The Dispossessed")
                .with("rating", 4.5),
            Entry::new()
                .with("author_id", banks)
                .with("title", "Excession")
                .with("rating", 4.0),
            Entry::new()
                .with("author_id", le_guin)
                .with("title", "The Lathe of Heaven")
                .with("rating", 4.2),
        ])
        .unwrap();
    engine.commit().unwrap();

    // === Cross join ===
    println!("=== Books by Le Guin ===");
    let rows = authors
        .cross_join(
            books,
            &Where::new("name", "Le Guin"),
            &Correlation::new("id", "author_id"),
            &Fields::only(["Author.name", "title", "rating"]),
        )
        .unwrap();
    for row in rows {
        println!("  {}", serde_json::to_string(&row).unwrap());
    }

    // === Update ===
    let changed = books
        .update(
            &Where::new("title", "Excession"),
            &Entry::new().with("rating", 4.8),
        )
        .unwrap();
    engine.commit().unwrap();
    println!("\n=== After update ({changed} row) ===");
    print_rows(books);

    // === Remove, then roll back ===
    let removed = books.remove(&Where::new("author_id", le_guin)).unwrap();
    println!("\n=== Removed {removed} row(s), pending ===");
    print_rows(books);

    engine.rollback().unwrap();
    println!("\n=== After rollback ===");
    print_rows(books);
}
