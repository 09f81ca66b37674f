//! Test fixtures and sample data
//!
//! Provides pre-built export contents and settings files for testing.

use db_backup::strategies::mongodb_export::CollectionDump;
use db_backup::strategies::postgres_catalog::CatalogRow;
use serde_json::json;

/// A small mysqldump-style script
pub fn sample_sql_dump() -> &'static str {
    "-- MySQL dump 10.13\n\
     CREATE TABLE `orders` (\n  `id` int NOT NULL,\n  `total` decimal(10,2) DEFAULT NULL,\n  PRIMARY KEY (`id`)\n);\n\
     INSERT INTO `orders` VALUES (1,19.99),(2,5.00);\n\
     -- Dump completed\n"
}

/// Catalog row for a base table of the public schema
pub fn catalog_row(dbname: &str, table: &str) -> CatalogRow {
    CatalogRow {
        table_catalog: dbname.to_string(),
        table_schema: "public".to_string(),
        table_name: table.to_string(),
        table_type: "BASE TABLE".to_string(),
    }
}

/// Catalog of an `inventory` database with three tables
pub fn sample_catalog_rows() -> Vec<CatalogRow> {
    ["items", "stock_levels", "suppliers"]
        .iter()
        .map(|table| catalog_row("inventory", table))
        .collect()
}

/// `shop` database: `orders` with two documents, `users` with one
pub fn shop_collections() -> Vec<CollectionDump> {
    vec![
        CollectionDump {
            collection: "orders".to_string(),
            docs: vec![
                json!({ "_id": { "$oid": "65a1f0c2e4b0a1b2c3d4e5f1" }, "item": "book", "qty": 1 }),
                json!({ "_id": { "$oid": "65a1f0c2e4b0a1b2c3d4e5f2" }, "item": "pen", "qty": 3 }),
            ],
        },
        CollectionDump {
            collection: "users".to_string(),
            docs: vec![json!({ "_id": 1, "name": "ada", "tags": ["admin"] })],
        },
    ]
}

/// `n` collections with `m` documents each
pub fn generated_collections(n: usize, m: usize) -> Vec<CollectionDump> {
    (0..n)
        .map(|c| CollectionDump {
            collection: format!("collection_{:02}", c),
            docs: (0..m)
                .map(|d| json!({ "_id": d, "collection": c, "payload": format!("doc-{}-{}", c, d) }))
                .collect(),
        })
        .collect()
}

/// Settings file with everything written under `{root}`
pub fn settings_toml() -> &'static str {
    r#"
[output]
directory = "{root}/artifacts"

[logging]
directory = "{root}/logs"
level = "debug"
max_files = 3

[notifications]
desktop = false

[upload]
store = "local"
directory = "{root}/mirror"
"#
}

/// Replace placeholders in a template
pub fn render_template(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in replacements {
        result = result.replace(&format!("{{{}}}", key), value);
    }
    result
}
