//! Declared-table catalogs shared by scenario tests.
//!
//! [`storage_catalog`] is a realistic three-table catalog (buckets, files,
//! virus) with both relationship kinds; the smaller helpers build single
//! tables with exactly the pieces a scenario needs.

use hmeta_schemas::{
    ArrayRelationship, Configuration, CustomRootFields, DeclaredTable, ForeignKeyColumns,
    ObjectRelationship, Table,
};
use serde_json::{json, Value};

pub const SOURCE: &str = "default";

pub fn buckets() -> Table {
    Table::new("storage", "buckets")
}

pub fn files() -> Table {
    Table::new("storage", "files")
}

pub fn virus() -> Table {
    Table::new("storage", "virus")
}

fn columns(config: Configuration, pairs: &[(&str, &str)]) -> Configuration {
    pairs
        .iter()
        .fold(config, |cfg, (column, exposed)| cfg.with_column(*column, *exposed))
}

/// buckets -> files (array), files -> bucket (object), virus -> file (object).
pub fn storage_catalog(source: &str) -> Vec<DeclaredTable> {
    let buckets = DeclaredTable::new(source, buckets())
        .with_configuration(columns(
            Configuration::default()
                .with_custom_name("buckets")
                .with_root_fields(CustomRootFields::conventional("bucket", "buckets")),
            &[
                ("id", "id"),
                ("created_at", "createdAt"),
                ("updated_at", "updatedAt"),
                ("download_expiration", "downloadExpiration"),
                ("min_upload_file_size", "minUploadFileSize"),
                ("max_upload_file_size", "maxUploadFileSize"),
                ("cache_control", "cacheControl"),
                ("presigned_urls_enabled", "presignedUrlsEnabled"),
            ],
        ))
        .with_array_relationship(ArrayRelationship::new("files", files(), ["bucket_id"]));

    let files = DeclaredTable::new(source, files())
        .with_configuration(columns(
            Configuration::default()
                .with_custom_name("files")
                .with_root_fields(CustomRootFields::conventional("file", "files")),
            &[
                ("id", "id"),
                ("created_at", "createdAt"),
                ("updated_at", "updatedAt"),
                ("bucket_id", "bucketId"),
                ("name", "name"),
                ("size", "size"),
                ("mime_type", "mimeType"),
                ("etag", "etag"),
                ("is_uploaded", "isUploaded"),
                ("uploaded_by_user_id", "uploadedByUserId"),
                ("metadata", "metadata"),
            ],
        ))
        .with_object_relationship(ObjectRelationship::new(
            "bucket",
            ForeignKeyColumns::single("bucket_id"),
        ));

    let virus = DeclaredTable::new(source, virus())
        .with_configuration(columns(
            Configuration::default()
                .with_custom_name("virus")
                .with_root_fields(CustomRootFields::conventional("virus", "viruses")),
            &[
                ("id", "id"),
                ("created_at", "createdAt"),
                ("updated_at", "updatedAt"),
                ("file_id", "fileId"),
                ("filename", "filename"),
                ("virus", "virus"),
                ("user_session", "userSession"),
            ],
        ))
        .with_object_relationship(ObjectRelationship::new(
            "file",
            ForeignKeyColumns::single("file_id"),
        ));

    vec![buckets, files, virus]
}

/// A table with only a custom name and no relationships.
pub fn plain_table(schema: &str, name: &str) -> DeclaredTable {
    DeclaredTable::new(SOURCE, Table::new(schema, name))
        .with_configuration(Configuration::default().with_custom_name(name))
}

/// Raw export entry for an object relationship on a single column.
pub fn raw_object_relationship(name: &str, column: &str) -> Value {
    json!({"name": name, "using": {"foreign_key_constraint_on": column}})
}

/// Raw export entry for an array relationship.
pub fn raw_array_relationship(name: &str, remote: &Table, column: &str) -> Value {
    json!({
        "name": name,
        "using": {"foreign_key_constraint_on": {"table": remote, "columns": [column]}}
    })
}
