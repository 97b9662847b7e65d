//! SQL-to-Rust type mapping for generated record structs.

use tablegen_core::ColumnInfo;

/// Map a normalized SQL type name to the Rust type used in generated
/// structs.
///
/// Accepts the lowercased names the dialect adapters produce, with or
/// without a length suffix ("varchar(255)"). Unrecognized types fall back
/// to `String` so generation never fails on an exotic column.
pub fn rust_type(sql_type: &str) -> &'static str {
    let lower = sql_type.to_ascii_lowercase();
    let unsigned = lower.contains("unsigned");
    let base = lower.split('(').next().unwrap_or("").trim();
    let base = base.strip_suffix(" unsigned").unwrap_or(base);

    match base {
        "tinyint" if lower.starts_with("tinyint(1)") => "bool",
        "bool" | "boolean" => "bool",
        "tinyint" | "smallint" | "int2" => {
            if unsigned { "u16" } else { "i16" }
        }
        "int" | "integer" | "mediumint" | "int4" | "serial" => {
            if unsigned { "u32" } else { "i32" }
        }
        "bigint" | "int8" | "bigserial" => {
            if unsigned { "u64" } else { "i64" }
        }
        "float" | "real" | "float4" => "f32",
        "double" | "double precision" | "float8" | "numeric" | "decimal" => "f64",
        "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" | "bytea" => {
            "Vec<u8>"
        }
        // Dates, times, json, uuids, and anything else ride as text.
        _ => "String",
    }
}

/// The full field type for a column, wrapping nullable columns in `Option`.
pub fn field_type(column: &ColumnInfo) -> String {
    let base = rust_type(&column.sql_type);
    if column.nullable {
        format!("Option<{base}>")
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widths() {
        assert_eq!(rust_type("smallint"), "i16");
        assert_eq!(rust_type("int"), "i32");
        assert_eq!(rust_type("integer"), "i32");
        assert_eq!(rust_type("bigint"), "i64");
        assert_eq!(rust_type("bigint unsigned"), "u64");
        assert_eq!(rust_type("int(11) unsigned"), "u32");
    }

    #[test]
    fn test_mysql_boolean_convention() {
        assert_eq!(rust_type("tinyint(1)"), "bool");
        assert_eq!(rust_type("tinyint(4)"), "i16");
        assert_eq!(rust_type("boolean"), "bool");
    }

    #[test]
    fn test_text_and_fallback() {
        assert_eq!(rust_type("varchar(255)"), "String");
        assert_eq!(rust_type("text"), "String");
        assert_eq!(rust_type("timestamp with time zone"), "String");
        assert_eq!(rust_type("geography"), "String");
    }

    #[test]
    fn test_binary_types() {
        assert_eq!(rust_type("bytea"), "Vec<u8>");
        assert_eq!(rust_type("varbinary(16)"), "Vec<u8>");
    }

    #[test]
    fn test_field_type_wraps_nullable() {
        let col = ColumnInfo {
            name: "note".to_string(),
            sql_type: "text".to_string(),
            nullable: true,
            primary_key: false,
            default: None,
            comment: None,
            extra: None,
        };
        assert_eq!(field_type(&col), "Option<String>");
    }
}
