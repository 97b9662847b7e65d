//! Rendering table regions and service file preambles.

use tablegen_core::ColumnInfo;

use crate::naming::{field_ident, struct_name};
use crate::plan::TablePlan;
use crate::type_map::field_type;

/// Render the region body for one table: a record struct, column consts,
/// and canned SQL strings. Purely a function of the table metadata, so
/// re-rendering an unchanged table is byte-identical.
pub fn render_table(table: &TablePlan) -> String {
    let name = struct_name(&table.table);
    let mut out = String::new();

    out.push_str(&format!("/// Record mapped from the `{}` table.\n", table.table));
    out.push_str("#[derive(Debug, Clone, PartialEq)]\n");
    out.push_str(&format!("pub struct {name} {{\n"));
    for column in &table.columns {
        if let Some(comment) = non_empty(&column.comment) {
            out.push_str(&format!("    /// {comment}\n"));
        }
        out.push_str(&format!(
            "    pub {}: {},\n",
            field_ident(&column.name),
            field_type(column)
        ));
    }
    out.push_str("}\n\n");

    let column_names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    let column_list = column_names.join(", ");
    let quoted: Vec<String> = column_names.iter().map(|c| format!("\"{c}\"")).collect();
    let placeholders = vec!["?"; column_names.len()].join(", ");

    out.push_str(&format!("impl {name} {{\n"));
    out.push_str(&format!(
        "    pub const TABLE: &'static str = \"{}\";\n",
        table.table
    ));
    out.push_str(&format!(
        "    pub const COLUMNS: &'static [&'static str] = &[{}];\n",
        quoted.join(", ")
    ));
    out.push_str(&format!(
        "    pub const SELECT_SQL: &'static str = \"SELECT {column_list} FROM {}\";\n",
        table.table
    ));
    out.push_str(&format!(
        "    pub const INSERT_SQL: &'static str = \"INSERT INTO {} ({column_list}) VALUES ({placeholders})\";\n",
        table.table
    ));
    if let Some(pk) = primary_key(&table.columns) {
        out.push_str(&format!(
            "    pub const SELECT_BY_{}_SQL: &'static str = \"SELECT {column_list} FROM {} WHERE {} = ?\";\n",
            pk.to_uppercase(),
            table.table,
            pk
        ));
    }
    out.push_str("}\n");
    out
}

/// Preamble for a freshly created service file. Lives outside the managed
/// regions, so hand edits to it survive regeneration.
pub fn service_preamble(service: &str) -> String {
    format!("//! `{service}` service: records generated from database tables.\n\n")
}

/// Preamble for the managed services module list.
pub fn mod_preamble() -> String {
    "//! Service modules.\n\n".to_string()
}

/// Body of the managed module-list region.
pub fn render_mod_list(services: &[String]) -> String {
    let mut out = String::new();
    for service in services {
        out.push_str(&format!("pub mod {service};\n"));
    }
    out
}

fn primary_key(columns: &[ColumnInfo]) -> Option<&str> {
    let mut keys = columns.iter().filter(|c| c.primary_key);
    let first = keys.next()?;
    // Composite keys get no lookup helper.
    if keys.next().is_some() {
        return None;
    }
    Some(&first.name)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, sql_type: &str, nullable: bool, pk: bool) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            nullable,
            primary_key: pk,
            default: None,
            comment: None,
            extra: None,
        }
    }

    fn users() -> TablePlan {
        TablePlan {
            table: "users".to_string(),
            columns: vec![
                column("id", "bigint", false, true),
                column("email", "varchar(255)", false, false),
                column("display_name", "text", true, false),
            ],
        }
    }

    #[test]
    fn test_render_users_table() {
        insta::assert_snapshot!(render_table(&users()), @r#"
/// Record mapped from the `users` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Users {
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
}

impl Users {
    pub const TABLE: &'static str = "users";
    pub const COLUMNS: &'static [&'static str] = &["id", "email", "display_name"];
    pub const SELECT_SQL: &'static str = "SELECT id, email, display_name FROM users";
    pub const INSERT_SQL: &'static str = "INSERT INTO users (id, email, display_name) VALUES (?, ?, ?)";
    pub const SELECT_BY_ID_SQL: &'static str = "SELECT id, email, display_name FROM users WHERE id = ?";
}
"#);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        assert_eq!(render_table(&users()), render_table(&users()));
    }

    #[test]
    fn test_keyword_column_uses_raw_ident() {
        let plan = TablePlan {
            table: "events".to_string(),
            columns: vec![
                column("id", "integer", false, true),
                column("type", "text", false, false),
            ],
        };
        let body = render_table(&plan);
        assert!(body.contains("pub r#type: String,"));
        assert!(body.contains("\"SELECT id, type FROM events\""));
    }

    #[test]
    fn test_composite_key_gets_no_lookup_helper() {
        let plan = TablePlan {
            table: "memberships".to_string(),
            columns: vec![
                column("user_id", "bigint", false, true),
                column("group_id", "bigint", false, true),
            ],
        };
        assert!(!render_table(&plan).contains("SELECT_BY_"));
    }

    #[test]
    fn test_column_comment_becomes_doc() {
        let mut plan = users();
        plan.columns[1].comment = Some("login address".to_string());
        assert!(render_table(&plan).contains("    /// login address\n    pub email: String,"));
    }

    #[test]
    fn test_mod_list() {
        let services = vec!["accounts".to_string(), "billing".to_string()];
        assert_eq!(render_mod_list(&services), "pub mod accounts;\npub mod billing;\n");
    }
}
