use rowforge_core::{GeneratedRow, Value};

/// Schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    /// Split `schema.table`, falling back to `default_schema` for bare names.
    ///
    /// Unquoted parts fold to lower case the way the server folds them; quoted
    /// parts keep their spelling.
    pub fn parse(table: &str, default_schema: &str) -> Self {
        let table = table.trim();
        match split_qualified(table) {
            Some((schema, name)) => Self {
                schema: identifier(schema),
                name: identifier(name),
            },
            None => Self {
                schema: default_schema.to_string(),
                name: identifier(table),
            },
        }
    }

    pub fn quoted(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }

    /// Bare name inside the default schema, `schema.table` elsewhere. Parts
    /// that would not survive folding are quoted, so the result parses back
    /// to the same table.
    pub fn canonical(&self, default_schema: &str) -> String {
        if self.schema == default_schema {
            render(&self.name)
        } else {
            format!("{}.{}", render(&self.schema), render(&self.name))
        }
    }
}

/// Split on the first dot outside double quotes.
fn split_qualified(table: &str) -> Option<(&str, &str)> {
    let mut quoted = false;
    for (index, ch) in table.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            '.' if !quoted => return Some((&table[..index], &table[index + 1..])),
            _ => {}
        }
    }
    None
}

fn identifier(part: &str) -> String {
    let part = part.trim();
    part.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .map_or_else(
            || part.to_ascii_lowercase(),
            |inner| inner.replace("\"\"", "\""),
        )
}

fn render(ident: &str) -> String {
    let mut chars = ident.chars();
    let plain = chars
        .next()
        .is_some_and(|first| first.is_ascii_lowercase() || first == '_')
        && chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '$');
    if plain {
        ident.to_string()
    } else {
        quote_ident(ident)
    }
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// SQL text plus the values to bind, in placeholder order.
#[derive(Debug)]
pub struct Statement<'v> {
    pub sql: String,
    pub binds: Vec<&'v Value>,
}

impl<'v> Statement<'v> {
    fn new() -> Self {
        Self {
            sql: String::new(),
            binds: Vec::new(),
        }
    }

    fn placeholder(&mut self, value: &'v Value) -> String {
        if value.is_null() {
            return "null".to_string();
        }
        self.binds.push(value);
        format!("${}", self.binds.len())
    }

    fn predicate(&mut self, column: &str, value: &'v Value) -> String {
        if value.is_null() {
            format!("{} is null", quote_ident(column))
        } else {
            let placeholder = self.placeholder(value);
            format!("{} = {}", quote_ident(column), placeholder)
        }
    }
}

pub fn insert<'v>(table: &TableRef, row: &'v GeneratedRow) -> Statement<'v> {
    let mut statement = Statement::new();
    if row.is_empty() {
        statement.sql = format!("insert into {} default values returning *", table.quoted());
        return statement;
    }

    let mut columns = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());
    for (column, value) in row.iter() {
        columns.push(quote_ident(column));
        values.push(statement.placeholder(value));
    }
    statement.sql = format!(
        "insert into {} ({}) values ({}) returning *",
        table.quoted(),
        columns.join(", "),
        values.join(", ")
    );
    statement
}

pub fn exists<'v>(table: &TableRef, column: &str, value: &'v Value) -> Statement<'v> {
    let mut statement = Statement::new();
    let predicate = statement.predicate(column, value);
    statement.sql = format!(
        "select exists (select 1 from {} where {})",
        table.quoted(),
        predicate
    );
    statement
}

pub fn fetch<'v>(table: &TableRef, column: &str, value: &'v Value) -> Statement<'v> {
    let mut statement = Statement::new();
    let predicate = statement.predicate(column, value);
    statement.sql = format!("select * from {} where {} limit 1", table.quoted(), predicate);
    statement
}

pub fn delete<'v>(table: &TableRef, column: &str, value: &'v Value) -> Statement<'v> {
    let mut statement = Statement::new();
    let predicate = statement.predicate(column, value);
    statement.sql = format!("delete from {} where {}", table.quoted(), predicate);
    statement
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders() -> TableRef {
        TableRef::parse("orders", "public")
    }

    #[test]
    fn parse_handles_bare_qualified_and_quoted_names() {
        assert_eq!(
            TableRef::parse("orders", "public"),
            TableRef {
                schema: "public".to_string(),
                name: "orders".to_string()
            }
        );
        assert_eq!(TableRef::parse("sales.orders", "public").schema, "sales");
        assert_eq!(TableRef::parse("\"Sales\".\"Order\"", "public").name, "Order");
    }

    #[test]
    fn unquoted_names_fold_to_lower_case() {
        let folded = TableRef::parse("Sales.Orders", "public");
        assert_eq!(folded.schema, "sales");
        assert_eq!(folded.name, "orders");
        assert_eq!(
            TableRef::parse("Orders", "public").canonical("public"),
            TableRef::parse("orders", "public").canonical("public")
        );
    }

    #[test]
    fn dots_inside_quotes_do_not_split() {
        let table = TableRef::parse("\"odd.schema\".\"Line.Items\"", "public");
        assert_eq!(table.schema, "odd.schema");
        assert_eq!(table.name, "Line.Items");
    }

    #[test]
    fn canonical_names_parse_back_to_the_same_table() {
        for table in ["orders", "\"Order\"", "sales.\"Line Items\"", "\"Geo\".regions"] {
            let parsed = TableRef::parse(table, "public");
            let canonical = parsed.canonical("public");
            assert_eq!(TableRef::parse(&canonical, "public"), parsed, "{table}");
        }
        assert_eq!(TableRef::parse("\"Order\"", "public").canonical("public"), "\"Order\"");
    }

    #[test]
    fn canonical_drops_only_the_default_schema() {
        assert_eq!(TableRef::parse("public.orders", "public").canonical("public"), "orders");
        assert_eq!(TableRef::parse("sales.orders", "public").canonical("public"), "sales.orders");
    }

    #[test]
    fn identifiers_escape_embedded_quotes() {
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn insert_binds_values_and_inlines_nulls() {
        let mut row = GeneratedRow::new();
        row.set("customer_id", Value::Int(4));
        row.set("note", Value::Null);
        row.set("total", "12.50");

        let statement = insert(&orders(), &row);
        assert_eq!(
            statement.sql,
            "insert into \"public\".\"orders\" (\"customer_id\", \"note\", \"total\") values ($1, null, $2) returning *"
        );
        assert_eq!(statement.binds.len(), 2);
        assert_eq!(statement.binds[1], &Value::Text("12.50".to_string()));
    }

    #[test]
    fn empty_insert_uses_default_values() {
        let row = GeneratedRow::new();
        let statement = insert(&orders(), &row);
        assert_eq!(
            statement.sql,
            "insert into \"public\".\"orders\" default values returning *"
        );
        assert!(statement.binds.is_empty());
    }

    #[test]
    fn null_lookups_use_is_null() {
        let statement = fetch(&orders(), "note", &Value::Null);
        assert_eq!(
            statement.sql,
            "select * from \"public\".\"orders\" where \"note\" is null limit 1"
        );
        assert!(statement.binds.is_empty());
    }

    #[test]
    fn exists_and_delete_bind_one_value() {
        let id = Value::Int(9);
        assert_eq!(
            exists(&orders(), "id", &id).sql,
            "select exists (select 1 from \"public\".\"orders\" where \"id\" = $1)"
        );
        let delete = delete(&orders(), "id", &id);
        assert_eq!(delete.sql, "delete from \"public\".\"orders\" where \"id\" = $1");
        assert_eq!(delete.binds, vec![&id]);
    }
}
