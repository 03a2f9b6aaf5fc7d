use sqlx::{PgPool, Row};

use rowforge_core::Result;

use super::codec::map_sqlx_error;

pub struct RawColumn {
    pub name: String,
    pub type_name: String,
    pub is_nullable: bool,
    pub is_identity: bool,
    pub character_max_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
    pub is_unique: bool,
    pub referenced_schema: Option<String>,
    pub referenced_table: Option<String>,
    pub referenced_column: Option<String>,
}

const LIST_COLUMNS: &str = r#"
select
  a.attname::text as name,
  t.typname::text as type_name,
  (not a.attnotnull) as is_nullable,
  (a.attidentity <> ''
    or coalesce(pg_get_expr(ad.adbin, ad.adrelid), '') like 'nextval(%') as is_identity,
  ic.character_maximum_length::int4 as character_max_length,
  ic.numeric_precision::int4 as numeric_precision,
  ic.numeric_scale::int4 as numeric_scale,
  exists (
    select 1
    from pg_constraint uc
    where uc.conrelid = c.oid
      and uc.contype in ('p', 'u')
      and a.attnum = any(uc.conkey)
  ) as is_unique,
  fk.referenced_schema,
  fk.referenced_table,
  fk.referenced_column
from pg_attribute a
join pg_class c on c.oid = a.attrelid
join pg_namespace n on n.oid = c.relnamespace
join pg_type t on t.oid = a.atttypid
left join pg_attrdef ad on ad.adrelid = a.attrelid and ad.adnum = a.attnum
left join information_schema.columns ic
  on ic.table_schema = n.nspname and ic.table_name = c.relname and ic.column_name = a.attname
left join lateral (
  select
    rn.nspname::text as referenced_schema,
    rc.relname::text as referenced_table,
    ra.attname::text as referenced_column
  from pg_constraint fc
  join unnest(fc.conkey, fc.confkey) as k(attnum, refnum) on k.attnum = a.attnum
  join pg_class rc on rc.oid = fc.confrelid
  join pg_namespace rn on rn.oid = rc.relnamespace
  join pg_attribute ra on ra.attrelid = fc.confrelid and ra.attnum = k.refnum
  where fc.conrelid = c.oid
    and fc.contype = 'f'
  order by fc.conname
  limit 1
) fk on true
where n.nspname = $1
  and c.relname = $2
  and c.relkind in ('r', 'p')
  and a.attnum > 0
  and not a.attisdropped
  and a.attgenerated = ''
order by a.attnum
"#;

/// Columns of one table in attribute order, excluding generated columns.
pub async fn list_columns(pool: &PgPool, schema: &str, table: &str) -> Result<Vec<RawColumn>> {
    let rows = sqlx::query(LIST_COLUMNS)
        .bind(schema)
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(|err| map_sqlx_error(table, err))?;

    rows.iter()
        .map(|row| {
            Ok(RawColumn {
                name: row.try_get("name")?,
                type_name: row.try_get("type_name")?,
                is_nullable: row.try_get("is_nullable")?,
                is_identity: row.try_get("is_identity")?,
                character_max_length: row.try_get("character_max_length")?,
                numeric_precision: row.try_get("numeric_precision")?,
                numeric_scale: row.try_get("numeric_scale")?,
                is_unique: row.try_get("is_unique")?,
                referenced_schema: row.try_get("referenced_schema")?,
                referenced_table: row.try_get("referenced_table")?,
                referenced_column: row.try_get("referenced_column")?,
            })
        })
        .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
        .map_err(|err| map_sqlx_error(table, err))
}
