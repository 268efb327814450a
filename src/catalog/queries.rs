// Read-only catalog queries against information_schema and pg_catalog.
//
// Identifier columns are domains over `name`, so everything is cast to a
// plain SQL type before it reaches the driver. No query relies on ORDER BY
// for correctness; grouping and ordering happen client-side.

/// Base tables in schema `$1`
pub const LIST_BASE_TABLES: &str = r#"
    SELECT t.table_name::text AS table_name
    FROM information_schema.tables t
    WHERE t.table_schema::text = $1::text
      AND t.table_type = 'BASE TABLE'
    ORDER BY t.table_name
"#;

/// Columns of the tables `$2` in schema `$1`
pub const TABLE_COLUMNS: &str = r#"
    SELECT
        c.table_name::text AS table_name,
        c.column_name::text AS column_name,
        c.data_type::text AS data_type,
        c.character_maximum_length::int4 AS max_length,
        c.column_default::text AS column_default,
        (c.is_nullable = 'YES') AS is_nullable,
        c.ordinal_position::int4 AS ordinal_position
    FROM information_schema.columns c
    WHERE c.table_schema::text = $1::text
      AND c.table_name::text = ANY($2::text[])
"#;

/// One row per constrained column of the tables `$2` in schema `$1`.
///
/// Foreign key names are only unique per table, so the referenced side is
/// resolved through `pg_constraint` pinned to the row's own table, pairing
/// `conkey[i]` with `confkey[i]` at the key column's ordinal.
pub const TABLE_CONSTRAINT_COLUMNS: &str = r#"
    SELECT
        tc.table_name::text AS table_name,
        tc.constraint_name::text AS constraint_name,
        tc.constraint_type::text AS constraint_type,
        kcu.column_name::text AS column_name,
        kcu.ordinal_position::int4 AS ordinal_position,
        fk.foreign_table_name,
        fk.foreign_column_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
        ON kcu.constraint_schema = tc.constraint_schema
        AND kcu.constraint_name = tc.constraint_name
        AND kcu.table_schema = tc.table_schema
        AND kcu.table_name = tc.table_name
    LEFT JOIN LATERAL (
        SELECT
            ref_rel.relname::text AS foreign_table_name,
            ref_att.attname::text AS foreign_column_name
        FROM pg_catalog.pg_constraint con
        JOIN pg_catalog.pg_class rel ON rel.oid = con.conrelid
        JOIN pg_catalog.pg_namespace nsp ON nsp.oid = rel.relnamespace
        CROSS JOIN LATERAL unnest(con.conkey, con.confkey)
            WITH ORDINALITY AS k(attnum, ref_attnum, ord)
        JOIN pg_catalog.pg_class ref_rel ON ref_rel.oid = con.confrelid
        JOIN pg_catalog.pg_attribute ref_att
            ON ref_att.attrelid = con.confrelid
            AND ref_att.attnum = k.ref_attnum
        WHERE con.contype = 'f'
          AND con.conname::text = tc.constraint_name::text
          AND nsp.nspname::text = tc.table_schema::text
          AND rel.relname::text = tc.table_name::text
          AND k.ord::int4 = kcu.ordinal_position::int4
    ) fk ON tc.constraint_type = 'FOREIGN KEY'
    WHERE tc.table_schema::text = $1::text
      AND tc.table_name::text = ANY($2::text[])
"#;
