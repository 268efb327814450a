use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Keywords PostgreSQL refuses as bare identifiers: the reserved,
/// type/function-name and column-name categories.
static NON_BARE_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // reserved
        "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both",
        "case", "cast", "check", "collate", "column", "constraint", "create", "current_catalog",
        "current_date", "current_role", "current_time", "current_timestamp", "current_user",
        "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "false",
        "fetch", "for", "foreign", "from", "grant", "group", "having", "in", "initially",
        "intersect", "into", "lateral", "leading", "limit", "localtime", "localtimestamp", "not",
        "null", "offset", "on", "only", "or", "order", "placing", "primary", "references",
        "returning", "select", "session_user", "some", "symmetric", "system_user", "table",
        "then", "to", "trailing", "true", "union", "unique", "user", "using", "variadic", "when",
        "where", "window", "with",
        // type or function names
        "authorization", "binary", "collation", "concurrently", "cross", "current_schema",
        "freeze", "full", "ilike", "inner", "is", "isnull", "join", "left", "like", "natural",
        "notnull", "outer", "overlaps", "right", "similar", "tablesample", "verbose",
        // column names
        "between", "bigint", "bit", "boolean", "char", "character", "coalesce", "dec", "decimal",
        "exists", "extract", "float", "greatest", "grouping", "inout", "int", "integer",
        "interval", "json", "json_array", "json_arrayagg", "json_object", "json_objectagg",
        "least", "national", "nchar", "none", "normalize", "nullif", "numeric", "out", "overlay",
        "position", "precision", "real", "row", "setof", "smallint", "substring", "time",
        "timestamp", "treat", "trim", "values", "varchar", "xmlattributes", "xmlconcat",
        "xmlelement", "xmlexists", "xmlforest", "xmlnamespaces", "xmlparse", "xmlpi", "xmlroot",
        "xmlserialize", "xmltable",
    ]
    .into_iter()
    .collect()
});

/// Quote an identifier the way `quote_ident` / `format('%I')` does.
///
/// Lowercase names made of ASCII letters, digits and underscores that do not start
/// with a digit and are not keywords stay bare. Everything else is wrapped in
/// double quotes with embedded quotes doubled.
pub fn quote_ident(ident: &str) -> String {
    if is_bare_safe(ident) {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

fn is_bare_safe(ident: &str) -> bool {
    let mut chars = ident.chars();
    let starts_ok = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');

    starts_ok
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !NON_BARE_KEYWORDS.contains(ident)
}
