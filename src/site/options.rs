//! Key/value access to the installation's options table, plus typed helpers
//! for the handful of options the reset procedure cares about.

use rusqlite::Connection;

/// Read an option value, `None` if the option is not set.
pub fn get_option(conn: &Connection, prefix: &str, name: &str) -> rusqlite::Result<Option<String>> {
    match conn.query_row(
        &format!("SELECT option_value FROM \"{prefix}options\" WHERE option_name = ?1"),
        [name],
        |row| row.get::<_, String>(0),
    ) {
        Ok(val) => Ok(Some(val)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Set an option, inserting or overwriting as needed.
pub fn set_option(conn: &Connection, prefix: &str, name: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO \"{prefix}options\" (option_name, option_value) VALUES (?1, ?2) \
             ON CONFLICT(option_name) DO UPDATE SET option_value = excluded.option_value"
        ),
        [name, value],
    )?;
    Ok(())
}

/// Delete an option. Deleting a missing option is not an error.
pub fn delete_option(conn: &Connection, prefix: &str, name: &str) -> rusqlite::Result<()> {
    conn.execute(
        &format!("DELETE FROM \"{prefix}options\" WHERE option_name = ?1"),
        [name],
    )?;
    Ok(())
}

/// Recompute the URL-routing rules from the stored permalink structure and
/// write them back as the `rewrite_rules` option (JSON map of pattern to
/// target). Mirrors a routing-table rebuild after the store changes shape.
pub fn regenerate_rewrite_rules(conn: &Connection, prefix: &str) -> anyhow::Result<()> {
    let structure = get_option(conn, prefix, "permalink_structure")?
        .unwrap_or_else(|| "/%postname%/".to_string());

    let mut rules = serde_json::Map::new();
    rules.insert(
        "^feed/?$".to_string(),
        serde_json::Value::String("index?feed=rss2".to_string()),
    );
    rules.insert(
        "^page/([0-9]+)/?$".to_string(),
        serde_json::Value::String("index?paged=$1".to_string()),
    );
    if structure.contains("%postname%") {
        rules.insert(
            "^([^/]+)/?$".to_string(),
            serde_json::Value::String("index?name=$1".to_string()),
        );
    } else if structure.contains("%year%") {
        rules.insert(
            "^([0-9]{4})/([0-9]{1,2})/([^/]+)/?$".to_string(),
            serde_json::Value::String("index?year=$1&monthnum=$2&name=$3".to_string()),
        );
    }

    let serialized = serde_json::to_string(&serde_json::Value::Object(rules))?;
    delete_option(conn, prefix, "rewrite_rules")?;
    set_option(conn, prefix, "rewrite_rules", &serialized)?;
    Ok(())
}
