use csv_chat::gate::validate;

#[test]
fn test_accepts_simple_select() {
    let validated = validate("SELECT id, name FROM data WHERE id = 1").unwrap();

    assert_eq!(validated.tables.len(), 1);
    assert_eq!(validated.tables[0].as_str(), "data");
    assert!(validated.projection.iter().any(|c| c.as_str() == "id"));
    assert!(validated.projection.iter().any(|c| c.as_str() == "name"));
    assert!(!validated.has_wildcard);
}

#[test]
fn test_accepts_select_star() {
    let validated = validate("SELECT * FROM data").unwrap();

    assert!(validated.has_wildcard);
    assert!(validated.projection.is_empty());
}

#[test]
fn test_accepts_trailing_semicolon() {
    let validated = validate("SELECT id FROM data;").unwrap();

    assert_eq!(validated.tables[0].as_str(), "data");
}

#[test]
fn test_accepts_group_by_aggregate() {
    let sql = "SELECT category, SUM(amount) AS total FROM data GROUP BY category";
    let validated = validate(sql).unwrap();

    assert!(validated.projection.iter().any(|c| c.as_str() == "category"));
    assert!(validated.projection.iter().any(|c| c.as_str() == "total"));
}

#[test]
fn test_accepts_subquery() {
    let sql = "SELECT * FROM data WHERE id IN (SELECT id FROM data WHERE amount > 10)";

    assert!(validate(sql).is_ok());
}

#[test]
fn test_accepts_cte() {
    let sql = "WITH big AS (SELECT * FROM data WHERE amount > 10) SELECT category FROM big";
    let validated = validate(sql).unwrap();

    assert!(validated.tables.iter().any(|t| t.as_str() == "data"));
}

#[test]
fn test_accepts_union() {
    let sql = "SELECT category FROM data UNION SELECT category FROM data";
    let validated = validate(sql).unwrap();

    assert!(validated.projection.iter().any(|c| c.as_str() == "category"));
}

#[test]
fn test_rejects_insert() {
    let result = validate("INSERT INTO data (id) VALUES (1)");

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("INSERT"));
}

#[test]
fn test_rejects_update() {
    let result = validate("UPDATE data SET amount = 0");

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("UPDATE"));
}

#[test]
fn test_rejects_delete() {
    let result = validate("DELETE FROM data");

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("DELETE"));
}

#[test]
fn test_rejects_drop() {
    let result = validate("DROP TABLE data");

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("DROP"));
}

#[test]
fn test_rejects_truncate() {
    assert!(validate("TRUNCATE TABLE data").is_err());
}

#[test]
fn test_rejects_alter() {
    let result = validate("ALTER TABLE data ADD COLUMN extra TEXT");

    assert!(result.is_err());
}

#[test]
fn test_rejects_create_table() {
    let result = validate("CREATE TABLE copy (id INT)");

    assert!(result.is_err());
}

#[test]
fn test_rejects_attach() {
    assert!(validate("ATTACH DATABASE 'other.db' AS other").is_err());
}

#[test]
fn test_rejects_pragma() {
    assert!(validate("PRAGMA table_info(data)").is_err());
}

#[test]
fn test_rejects_multiple_statements() {
    let result = validate("SELECT * FROM data; DELETE FROM data");

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("single statement"));
}

#[test]
fn test_rejects_two_selects() {
    assert!(validate("SELECT 1; SELECT 2").is_err());
}

#[test]
fn test_rejects_empty_input() {
    assert!(validate("").is_err());
    assert!(validate("   \n ").is_err());
}

#[test]
fn test_rejects_unparseable_input() {
    assert!(validate("SELEKT * FORM data").is_err());
    assert!(validate("please delete everything").is_err());
}

#[test]
fn test_rejects_select_into() {
    // Either rejected structurally or refused by the parser; never accepted
    assert!(validate("SELECT * INTO copy FROM data").is_err());
}

#[test]
fn test_rejects_transaction_control() {
    assert!(validate("BEGIN").is_err());
    assert!(validate("COMMIT").is_err());
}

#[test]
fn test_canonical_sql_is_single_statement() {
    let validated = validate("select id from data").unwrap();

    assert!(validated.sql.to_uppercase().starts_with("SELECT"));
    assert!(!validated.sql.contains(';'));
}

#[test]
fn test_projection_aliases_win() {
    let validated = validate("SELECT amount * 2 AS doubled FROM data").unwrap();

    assert_eq!(validated.projection.len(), 1);
    assert_eq!(validated.projection[0].as_str(), "doubled");
}

#[test]
fn test_tables_from_derived_subquery() {
    let sql = "SELECT t.category FROM (SELECT category FROM data) AS t";
    let validated = validate(sql).unwrap();

    assert!(validated.tables.iter().any(|t| t.as_str() == "data"));
}
