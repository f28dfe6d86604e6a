use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::DestinationCategory;
use crate::models::Destination;

pub fn insert_destination(
    conn: &Connection,
    name: &str,
    category: &DestinationCategory,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO destinations (name, category) VALUES (?1, ?2)",
        params![name, category.as_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_destination(conn: &Connection, id: i64) -> Result<Option<Destination>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, category FROM destinations WHERE id = ?1",
        params![id],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        },
    );

    match result {
        Ok((id, name, category)) => Ok(Some(Destination {
            id,
            name,
            category: DestinationCategory::from_str(&category)?,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn destination_exists(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM destinations WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn list_destinations(conn: &Connection) -> Result<Vec<Destination>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name, category FROM destinations ORDER BY name ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut destinations = Vec::new();
    for row in rows {
        let (id, name, category) = row?;
        destinations.push(Destination {
            id,
            name,
            category: DestinationCategory::from_str(&category)?,
        });
    }
    Ok(destinations)
}
