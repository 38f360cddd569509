use std::ops::DerefMut;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use tracing::debug;

use crate::{
    Connection, Error, PooledConnection,
    error::Result,
    schema::{CreateAnnouncement, UpdateAnnouncement},
};

const ENTITY: &str = "Announcement";

time::serde::format_description!(
    iso_datetime,
    PrimitiveDateTime,
    "[year]-[month]-[day]T[hour]:[minute]:[second]"
);

/// Stored announcement, as it is in the `announcement` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner: String,
    pub date_of_creation: PrimitiveDateTime,
}

/// Shape of announcement returned to API callers - description is not exposed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AnnouncementPublic {
    pub id: i64,
    pub title: String,
    #[serde(with = "iso_datetime")]
    pub date_of_creation: PrimitiveDateTime,
    pub owner: String,
}

impl Announcement {
    pub fn to_public(&self) -> AnnouncementPublic {
        AnnouncementPublic {
            id: self.id,
            title: self.title.clone(),
            date_of_creation: self.date_of_creation,
            owner: self.owner.clone(),
        }
    }

    /// Assigns only the fields present in the patch.
    pub fn apply(&mut self, patch: UpdateAnnouncement) {
        if let Some(owner) = patch.owner {
            self.owner = owner;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }
}

pub type AnnouncementRepository = AnnouncementRepositoryImpl<PooledConnection>;

/// Repository bound to a single connection, which it holds for its whole life.
pub struct AnnouncementRepositoryImpl<C> {
    conn: C,
}

impl<C> AnnouncementRepositoryImpl<C>
where
    C: DerefMut<Target = Connection>,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, payload: CreateAnnouncement) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO announcement (title, description, owner) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.owner)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| Error::from_write(ENTITY, e))?;

        debug!("Created announcement {id} for owner {}", payload.owner);
        Ok(id)
    }

    pub async fn get(&mut self, id: i64) -> Result<Announcement> {
        sqlx::query_as::<_, Announcement>(
            "SELECT id, title, description, owner, date_of_creation FROM announcement WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| Error::RecordNotFound(ENTITY.to_string()))
    }

    pub async fn update(&mut self, id: i64, payload: UpdateAnnouncement) -> Result<Announcement> {
        let conn: &mut Connection = &mut self.conn;
        let mut transaction = sqlx::Connection::begin(conn).await?;

        let mut record = sqlx::query_as::<_, Announcement>(
            "SELECT id, title, description, owner, date_of_creation FROM announcement WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *transaction)
        .await?
        .ok_or_else(|| Error::RecordNotFound(ENTITY.to_string()))?;

        record.apply(payload);

        sqlx::query("UPDATE announcement SET title = $1, description = $2, owner = $3 WHERE id = $4")
            .bind(&record.title)
            .bind(&record.description)
            .bind(&record.owner)
            .bind(id)
            .execute(&mut *transaction)
            .await
            .map_err(|e| Error::from_write(ENTITY, e))?;

        transaction
            .commit()
            .await
            .map_err(|e| Error::from_write(ENTITY, e))?;

        debug!("Updated announcement {id}");
        Ok(record)
    }

    pub async fn delete(&mut self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM announcement WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound(ENTITY.to_string()))
        } else {
            debug!("Deleted announcement {id}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample() -> Announcement {
        Announcement {
            id: 3,
            title: "Bike for sale".to_string(),
            description: "Barely used".to_string(),
            owner: "alice".to_string(),
            date_of_creation: datetime!(2025-03-01 12:30:05),
        }
    }

    #[test]
    fn test_public_representation() {
        let value = serde_json::to_value(sample().to_public()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 3,
                "title": "Bike for sale",
                "date_of_creation": "2025-03-01T12:30:05",
                "owner": "alice",
            })
        );
    }

    #[test]
    fn test_apply_touches_only_present_fields() {
        let mut record = sample();
        record.apply(UpdateAnnouncement {
            title: Some("Bike sold".to_string()),
            ..Default::default()
        });
        assert_eq!(record.title, "Bike sold");
        assert_eq!(record.owner, "alice");
        assert_eq!(record.description, "Barely used");

        record.apply(UpdateAnnouncement::default());
        assert_eq!(
            record,
            Announcement {
                title: "Bike sold".to_string(),
                ..sample()
            }
        );
    }
}
