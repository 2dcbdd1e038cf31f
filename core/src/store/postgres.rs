//! PostgreSQL record store.
//!
//! Enabled with the `postgres` cargo feature. The adapter leans on the
//! database for every atomicity guarantee the trait demands:
//! `ON CONFLICT (user_id, event_id) DO UPDATE` for the RSVP upsert, a
//! single `UPDATE` for the approve flip, and an `ON DELETE CASCADE`
//! foreign key for the RSVP cascade.
//!
//! Queries are runtime-checked (`sqlx::query`), so the feature builds
//! without a live `DATABASE_URL`.

use super::RecordStore;
use crate::error::{CoordinationError, Result};
use crate::model::{
    Event, EventDetails, EventId, EventPatch, EventRef, NewUser, OrganizerRef, ResponderInfo,
    ResponderRef, Role, Rsvp, RsvpDetails, RsvpStatus, RsvpWithRefs, RsvpWithResponder, User,
    UserId,
};
use crate::policy::EventVisibility;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);
CREATE TABLE IF NOT EXISTS events (
    id UUID PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    date TIMESTAMPTZ NOT NULL,
    location TEXT NOT NULL,
    organizer_id UUID NOT NULL REFERENCES users(id),
    approved BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL
);
CREATE TABLE IF NOT EXISTS rsvps (
    user_id UUID NOT NULL REFERENCES users(id),
    event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    status TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (user_id, event_id)
);
";

/// PostgreSQL [`RecordStore`] adapter.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create an adapter over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the DDL fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn event_details(&self, id: EventId) -> Result<Option<EventDetails>> {
        let row = sqlx::query(
            "SELECT e.id, e.title, e.description, e.date, e.location, e.organizer_id, \
                    e.approved, e.created_at, u.email AS organizer_email \
             FROM events e JOIN users u ON u.id = e.organizer_id \
             WHERE e.id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        let Some(row) = row else { return Ok(None) };
        let event = event_from_row(&row)?;
        let organizer = OrganizerRef {
            email: row.try_get("organizer_email").map_err(storage)?,
        };

        let rsvp_rows = sqlx::query(
            "SELECT r.user_id, r.event_id, r.status, r.created_at, u.email \
             FROM rsvps r JOIN users u ON u.id = r.user_id \
             WHERE r.event_id = $1 \
             ORDER BY r.created_at DESC, r.user_id ASC",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        let rsvps = rsvp_rows
            .iter()
            .map(|row| {
                Ok(RsvpDetails {
                    rsvp: rsvp_from_row(row)?,
                    user: ResponderRef {
                        email: row.try_get("email").map_err(storage)?,
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(EventDetails {
            event,
            organizer,
            rsvps,
        }))
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let user = User {
            id: UserId::new(),
            email: new_user.email,
            role: new_user.role,
            created_at: Utc::now(),
        };
        sqlx::query("INSERT INTO users (id, email, role, created_at) VALUES ($1, $2, $3, $4)")
            .bind(user.id.0)
            .bind(&user.email)
            .bind(user.role.as_str())
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    CoordinationError::conflict("User already exists")
                } else {
                    storage(e)
                }
            })?;
        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        sqlx::query("SELECT id, email, role, created_at FROM users WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .map(|row| user_from_row(&row))
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query("SELECT id, email, role, created_at FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .map(|row| user_from_row(&row))
            .transpose()
    }

    async fn insert_event(&self, event: Event) -> Result<EventDetails> {
        sqlx::query(
            "INSERT INTO events \
                 (id, title, description, date, location, organizer_id, approved, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(event.id.0)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.location)
        .bind(event.organizer_id.0)
        .bind(event.approval.is_approved())
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        self.event_details(event.id)
            .await?
            .ok_or_else(|| CoordinationError::storage("Inserted event vanished"))
    }

    async fn find_event(&self, id: EventId) -> Result<Option<Event>> {
        sqlx::query(
            "SELECT id, title, description, date, location, organizer_id, approved, created_at \
             FROM events WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .map(|row| event_from_row(&row))
        .transpose()
    }

    async fn apply_event_patch(
        &self,
        id: EventId,
        patch: EventPatch,
    ) -> Result<Option<EventDetails>> {
        let updated = sqlx::query(
            "UPDATE events SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 date = COALESCE($4, date), \
                 location = COALESCE($5, location) \
             WHERE id = $1",
        )
        .bind(id.0)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.date)
        .bind(patch.location)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.event_details(id).await
    }

    async fn mark_event_approved(&self, id: EventId) -> Result<Option<EventDetails>> {
        let updated = sqlx::query("UPDATE events SET approved = TRUE WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.event_details(id).await
    }

    async fn delete_event(&self, id: EventId) -> Result<Option<Event>> {
        // The RSVP foreign key is ON DELETE CASCADE, so one statement
        // removes the event and its responses atomically.
        sqlx::query(
            "DELETE FROM events WHERE id = $1 \
             RETURNING id, title, description, date, location, organizer_id, approved, created_at",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .map(|row| event_from_row(&row))
        .transpose()
    }

    async fn list_events(&self, visibility: EventVisibility) -> Result<Vec<EventDetails>> {
        let rows = sqlx::query(
            "SELECT id FROM events \
             WHERE approved OR NOT $1 \
             ORDER BY date ASC, id ASC",
        )
        .bind(matches!(visibility, EventVisibility::ApprovedOnly))
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        let mut details = Vec::with_capacity(rows.len());
        for row in rows {
            let id = EventId(row.try_get("id").map_err(storage)?);
            if let Some(event) = self.event_details(id).await? {
                details.push(event);
            }
        }
        Ok(details)
    }

    async fn upsert_rsvp(
        &self,
        user_id: UserId,
        event_id: EventId,
        status: RsvpStatus,
    ) -> Result<RsvpWithRefs> {
        let row = sqlx::query(
            "INSERT INTO rsvps (user_id, event_id, status, created_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, event_id) DO UPDATE SET status = EXCLUDED.status \
             RETURNING user_id, event_id, status, created_at",
        )
        .bind(user_id.0)
        .bind(event_id.0)
        .bind(status.to_string())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                CoordinationError::not_found("Event", event_id)
            } else {
                storage(e)
            }
        })?;
        let rsvp = rsvp_from_row(&row)?;

        let context = sqlx::query(
            "SELECT u.email, e.id, e.title \
             FROM users u, events e \
             WHERE u.id = $1 AND e.id = $2",
        )
        .bind(user_id.0)
        .bind(event_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or_else(|| CoordinationError::not_found("Event", event_id))?;

        Ok(RsvpWithRefs {
            rsvp,
            user: ResponderRef {
                email: context.try_get("email").map_err(storage)?,
            },
            event: EventRef {
                id: EventId(context.try_get("id").map_err(storage)?),
                title: context.try_get("title").map_err(storage)?,
            },
        })
    }

    async fn list_rsvps(&self, event_id: EventId) -> Result<Vec<RsvpWithResponder>> {
        let rows = sqlx::query(
            "SELECT r.user_id, r.event_id, r.status, r.created_at, u.email, u.role \
             FROM rsvps r JOIN users u ON u.id = r.user_id \
             WHERE r.event_id = $1 \
             ORDER BY r.created_at DESC, r.user_id ASC",
        )
        .bind(event_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter()
            .map(|row| {
                Ok(RsvpWithResponder {
                    rsvp: rsvp_from_row(row)?,
                    user: ResponderInfo {
                        email: row.try_get("email").map_err(storage)?,
                        role: parse_role(&row.try_get::<String, _>("role").map_err(storage)?)?,
                    },
                })
            })
            .collect()
    }
}

fn storage(e: impl std::fmt::Display) -> CoordinationError {
    CoordinationError::storage(e)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

fn parse_role(raw: &str) -> Result<Role> {
    raw.parse()
        .map_err(|_| CoordinationError::storage(format!("Unknown role in store: {raw}")))
}

fn parse_status(raw: &str) -> Result<RsvpStatus> {
    match raw {
        "GOING" => Ok(RsvpStatus::Going),
        "MAYBE" => Ok(RsvpStatus::Maybe),
        "NOT_GOING" => Ok(RsvpStatus::NotGoing),
        other => Err(CoordinationError::storage(format!(
            "Unknown RSVP status in store: {other}"
        ))),
    }
}

fn user_from_row(row: &PgRow) -> Result<User> {
    Ok(User {
        id: UserId(row.try_get("id").map_err(storage)?),
        email: row.try_get("email").map_err(storage)?,
        role: parse_role(&row.try_get::<String, _>("role").map_err(storage)?)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(storage)?,
    })
}

fn event_from_row(row: &PgRow) -> Result<Event> {
    Ok(Event {
        id: EventId(row.try_get("id").map_err(storage)?),
        title: row.try_get("title").map_err(storage)?,
        description: row.try_get("description").map_err(storage)?,
        date: row.try_get::<DateTime<Utc>, _>("date").map_err(storage)?,
        location: row.try_get("location").map_err(storage)?,
        organizer_id: UserId(row.try_get("organizer_id").map_err(storage)?),
        approval: row.try_get::<bool, _>("approved").map_err(storage)?.into(),
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(storage)?,
    })
}

fn rsvp_from_row(row: &PgRow) -> Result<Rsvp> {
    Ok(Rsvp {
        user_id: UserId(row.try_get("user_id").map_err(storage)?),
        event_id: EventId(row.try_get("event_id").map_err(storage)?),
        status: parse_status(&row.try_get::<String, _>("status").map_err(storage)?)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(storage)?,
    })
}
