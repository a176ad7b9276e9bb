//! MySQL implementation of the SecurityEventRepository trait.
//!
//! Persists the security audit trail in the `security_events` table.
//! The trail is append-only from the caller's point of view; the only
//! destructive operation is retention-driven deletion.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sd_core::domain::entities::audit::{SecurityEvent, SecurityEventKind};
use sd_core::errors::DomainError;
use sd_core::repositories::SecurityEventRepository;

const SELECT_COLUMNS: &str = "id, kind, user_id, ip_address, user_agent, session_id, \
     device_fingerprint, geolocation, reason, details, created_at";

/// MySQL implementation of SecurityEventRepository
pub struct MySqlSecurityEventRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlSecurityEventRepository {
    /// Create a new MySQL security event repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a SecurityEvent entity
    fn row_to_event(row: &sqlx::mysql::MySqlRow) -> Result<SecurityEvent, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get id: {}", e),
        })?;

        let kind: String = row.try_get("kind").map_err(|e| DomainError::Internal {
            message: format!("Failed to get kind: {}", e),
        })?;

        let user_id: Option<String> = row.try_get("user_id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get user_id: {}", e),
        })?;
        let user_id = user_id
            .map(|id| Uuid::parse_str(&id))
            .transpose()
            .map_err(|e| DomainError::Internal {
                message: format!("Invalid user UUID: {}", e),
            })?;

        // Details are stored as serialized JSON text
        let details: Option<String> = row.try_get("details").map_err(|e| DomainError::Internal {
            message: format!("Failed to get details: {}", e),
        })?;
        let details = details
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|e| DomainError::Internal {
                message: format!("Invalid details JSON: {}", e),
            })?;

        Ok(SecurityEvent {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid event UUID: {}", e),
            })?,
            kind: SecurityEventKind::from_str(&kind),
            user_id,
            ip_address: row
                .try_get("ip_address")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get ip_address: {}", e),
                })?,
            user_agent: row
                .try_get("user_agent")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get user_agent: {}", e),
                })?,
            session_id: row
                .try_get("session_id")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get session_id: {}", e),
                })?,
            device_fingerprint: row.try_get("device_fingerprint").map_err(|e| {
                DomainError::Internal {
                    message: format!("Failed to get device_fingerprint: {}", e),
                }
            })?,
            geolocation: row
                .try_get("geolocation")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get geolocation: {}", e),
                })?,
            reason: row.try_get("reason").map_err(|e| DomainError::Internal {
                message: format!("Failed to get reason: {}", e),
            })?,
            details,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
        })
    }

    fn rows_to_events(rows: &[sqlx::mysql::MySqlRow]) -> Result<Vec<SecurityEvent>, DomainError> {
        rows.iter()
            .map(Self::row_to_event)
            .collect::<Result<Vec<_>, _>>()
    }
}

#[async_trait]
impl SecurityEventRepository for MySqlSecurityEventRepository {
    async fn insert(&self, event: &SecurityEvent) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO security_events (
                id, kind, user_id, ip_address, user_agent, session_id,
                device_fingerprint, geolocation, reason, details, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let details_json = event
            .details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to serialize details: {}", e),
            })?;

        sqlx::query(query)
            .bind(event.id.to_string())
            .bind(event.kind.as_str())
            .bind(event.user_id.map(|id| id.to_string()))
            .bind(&event.ip_address)
            .bind(&event.user_agent)
            .bind(&event.session_id)
            .bind(&event.device_fingerprint)
            .bind(&event.geolocation)
            .bind(&event.reason)
            .bind(details_json)
            .bind(event.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to insert security event: {}", e),
            })?;

        Ok(())
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SecurityEvent>, DomainError> {
        let query = format!(
            r#"
            SELECT {}
            FROM security_events
            WHERE user_id = ?
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find events by user: {}", e),
            })?;

        Self::rows_to_events(&rows)
    }

    async fn find_by_user_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<SecurityEvent>, DomainError> {
        let query = format!(
            r#"
            SELECT {}
            FROM security_events
            WHERE user_id = ?
            AND created_at >= ?
            ORDER BY created_at DESC
            "#,
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(since)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find events by user since: {}", e),
            })?;

        Self::rows_to_events(&rows)
    }

    async fn find_by_ip_since(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SecurityEvent>, DomainError> {
        let query = format!(
            r#"
            SELECT {}
            FROM security_events
            WHERE ip_address = ?
            AND created_at >= ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(ip_address)
            .bind(since)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find events by ip: {}", e),
            })?;

        Self::rows_to_events(&rows)
    }

    async fn find_since(&self, since: DateTime<Utc>) -> Result<Vec<SecurityEvent>, DomainError> {
        let query = format!(
            r#"
            SELECT {}
            FROM security_events
            WHERE created_at >= ?
            ORDER BY created_at DESC
            "#,
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(since)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find events since: {}", e),
            })?;

        Self::rows_to_events(&rows)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let query = r#"
            DELETE FROM security_events
            WHERE created_at < ?
        "#;

        let result = sqlx::query(query)
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to delete old events: {}", e),
            })?;

        Ok(result.rows_affected())
    }
}
