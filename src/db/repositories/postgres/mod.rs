//! Postgres repository implementation using Diesel.
//!
//! Connection pooling with r2d2, embedded migrations, and blocking queries
//! executed on the tokio blocking pool. The replace-all availability save
//! and the barber-delete cascade each run inside a single transaction, so
//! readers never observe a mix of old and new rows.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task;
use uuid::Uuid;

use crate::db::models::{AppointmentFilter, AvailabilityRow, DateOverrideRow};
use crate::db::repository::{
    AppointmentRepository, AvailabilityRepository, BarberRepository, CatalogRepository,
    ErrorContext, FullRepository, NotificationRepository, RepositoryError, RepositoryResult,
    TimeOffRepository,
};
use crate::models::{Appointment, Barber, BarberId, Notification, ServiceItem, TimeOffEntry};

mod models;
mod schema;

use models::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

const FEED_CAPACITY: usize = 64;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
pub struct PostgresRepository {
    pool: PgPool,
    feed: broadcast::Sender<Notification>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub async fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .build(manager)?;

        let migration_pool = pool.clone();
        task::spawn_blocking(move || -> RepositoryResult<()> {
            let mut conn = migration_pool.get()?;
            conn.run_pending_migrations(MIGRATIONS)
                .map_err(|e| RepositoryError::configuration(format!("migrations failed: {}", e)))?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;

        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Ok(Self { pool, feed })
    }

    /// Run a blocking Diesel closure on the blocking pool.
    async fn run<F, T>(&self, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))?
    }
}

fn barber_exists(conn: &mut PgConnection, id: Uuid) -> RepositoryResult<bool> {
    use schema::barbers::dsl as b;
    let found = diesel::select(diesel::dsl::exists(b::barbers.filter(b::id.eq(id))))
        .get_result::<bool>(conn)?;
    Ok(found)
}

fn barber_not_found(id: BarberId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        "barber does not exist",
        ErrorContext::default().with_entity("barber").with_entity_id(id),
    )
}

#[async_trait]
impl BarberRepository for PostgresRepository {
    async fn list_barbers(&self) -> RepositoryResult<Vec<Barber>> {
        use schema::barbers::dsl as b;
        self.run(|conn| {
            let rows = b::barbers
                .order((b::name.asc(), b::id.asc()))
                .load::<BarberRow>(conn)?;
            Ok(rows.into_iter().map(Barber::from).collect())
        })
        .await
    }

    async fn get_barber(&self, id: BarberId) -> RepositoryResult<Barber> {
        use schema::barbers::dsl as b;
        self.run(move |conn| {
            b::barbers
                .find(id.value())
                .first::<BarberRow>(conn)
                .optional()?
                .map(Barber::from)
                .ok_or_else(|| barber_not_found(id))
        })
        .await
    }

    async fn insert_barber(&self, barber: &Barber) -> RepositoryResult<()> {
        let row = BarberRow::from(barber);
        self.run(move |conn| {
            diesel::insert_into(schema::barbers::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn delete_barber(&self, id: BarberId) -> RepositoryResult<()> {
        self.run(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|conn| {
                use schema::{
                    barbers, date_overrides, notifications, time_off, weekly_availability,
                };

                diesel::delete(
                    notifications::table.filter(notifications::barber_id.eq(id.value())),
                )
                .execute(conn)?;
                diesel::delete(time_off::table.filter(time_off::barber_id.eq(id.value())))
                    .execute(conn)?;
                diesel::delete(
                    date_overrides::table.filter(date_overrides::barber_id.eq(id.value())),
                )
                .execute(conn)?;
                diesel::delete(
                    weekly_availability::table
                        .filter(weekly_availability::barber_id.eq(id.value())),
                )
                .execute(conn)?;

                let deleted =
                    diesel::delete(barbers::table.filter(barbers::id.eq(id.value())))
                        .execute(conn)?;
                if deleted == 0 {
                    return Err(barber_not_found(id));
                }
                Ok(())
            })
        })
        .await
    }

    async fn count_barbers(&self) -> RepositoryResult<usize> {
        use schema::barbers::dsl as b;
        self.run(|conn| {
            let count: i64 = b::barbers.count().get_result(conn)?;
            Ok(count as usize)
        })
        .await
    }
}

#[async_trait]
impl AvailabilityRepository for PostgresRepository {
    async fn fetch_weekly_rows(
        &self,
        barber_id: BarberId,
    ) -> RepositoryResult<Vec<AvailabilityRow>> {
        use schema::weekly_availability::dsl as w;
        self.run(move |conn| {
            let rows = w::weekly_availability
                .filter(w::barber_id.eq(barber_id.value()))
                .order(w::weekday.asc())
                .load::<WeeklyAvailabilityRow>(conn)?;
            rows.into_iter().map(|row| row.into_domain()).collect()
        })
        .await
    }

    async fn fetch_date_overrides(
        &self,
        barber_id: BarberId,
    ) -> RepositoryResult<Vec<DateOverrideRow>> {
        use schema::date_overrides::dsl as d;
        self.run(move |conn| {
            let rows = d::date_overrides
                .filter(d::barber_id.eq(barber_id.value()))
                .order(d::date.asc())
                .load::<DateOverrideDbRow>(conn)?;
            rows.into_iter().map(|row| row.into_domain()).collect()
        })
        .await
    }

    async fn replace_availability(
        &self,
        barber_id: BarberId,
        weekly: Vec<AvailabilityRow>,
        overrides: Vec<DateOverrideRow>,
    ) -> RepositoryResult<()> {
        let weekly_rows: Vec<WeeklyAvailabilityRow> = weekly
            .iter()
            .map(WeeklyAvailabilityRow::from_domain)
            .collect::<RepositoryResult<_>>()?;
        let override_rows: Vec<DateOverrideDbRow> = overrides
            .iter()
            .map(DateOverrideDbRow::from_domain)
            .collect::<RepositoryResult<_>>()?;

        self.run(move |conn| {
            // Delete-then-insert as one transaction: the store holds either
            // the old full set or the new one, never a mix.
            conn.transaction::<_, RepositoryError, _>(|conn| {
                use schema::{date_overrides, weekly_availability};

                if !barber_exists(conn, barber_id.value())? {
                    return Err(barber_not_found(barber_id));
                }

                diesel::delete(
                    weekly_availability::table
                        .filter(weekly_availability::barber_id.eq(barber_id.value())),
                )
                .execute(conn)?;
                diesel::delete(
                    date_overrides::table
                        .filter(date_overrides::barber_id.eq(barber_id.value())),
                )
                .execute(conn)?;

                diesel::insert_into(weekly_availability::table)
                    .values(&weekly_rows)
                    .execute(conn)?;
                diesel::insert_into(date_overrides::table)
                    .values(&override_rows)
                    .execute(conn)?;
                Ok(())
            })
        })
        .await
    }
}

#[async_trait]
impl TimeOffRepository for PostgresRepository {
    async fn list_time_off(&self, barber_id: BarberId) -> RepositoryResult<Vec<TimeOffEntry>> {
        use schema::time_off::dsl as t;
        self.run(move |conn| {
            let rows = t::time_off
                .filter(t::barber_id.eq(barber_id.value()))
                .order((t::date.asc(), t::id.asc()))
                .load::<TimeOffRow>(conn)?;
            Ok(rows.into_iter().map(TimeOffEntry::from).collect())
        })
        .await
    }

    async fn insert_time_off(&self, entry: &TimeOffEntry) -> RepositoryResult<()> {
        let row = TimeOffRow::from(entry);
        let barber_id = entry.barber_id;
        self.run(move |conn| {
            if !barber_exists(conn, barber_id.value())? {
                return Err(barber_not_found(barber_id));
            }
            diesel::insert_into(schema::time_off::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn delete_time_off(&self, entry_id: Uuid) -> RepositoryResult<()> {
        use schema::time_off::dsl as t;
        self.run(move |conn| {
            let deleted = diesel::delete(t::time_off.filter(t::id.eq(entry_id))).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "time-off entry does not exist",
                    ErrorContext::default()
                        .with_entity("time_off")
                        .with_entity_id(entry_id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn time_off_exists(
        &self,
        barber_id: BarberId,
        date: NaiveDate,
    ) -> RepositoryResult<bool> {
        use schema::time_off::dsl as t;
        self.run(move |conn| {
            let found = diesel::select(diesel::dsl::exists(
                t::time_off
                    .filter(t::barber_id.eq(barber_id.value()))
                    .filter(t::date.eq(date)),
            ))
            .get_result::<bool>(conn)?;
            Ok(found)
        })
        .await
    }
}

#[async_trait]
impl CatalogRepository for PostgresRepository {
    async fn list_services(&self) -> RepositoryResult<Vec<ServiceItem>> {
        use schema::services::dsl as s;
        self.run(|conn| {
            let rows = s::services
                .order((s::name.asc(), s::id.asc()))
                .load::<ServiceRow>(conn)?;
            rows.into_iter().map(|row| row.into_domain()).collect()
        })
        .await
    }

    async fn insert_service(&self, service: &ServiceItem) -> RepositoryResult<()> {
        let row = ServiceRow::from(service);
        self.run(move |conn| {
            diesel::insert_into(schema::services::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn update_service(&self, service: &ServiceItem) -> RepositoryResult<()> {
        use schema::services::dsl as s;
        let row = ServiceRow::from(service);
        let id = service.id;
        self.run(move |conn| {
            let updated = diesel::update(s::services.filter(s::id.eq(id)))
                .set(&row)
                .execute(conn)?;
            if updated == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "service does not exist",
                    ErrorContext::default().with_entity("service").with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn delete_service(&self, id: Uuid) -> RepositoryResult<()> {
        use schema::services::dsl as s;
        self.run(move |conn| {
            let deleted = diesel::delete(s::services.filter(s::id.eq(id))).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "service does not exist",
                    ErrorContext::default().with_entity("service").with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl AppointmentRepository for PostgresRepository {
    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> RepositoryResult<Vec<Appointment>> {
        use schema::appointments::dsl as a;
        let filter = filter.clone();
        self.run(move |conn| {
            let mut query = a::appointments.into_boxed();
            if let Some(status) = filter.status {
                let status = match status {
                    crate::models::AppointmentStatus::Pending => "pending",
                    crate::models::AppointmentStatus::Confirmed => "confirmed",
                    crate::models::AppointmentStatus::Cancelled => "cancelled",
                };
                query = query.filter(a::status.eq(status));
            }
            if let Some(barber_id) = filter.barber_id {
                query = query.filter(a::barber_id.eq(barber_id.value()));
            }
            if let Some(needle) = filter.client_contains {
                query = query.filter(a::client_name.ilike(format!("%{}%", needle)));
            }
            let rows = query
                .order((a::date.asc(), a::time_of_day.asc(), a::id.asc()))
                .load::<AppointmentRow>(conn)?;
            rows.into_iter().map(|row| row.into_domain()).collect()
        })
        .await
    }

    async fn get_appointment(&self, id: Uuid) -> RepositoryResult<Appointment> {
        use schema::appointments::dsl as a;
        self.run(move |conn| {
            a::appointments
                .find(id)
                .first::<AppointmentRow>(conn)
                .optional()?
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        "appointment does not exist",
                        ErrorContext::default()
                            .with_entity("appointment")
                            .with_entity_id(id),
                    )
                })?
                .into_domain()
        })
        .await
    }

    async fn insert_appointment(&self, appointment: &Appointment) -> RepositoryResult<()> {
        let row = AppointmentRow::from(appointment);
        self.run(move |conn| {
            diesel::insert_into(schema::appointments::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn update_appointment(&self, appointment: &Appointment) -> RepositoryResult<()> {
        use schema::appointments::dsl as a;
        let row = AppointmentRow::from(appointment);
        let id = appointment.id;
        self.run(move |conn| {
            let updated = diesel::update(a::appointments.filter(a::id.eq(id)))
                .set(&row)
                .execute(conn)?;
            if updated == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "appointment does not exist",
                    ErrorContext::default()
                        .with_entity("appointment")
                        .with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl NotificationRepository for PostgresRepository {
    async fn list_notifications(
        &self,
        barber_id: BarberId,
    ) -> RepositoryResult<Vec<Notification>> {
        use schema::notifications::dsl as n;
        self.run(move |conn| {
            let rows = n::notifications
                .filter(n::barber_id.eq(barber_id.value()))
                .order((n::created_at.desc(), n::id.asc()))
                .load::<NotificationRow>(conn)?;
            Ok(rows.into_iter().map(Notification::from).collect())
        })
        .await
    }

    async fn insert_notification(&self, notification: &Notification) -> RepositoryResult<()> {
        let row = NotificationRow::from(notification);
        let barber_id = notification.barber_id;
        self.run(move |conn| {
            if !barber_exists(conn, barber_id.value())? {
                return Err(barber_not_found(barber_id));
            }
            diesel::insert_into(schema::notifications::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await?;
        // Per-process feed; cross-process listeners ride the store's own
        // replication stream instead.
        let _ = self.feed.send(notification.clone());
        Ok(())
    }

    async fn mark_notification_read(&self, id: Uuid) -> RepositoryResult<()> {
        use schema::notifications::dsl as n;
        self.run(move |conn| {
            let updated = diesel::update(n::notifications.filter(n::id.eq(id)))
                .set(n::read.eq(true))
                .execute(conn)?;
            if updated == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "notification does not exist",
                    ErrorContext::default()
                        .with_entity("notification")
                        .with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn mark_all_read(&self, barber_id: BarberId) -> RepositoryResult<usize> {
        use schema::notifications::dsl as n;
        self.run(move |conn| {
            let updated = diesel::update(
                n::notifications
                    .filter(n::barber_id.eq(barber_id.value()))
                    .filter(n::read.eq(false)),
            )
            .set(n::read.eq(true))
            .execute(conn)?;
            Ok(updated)
        })
        .await
    }

    fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.feed.subscribe()
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.run(|conn| {
            sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }
}
