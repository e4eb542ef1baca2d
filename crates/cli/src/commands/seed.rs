//! Demo data loader.
//!
//! Fills a fresh database with enough content to click around the
//! dashboard and the mobile app: a few groups, upcoming events, a
//! handful of published sermons, and default settings.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn database_url() -> Result<String, SeedError> {
    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| SeedError::MissingEnvVar("ADMIN_DATABASE_URL or DATABASE_URL"))
}

const GROUPS: &[(&str, &str, &str)] = &[
    (
        "Young Adults",
        "Community for folks in their twenties and thirties.",
        "Tuesday",
    ),
    (
        "Women's Bible Study",
        "Weekly study through one book at a time.",
        "Wednesday",
    ),
    (
        "Men's Breakfast",
        "Food and honest conversation, first Saturday monthly.",
        "Saturday",
    ),
];

const SERMONS: &[(&str, &str, &str)] = &[
    ("The Prodigal's Father", "Pastor Dan Whitfield", "Luke 15:11-32"),
    ("Rooted and Built Up", "Pastor Dan Whitfield", "Colossians 2:6-7"),
    ("A Living Hope", "Sarah Okafor", "1 Peter 1:3-9"),
];

/// Insert demo rows into the shared database.
///
/// Safe to re-run; every insert skips rows that already exist.
///
/// # Errors
///
/// Returns an error when the database URL is missing or a query fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let url = database_url()?;
    let pool = PgPool::connect(&url).await?;

    seed_groups(&pool).await?;
    seed_events(&pool).await?;
    seed_sermons(&pool).await?;
    seed_settings(&pool).await?;

    tracing::info!("Seed complete");
    Ok(())
}

async fn seed_groups(pool: &PgPool) -> Result<(), SeedError> {
    for (name, description, meeting_day) in GROUPS {
        let inserted = sqlx::query(
            "INSERT INTO groups (id, name, description, meeting_day)
             SELECT $1, $2, $3, $4
             WHERE NOT EXISTS (SELECT 1 FROM groups WHERE name = $2)",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(meeting_day)
        .execute(pool)
        .await?;
        if inserted.rows_affected() > 0 {
            tracing::info!(group = name, "Seeded group");
        }
    }
    Ok(())
}

async fn seed_events(pool: &PgPool) -> Result<(), SeedError> {
    let now = Utc::now();
    let events = [
        (
            "Sunday Gathering",
            "Weekly worship service.",
            "Main Hall",
            now + Duration::days(3),
        ),
        (
            "Community Dinner",
            "Bring a dish to share.",
            "Fellowship Room",
            now + Duration::days(10),
        ),
        (
            "Serve Day",
            "Neighborhood cleanup and food bank shift.",
            "Parking Lot",
            now + Duration::days(17),
        ),
    ];

    for (title, description, location, starts_at) in events {
        let inserted = sqlx::query(
            "INSERT INTO events (id, title, description, location, starts_at, ends_at, status)
             SELECT $1, $2, $3, $4, $5, $6, 'published'
             WHERE NOT EXISTS (SELECT 1 FROM events WHERE title = $2)",
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(description)
        .bind(location)
        .bind(starts_at)
        .bind(starts_at + Duration::hours(2))
        .execute(pool)
        .await?;
        if inserted.rows_affected() > 0 {
            tracing::info!(event = title, "Seeded event");
        }
    }
    Ok(())
}

async fn seed_sermons(pool: &PgPool) -> Result<(), SeedError> {
    let mut preached_on = Utc::now().date_naive();
    for (title, speaker, scripture) in SERMONS {
        preached_on -= Duration::days(7);
        let inserted = sqlx::query(
            "INSERT INTO sermons (id, title, speaker, scripture_reference, preached_on, is_published)
             SELECT $1, $2, $3, $4, $5, TRUE
             WHERE NOT EXISTS (SELECT 1 FROM sermons WHERE title = $2)",
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(speaker)
        .bind(scripture)
        .bind(preached_on)
        .execute(pool)
        .await?;
        if inserted.rows_affected() > 0 {
            tracing::info!(sermon = title, "Seeded sermon");
        }
    }
    Ok(())
}

async fn seed_settings(pool: &PgPool) -> Result<(), SeedError> {
    sqlx::query(
        r#"INSERT INTO settings (key, value)
         VALUES ('branding', '{"churchName": "Wayside Church"}'::jsonb),
                ('giving', '{"funds": ["General", "Missions", "Building"]}'::jsonb)
         ON CONFLICT (key) DO NOTHING"#,
    )
    .execute(pool)
    .await?;
    Ok(())
}
