//! Database bootstrap: schema creation and startup seeding.

use anyhow::Result;
use chrono::Utc;
use rand::Rng;
use sqlx::SqlitePool;

/// Create every table this deployment needs. Statements are idempotent so
/// this runs unconditionally at startup.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            email TEXT,
            is_staff INTEGER NOT NULL DEFAULT 0,
            is_superuser INTEGER NOT NULL DEFAULT 0,
            enabled INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            expires_at INTEGER NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS user_permissions (
            user_id TEXT NOT NULL,
            codename TEXT NOT NULL,
            PRIMARY KEY (user_id, codename),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS stadiums (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            key TEXT NOT NULL UNIQUE,
            capacity INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS pitches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            stadium_id INTEGER NOT NULL UNIQUE REFERENCES stadiums(id) ON DELETE CASCADE,
            surface_type TEXT NOT NULL,
            width INTEGER NOT NULL,
            length INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            key TEXT NOT NULL UNIQUE,
            team_type TEXT NOT NULL DEFAULT 'CLUB',
            website TEXT,
            motto TEXT,
            description TEXT,
            stadium_id INTEGER REFERENCES stadiums(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS squads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            squad_type TEXT NOT NULL DEFAULT 'FIRST',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            key TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS squad_players (
            squad_id INTEGER NOT NULL REFERENCES squads(id) ON DELETE CASCADE,
            player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
            PRIMARY KEY (squad_id, player_id)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS player_attributes (
            player_id INTEGER PRIMARY KEY REFERENCES players(id) ON DELETE CASCADE,
            position TEXT NOT NULL,
            nationality TEXT NOT NULL,
            age INTEGER NOT NULL,
            score_defence INTEGER NOT NULL DEFAULT 50,
            score_midfield INTEGER NOT NULL DEFAULT 50,
            score_offence INTEGER NOT NULL DEFAULT 50,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS player_contracts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
            team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            valid_from TEXT NOT NULL,
            duration INTEGER NOT NULL,
            terms TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed the initial superuser when no superuser exists yet. The generated
/// password is printed once to the log.
pub async fn seed_admin_user(pool: &SqlitePool) -> Result<()> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_superuser = 1")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let password = generate_random_password(12);
    let hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)?;
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO users (id, username, password_hash, email, is_staff, is_superuser, enabled, created_at, updated_at)
         VALUES (?, ?, ?, ?, 1, 1, 1, ?, ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind("admin")
    .bind(&hash)
    .bind("admin@example.com")
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    tracing::info!("Created admin account 'admin' with password: {}", password);
    Ok(())
}

/// Seed a small club dataset on first start so the console has something
/// to show. Skipped once any team exists.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<()> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM teams")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let now = Utc::now().to_rfc3339();

    let northbank = sqlx::query(
        "INSERT INTO stadiums (name, key, capacity, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind("Northbank Arena")
    .bind("northbank-arena")
    .bind(60_432)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    let riverside = sqlx::query(
        "INSERT INTO stadiums (name, key, capacity, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind("Riverside Park")
    .bind("riverside-park")
    .bind(41_307)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    for (stadium_id, surface) in [(northbank, "GRASS"), (riverside, "HYBRID")] {
        sqlx::query(
            "INSERT INTO pitches (stadium_id, surface_type, width, length, created_at, updated_at)
             VALUES (?, ?, 6800, 10500, ?, ?)",
        )
        .bind(stadium_id)
        .bind(surface)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;
    }

    let united = sqlx::query(
        "INSERT INTO teams (name, key, team_type, website, motto, description, stadium_id, created_at, updated_at)
         VALUES (?, ?, 'CLUB', ?, ?, ?, ?, ?, ?)",
    )
    .bind("Northbank United")
    .bind("northbank-united")
    .bind("https://northbank-united.example.com")
    .bind("Forward together")
    .bind("Founded in 1892, playing at the Northbank Arena since 1913.")
    .bind(northbank)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    let rovers = sqlx::query(
        "INSERT INTO teams (name, key, team_type, website, motto, description, stadium_id, created_at, updated_at)
         VALUES (?, ?, 'CLUB', ?, ?, ?, ?, ?, ?)",
    )
    .bind("Riverside Rovers")
    .bind("riverside-rovers")
    .bind("https://riverside-rovers.example.com")
    .bind("Never stop rolling")
    .bind("A community club from the east bank, promoted twice in the last decade.")
    .bind(riverside)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    let mut player_ids = Vec::new();
    for (name, key) in [
        ("Dele Okafor", "dele-okafor"),
        ("Marc Visser", "marc-visser"),
        ("Tomas Lindqvist", "tomas-lindqvist"),
        ("Janko Novak", "janko-novak"),
    ] {
        let id = sqlx::query(
            "INSERT INTO players (name, key, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(key)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?
        .last_insert_rowid();
        player_ids.push(id);
    }

    for (player_id, position, nationality, age) in [
        (player_ids[0], "ST", "Nigerian", 24),
        (player_ids[1], "GK", "Dutch", 29),
    ] {
        sqlx::query(
            "INSERT INTO player_attributes (player_id, position, nationality, age, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(player_id)
        .bind(position)
        .bind(nationality)
        .bind(age)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;
    }

    let first_squad = sqlx::query(
        "INSERT INTO squads (team_id, squad_type, created_at, updated_at) VALUES (?, 'FIRST', ?, ?)",
    )
    .bind(united)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    let rovers_squad = sqlx::query(
        "INSERT INTO squads (team_id, squad_type, created_at, updated_at) VALUES (?, 'FIRST', ?, ?)",
    )
    .bind(rovers)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    for (squad_id, player_id) in [
        (first_squad, player_ids[0]),
        (first_squad, player_ids[1]),
        (rovers_squad, player_ids[2]),
        (rovers_squad, player_ids[3]),
    ] {
        sqlx::query("INSERT INTO squad_players (squad_id, player_id) VALUES (?, ?)")
            .bind(squad_id)
            .bind(player_id)
            .execute(pool)
            .await?;
    }

    sqlx::query(
        "INSERT INTO player_contracts (player_id, team_id, valid_from, duration, terms, created_at, updated_at)
         VALUES (?, ?, '2025-07-01', 3, 'Standard first-team terms with a release clause.', ?, ?)",
    )
    .bind(player_ids[0])
    .bind(united)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    for name in ["Editors", "Scouts"] {
        sqlx::query("INSERT INTO groups (name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await?;
    }

    tracing::info!("Seeded demo club data");
    Ok(())
}

pub fn generate_random_password(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
