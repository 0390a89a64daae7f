//! Warehouse schema definitions
//!
//! Static DDL for the two staging tables, the four dimension tables and the
//! songplays fact table. Creates run in dependency order (staging, then
//! dimensions, then the fact table, which references the dimensions by
//! foreign key); drops run in the reverse order. Every drop is `IF EXISTS`
//! and every create is `IF NOT EXISTS`, so a schema reset is safe to run
//! against any prior state, including an empty database.
//!
//! Dimension tables are small and broadcast to every compute node
//! (DISTSTYLE ALL); the fact table is distributed by song_id.

use super::Statement;

/// Every warehouse table, in create order
pub const TABLES: [&str; 7] = [
    "staging_events",
    "staging_songs",
    "users",
    "songs",
    "artists",
    "times",
    "songplays",
];

/// Landing zone for raw app-activity log lines. Column order matches the
/// jsonpaths document used by the COPY command.
const STAGING_EVENTS: &str = r#"
CREATE TABLE IF NOT EXISTS staging_events (
    artist          VARCHAR(512),
    auth            VARCHAR(32),
    first_name      VARCHAR(128),
    gender          VARCHAR(8),
    item_in_session INTEGER,
    last_name       VARCHAR(128),
    length          NUMERIC(10, 5),
    level           VARCHAR(16),
    location        VARCHAR(512),
    method          VARCHAR(8),
    page            VARCHAR(64),
    registration    BIGINT,
    session_id      INTEGER,
    song            VARCHAR(512),
    status          INTEGER,
    ts              TIMESTAMP,
    user_agent      VARCHAR(512),
    user_id         INTEGER
)
"#;

/// Landing zone for raw song-metadata records. Field names in the source
/// JSON already match these column names, so the COPY uses JSON 'auto'.
const STAGING_SONGS: &str = r#"
CREATE TABLE IF NOT EXISTS staging_songs (
    num_songs        INTEGER,
    artist_id        VARCHAR(32),
    artist_latitude  DOUBLE PRECISION,
    artist_longitude DOUBLE PRECISION,
    artist_location  VARCHAR(512),
    artist_name      VARCHAR(512),
    song_id          VARCHAR(32),
    title            VARCHAR(512),
    duration         NUMERIC(10, 5),
    year             INTEGER
)
"#;

const USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id    INTEGER PRIMARY KEY,
    first_name VARCHAR(128),
    last_name  VARCHAR(128),
    gender     VARCHAR(8),
    level      VARCHAR(16)
) DISTSTYLE ALL
"#;

const SONGS: &str = r#"
CREATE TABLE IF NOT EXISTS songs (
    song_id   VARCHAR(32) PRIMARY KEY,
    title     VARCHAR(512) NOT NULL,
    artist_id VARCHAR(32) NOT NULL,
    year      INTEGER,
    duration  NUMERIC(10, 5)
) DISTSTYLE ALL
"#;

const ARTISTS: &str = r#"
CREATE TABLE IF NOT EXISTS artists (
    artist_id VARCHAR(32) PRIMARY KEY,
    name      VARCHAR(512) NOT NULL,
    location  VARCHAR(512),
    latitude  DOUBLE PRECISION,
    longitude DOUBLE PRECISION
) DISTSTYLE ALL
"#;

/// Keyed by distinct start_time. A listening session spans many timestamps,
/// so session_id cannot be the key here.
const TIMES: &str = r#"
CREATE TABLE IF NOT EXISTS times (
    start_time TIMESTAMP PRIMARY KEY SORTKEY,
    hour       INTEGER NOT NULL,
    day        INTEGER NOT NULL,
    week       INTEGER NOT NULL,
    month      INTEGER NOT NULL,
    year       INTEGER NOT NULL,
    weekday    INTEGER NOT NULL
) DISTSTYLE ALL
"#;

/// Fact table: one row per NextSong event that matched a song in the
/// metadata. Created last, dropped first (foreign keys).
const SONGPLAYS: &str = r#"
CREATE TABLE IF NOT EXISTS songplays (
    songplay_id BIGINT IDENTITY(0, 1) PRIMARY KEY,
    start_time  TIMESTAMP NOT NULL REFERENCES times (start_time) SORTKEY,
    user_id     INTEGER NOT NULL REFERENCES users (user_id),
    level       VARCHAR(16),
    song_id     VARCHAR(32) NOT NULL REFERENCES songs (song_id) DISTKEY,
    artist_id   VARCHAR(32) NOT NULL REFERENCES artists (artist_id),
    session_id  INTEGER,
    location    VARCHAR(512),
    user_agent  VARCHAR(512)
)
"#;

/// Table creates, in dependency order (fact table last)
pub fn create_statements() -> Vec<Statement> {
    vec![
        Statement::new("staging_events", STAGING_EVENTS),
        Statement::new("staging_songs", STAGING_SONGS),
        Statement::new("users", USERS),
        Statement::new("songs", SONGS),
        Statement::new("artists", ARTISTS),
        Statement::new("times", TIMES),
        Statement::new("songplays", SONGPLAYS),
    ]
}

/// Table drops, in reverse dependency order (fact table first).
/// Safe against tables that do not exist.
pub fn drop_statements() -> Vec<Statement> {
    TABLES
        .iter()
        .rev()
        .map(|&table| Statement {
            table,
            sql: format!("DROP TABLE IF EXISTS {table}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_statement_per_table() {
        assert_eq!(create_statements().len(), TABLES.len());
        assert_eq!(drop_statements().len(), TABLES.len());
    }

    #[test]
    fn test_create_order_fact_last() {
        let creates = create_statements();
        assert_eq!(creates[0].table, "staging_events");
        assert_eq!(creates[1].table, "staging_songs");
        assert_eq!(creates.last().unwrap().table, "songplays");
    }

    #[test]
    fn test_drop_order_fact_first() {
        let drops = drop_statements();
        assert_eq!(drops[0].table, "songplays");
        assert_eq!(drops.last().unwrap().table, "staging_events");
    }

    #[test]
    fn test_drops_are_idempotent() {
        for statement in drop_statements() {
            assert!(
                statement.sql.contains("DROP TABLE IF EXISTS"),
                "drop for {} must tolerate a missing table",
                statement.table
            );
        }
    }

    #[test]
    fn test_creates_are_idempotent() {
        for statement in create_statements() {
            assert!(
                statement.sql.contains("CREATE TABLE IF NOT EXISTS"),
                "create for {} must tolerate an existing table",
                statement.table
            );
        }
    }

    #[test]
    fn test_dimensions_are_broadcast() {
        for statement in create_statements() {
            let is_dimension = matches!(statement.table, "users" | "songs" | "artists" | "times");
            assert_eq!(
                statement.sql.contains("DISTSTYLE ALL"),
                is_dimension,
                "unexpected diststyle on {}",
                statement.table
            );
        }
    }

    #[test]
    fn test_fact_references_dimensions() {
        assert!(SONGPLAYS.contains("REFERENCES times (start_time)"));
        assert!(SONGPLAYS.contains("REFERENCES users (user_id)"));
        assert!(SONGPLAYS.contains("REFERENCES songs (song_id)"));
        assert!(SONGPLAYS.contains("REFERENCES artists (artist_id)"));
    }

    #[test]
    fn test_time_dimension_keyed_by_start_time() {
        assert!(TIMES.contains("start_time TIMESTAMP PRIMARY KEY"));
        assert!(!TIMES.contains("session_id"));
    }
}
