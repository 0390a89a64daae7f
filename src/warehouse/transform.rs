//! Staging-to-warehouse transformations
//!
//! Set-based INSERT ... SELECT statements that reshape the staging tables
//! into the star schema. Dimensions populate first; the fact insert is the
//! last statement because songplays declares foreign keys into every
//! dimension. All statements are deterministic given identical staging
//! contents, and every target is assumed freshly recreated (the inserts do
//! plain set deduplication, not upserts).

use super::Statement;

/// Unique per user_id, keeping the most recent event per user so the level
/// column reflects the user's last-known subscription tier. A plain
/// SELECT DISTINCT would emit one row per (user, level) pair and violate the
/// primary key whenever a user switched between free and paid mid-window.
const USERS_INSERT: &str = r#"
INSERT INTO users (user_id, first_name, last_name, gender, level)
SELECT user_id, first_name, last_name, gender, level
FROM (
    SELECT user_id, first_name, last_name, gender, level,
           ROW_NUMBER() OVER (PARTITION BY user_id ORDER BY ts DESC) AS recency
    FROM staging_events
    WHERE page = 'NextSong'
      AND user_id IS NOT NULL
) AS ranked
WHERE recency = 1
"#;

const SONGS_INSERT: &str = r#"
INSERT INTO songs (song_id, title, artist_id, year, duration)
SELECT DISTINCT song_id, title, artist_id, year, duration
FROM staging_songs
WHERE song_id IS NOT NULL
"#;

const ARTISTS_INSERT: &str = r#"
INSERT INTO artists (artist_id, name, location, latitude, longitude)
SELECT DISTINCT artist_id, artist_name, artist_location, artist_latitude, artist_longitude
FROM staging_songs
WHERE artist_id IS NOT NULL
"#;

/// One row per distinct playback timestamp. Only NextSong events feed the
/// fact table, so only their timestamps are broken out here.
const TIMES_INSERT: &str = r#"
INSERT INTO times (start_time, hour, day, week, month, year, weekday)
SELECT DISTINCT
    ts,
    EXTRACT(HOUR FROM ts)::INTEGER,
    EXTRACT(DAY FROM ts)::INTEGER,
    EXTRACT(WEEK FROM ts)::INTEGER,
    EXTRACT(MONTH FROM ts)::INTEGER,
    EXTRACT(YEAR FROM ts)::INTEGER,
    EXTRACT(WEEKDAY FROM ts)::INTEGER
FROM staging_events
WHERE page = 'NextSong'
  AND ts IS NOT NULL
"#;

/// Fact rows come only from NextSong events that match a song on
/// (artist name, title, duration). Events with no metadata match are
/// excluded, which is lossy by design: the warehouse answers questions
/// about the catalogued library, not about every log line.
const SONGPLAYS_INSERT: &str = r#"
INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
SELECT DISTINCT
    e.ts,
    e.user_id,
    e.level,
    s.song_id,
    s.artist_id,
    e.session_id,
    e.location,
    e.user_agent
FROM staging_events e
JOIN staging_songs s
  ON e.artist = s.artist_name
 AND e.song = s.title
 AND e.length = s.duration
WHERE e.page = 'NextSong'
  AND e.user_id IS NOT NULL
  AND e.ts IS NOT NULL
"#;

/// Warehouse inserts, dimensions first, fact table last
pub fn insert_statements() -> Vec<Statement> {
    vec![
        Statement::new("users", USERS_INSERT),
        Statement::new("songs", SONGS_INSERT),
        Statement::new("artists", ARTISTS_INSERT),
        Statement::new("times", TIMES_INSERT),
        Statement::new("songplays", SONGPLAYS_INSERT),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_insert_is_last() {
        let inserts = insert_statements();
        assert_eq!(inserts.len(), 5);
        assert_eq!(inserts.last().unwrap().table, "songplays");
        for statement in &inserts[..4] {
            assert_ne!(statement.table, "songplays");
        }
    }

    #[test]
    fn test_fact_rows_filtered_to_next_song() {
        assert!(SONGPLAYS_INSERT.contains("e.page = 'NextSong'"));
    }

    #[test]
    fn test_fact_join_matches_song_metadata() {
        assert!(SONGPLAYS_INSERT.contains("e.artist = s.artist_name"));
        assert!(SONGPLAYS_INSERT.contains("e.song = s.title"));
        assert!(SONGPLAYS_INSERT.contains("e.length = s.duration"));
    }

    #[test]
    fn test_inserts_deduplicate() {
        assert!(SONGS_INSERT.contains("SELECT DISTINCT"));
        assert!(ARTISTS_INSERT.contains("SELECT DISTINCT"));
        assert!(TIMES_INSERT.contains("SELECT DISTINCT"));
        assert!(SONGPLAYS_INSERT.contains("SELECT DISTINCT"));
    }

    #[test]
    fn test_users_keep_latest_level() {
        // DISTINCT is not enough for users: the level changes over time and
        // the dimension must hold exactly one row per user_id.
        assert!(USERS_INSERT.contains("ROW_NUMBER() OVER (PARTITION BY user_id ORDER BY ts DESC)"));
        assert!(USERS_INSERT.contains("recency = 1"));
    }

    #[test]
    fn test_users_derived_table_is_aliased() {
        // The engine rejects an unaliased subquery in FROM outright, which
        // would fail the first statement of the whole insert sequence.
        assert!(USERS_INSERT.contains(") AS ranked"));
    }

    #[test]
    fn test_times_sourced_from_playback_timestamps() {
        assert!(TIMES_INSERT.contains("page = 'NextSong'"));
        assert!(TIMES_INSERT.contains("EXTRACT(WEEKDAY FROM ts)"));
    }

    #[test]
    fn test_null_keys_excluded() {
        assert!(USERS_INSERT.contains("user_id IS NOT NULL"));
        assert!(SONGS_INSERT.contains("song_id IS NOT NULL"));
        assert!(ARTISTS_INSERT.contains("artist_id IS NOT NULL"));
        assert!(SONGPLAYS_INSERT.contains("e.user_id IS NOT NULL"));
    }
}
