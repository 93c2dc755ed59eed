pub const SCHEMA: &str = r#"
-- Mirror of identities owned by the external identity provider.
-- Analyses reference it so ownership is enforced by the engine.
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

-- One row per analysis result. Append-only; no ON DELETE action, so an
-- owner cannot be removed while their analyses exist.
CREATE TABLE IF NOT EXISTS analyses (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    player_number TEXT,
    team TEXT,
    jersey_color TEXT,
    analysis_text TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_analyses_user ON analyses(user_id);

CREATE TRIGGER IF NOT EXISTS analyses_immutable_keys
BEFORE UPDATE OF id, created_at ON analyses
BEGIN
    SELECT RAISE(ABORT, 'analyses.id and analyses.created_at are immutable');
END;
"#;
