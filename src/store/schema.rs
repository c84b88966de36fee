//! PostgreSQL DDL
//!
//! Statements are idempotent and run once at startup.

use sqlx::PgPool;

const CREATE_TRANSFERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transfers_tb (
    id                        UUID PRIMARY KEY,
    amount                    NUMERIC NOT NULL CHECK (amount > 0),
    currency                  VARCHAR(8) NOT NULL,
    recipient_name            VARCHAR(256) NOT NULL,
    recipient_phone           VARCHAR(64) NOT NULL,
    sender_auth_session_id    BIGINT,
    receiver_auth_session_id  BIGINT,
    created_at                TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_AUTH_SESSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS auth_sessions_tb (
    id          BIGSERIAL PRIMARY KEY,
    user_id     BIGINT NOT NULL,
    public_key  VARCHAR(56) NOT NULL,
    token       TEXT,
    state       SMALLINT NOT NULL DEFAULT 0,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_KYC_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS kyc_tb (
    id               BIGSERIAL PRIMARY KEY,
    user_id          BIGINT NOT NULL,
    auth_session_id  BIGINT NOT NULL REFERENCES auth_sessions_tb(id),
    sep12_id         VARCHAR(128),
    status           VARCHAR(16) NOT NULL,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (auth_session_id, user_id)
)
"#;

const CREATE_HOSTED_DEPOSITS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS hosted_deposits_tb (
    id                 BIGSERIAL PRIMARY KEY,
    transfer_id        UUID NOT NULL REFERENCES transfers_tb(id),
    user_id            BIGINT NOT NULL,
    amount             NUMERIC NOT NULL,
    source_asset       VARCHAR(128) NOT NULL,
    destination_asset  VARCHAR(128) NOT NULL,
    method             VARCHAR(32) NOT NULL,
    sep6_id            VARCHAR(128) NOT NULL,
    created_at         TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_HOSTED_WITHDRAWALS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS hosted_withdrawals_tb (
    id                 BIGSERIAL PRIMARY KEY,
    transfer_id        UUID NOT NULL REFERENCES transfers_tb(id),
    user_id            BIGINT NOT NULL,
    amount             NUMERIC NOT NULL,
    source_asset       VARCHAR(128) NOT NULL,
    destination_asset  VARCHAR(128) NOT NULL,
    method             VARCHAR(32) NOT NULL,
    dest               VARCHAR(256) NOT NULL,
    sep6_id            VARCHAR(128) NOT NULL,
    created_at         TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_hosted_deposits_transfer ON hosted_deposits_tb (transfer_id)",
    "CREATE INDEX IF NOT EXISTS idx_hosted_withdrawals_transfer ON hosted_withdrawals_tb (transfer_id)",
];

/// Create all tables and indexes if they do not exist
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing PostgreSQL schema...");

    for ddl in [
        CREATE_TRANSFERS_TABLE,
        CREATE_AUTH_SESSIONS_TABLE,
        CREATE_KYC_TABLE,
        CREATE_HOSTED_DEPOSITS_TABLE,
        CREATE_HOSTED_WITHDRAWALS_TABLE,
    ]
    .into_iter()
    .chain(CREATE_INDEXES)
    {
        sqlx::query(ddl).execute(pool).await?;
    }

    tracing::info!("PostgreSQL schema initialized");
    Ok(())
}
