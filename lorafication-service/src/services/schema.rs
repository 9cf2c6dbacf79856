/// Postgres schema, applied on every startup. Every statement is idempotent.
pub const SCHEMA: &str = r#"
CREATE EXTENSION IF NOT EXISTS "uuid-ossp";

CREATE TABLE IF NOT EXISTS node(
    public_key UUID PRIMARY KEY DEFAULT uuid_generate_v4(),
    secret UUID NOT NULL DEFAULT uuid_generate_v4(),
    name VARCHAR(255) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    modified TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS entity(
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    sms BIGINT,
    created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    modified TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT notify_channels_check CHECK (email IS NOT NULL OR sms IS NOT NULL)
);

CREATE TABLE IF NOT EXISTS contract(
    id SERIAL PRIMARY KEY,
    node_public_key UUID NOT NULL REFERENCES node(public_key),
    entity_id INTEGER NOT NULL REFERENCES entity(id),
    created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    modified TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS contract_node_public_key_idx ON contract(node_public_key);
"#;
