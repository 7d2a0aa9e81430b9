//! SQLite card repository.
//!
//! Reads the `cards` table of a card catalog database. Category and color
//! filters are evaluated by the same Rust classifiers the in-memory backend
//! uses, registered on the connection as scalar SQL functions, so sampling
//! stays a single bounded `ORDER BY RANDOM() LIMIT ?` query.

use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use crate::card::{CardId, CardRecord};
use crate::category::{Category, ClassifierRegistry};
use crate::color::ColorIdentity;
use crate::storage::traits::{CardQuery, CardRepository, CommanderFilter, RepositoryError};

const COLUMNS: &str = "id, name, mana_cost, type_line, oracle_text, power, toughness, \
                       colors, rarity, set_name, image_uri, price_usd";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS cards (
        id TEXT PRIMARY KEY,
        name TEXT,
        mana_cost TEXT,
        type_line TEXT,
        oracle_text TEXT,
        power TEXT,
        toughness TEXT,
        colors TEXT,
        rarity TEXT,
        set_name TEXT,
        image_uri TEXT,
        price_usd REAL
    );
    CREATE INDEX IF NOT EXISTS cards_name ON cards (name);
";

fn backend_err(err: rusqlite::Error) -> RepositoryError {
    RepositoryError::BackendError(err.to_string())
}

fn lock_err(context: &'static str) -> RepositoryError {
    RepositoryError::BackendError(format!("poisoned lock: {context}"))
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// `%fragment%` with LIKE wildcards in the fragment escaped by `\`.
fn like_pattern(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 2);
    out.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<CardRecord> {
    Ok(CardRecord {
        id: CardId::new(row.get::<_, String>(0)?),
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        mana_cost: row.get(2)?,
        type_line: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        oracle_text: row.get(4)?,
        power: row.get(5)?,
        toughness: row.get(6)?,
        colors: row.get(7)?,
        rarity: row.get(8)?,
        set_name: row.get(9)?,
        image_uri: row.get(10)?,
        price_usd: row.get(11)?,
    })
}

/// Registers `deck_color_mask(colors)` and `deck_category(tag, type_line, oracle_text)`.
fn register_functions(
    conn: &Connection,
    classifiers: &Arc<ClassifierRegistry>,
) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    conn.create_scalar_function("deck_color_mask", 1, flags, |ctx| {
        let raw: Option<String> = ctx.get(0)?;
        Ok(i64::from(ColorIdentity::from_card_field(raw.as_deref()).mask()))
    })?;

    let registry = AssertUnwindSafe(Arc::clone(classifiers));
    conn.create_scalar_function("deck_category", 3, flags, move |ctx| {
        let tag: String = ctx.get(0)?;
        let category: Category = tag
            .parse()
            .map_err(|e: String| rusqlite::Error::UserFunctionError(e.into()))?;
        let type_line: Option<String> = ctx.get(1)?;
        let oracle_text: Option<String> = ctx.get(2)?;

        let mut row = CardRecord::new("", "", type_line.unwrap_or_default(), None);
        row.oracle_text = oracle_text;
        Ok(registry.matches(category, &row))
    })?;

    Ok(())
}

/// Card repository over a SQLite `cards` table.
pub struct SqliteCardRepository {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteCardRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCardRepository").finish_non_exhaustive()
    }
}

impl SqliteCardRepository {
    /// Opens a database file with the standard classifiers.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        Self::open_with_classifiers(path, ClassifierRegistry::standard()?)
    }

    /// Opens a database file with custom classifiers.
    pub fn open_with_classifiers(
        path: impl AsRef<Path>,
        classifiers: ClassifierRegistry,
    ) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;
        Self::from_connection(conn, classifiers)
    }

    /// Opens a private in-memory database. Call [`Self::create_schema`] before use.
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;
        Self::from_connection(conn, ClassifierRegistry::standard()?)
    }

    fn from_connection(
        conn: Connection,
        classifiers: ClassifierRegistry,
    ) -> Result<Self, RepositoryError> {
        register_functions(&conn, &Arc::new(classifiers)).map_err(backend_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates the `cards` table if it does not exist.
    pub fn create_schema(&self) -> Result<(), RepositoryError> {
        let conn = self.conn.lock().map_err(|_| lock_err("sqlite.create_schema"))?;
        conn.execute_batch(SCHEMA).map_err(backend_err)
    }

    /// Inserts one card. Returns error if the ID already exists.
    pub fn insert_card(&self, card: &CardRecord) -> Result<(), RepositoryError> {
        let conn = self.conn.lock().map_err(|_| lock_err("sqlite.insert_card"))?;
        let sql = format!("INSERT INTO cards ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)");
        conn.execute(
            &sql,
            params![
                card.id.as_str(),
                card.name,
                card.mana_cost,
                card.type_line,
                card.oracle_text,
                card.power,
                card.toughness,
                card.colors,
                card.rarity,
                card.set_name,
                card.image_uri,
                card.price_usd,
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref err, _)
                if err.code == ErrorCode::ConstraintViolation =>
            {
                RepositoryError::DuplicateKey(card.id.to_string())
            }
            other => backend_err(other),
        })?;
        Ok(())
    }

    fn query_records(
        &self,
        context: &'static str,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<CardRecord>, RepositoryError> {
        let conn = self.conn.lock().map_err(|_| lock_err(context))?;
        let mut stmt = conn.prepare(sql).map_err(backend_err)?;
        let rows = stmt.query_map(params, read_record).map_err(backend_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(backend_err)
    }
}

impl CardRepository for SqliteCardRepository {
    fn find_by_id(&self, id: &CardId) -> Result<Option<CardRecord>, RepositoryError> {
        let conn = self.conn.lock().map_err(|_| lock_err("sqlite.find_by_id"))?;
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM cards WHERE id = ?"),
            params![id.as_str()],
            read_record,
        )
        .optional()
        .map_err(backend_err)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<CardRecord>, RepositoryError> {
        let conn = self.conn.lock().map_err(|_| lock_err("sqlite.find_by_name"))?;
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM cards WHERE name = ? ORDER BY rowid LIMIT 1"),
            params![name],
            read_record,
        )
        .optional()
        .map_err(backend_err)
    }

    fn sample(&self, query: &CardQuery) -> Result<Vec<CardRecord>, RepositoryError> {
        if query.is_vacuous() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {COLUMNS} FROM cards
             WHERE deck_category(?1, type_line, oracle_text)
             AND COALESCE(price_usd, 0) <= ?2
             AND (?3 = 0 OR deck_color_mask(colors) = 0 OR (deck_color_mask(colors) & ?3) != 0)
             ORDER BY RANDOM()
             LIMIT ?4"
        );
        self.query_records(
            "sqlite.sample",
            &sql,
            params![
                query.category.as_str(),
                query.max_price,
                i64::from(query.colors.mask()),
                to_i64(query.limit),
            ],
        )
    }

    fn search_by_name(
        &self,
        fragment: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CardRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM cards WHERE name LIKE ? ESCAPE '\\' ORDER BY rowid LIMIT ? OFFSET ?"
        );
        self.query_records(
            "sqlite.search_by_name",
            &sql,
            params![like_pattern(fragment), to_i64(limit), to_i64(offset)],
        )
    }

    fn list_commanders(&self, filter: &CommanderFilter) -> Result<Vec<CardRecord>, RepositoryError> {
        let name = filter
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(like_pattern)
            .unwrap_or_else(|| "%".to_string());
        let mask = i64::from(filter.colors.mask());
        let sql = format!(
            "SELECT {COLUMNS} FROM cards
             WHERE (type_line LIKE '%Legendary Creature%'
                    OR (type_line LIKE '%Legendary%' AND oracle_text LIKE '%can be your commander%'))
             AND name LIKE ?1 ESCAPE '\\'
             AND (deck_color_mask(colors) & ?2) = ?2
             ORDER BY rowid
             LIMIT ?3 OFFSET ?4"
        );
        self.query_records(
            "sqlite.list_commanders",
            &sql,
            params![name, mask, to_i64(filter.limit), to_i64(filter.offset)],
        )
    }
}

/// Opens (and if needed creates) a card database at `path`.
pub fn open_database(path: impl AsRef<Path>) -> Result<SqliteCardRepository, RepositoryError> {
    let repo = SqliteCardRepository::open(path)?;
    repo.create_schema()?;
    Ok(repo)
}
